//! Parallelism configuration for scans.
//!
//! Root scans are independent, so they run on a rayon pool by default.
//! Sibling branches inside one root may also be fanned out; every worker
//! gets its own immutable trail, so this changes scheduling only, never
//! results.

use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// ```rust
/// use groupnest::config::ParallelConfig;
///
/// let config = ParallelConfig {
///     enabled: true,
///     max_concurrency: Some(4),
///     parallel_branches: false,
/// };
/// assert_eq!(config.effective_concurrency(), 4);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Scan roots concurrently (default: true)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Worker threads (default: available cores)
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Also explore sibling child groups concurrently (default: false)
    #[serde(default)]
    pub parallel_branches: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_concurrency: None,
            parallel_branches: false,
        }
    }
}

impl ParallelConfig {
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Worker count; 1 when parallelism is disabled.
    pub fn effective_concurrency(&self) -> usize {
        if !self.enabled {
            return 1;
        }
        self.max_concurrency
            .filter(|&n| n > 0)
            .unwrap_or_else(num_cpus)
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}
