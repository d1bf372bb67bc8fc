//! Configuration for groupnest scans.
//!
//! Settings come from `.groupnest.toml` (see [`loader`]) and are then
//! overridden by command-line flags.

mod core;
pub mod loader;
mod parallel;
pub mod retry;

pub use self::core::{GroupnestConfig, ReportConfig, ReportFormat, DEFAULT_MAX_DEPTH};
pub use loader::{load_config, load_config_from, CONFIG_FILE_NAME};
pub use parallel::ParallelConfig;
pub use retry::{RetryConfig, RetryStrategy};
