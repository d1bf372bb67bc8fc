//! Progress feedback for scans, built on `indicatif`.
//!
//! # Progress Behavior
//!
//! - **Quiet Mode**: No progress output (`--quiet` or the `GROUPNEST_QUIET`
//!   env var)
//! - **Non-TTY**: Bars are hidden when stderr is not a terminal, so CI logs
//!   and piped output stay clean
//!
//! ```rust,no_run
//! use groupnest::progress::{ProgressConfig, ProgressManager, TEMPLATE_ROOT_SCAN};
//!
//! let manager = ProgressManager::new(ProgressConfig::from_env(false, 0));
//! let bar = manager.create_bar(120, TEMPLATE_ROOT_SCAN);
//! bar.set_message("Scanning groups");
//! bar.inc(1);
//! bar.finish_and_clear();
//! ```

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Arc;

pub const TEMPLATE_ROOT_SCAN: &str = "🔎 {msg} {pos}/{len} groups ({percent}%) - {eta}";
pub const TEMPLATE_SPINNER: &str = "{spinner} {msg}";

pub const QUIET_ENV_VAR: &str = "GROUPNEST_QUIET";

#[derive(Debug, Clone, Default)]
pub struct ProgressConfig {
    pub quiet_mode: bool,
    pub verbosity: u8,
}

impl ProgressConfig {
    pub fn from_env(quiet: bool, verbosity: u8) -> Self {
        let env_quiet = std::env::var(QUIET_ENV_VAR).is_ok();
        Self {
            quiet_mode: quiet || env_quiet,
            verbosity,
        }
    }

    pub fn should_show_progress(&self) -> bool {
        if self.quiet_mode {
            return false;
        }

        use std::io::IsTerminal;
        std::io::stderr().is_terminal()
    }
}

/// Hands out progress bars that share one terminal area.
#[derive(Clone)]
pub struct ProgressManager {
    multi: Arc<MultiProgress>,
    config: ProgressConfig,
}

impl ProgressManager {
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            multi: Arc::new(MultiProgress::new()),
            config,
        }
    }

    /// Hidden when progress should not be shown.
    pub fn create_bar(&self, len: u64, template: &str) -> ProgressBar {
        if !self.config.should_show_progress() {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  ");
        let pb = self.multi.add(ProgressBar::new(len));
        pb.set_style(style);
        pb
    }

    /// Hidden when progress should not be shown.
    pub fn create_spinner(&self, msg: &str) -> ProgressBar {
        if !self.config.should_show_progress() {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::default_spinner()
            .template(TEMPLATE_SPINNER)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(style);
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    pub fn verbosity(&self) -> u8 {
        self.config.verbosity
    }

    /// Clear all bars before printing final output.
    pub fn clear(&self) -> std::io::Result<()> {
        self.multi.clear()
    }
}
