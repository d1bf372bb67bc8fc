//! CLI command implementations.
//!
//! - **scan**: Load a directory snapshot, scan it and report anomalies
//! - **init**: Write a starter `.groupnest.toml`

pub mod init;
pub mod scan;

pub use init::init_config;
pub use scan::{handle_scan, ScanConfig};
