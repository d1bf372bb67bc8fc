use crate::config::CONFIG_FILE_NAME;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = r#"# Groupnest Configuration

# Longest allowed containment chain below any group
max_depth = 5

# Stop starting new work after this many seconds
# deadline_seconds = 3600

[parallel]
enabled = true
# max_concurrency = 8
parallel_branches = false

[retry]
enabled = true
max_retries = 2
base_delay_ms = 250
strategy = "exponential"
timeout_seconds = 30
jitter_factor = 0.1

[report]
format = "csv"
# output = "group_lookup_failures.csv"
path_separator = " -> "
"#;

pub fn init_config(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    init_config_at(&config_path, force)?;
    println!("Created {CONFIG_FILE_NAME} configuration file");
    Ok(())
}

pub fn init_config_at(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(())
}
