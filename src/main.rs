use anyhow::Result;
use clap::Parser;
use groupnest::cli::{Cli, Commands};
use groupnest::commands::ScanConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            snapshot,
            config,
            max_depth,
            jobs,
            no_parallel,
            parallel_branches,
            deadline,
            report_format,
            output,
            summary,
            no_retry,
            quiet,
            plain,
            log_json,
            verbosity,
        } => {
            let scan_config = ScanConfig {
                snapshot,
                config,
                max_depth,
                jobs,
                no_parallel,
                parallel_branches,
                deadline,
                report_format: report_format.map(Into::into),
                output,
                summary: Some(summary),
                no_retry,
                quiet,
                plain,
                log_json,
                verbosity,
            };
            groupnest::commands::handle_scan(scan_config)
        }
        Commands::Init { force } => groupnest::commands::init_config(force),
    }
}
