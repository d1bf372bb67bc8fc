use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "groupnest")]
#[command(about = "Security group nesting analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a directory snapshot for circular and over-deep group nesting
    Scan {
        /// Directory snapshot (.json, .yaml, .yml or .toml)
        snapshot: PathBuf,

        /// Configuration file (defaults to .groupnest.toml discovery)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum nesting depth before a chain is reported
        #[arg(long = "max-depth")]
        max_depth: Option<usize>,

        /// Number of worker threads (0 = all available cores)
        #[arg(short = 'j', long = "jobs")]
        jobs: Option<usize>,

        /// Scan roots one after another on the calling thread
        #[arg(long = "no-parallel")]
        no_parallel: bool,

        /// Also explore sibling branches of one root in parallel
        #[arg(long = "parallel-branches")]
        parallel_branches: bool,

        /// Stop expanding new groups after this many seconds
        #[arg(long = "deadline")]
        deadline: Option<u64>,

        /// Format of the lookup failure report
        #[arg(long = "report-format", value_enum)]
        report_format: Option<ReportFormat>,

        /// Lookup failure report path (defaults to a timestamped file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Summary printed to stdout when the scan finishes
        #[arg(long, value_enum, default_value = "terminal")]
        summary: SummaryFormat,

        /// Disable retries of transient lookup failures
        #[arg(long = "no-retry")]
        no_retry: bool,

        /// Hide progress bars
        #[arg(short, long)]
        quiet: bool,

        /// Disable colors in the terminal summary
        #[arg(long)]
        plain: bool,

        /// Emit logs as JSON lines on stderr
        #[arg(long = "log-json")]
        log_json: bool,

        /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
        /// -v: Scan start and finish
        /// -vv: Per-root spans and lookup failures
        /// -vvv: Everything
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    Terminal,
    Json,
}

impl From<ReportFormat> for crate::config::ReportFormat {
    fn from(f: ReportFormat) -> Self {
        match f {
            ReportFormat::Csv => crate::config::ReportFormat::Csv,
            ReportFormat::Json => crate::config::ReportFormat::Json,
        }
    }
}
