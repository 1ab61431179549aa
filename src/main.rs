//! Command-line entry point for videos-dl

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use videos_dl::{Config, ConsoleReporter, Error, RunDriver, SkipPolicy};

/// Download every link listed in `videos-*.txt` files
#[derive(Parser, Debug)]
#[command(name = "videos-dl", version, about)]
struct Cli {
    /// JSON configuration file; command-line flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory searched for link list files
    #[arg(short, long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Link list file name pattern with exactly one `*`
    #[arg(short, long)]
    pattern: Option<String>,

    /// Root directory downloads are written to
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Attempts per link before giving up
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Seconds added to the wait after each failed attempt
    #[arg(long, value_name = "SECS")]
    backoff_secs: Option<u64>,

    /// When an existing file counts as already downloaded
    #[arg(long, value_enum)]
    skip_policy: Option<SkipArg>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SkipArg {
    /// Skip whenever a file with the target name exists
    Exists,
    /// Skip only when the existing file has the expected size
    SizeMatch,
}

impl From<SkipArg> for SkipPolicy {
    fn from(arg: SkipArg) -> Self {
        match arg {
            SkipArg::Exists => SkipPolicy::Exists,
            SkipArg::SizeMatch => SkipPolicy::SizeMatch,
        }
    }
}

impl Cli {
    fn load_config(&self) -> videos_dl::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(dir) = &self.input_dir {
            config.download.input_dir = dir.clone();
        }
        if let Some(pattern) = &self.pattern {
            config.download.link_file_pattern = pattern.clone();
        }
        if let Some(dir) = &self.output {
            config.download.download_dir = dir.clone();
        }
        if let Some(max) = self.max_attempts {
            config.retry.max_attempts = max;
        }
        if let Some(secs) = self.backoff_secs {
            config.retry.backoff_increment = Duration::from_secs(secs);
        }
        if let Some(policy) = self.skip_policy {
            config.download.skip_policy = policy.into();
        }

        Ok(config)
    }

    fn default_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "videos_dl=error",
            (false, 0) => "videos_dl=warn",
            (false, 1) => "videos_dl=info",
            _ => "videos_dl=debug",
        }
    }
}

/// Logs go to stderr so they never interleave with the progress line on stdout
fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: &Cli) -> videos_dl::Result<()> {
    let config = cli.load_config()?;
    let driver = RunDriver::with_http_resolver(&config)?;

    let mut reporter = ConsoleReporter::stdout();
    let summary = driver.run(&mut reporter).await?;

    tracing::info!(
        lists = summary.lists.len(),
        failed = summary.failed(),
        "All link lists processed"
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.default_filter());

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ Error::NoInputFound { .. }) => {
            tracing::debug!(error = %e, "No input");
            eprintln!("No link files found :(");
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
