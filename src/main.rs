use std::path::PathBuf;

use anyhow::Context;
use apirunner::commands::{self, RunOptions};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};


/// Run declarative JSON test suites against an HTTP API.
#[derive(Parser)]
#[clap(author, version = clap::crate_version!(), max_term_width = 100, about)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Increase logging level (-v: info, -vv: debug, -vvv: trace)
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs every suite file found under a test directory
    Run {
        /// Directory searched recursively for `.json` suite files
        test_dir: PathBuf,

        /// Only run suites whose file name matches this regex
        #[clap(short = 'm', long = "match", default_value = ".*")]
        pattern: String,

        /// Run config file [default: <TEST_DIR>/apirunner.conf]
        #[clap(short, long)]
        config: Option<PathBuf>,

        /// Number of suites run concurrently
        #[clap(
            short,
            long,
            default_value_t = 1,
            value_parser = clap::value_parser!(u16).range(1..)
        )]
        jobs: u16,

        /// Print error details under each failed test as it runs
        #[clap(short, long)]
        details: bool,

        /// Write a JSON report of the run to this file
        #[clap(short, long)]
        report: Option<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_tracing(verbose: u8) -> Result<(), anyhow::Error> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level(verbose).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Returns whether every test passed.
async fn run(cli: Cli) -> Result<bool, anyhow::Error> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "apirunner", &mut std::io::stdout());
            Ok(true)
        }
        Commands::Run {
            test_dir,
            pattern,
            config,
            jobs,
            details,
            report,
        } => {
            init_tracing(cli.verbose)?;
            debug!("Argument parsing complete.");

            let options = RunOptions {
                test_dir,
                config_path: config,
                match_pattern: pattern,
                jobs: usize::from(jobs),
                details,
                report,
            };
            let passed = commands::run_command(&options).await.with_context(|| {
                format!("Error executing tests in {}", options.test_dir.display())
            })?;
            Ok(passed)
        }
    }
}

#[tokio::main]
async fn main() {
    match run(Cli::parse()).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
