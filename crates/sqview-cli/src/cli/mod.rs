//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use sqview_core::config::{self, Config};
use sqview_core::interrupt;

mod commands;

#[derive(Parser)]
#[command(name = "sqview")]
#[command(version = "0.2")]
#[command(about = "Slurm queue and log viewer for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print or follow the most recent job's logs in a directory
    Logs {
        /// Directory holding *_submission.sh scripts and log files
        /// (defaults to the configured log_dir)
        #[arg(value_name = "LOG_DIR")]
        log_dir: Option<String>,

        /// Pick the oldest submitted job instead of the newest
        #[arg(long)]
        oldest: bool,

        /// Keep printing stdout as the job appends to it
        #[arg(long = "follow-stdout")]
        follow_stdout: bool,

        /// Keep printing stderr as the job appends to it
        #[arg(long = "follow-stderr", conflicts_with = "follow_stdout")]
        follow_stderr: bool,
    },

    /// Copy the working tree aside and run a command inside the copy
    Snapshot {
        /// Command to run inside the snapshot
        #[arg(value_name = "COMMAND")]
        command: String,

        /// Basename glob to skip while copying (repeatable)
        #[arg(long, value_name = "GLOB")]
        exclude: Vec<String>,

        /// Directory to create the experiment copy under
        #[arg(long, value_name = "DIR")]
        base_dir: Option<String>,

        /// Fixed experiment id (random when omitted)
        #[arg(long, value_name = "ID")]
        experiment_id: Option<u64>,

        /// Report what would happen without copying or running
        #[arg(long)]
        dry_run: bool,
    },

    /// Show recent GitHub activity for a user
    Activity {
        /// GitHub user (defaults to the configured github_user)
        #[arg(long)]
        user: Option<String>,

        /// Maximum number of events to show
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    interrupt::init();
    let _log_guard = init_logging();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

/// Diagnostics go to a file; the dashboard owns the terminal.
///
/// Returns the appender guard that must stay alive for the process, or
/// `None` when the log directory cannot be created.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::EnvFilter;

    let dir = config::paths::log_dir();
    std::fs::create_dir_all(&dir).ok()?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, "sqview.log"));
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SQVIEW_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;

    // default to the dashboard
    let Some(command) = cli.command else {
        return commands::dash::run(config);
    };

    match command {
        Commands::Logs {
            log_dir,
            oldest,
            follow_stdout,
            follow_stderr,
        } => {
            commands::logs::run(
                log_dir.as_deref(),
                oldest,
                follow_stdout,
                follow_stderr,
                &config,
            )
            .await
        }

        Commands::Snapshot {
            command,
            exclude,
            base_dir,
            experiment_id,
            dry_run,
        } => {
            commands::snapshot::run(
                &command,
                exclude,
                base_dir.as_deref(),
                experiment_id,
                dry_run,
                &config,
            )
            .await
        }

        Commands::Activity { user, limit } => {
            commands::activity::run(user.as_deref(), limit, &config).await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
