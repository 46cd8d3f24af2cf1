use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use url::Url;

use budget_sync::cli::{
    handle_config, handle_init, handle_month, handle_open, handle_pull, handle_push, handle_seal,
    Overrides, Session,
};
use budget_sync::config::paths::BudgetPaths;
use budget_sync::models::MonthKey;

#[derive(Parser)]
#[command(
    name = "budget-sync",
    version,
    about = "Local-first budget ledger with encrypted household cloud sync",
    long_about = "budget-sync keeps a household budget ledger on this device and \
                  mirrors it, encrypted under the household passphrase, to a shared \
                  cloud table. The passphrase is read from BUDGET_SYNC_PASSPHRASE or \
                  prompted for."
)]
struct Cli {
    /// Household identifier shared by every device of the household
    #[arg(long, global = true, env = "BUDGET_SYNC_HOUSEHOLD")]
    household: Option<String>,

    /// Cloud endpoint, overriding the settings file
    #[arg(long, global = true, env = "BUDGET_SYNC_ENDPOINT")]
    endpoint: Option<Url>,

    /// Cloud API key, overriding the settings file
    #[arg(long, global = true, env = "BUDGET_SYNC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default settings and an empty ledger
    Init,

    /// Show paths and cloud configuration
    Config,

    /// Load the ledger (cloud first) and report where it came from
    Pull,

    /// Save the ledger locally and to the cloud
    Push {
        /// Push this ledger file instead of the local slot
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Replace the cloud copy even when this passphrase cannot open it
        #[arg(long)]
        force: bool,
    },

    /// Show a month's budget, carrying allocations forward into it
    Month {
        /// Months relative to the anchor month (negative for the past)
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i32,

        /// Anchor month (YYYY-MM), defaults to the current month
        #[arg(long)]
        from: Option<MonthKey>,
    },

    /// Encrypt a file into an envelope
    Seal {
        /// Plaintext input file
        input: PathBuf,
        /// Envelope output file
        output: PathBuf,
    },

    /// Decrypt an envelope back into a file
    Open {
        /// Envelope input file
        input: PathBuf,
        /// Plaintext output file
        output: PathBuf,
    },
}

fn init_tracing(log_level: &str) {
    let level: tracing::Level = log_level.parse().unwrap_or(tracing::Level::WARN);
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let paths = BudgetPaths::new()?;
    let overrides = Overrides {
        household_id: cli.household,
        endpoint: cli.endpoint,
        api_key: cli.api_key,
    };

    match cli.command {
        Some(Commands::Init) => handle_init(&paths)?,
        Some(Commands::Config) => handle_config(&paths, &overrides)?,
        Some(Commands::Pull) => {
            let session = Session::open(&paths, overrides)?;
            handle_pull(&session).await?;
        }
        Some(Commands::Push { file, force }) => {
            let session = Session::open(&paths, overrides)?;
            handle_push(&session, file.as_deref(), force).await?;
        }
        Some(Commands::Month { offset, from }) => {
            let session = Session::open(&paths, overrides)?;
            handle_month(&session, offset, from).await?;
        }
        Some(Commands::Seal { input, output }) => handle_seal(&input, &output)?,
        Some(Commands::Open { input, output }) => handle_open(&input, &output)?,
        None => {
            println!("budget-sync - local-first budget ledger with encrypted cloud sync");
            println!();
            println!("Run 'budget-sync --help' for usage information.");
            println!("Run 'budget-sync init' to get started.");
        }
    }

    Ok(())
}
