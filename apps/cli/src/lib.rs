//! # quill: Quote Drafting CLI
//!
//! Wires configuration, logging and the database together, then hands the
//! parsed subcommand to its handler.
//!
//! ## Module Organization
//! ```text
//! quill_cli/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── args.rs         ◄─── clap definitions
//! ├── config.rs       ◄─── quill.toml + QUILL_* overrides
//! ├── commands/       ◄─── company, client, quote handlers
//! └── error.rs        ◄─── AppError shown to the user
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  init_tracing(-v) ──► AppConfig::load(--config) ──► Database::new      │
//! │                                                       (migrations)     │
//! │                                                            │           │
//! │                                                            ▼           │
//! │                                              commands::<area>::handle  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod args;
pub mod commands;
pub mod config;
pub mod error;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands, ConfigCommand};
use config::AppConfig;
use error::AppResult;
use quill_db::{Database, DbConfig};

/// Runs one invocation of the CLI.
pub async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load(cli.config.clone())?;

    match cli.command {
        Commands::Config(command) => run_config(&config, cli.config, command),
        command => run_with_database(&config, command).await,
    }
}

async fn run_with_database(config: &AppConfig, command: Commands) -> AppResult<()> {
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    info!(?db_path, "Opening database");
    let db = Database::new(DbConfig::new(db_path)).await?;

    let result = match command {
        Commands::Company(command) => commands::company::handle(&db, command).await,
        Commands::Client(command) => commands::client::handle(&db, command).await,
        Commands::Quote(command) => commands::quote::handle(&db, config, command).await,
        Commands::Config(_) => Ok(()),
    };

    db.close().await;
    result
}

fn run_config(config: &AppConfig, path: Option<std::path::PathBuf>, command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommand::Init => {
            let path = path.or_else(AppConfig::default_config_path);
            config.save(path.clone())?;
            if let Some(path) = path {
                println!("Wrote {}", path.display());
            }
        }
    }
    Ok(())
}

/// Initializes the tracing subscriber, writing to stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages everywhere
/// - `RUST_LOG=quill=trace` - Trace for quill crates only
/// - Default: `info,quill=debug,sqlx=warn`; `-v` raises it to `debug`
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug,sqlx=warn" } else { "info,quill=debug,sqlx=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(verbose, "Tracing initialized");
}
