//! `sqlreg` command-line entry point.
//!
//! # Responsibility
//! - Resolve statements from a JSON source file.
//! - Run one transactional member upgrade batch against a database file.

use clap::{Args, Parser, Subcommand};
use log::error;
use sqlreg_core::{
    init_logging, load_config, open_db, ConcurrentStore, CoreConfig, JsonStatementSource,
    LogNotifier, StatementService, ThresholdPolicy, UpgradeService,
};
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "sqlreg", version = sqlreg_core::core_version())]
#[command(about = "Statement registry and member level upgrade tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a statement source and print resolved statements
    Statements(StatementsArgs),
    /// Run one member upgrade batch
    Upgrade(UpgradeArgs),
}

#[derive(Debug, Args)]
struct StatementsArgs {
    /// JSON file with a `statements` array of `{key, text}` objects
    source: PathBuf,

    /// Keys to resolve; prints every loaded statement when omitted
    #[arg(long = "key", short = 'k')]
    keys: Vec<String>,
}

#[derive(Debug, Args)]
struct UpgradeArgs {
    /// SQLite database file; overrides `database_path` from the config
    #[arg(long)]
    db: Option<PathBuf>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

type CliResult = Result<(), Box<dyn Error>>;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Statements(args) => run_statements(args),
        Command::Upgrade(args) => run_upgrade(args),
    };

    if let Err(err) = result {
        error!("event=cli_exit module=cli status=error error={err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run_statements(args: StatementsArgs) -> CliResult {
    let source = JsonStatementSource::new(&args.source);
    let service = StatementService::initialize(source, ConcurrentStore::new())?;

    let keys = if args.keys.is_empty() {
        let mut keys = service.store().keys();
        keys.sort();
        keys
    } else {
        args.keys
    };

    for key in keys {
        let text = service.get_statement(&key)?;
        println!("{key}\t{text}");
    }
    Ok(())
}

fn run_upgrade(args: UpgradeArgs) -> CliResult {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => CoreConfig::default(),
    };
    if config.logging.log_dir.is_some() {
        init_logging(&config.logging)?;
    }

    let db_path = args
        .db
        .or_else(|| config.database_path.clone())
        .ok_or("no database given; pass --db or set database_path in the config")?;
    let mut conn = open_db(&db_path)?;

    let service = UpgradeService::new(ThresholdPolicy::from_config(&config.upgrade), LogNotifier);
    let report = service.run_upgrade_batch(&mut conn)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
