//! CLI application for utility invoice extraction and incremental loading.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{Context, browse, config, pass, watch};

/// Extract utility invoices from PDFs and load them into a database
///
/// Only one run, watch or load may write to a given database at a time;
/// concurrent writers can store the same invoice twice.
#[derive(Parser)]
#[command(name = "facturas")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Invoice directory (overrides the config file)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    /// SQLite database (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the text dump of every PDF in the invoice directory
    Dump,

    /// Extract the text dump into the general and itemized CSVs
    Extract,

    /// Load both CSVs into the database
    Load,

    /// Dump, extract and load once, then exit
    Run,

    /// Re-run the full pass whenever new PDFs appear
    Watch(watch::WatchArgs),

    /// Report file names that share a normalized key
    Keys(browse::KeysArgs),

    /// List stored invoices, newest first
    List(browse::ListArgs),

    /// Show stored row counts
    Status,

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let ctx = Context {
        config_path: cli.config,
        invoice_dir: cli.dir,
        database: cli.db,
    };

    match cli.command {
        Commands::Dump => pass::dump(&ctx),
        Commands::Extract => pass::extract(&ctx),
        Commands::Load => pass::load(&ctx),
        Commands::Run => pass::run(&ctx),
        Commands::Watch(args) => watch::run(args, &ctx).await,
        Commands::Keys(args) => browse::keys(args, &ctx),
        Commands::List(args) => browse::list(args, &ctx),
        Commands::Status => browse::status(&ctx),
        Commands::Config(args) => config::run(args, &ctx),
    }
}
