//! filevault CLI
//!
//! Command-line interface for the file vault

use clap::{Args, Parser, Subcommand};
use filevault_core::logging_facility::{self, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "filevault")]
#[command(about = "filevault - transactional file storage", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Where the vault lives; shared by every subcommand
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Configuration file (TOML); defaults to ./filevault.toml if present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Absolute storage root (overrides config and FILEVAULT__ROOT_PATH)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// SQLite database file (defaults to <root>/filevault.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Store a file and print the upload envelope
    Upload(commands::upload::UploadArgs),
    /// Print a record's metadata snapshot
    Show(commands::show::ShowArgs),
    /// List stored records
    List,
    /// Write a record's content to stdout
    Cat(commands::cat::CatArgs),
}

fn main() {
    let cli = Cli::parse();

    logging_facility::init(if cli.global.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Upload(args) => commands::upload::execute(args, &cli.global),
        Commands::Show(args) => commands::show::execute(args, &cli.global),
        Commands::List => commands::list::execute(&cli.global),
        Commands::Cat(args) => commands::cat::execute(args, &cli.global),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
