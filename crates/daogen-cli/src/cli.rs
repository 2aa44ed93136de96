use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "daogen")]
#[command(version, about = "Generate asynchronous DAOs and their injection modules from schema metadata")]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where configuration comes from.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Directory holding default.toml and local.toml
    #[arg(long, global = true, default_value = "./config")]
    pub config_dir: PathBuf,

    /// Extra configuration file, applied after the directory layers
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate DAOs and modules for every schema of a catalog
    Generate {
        /// Schema catalog (JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Override the output directory
        #[arg(short, long)]
        target_dir: Option<PathBuf>,

        /// Build everything but write nothing; list the files instead
        #[arg(long)]
        dry_run: bool,

        /// Skip the per-schema DAO module
        #[arg(long)]
        no_module: bool,

        /// Skip interface-scoped bindings
        #[arg(long)]
        no_interface_binding: bool,

        /// Process tables in parallel
        #[arg(long)]
        parallel: bool,

        /// Print the generation reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how each table's key resolves, without generating anything
    Inspect {
        /// Schema catalog (JSON)
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Print the effective configuration as TOML
    Config,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
