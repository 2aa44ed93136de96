//! # daogen
//!
//! Command-line entry point of the DAO generator.

use cli::{Cli, Commands};
use commands::GenerateOptions;
use daogen_core::{init_logging, DaogenResult, ErrorReport};
use std::process::ExitCode;
use tracing::{error, info};

mod cli;
mod commands;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let report = ErrorReport::from(&e);
            error!(code = %report.code, fatal = report.fatal, "{}", report.message);
            eprintln!("error[{}]: {}", report.code, report.message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> DaogenResult<()> {
    let mut config = commands::load_config(&cli.config)?;

    match cli.command {
        Commands::Generate {
            schema,
            target_dir,
            dry_run,
            no_module,
            no_interface_binding,
            parallel,
            json,
        } => {
            let options = GenerateOptions {
                schema,
                target_dir,
                dry_run,
                no_module,
                no_interface_binding,
                parallel,
                json,
            };
            commands::apply_overrides(&mut config, &options);
            init_logging(&config.logging)?;
            info!("Starting daogen {}", env!("CARGO_PKG_VERSION"));
            commands::generate(&config, &options)?;
        }
        Commands::Inspect { schema } => {
            init_logging(&config.logging)?;
            commands::inspect(&config, &schema)?;
        }
        Commands::Config => commands::show_config(&config)?,
    }

    Ok(())
}
