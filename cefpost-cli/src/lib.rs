//! cefpost CLI library.
//!
//! This library exposes internal modules for integration testing.
//! In production, `cefpost` is used as a binary (main.rs).

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

use cli::{Cli, Commands};
use commands::config::ConfigOverrides;
use error::CliError;
use output::OutputWriter;

/// Dispatch a parsed command line.
///
/// `config` subcommands resolve the configuration themselves so that an invalid
/// file is reported instead of aborting. `parse` initializes logging from the
/// effective configuration before reading any input.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        config,
        log_level,
        output,
        timezone,
        command,
    } = cli;

    let writer = OutputWriter::new(output);
    let overrides = ConfigOverrides {
        log_level,
        timezone,
    };

    match command {
        Commands::Config(args) => {
            commands::config::execute(args, config.as_deref(), &overrides, &writer).await
        }
        Commands::Parse(args) => {
            let loaded = commands::config::load_config(config.as_deref(), &overrides).await?;
            logging::init_tracing(&loaded.config.general)
                .map_err(|e| CliError::Config(e.to_string()))?;
            cefpost_core::metrics::describe_all();

            tracing::debug!(source = %loaded.source, "configuration loaded");
            commands::parse::execute(args, &loaded.config, &writer).await
        }
    }
}
