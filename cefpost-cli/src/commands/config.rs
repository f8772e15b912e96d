//! `cefpost config` command handler and configuration resolution

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use cefpost_core::config::CefpostConfig;
use cefpost_core::error::{CefpostError, ConfigError};
use cefpost_parser::CefParser;

use crate::cli::{ConfigAction, ConfigArgs, DEFAULT_CONFIG_PATH};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Source label used when no configuration file exists.
pub const BUILTIN_DEFAULTS_SOURCE: &str = "(built-in defaults)";

/// Values given on the command line, applied after environment overrides.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub timezone: Option<String>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut CefpostConfig) {
        if let Some(ref level) = self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(ref timezone) = self.timezone {
            config.parser.timezone = timezone.clone();
        }
    }
}

/// Effective configuration together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CefpostConfig,
    pub source: String,
}

/// Resolve the effective configuration.
///
/// Precedence: CLI overrides, then `CEFPOST_*` environment variables, then the
/// file, then built-in defaults. An explicit path must exist; a missing default
/// `cefpost.toml` falls back to built-in defaults.
///
/// # Errors
///
/// Returns `CefpostError::Config` when the file cannot be parsed or a value is invalid.
pub async fn load_config(
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<LoadedConfig, CefpostError> {
    let (mut config, source) = match explicit {
        Some(path) => (
            CefpostConfig::from_file(path).await?,
            path.display().to_string(),
        ),
        None => match CefpostConfig::from_file(DEFAULT_CONFIG_PATH).await {
            Ok(config) => (config, DEFAULT_CONFIG_PATH.to_owned()),
            Err(CefpostError::Config(ConfigError::FileNotFound { .. })) => {
                debug!(path = DEFAULT_CONFIG_PATH, "no config file, using defaults");
                (CefpostConfig::default(), BUILTIN_DEFAULTS_SOURCE.to_owned())
            }
            Err(e) => return Err(e),
        },
    };

    config.apply_env_overrides();
    overrides.apply(&mut config);
    config.validate()?;

    Ok(LoadedConfig { config, source })
}

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, overrides, writer).await,
        ConfigAction::Show { section } => {
            execute_show(config_path, overrides, section, writer).await
        }
    }
}

fn source_label(config_path: Option<&Path>) -> String {
    config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned())
}

/// Execute the config validate subcommand.
///
/// Besides the file-level checks, the timezone is resolved by building a
/// parser, so an unknown zone name is reported here rather than at parse time.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails.
async fn execute_validate(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %source_label(config_path), "validating configuration");

    let report = build_validation_report(config_path, overrides).await;
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Load, validate and build a parser, collecting every failure.
pub async fn build_validation_report(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> ConfigValidationReport {
    match load_config(config_path, overrides).await {
        Ok(loaded) => {
            let errors: Vec<String> = match CefParser::new(&loaded.config.parser) {
                Ok(_) => Vec::new(),
                Err(e) => vec![e.to_string()],
            };
            ConfigValidationReport {
                source: loaded.source,
                valid: errors.is_empty(),
                errors,
            }
        }
        Err(e) => ConfigValidationReport {
            source: source_label(config_path),
            valid: false,
            errors: vec![e.to_string()],
        },
    }
}

/// Execute the config show subcommand.
///
/// # Errors
///
/// Returns `CliError::Core` if loading fails or `CliError::Command` if the section name is invalid.
async fn execute_show(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %source_label(config_path), "loading configuration");

    let loaded = load_config(config_path, overrides).await?;
    let report = build_config_report(&loaded, section.as_deref())?;
    writer.render(&report)?;

    Ok(())
}

/// Serialize the whole configuration or one section of it.
pub fn build_config_report(
    loaded: &LoadedConfig,
    section: Option<&str>,
) -> Result<ConfigReport, CliError> {
    let config_toml = match section {
        None => toml::to_string_pretty(&loaded.config),
        Some("general") => toml::to_string_pretty(&loaded.config.general),
        Some("parser") => toml::to_string_pretty(&loaded.config.parser),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: general, parser)",
                other
            )));
        }
    }
    .unwrap_or_else(|e| format!("(serialization error: {})", e));

    Ok(ConfigReport {
        source: loaded.source.clone(),
        section: section.map(str::to_owned),
        config_toml,
    })
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
