//! Config command - inspect and edit the invx configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand, ValueEnum};
use console::style;
use tracing::debug;

use invx_core::export::ExportFormat;
use invx_core::models::config::InvxConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show every setting and where it was loaded from
    Show,

    /// Write a configuration file with the default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one setting
    Get {
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Change one setting in the configuration file
    Set {
        #[arg(value_enum)]
        key: ConfigKey,
        /// New value; an empty string clears a section marker
        value: String,
    },

    /// Show configuration file path
    Path,
}

/// Settings addressable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ConfigKey {
    #[value(name = "input.directory")]
    InputDirectory,
    #[value(name = "output.path")]
    OutputPath,
    #[value(name = "output.format")]
    OutputFormat,
    #[value(name = "extraction.section_start")]
    SectionStart,
    #[value(name = "extraction.section_end")]
    SectionEnd,
    #[value(name = "batch.continue_on_error")]
    ContinueOnError,
}

impl ConfigKey {
    const ALL: [ConfigKey; 6] = [
        ConfigKey::InputDirectory,
        ConfigKey::OutputPath,
        ConfigKey::OutputFormat,
        ConfigKey::SectionStart,
        ConfigKey::SectionEnd,
        ConfigKey::ContinueOnError,
    ];

    fn name(self) -> &'static str {
        match self {
            ConfigKey::InputDirectory => "input.directory",
            ConfigKey::OutputPath => "output.path",
            ConfigKey::OutputFormat => "output.format",
            ConfigKey::SectionStart => "extraction.section_start",
            ConfigKey::SectionEnd => "extraction.section_end",
            ConfigKey::ContinueOnError => "batch.continue_on_error",
        }
    }

    /// Current value; unset markers print as an empty string.
    fn get(self, config: &InvxConfig) -> String {
        match self {
            ConfigKey::InputDirectory => config.input.directory.display().to_string(),
            ConfigKey::OutputPath => config.output.path.display().to_string(),
            ConfigKey::OutputFormat => config.output.format.extension().to_string(),
            ConfigKey::SectionStart => config.extraction.section_start.clone().unwrap_or_default(),
            ConfigKey::SectionEnd => config.extraction.section_end.clone().unwrap_or_default(),
            ConfigKey::ContinueOnError => config.batch.continue_on_error.to_string(),
        }
    }

    fn set(self, config: &mut InvxConfig, value: &str) -> anyhow::Result<()> {
        let marker = || Some(value.to_string()).filter(|v| !v.is_empty());

        match self {
            ConfigKey::InputDirectory => config.input.directory = PathBuf::from(value),
            ConfigKey::OutputPath => config.output.path = PathBuf::from(value),
            ConfigKey::OutputFormat => {
                config.output.format = ExportFormat::from_name(value).ok_or_else(|| {
                    anyhow::anyhow!("Unknown format {:?}, expected xlsx, csv or json", value)
                })?;
            }
            ConfigKey::SectionStart => config.extraction.section_start = marker(),
            ConfigKey::SectionEnd => config.extraction.section_end = marker(),
            ConfigKey::ContinueOnError => {
                config.batch.continue_on_error = value
                    .parse()
                    .with_context(|| format!("Expected true or false, got {:?}", value))?;
            }
        }
        Ok(())
    }
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init { force } => init_config(&path, force),
        ConfigCommand::Get { key } => {
            println!("{}", key.get(&read_or_default(&path)?));
            Ok(())
        }
        ConfigCommand::Set { key, value } => set_config(&path, key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invx")
        .join("config.json")
}

/// Load the explicit config file, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvxConfig> {
    if let Some(path) = config_path {
        return InvxConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config file {}", path));
    }

    read_or_default(&default_config_path())
}

fn read_or_default(path: &Path) -> anyhow::Result<InvxConfig> {
    if !path.exists() {
        return Ok(InvxConfig::default());
    }
    debug!("Using config file {}", path.display());
    InvxConfig::from_file(path)
        .with_context(|| format!("Failed to load config file {}", path.display()))
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if path.exists() {
        println!("{} Loaded from {}", style("ℹ").blue(), path.display());
    } else {
        println!("{} No config file, using defaults", style("ℹ").blue());
    }

    let config = read_or_default(path)?;
    for key in ConfigKey::ALL {
        println!("{} = {}", key.name(), key.get(&config));
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    write_config(path, &InvxConfig::default())?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn set_config(path: &Path, key: ConfigKey, value: &str) -> anyhow::Result<()> {
    let mut config = read_or_default(path)?;
    key.set(&mut config, value)?;
    write_config(path, &config)?;

    println!(
        "{} {} = {}",
        style("✓").green(),
        key.name(),
        key.get(&config)
    );
    Ok(())
}

fn write_config(path: &Path, config: &InvxConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    config
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'invx config init' to create a configuration file.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use invx_core::LineItemScope;

    #[test]
    fn test_every_key_round_trips_through_set() {
        let mut config = InvxConfig::default();
        let values = [
            "in",
            "out/all.csv",
            "csv",
            "Product Details:",
            "TotalPrice",
            "false",
        ];

        for (key, value) in ConfigKey::ALL.into_iter().zip(values) {
            key.set(&mut config, value).unwrap();
            assert_eq!(key.get(&config), value, "{}", key.name());
        }
        assert_eq!(
            config.extraction.line_item_scope(),
            LineItemScope::Section {
                start: "Product Details:".to_string(),
                end: Some("TotalPrice".to_string()),
            }
        );
    }

    #[test]
    fn test_value_names_match_keys() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::from_str(key.name(), false).unwrap(), key);
        }
    }

    #[test]
    fn test_empty_marker_clears_section() {
        let mut config = InvxConfig::default();
        ConfigKey::SectionStart.set(&mut config, "Products").unwrap();
        ConfigKey::SectionStart.set(&mut config, "").unwrap();
        assert_eq!(config.extraction.section_start, None);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = InvxConfig::default();
        assert!(ConfigKey::OutputFormat.set(&mut config, "pdf").is_err());
        assert!(ConfigKey::ContinueOnError.set(&mut config, "maybe").is_err());
        assert_eq!(config.output.format, ExportFormat::Xlsx);
        assert!(config.batch.continue_on_error);
    }

    #[test]
    fn test_set_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        set_config(&path, ConfigKey::OutputFormat, "json").unwrap();
        let config = InvxConfig::from_file(&path).unwrap();
        assert_eq!(config.output.format, ExportFormat::Json);
        assert_eq!(config.input.directory, PathBuf::from("Documents/invoices"));
    }
}
