//! Config command - inspect and edit the configuration file.
//!
//! Every subcommand works on the file chosen with the global `-c` flag, or on
//! the per-user default when none is given.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;
use tracing::debug;

use fapiao_core::models::config::FapiaoConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init(InitArgs),

    /// Print one configuration value
    Get {
        /// Dotted key (e.g., "extraction.party_context_window")
        key: String,
    },

    /// Change one configuration value and save the file
    Set {
        /// Dotted key
        key: String,
        /// New value, parsed as JSON when possible
        value: String,
    },

    /// Show the configuration file in use
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path (default: the file in use)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let location = ConfigLocation::resolve(config_path);
    debug!("Config location: {}", location.path.display());

    match args.command {
        ConfigCommand::Show => show_config(&location),
        ConfigCommand::Init(init_args) => init_config(&location, init_args),
        ConfigCommand::Get { key } => get_config(&location, &key),
        ConfigCommand::Set { key, value } => set_config(&location, &key, &value),
        ConfigCommand::Path => show_path(&location),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fapiao")
        .join("config.json")
}

/// Load the configuration from `path`, or from the default location if it exists.
pub fn load_config(path: Option<&str>) -> anyhow::Result<FapiaoConfig> {
    ConfigLocation::resolve(path).load()
}

/// The configuration file a command operates on.
struct ConfigLocation {
    path: PathBuf,
    /// Chosen with `-c`; such a file must exist when read.
    explicit: bool,
}

impl ConfigLocation {
    fn resolve(path: Option<&str>) -> Self {
        match path {
            Some(path) => Self {
                path: PathBuf::from(path),
                explicit: true,
            },
            None => Self {
                path: default_config_path(),
                explicit: false,
            },
        }
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> anyhow::Result<FapiaoConfig> {
        if self.explicit || self.exists() {
            debug!("Using config file {}", self.path.display());
            return FapiaoConfig::from_file(&self.path)
                .with_context(|| format!("Failed to read config file {}", self.path.display()));
        }
        Ok(FapiaoConfig::default())
    }

    /// Like `load`, but a missing file starts from defaults.
    fn load_or_default(&self) -> anyhow::Result<FapiaoConfig> {
        if self.exists() {
            self.load()
        } else {
            Ok(FapiaoConfig::default())
        }
    }

    fn save(&self, config: &FapiaoConfig) -> anyhow::Result<()> {
        create_parent(&self.path)?;
        config
            .save(&self.path)
            .with_context(|| format!("Failed to write config file {}", self.path.display()))
    }
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Value at a dotted `key` in a serialized configuration.
fn lookup<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

/// Replace the value at an existing dotted `key`; unknown keys are rejected.
fn replace(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (parent, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (
            parent
                .split('.')
                .try_fold(&mut *json, |current, part| current.get_mut(part)),
            leaf,
        ),
        None => (Some(&mut *json), key),
    };

    let slot = parent
        .and_then(Value::as_object_mut)
        .and_then(|section| section.get_mut(leaf))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    if slot.is_object() {
        anyhow::bail!("{} is a section; set one of its keys instead", key);
    }
    *slot = value;
    Ok(())
}

/// Parse a command-line value as JSON, falling back to a plain string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn show_config(location: &ConfigLocation) -> anyhow::Result<()> {
    if !location.exists() && !location.explicit {
        eprintln!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }

    let config = location.load()?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(location: &ConfigLocation, args: InitArgs) -> anyhow::Result<()> {
    let target = ConfigLocation {
        path: args.output.unwrap_or_else(|| location.path.clone()),
        explicit: true,
    };

    if target.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            target.path.display()
        );
    }

    target.save(&FapiaoConfig::default())?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        target.path.display()
    );

    Ok(())
}

fn get_config(location: &ConfigLocation, key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(location.load()?)?;
    let value =
        lookup(&json, key).ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn set_config(location: &ConfigLocation, key: &str, raw: &str) -> anyhow::Result<()> {
    let mut json = serde_json::to_value(location.load_or_default()?)?;
    let value = parse_value(raw);

    replace(&mut json, key, value.clone())?;
    let config: FapiaoConfig = serde_json::from_value(json)
        .with_context(|| format!("Invalid value for {}: {}", key, raw))?;
    location.save(&config)?;

    println!(
        "{} Set {} = {} in {}",
        style("✓").green(),
        key,
        serde_json::to_string(&value)?,
        location.path.display()
    );

    Ok(())
}

fn show_path(location: &ConfigLocation) -> anyhow::Result<()> {
    println!("Configuration file: {}", location.path.display());

    if location.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'fapiao config init' to create a configuration file.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_key() {
        let config = json!({"extraction": {"party_context_window": 64}});
        assert_eq!(lookup(&config, "extraction.party_context_window"), Some(&json!(64)));
        assert_eq!(lookup(&config, "extraction.missing"), None);
        assert_eq!(lookup(&config, "extraction.party_context_window.deeper"), None);
    }

    #[test]
    fn test_replace_existing_key_only() {
        let mut config = json!({"ocr": {"language": "chi_sim+eng", "psm": 6}});

        replace(&mut config, "ocr.psm", json!(4)).unwrap();
        assert_eq!(config["ocr"]["psm"], json!(4));

        assert!(replace(&mut config, "ocr.dpi", json!(300)).is_err());
        assert!(replace(&mut config, "ocr", json!(1)).is_err());
        assert!(replace(&mut config, "pdf.max_pages", json!(1)).is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("10"), json!(10));
        assert_eq!(parse_value("false"), json!(false));
        assert_eq!(parse_value("chi_sim"), json!("chi_sim"));
    }
}
