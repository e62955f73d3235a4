//! Run configuration
//!
//! Values come from an optional TOML file and are overridden by flags.
//!
//! ```toml
//! database = "app.db"
//! changelog = "changelogs/index.json"
//! atomic_apply = true
//! ```

use clap::Args;
use dbcontrol_core::errors::{ExError, ExErrorKind};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Flags shared by every command
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Changelog index file
    #[arg(long)]
    pub changelog: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub database: Option<PathBuf>,
    pub changelog: Option<PathBuf>,
    pub atomic_apply: Option<bool>,
}

/// Effective settings after merging file and flags
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database: PathBuf,
    pub changelog: Option<PathBuf>,
    pub atomic_apply: bool,
}

impl Settings {
    /// Changelog index, required by `migrate` and `verify`
    pub fn require_changelog(&self) -> Result<&Path, ExError> {
        self.changelog
            .as_deref()
            .ok_or_else(|| {
                config_error("no changelog index given (use --changelog or the config file)")
            })
    }
}

fn config_error(message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_message(message)
}

/// Parse a TOML configuration file
pub fn load_file(path: &Path) -> Result<FileConfig, ExError> {
    let content = fs::read_to_string(path).map_err(|e| {
        ExError::new(ExErrorKind::Io)
            .with_op("load_config")
            .with_message(format!("{}: {}", path.display(), e))
    })?;
    parse(&content).map_err(|e| config_error(format!("{}: {}", path.display(), e.message())))
}

fn parse(content: &str) -> Result<FileConfig, ExError> {
    toml::from_str(content).map_err(|e| config_error(e.to_string()))
}

/// Merge the config file (if any) with flags; flags win
///
/// `no_atomic` comes from `--no-atomic` and only ever turns atomic apply off.
pub fn resolve(args: &ConfigArgs, no_atomic: bool) -> Result<Settings, ExError> {
    let file = match &args.config {
        Some(path) => load_file(path)?,
        None => FileConfig::default(),
    };
    merge(args, file, no_atomic)
}

fn merge(args: &ConfigArgs, file: FileConfig, no_atomic: bool) -> Result<Settings, ExError> {
    let database = args
        .database
        .clone()
        .or(file.database)
        .ok_or_else(|| config_error("no database given (use --database or the config file)"))?;

    Ok(Settings {
        database,
        changelog: args.changelog.clone().or(file.changelog),
        atomic_apply: !no_atomic && file.atomic_apply.unwrap_or(true),
    })
}
