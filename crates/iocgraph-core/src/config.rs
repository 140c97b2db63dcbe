use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::resolve::{
    DEFAULT_FROM_FIELDS, DEFAULT_LABEL_FIELDS, DEFAULT_TO_FIELDS, EndpointResolver, FieldPath,
};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "IOCGRAPH_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub edges: EdgeConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

impl Config {
    #[must_use]
    pub fn resolver(&self) -> EndpointResolver {
        self.edges.resolver()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeConfig {
    #[serde(default = "default_from_fields")]
    pub from_fields: Vec<FieldPath>,
    #[serde(default = "default_to_fields")]
    pub to_fields: Vec<FieldPath>,
    #[serde(default = "default_label_fields")]
    pub label_fields: Vec<FieldPath>,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            from_fields: default_from_fields(),
            to_fields: default_to_fields(),
            label_fields: default_label_fields(),
        }
    }
}

impl EdgeConfig {
    #[must_use]
    pub fn resolver(&self) -> EndpointResolver {
        EndpointResolver::new(
            self.from_fields.clone(),
            self.to_fields.clone(),
            self.label_fields.clone(),
        )
    }
}

/// Presentation switches. These only shape rendering and log verbosity;
/// the analysis itself never reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Render only type and value per record.
    #[serde(default)]
    pub reduced: bool,
    /// Raise log verbosity to debug.
    #[serde(default)]
    pub debug: bool,
}

fn paths(raw: &[&str]) -> Vec<FieldPath> {
    raw.iter().filter_map(|p| FieldPath::parse(p).ok()).collect()
}

fn default_from_fields() -> Vec<FieldPath> {
    paths(DEFAULT_FROM_FIELDS)
}

fn default_to_fields() -> Vec<FieldPath> {
    paths(DEFAULT_TO_FIELDS)
}

fn default_label_fields() -> Vec<FieldPath> {
    paths(DEFAULT_LABEL_FIELDS)
}

/// Parse a config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`Config`].
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<Config>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Default per-user config location: `<config_dir>/iocgraph/config.toml`.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("iocgraph/config.toml"))
}

/// Resolve and load the effective configuration.
///
/// Precedence: `explicit` → `$IOCGRAPH_CONFIG` → user config file →
/// defaults. An explicitly requested file must exist; the other locations
/// fall back to defaults when absent.
///
/// # Errors
///
/// Returns an error when an explicit file is missing or any selected file
/// fails to parse.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        return load_config_file(path);
    }

    let candidate = env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .or_else(user_config_path);

    match candidate {
        Some(path) if path.exists() => load_config_file(&path),
        _ => Ok(Config::default()),
    }
}
