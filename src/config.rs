use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_OUTPUT_FILE_NAME: &str = "embedded-dependencies.json";

/// Engine configuration, deserialized from `.embedded-deps/config.toml`.
///
/// Every key is optional; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File name of the JSON manifest.
    pub output_file_name: String,
    /// Also render `THIRD-PARTY-NOTICES.html`.
    pub generate_license_file: bool,
    /// Keep packages the lockfile marks as `dev`.
    pub include_dev: bool,
    /// Missing or unrecognized licenses count as copyleft until reviewed.
    pub treat_unknown_as_copyleft: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_file_name: DEFAULT_OUTPUT_FILE_NAME.to_string(),
            generate_license_file: false,
            include_dev: false,
            treat_unknown_as_copyleft: true,
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub output_file_name: Option<String>,
    pub generate_license_file: bool,
    pub include_dev: bool,
}

impl Config {
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(name) = overrides.output_file_name {
            self.output_file_name = name;
        }
        self.generate_license_file |= overrides.generate_license_file;
        self.include_dev |= overrides.include_dev;
        self
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.embedded-deps/config.toml`
/// 3. `~/.config/embedded-deps/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(".embedded-deps").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("embedded-deps")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
