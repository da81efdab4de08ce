use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{error, info, warn};
use logicsim::driver::DriverConfig;
use logicsim::EvaluationConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings read from `config.toml`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EvaluationConfig,
    pub driver: DriverConfig,
}

/// `<config dir>/logicsim/config.toml`, creating the directory on first use.
fn default_config_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "logicsim")?;
    let dir = dirs.config_dir();
    if let Err(e) = fs::create_dir_all(dir) {
        error!("Cannot create {}: {}", dir.display(), e);
        return None;
    }
    Some(dir.join("config.toml"))
}

/// The file to use: `path` if given, otherwise the per-user default.
pub fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
    path.map(Path::to_path_buf).or_else(default_config_path)
}

/// Write the settings as TOML. Failures are logged and otherwise ignored.
pub fn save_config(config: &AppConfig, path: Option<&Path>) {
    let Some(path) = resolve_path(path) else {
        return;
    };
    let written = toml::to_string_pretty(config)
        .context("encoding settings")
        .and_then(|text| fs::write(&path, text).context("writing file"));
    match written {
        Ok(()) => info!("Settings written to {}", path.display()),
        Err(e) => error!("Cannot save {}: {:#}", path.display(), e),
    }
}

/// Settings from `path` (or the default file). A missing file gives the
/// defaults; an unreadable one gives the defaults with a warning.
pub fn load_config(path: Option<&Path>) -> AppConfig {
    let Some(path) = resolve_path(path).filter(|p| p.exists()) else {
        return AppConfig::default();
    };
    read_config(&path).unwrap_or_else(|e| {
        warn!("Ignoring {}: {:#}", path.display(), e);
        AppConfig::default()
    })
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let text = fs::read_to_string(path).context("reading file")?;
    toml::from_str(&text).context("parsing TOML")
}
