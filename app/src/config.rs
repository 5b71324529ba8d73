use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::{error, info, warn};
use signalflow::RuntimeConfig;

const CONFIG_FILE: &str = "runtime.toml";

fn get_config_path() -> Option<PathBuf> {
    let proj_dirs = ProjectDirs::from("me", "signalflow", "signalflow_host")?;
    let config_dir = proj_dirs.config_dir();
    if !config_dir.exists() {
        if let Err(e) = fs::create_dir_all(config_dir) {
            error!("Failed to create config directory: {}", e);
            return None;
        }
    }
    Some(config_dir.join(CONFIG_FILE))
}

/// Write the default config so users have a file to edit.
fn save_default_config(path: &Path) {
    match toml::to_string_pretty(&RuntimeConfig::default()) {
        Ok(toml_str) => {
            if let Err(e) = fs::write(path, toml_str) {
                error!("Failed to write config file: {}", e);
            } else {
                info!("Default runtime config written to {}", path.display());
            }
        }
        Err(e) => error!("Failed to serialize config: {}", e),
    }
}

fn read_config(path: &Path) -> RuntimeConfig {
    match fs::read_to_string(path) {
        Ok(toml_str) => match RuntimeConfig::from_toml_str(&toml_str) {
            Ok(config) => {
                info!("Runtime config loaded from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to parse {}, using defaults: {}", path.display(), e);
                RuntimeConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {}, using defaults: {}", path.display(), e);
            RuntimeConfig::default()
        }
    }
}

/// Load the runtime config from `explicit`, or from the platform config
/// directory. Any failure falls back to the defaults.
pub fn load_config(explicit: Option<&Path>) -> RuntimeConfig {
    if let Some(path) = explicit {
        return read_config(path);
    }
    match get_config_path() {
        Some(path) if path.exists() => read_config(&path),
        Some(path) => {
            save_default_config(&path);
            RuntimeConfig::default()
        }
        None => {
            warn!("No config directory available, using defaults");
            RuntimeConfig::default()
        }
    }
}
