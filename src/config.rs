//! User settings for evdev-calibrate
//!
//! Loaded from `$XDG_CONFIG_HOME/evdev-calibrate/config.toml`. Every key is
//! optional; environment variables override the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::{config, paths};
use crate::persist::OutputType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Persistence format used when `--output-type` is not given
    pub output_type: OutputType,

    /// Directories whose presence means the X server reads xorg.conf.d snippets
    pub xorg_conf_dirs: Vec<PathBuf>,

    /// Where the user is told to put the xorg.conf.d snippet
    pub snippet_path: PathBuf,

    /// Where the user is told to put the HAL policy
    pub policy_path: PathBuf,

    /// Kernel input class directory used to confirm device names
    pub sysfs_input_dir: PathBuf,

    /// evdev nodes opened when sysfs cannot confirm a name
    pub dev_input_dir: PathBuf,
}

fn default_xorg_conf_dirs() -> Vec<PathBuf> {
    paths::XORG_CONF_DIRS.iter().map(PathBuf::from).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_type: OutputType::Auto,
            xorg_conf_dirs: default_xorg_conf_dirs(),
            snippet_path: PathBuf::from(paths::SNIPPET_FILE),
            policy_path: PathBuf::from(paths::POLICY_FILE),
            sysfs_input_dir: PathBuf::from(paths::SYSFS_INPUT),
            dev_input_dir: PathBuf::from(paths::DEV_INPUT),
        }
    }
}

impl Settings {
    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(config::APP_DIR);
        path.push(config::FILENAME);
        path
    }

    /// Load from the default location; a missing file means defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = match fs::read_to_string(path) {
            Ok(contents) => {
                info!(path = %path.display(), "Loading config");
                Self::parse(&contents)
                    .context(format!("Failed to parse config file {}", path.display()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file found, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(e).context(format!("Failed to read config file {}", path.display()));
            }
        };

        settings.apply_env_overrides();
        settings.validate();
        Ok(settings)
    }

    fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = env::var(config::OUTPUT_TYPE_ENV) {
            match OutputType::parse(&raw) {
                Some(output_type) => self.output_type = output_type,
                None => warn!(var = %config::OUTPUT_TYPE_ENV, value = %raw, "unknown output type, ignoring"),
            }
        }
    }

    fn validate(&mut self) {
        if self.xorg_conf_dirs.is_empty() {
            warn!("xorg_conf_dirs is empty, using defaults");
            self.xorg_conf_dirs = default_xorg_conf_dirs();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Settings::parse("").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let settings = Settings::parse(
            r#"
output_type = "hal"
policy_path = "/usr/share/hal/fdi/policy/20thirdparty/touch.fdi"
"#,
        )
        .unwrap();

        assert_eq!(settings.output_type, OutputType::Hal);
        assert_eq!(settings.policy_path, PathBuf::from("/usr/share/hal/fdi/policy/20thirdparty/touch.fdi"));
        assert_eq!(settings.snippet_path, PathBuf::from(paths::SNIPPET_FILE));
        assert_eq!(settings.xorg_conf_dirs, default_xorg_conf_dirs());
        assert_eq!(settings.dev_input_dir, PathBuf::from(paths::DEV_INPUT));
    }

    #[test]
    fn test_output_type_names() {
        assert_eq!(Settings::parse(r#"output_type = "xorg.conf.d""#).unwrap().output_type, OutputType::XorgConfD);
        assert_eq!(Settings::parse(r#"output_type = "xinput""#).unwrap().output_type, OutputType::Xinput);
        assert!(Settings::parse(r#"output_type = "udev""#).is_err());
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        assert_eq!(Settings::parse(&text).unwrap(), settings);
    }

    #[test]
    fn test_validate_restores_dirs() {
        let mut settings = Settings::parse("xorg_conf_dirs = []").unwrap();
        settings.validate();
        assert_eq!(settings.xorg_conf_dirs, default_xorg_conf_dirs());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.snippet_path, PathBuf::from(paths::SNIPPET_FILE));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "output_type = [").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
