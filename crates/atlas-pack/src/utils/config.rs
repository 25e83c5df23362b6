//! Settings file management.
//!
//! The settings file is looked up in order: an explicit `--config` path, then
//! `atlas-pack.toml` in the working directory, then next to the executable.
//! Without a file the built-in defaults apply.

use crate::errors::CliError;
use atlas_cache::{ExtensionFilter, PackSettings};
use camino::{Utf8Path, Utf8PathBuf};
use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;

pub const CONFIG_FILE_NAME: &str = "atlas-pack.toml";

/// Contents of atlas-pack.toml.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Extensions that count as atlas sources, matched case-sensitively.
    pub extensions: ExtensionFilter,
    pub settings: PackSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(CliError::NoExtensions.into());
        }
        self.settings.validate().map_err(CliError::from)?;
        Ok(())
    }
}

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Find the settings file to use, if any.
///
/// An explicit path must exist; the implicit locations are optional.
pub fn resolve_config_path(explicit: Option<&Utf8Path>) -> Result<Option<Utf8PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(CliError::config_not_found(path.to_path_buf()).into());
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = Utf8PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Ok(Some(local));
    }

    Ok(install_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file()))
}

/// Parse a settings file. Missing keys fall back to defaults.
pub fn load_config(path: &Utf8Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path).into_diagnostic()?;
    parse_config(path, &content)
}

fn parse_config(path: &Utf8Path, content: &str) -> Result<AppConfig> {
    toml::from_str(content).map_err(|e| CliError::config_parse_error(path.to_path_buf(), e).into())
}

/// Load the effective configuration and report where it came from.
pub fn load_effective_config(
    explicit: Option<&Utf8Path>,
) -> Result<(AppConfig, Option<Utf8PathBuf>)> {
    match resolve_config_path(explicit)? {
        Some(path) => {
            let cfg = load_config(&path)?;
            tracing::debug!("Loaded settings from {}", path);
            Ok((cfg, Some(path)))
        }
        None => Ok((AppConfig::default(), None)),
    }
}

/// Writes the configuration as pretty TOML.
pub fn save_config(cfg: &AppConfig, path: &Utf8Path) -> io::Result<()> {
    let content = toml::to_string_pretty(cfg).map_err(io::Error::other)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_cache::TextureFilter;

    fn temp_path(temp: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().join(CONFIG_FILE_NAME)).unwrap()
    }

    #[test]
    fn test_empty_file_is_default() {
        let cfg = parse_config(Utf8Path::new("atlas-pack.toml"), "").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_settings() {
        let content = r#"
extensions = ["png", "webp"]

[settings]
max_width = 2048
fast = false

[settings.filter_mode]
min = "Linear"
mag = "Nearest"
"#;
        let cfg = parse_config(Utf8Path::new("atlas-pack.toml"), content).unwrap();
        assert_eq!(cfg.settings.max_width, 2048);
        assert_eq!(cfg.settings.max_height, 4096);
        assert!(!cfg.settings.fast);
        assert!(cfg.settings.power_of_two);
        assert_eq!(cfg.settings.filter_mode.min, TextureFilter::Linear);
        assert_eq!(cfg.settings.filter_mode.mag, TextureFilter::Nearest);
        assert!(cfg.extensions.matches("webp"));
        assert!(!cfg.extensions.matches("jpg"));
    }

    #[test]
    fn test_extensions_with_dots() {
        let cfg = parse_config(Utf8Path::new("atlas-pack.toml"), "extensions = [\".png\"]\n")
            .unwrap();
        assert!(cfg.extensions.matches("png"));
    }

    #[test]
    fn test_unknown_filter_is_error() {
        let content = "[settings.filter_mode]\nmin = \"Blurry\"\nmag = \"Linear\"\n";
        assert!(parse_config(Utf8Path::new("atlas-pack.toml"), content).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp_path(&temp);

        let mut cfg = AppConfig::default();
        cfg.settings.max_height = 1024;
        save_config(&cfg, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp_path(&temp);
        assert!(resolve_config_path(Some(&path)).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let cfg = AppConfig {
            extensions: ExtensionFilter::new(Vec::<String>::new()),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        assert!(AppConfig::default().validate().is_ok());
    }
}
