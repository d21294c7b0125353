//! Settings for conversions and the CLI

use crate::compression::ZstdCompressor;
use crate::compression::zstd::DEFAULT_LEVEL;
use crate::error::Result;
use crate::function_map::FunctionMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Default value functions for serde
fn default_zstd_level() -> i32 {
    DEFAULT_LEVEL
}

/// User settings, stored as TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_zstd_level")]
    pub zstd_level: i32,
    /// Raw dictionary used for `.zs` files
    #[serde(default)]
    pub zstd_dictionary: Option<PathBuf>,
    /// Function map applied when no map is given on the command line
    #[serde(default)]
    pub function_map: Option<PathBuf>,
    /// Language tag for each UMSBT slot, in slot order
    #[serde(default)]
    pub umsbt_languages: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zstd_level: default_zstd_level(),
            zstd_dictionary: None,
            function_map: None,
            umsbt_languages: Vec::new(),
        }
    }
}

impl Settings {
    /// `<config dir>/glossa/settings.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glossa").join("settings.toml"))
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read or [`Error::Config`]
    /// if it is not valid settings TOML.
    ///
    /// [`Error::Io`]: crate::Error::Io
    /// [`Error::Config`]: crate::Error::Config
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load settings from [`Settings::default_path`], or return defaults.
    #[must_use]
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path().filter(|p| p.is_file()) else {
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring settings at {}: {e}", path.display());
            Self::default()
        })
    }

    /// Write settings as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Zstandard compressor for the configured level and dictionary.
    ///
    /// # Errors
    ///
    /// Returns an error if the dictionary cannot be read.
    pub fn compressor(&self) -> Result<ZstdCompressor> {
        ZstdCompressor::from_settings(self.zstd_level, self.zstd_dictionary.as_deref())
    }

    /// The configured function map, or an empty map.
    ///
    /// # Errors
    ///
    /// Returns an error if the map file cannot be read or compiled.
    pub fn function_map(&self) -> Result<FunctionMap> {
        match &self.function_map {
            Some(path) => FunctionMap::from_file(path),
            None => Ok(FunctionMap::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings: Settings = toml::from_str("umsbt_languages = [\"USen\", \"EUfr\"]\n").unwrap();
        assert_eq!(settings.zstd_level, 19);
        assert_eq!(settings.zstd_dictionary, None);
        assert_eq!(settings.umsbt_languages, vec!["USen".to_string(), "EUfr".to_string()]);
        assert!(settings.function_map().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let settings = Settings {
            zstd_level: 5,
            function_map: Some(PathBuf::from("maps/game.txt")),
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        assert_eq!(settings.compressor().unwrap().level(), 5);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "zstd_level = \"high\"").unwrap();
        assert!(matches!(Settings::load(&path), Err(crate::Error::Config(_))));
    }
}
