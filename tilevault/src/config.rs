//! Configuration file support.
//!
//! TileVault reads an INI config file from the platform config directory
//! (`~/.config/tilevault/config.ini` on Linux):
//!
//! ```ini
//! [map]
//! style_url = mapbox://styles/mapbox/streets-v11
//! max_zoom = 20.0
//! pixel_ratio = 1.0
//!
//! [engine]
//! state_path = /home/user/.local/share/tilevault/regions.json
//! tick_ms = 100
//! required_resources = 200
//! tile_limit = 6000
//! ```
//!
//! A missing file yields defaults; a present but malformed file is an
//! error so typos are not silently ignored.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

/// Errors loading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but does not parse as INI.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A key holds a value of the wrong type.
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// `[map]` section: viewport defaults for region requests.
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Style tiles are rendered from.
    pub style_url: String,
    /// Maximum supported zoom.
    pub max_zoom: f64,
    /// Device pixel-density factor.
    pub pixel_ratio: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style_url: "mapbox://styles/mapbox/streets-v11".to_string(),
            max_zoom: crate::request::DEFAULT_MAX_ZOOM,
            pixel_ratio: crate::request::DEFAULT_PIXEL_RATIO,
        }
    }
}

/// `[engine]` section: tuning for the in-process engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Snapshot file path; `None` uses the platform data directory.
    pub state_path: Option<PathBuf>,
    /// Interval between simulated progress ticks, in milliseconds.
    pub tick_ms: u64,
    /// Simulated resource count per region.
    pub required_resources: u64,
    /// Tile-count limit above which the engine warns.
    pub tile_limit: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            state_path: None,
            tick_ms: 100,
            required_resources: 200,
            tile_limit: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub map: MapConfig,
    pub engine: EngineConfig,
}

impl ConfigFile {
    /// Load from the default platform location, missing file ⇒ defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("map")) {
            if let Some(value) = section.get("style_url") {
                config.map.style_url = value.to_string();
            }
            if let Some(value) = section.get("max_zoom") {
                config.map.max_zoom = parse_value("map.max_zoom", value)?;
            }
            if let Some(value) = section.get("pixel_ratio") {
                config.map.pixel_ratio = parse_value("map.pixel_ratio", value)?;
            }
        }

        if let Some(section) = ini.section(Some("engine")) {
            if let Some(value) = section.get("state_path") {
                config.engine.state_path = Some(PathBuf::from(value));
            }
            if let Some(value) = section.get("tick_ms") {
                config.engine.tick_ms = parse_value("engine.tick_ms", value)?;
            }
            if let Some(value) = section.get("required_resources") {
                config.engine.required_resources =
                    parse_value("engine.required_resources", value)?;
            }
            if let Some(value) = section.get("tile_limit") {
                config.engine.tile_limit = Some(parse_value("engine.tile_limit", value)?);
            }
        }

        Ok(config)
    }

    /// Resolved snapshot path: configured value or the platform default.
    pub fn state_path(&self) -> PathBuf {
        self.engine
            .state_path
            .clone()
            .unwrap_or_else(default_state_path)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Default config file location (`<config>/tilevault/config.ini`).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tilevault").join("config.ini"))
}

/// Default engine snapshot location (`<data>/tilevault/regions.json`).
pub fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("tilevault")
        .join("regions.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults_without_sections() {
        let (_dir, path) = write_config("");
        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_full_config_parses() {
        let (_dir, path) = write_config(
            "[map]\n\
             style_url = mapbox://styles/custom\n\
             max_zoom = 18.0\n\
             pixel_ratio = 2.0\n\
             \n\
             [engine]\n\
             state_path = /tmp/tilevault/regions.json\n\
             tick_ms = 50\n\
             required_resources = 400\n\
             tile_limit = 6000\n",
        );
        let config = ConfigFile::load_from(&path).unwrap();

        assert_eq!(config.map.style_url, "mapbox://styles/custom");
        assert_eq!(config.map.max_zoom, 18.0);
        assert_eq!(config.map.pixel_ratio, 2.0);
        assert_eq!(
            config.engine.state_path.as_deref(),
            Some(Path::new("/tmp/tilevault/regions.json"))
        );
        assert_eq!(config.engine.tick_ms, 50);
        assert_eq!(config.engine.required_resources, 400);
        assert_eq!(config.engine.tile_limit, Some(6000));
    }

    #[test]
    fn test_invalid_numeric_value_is_an_error() {
        let (_dir, path) = write_config("[engine]\ntick_ms = fast\n");
        let result = ConfigFile::load_from(&path);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key, .. }) if key == "engine.tick_ms"
        ));
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let (_dir, path) = write_config("[engine]\ntick_ms = 25\n");
        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.engine.tick_ms, 25);
        assert_eq!(config.map, MapConfig::default());
    }
}
