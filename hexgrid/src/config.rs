//! Configuration loaded from `hexgrid.toml`.
//!
//! The working directory is searched first, then the platform config dir. A missing or
//! malformed file falls back to defaults. Unknown fields are ignored.

use hexgridlib::{CellMetrics, HexGridError, ViewOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

const FILE_NAME: &str = "hexgrid.toml";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LayoutConfig {
    #[serde(default = "LayoutConfig::default_font_size")]
    pub font_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size: Self::default_font_size(),
        }
    }
}

impl LayoutConfig {
    const fn default_font_size() -> f32 {
        13.0
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CursorConfig {
    /// Zero disables blinking
    #[serde(default = "CursorConfig::default_blink_interval_ms")]
    pub blink_interval_ms: u64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            blink_interval_ms: Self::default_blink_interval_ms(),
        }
    }
}

impl CursorConfig {
    const fn default_blink_interval_ms() -> u64 {
        750
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HighlightConfig {
    #[serde(default = "HighlightConfig::default_smart")]
    pub smart: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            smart: Self::default_smart(),
        }
    }
}

impl HighlightConfig {
    const fn default_smart() -> bool {
        true
    }
}

pub type Rgb = [u8; 3];

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ColorConfig {
    pub string: Rgb,
    pub data: Rgb,
    pub instruction: Rgb,
    pub patch: Rgb,
    pub sync: Rgb,
    pub selection: Rgb,
    pub selection_alt: Rgb,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            string: [0x00, 0xa0, 0xe8],
            data: [0xe8, 0xa0, 0x00],
            instruction: [0xe8, 0x60, 0x60],
            patch: [0xa0, 0xa0, 0xa0],
            sync: [0x60, 0xc0, 0x60],
            selection: [0x33, 0x99, 0xff],
            selection_alt: [0x80, 0x80, 0x80],
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub cursor: CursorConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub colors: ColorConfig,
}

impl Config {
    /// Parse a config from TOML text
    ///
    /// # Errors
    /// Returns [`HexGridError::Config`] if the text is not valid for this schema.
    pub fn parse(content: &str) -> Result<Self, HexGridError> {
        toml::from_str(content).map_err(|e| HexGridError::Config(e.to_string()))
    }

    /// View options for a new view. Glyph metrics are measured by the renderer.
    pub fn view_options(&self, metrics: CellMetrics) -> ViewOptions {
        ViewOptions {
            metrics,
            smart_highlighting: self.highlight.smart,
            blink_interval: Duration::from_millis(self.cursor.blink_interval_ms),
            ..ViewOptions::default()
        }
    }
}

/// Config path: `hexgrid.toml` in the working dir, else the platform config dir
pub fn discover() -> PathBuf {
    let local = PathBuf::from(FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("hexgrid").join(FILE_NAME);
    }
    local
}

/// Load the config at `path` (or the discovered one). Never fails: problems are logged
/// and the defaults are used instead.
pub fn load_from(path: Option<&Path>) -> Config {
    let path = path.map_or_else(discover, Path::to_path_buf);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            info!(path = %path.display(), %err, "no config file, using defaults");
            return Config::default();
        }
    };
    match Config::parse(&content) {
        Ok(config) => {
            info!(path = %path.display(), "config loaded");
            config
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "invalid config, using defaults");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        // Arrange
        let content = "";

        // Act
        let config = Config::parse(content).unwrap();

        // Assert
        assert_eq!(config, Config::default());
        assert_eq!(config.cursor.blink_interval_ms, 750);
        assert!(config.highlight.smart);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        // Arrange
        let content = "[cursor]\nblink_interval_ms = 0\n\n[colors]\npatch = [1, 2, 3]\n";

        // Act
        let config = Config::parse(content).unwrap();

        // Assert
        assert_eq!(config.cursor.blink_interval_ms, 0);
        assert_eq!(config.colors.patch, [1, 2, 3]);
        assert_eq!(config.colors.string, ColorConfig::default().string);
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        // Arrange
        let content = "[highlight]\nsmart = \"yes\"\n";

        // Act
        let result = Config::parse(content);

        // Assert
        assert!(matches!(result, Err(HexGridError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[layout]\nfont_size = 16.0\n[highlight]\nsmart = false").unwrap();

        // Act
        let config = load_from(Some(file.path()));

        // Assert
        assert!((config.layout.font_size - 16.0).abs() < f32::EPSILON);
        assert!(!config.highlight.smart);
    }

    #[test]
    fn test_load_from_malformed_file_falls_back() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml").unwrap();

        // Act
        let config = load_from(Some(file.path()));

        // Assert
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_missing_file_falls_back() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();

        // Act
        let config = load_from(Some(&dir.path().join("missing.toml")));

        // Assert
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_view_options_follow_config() {
        // Arrange
        let config = Config::parse("[cursor]\nblink_interval_ms = 300\n").unwrap();

        // Act
        let options = config.view_options(CellMetrics::default());

        // Assert
        assert_eq!(options.blink_interval, Duration::from_millis(300));
        assert!(options.smart_highlighting);
        assert!(options.follow_synchronized_cursor);
    }
}
