//! Configuration management for sketchnote.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::canvas::{
    CanvasOptions, CanvasSize, SizeOverrides, SurfaceCapability, Viewport, DEFAULT_LINE_WIDTH,
};
use crate::editor::EditorOptions;
use crate::error::{Error, Result};
use crate::notebook::normalize_email;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "sketchnote";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "notes.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `SKETCHNOTE_`)
/// 2. TOML config file at `~/.config/sketchnote/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Local user identity.
    pub profile: ProfileConfig,
    /// Drawing canvas configuration.
    pub canvas: CanvasConfig,
    /// Note autosave configuration.
    pub autosave: AutosaveConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/sketchnote/notes.db`
    pub database_path: Option<PathBuf>,
}

/// Identity of the local user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Identifier recorded as the creator of new notebooks.
    pub user_id: String,
    /// Email address notebooks are shared to.
    pub email: Option<String>,
}

/// Canvas-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Width strokes are rendered with.
    pub line_width: f64,
    /// Moves closer than this to the previous point are dropped (0 keeps all).
    pub min_segment_length: f64,
    /// Whether a drawing surface is available.
    pub native_surface: bool,
    /// Viewport width used to size the canvas.
    pub viewport_width: f64,
    /// Viewport height used to size the canvas.
    pub viewport_height: f64,
}

/// Autosave-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    /// Quiet period after the last edit before title/content are written.
    pub debounce_ms: u64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            user_id: "local".to_string(),
            email: None,
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            min_segment_length: 0.0,
            native_surface: true,
            viewport_width: 390.0,
            viewport_height: 844.0,
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { debounce_ms: 700 }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `SKETCHNOTE_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("SKETCHNOTE_").split("__"));

        let mut config: Config = figment.extract()?;
        config.validate()?;
        config.profile.email = config.profile.email.as_deref().map(normalize_email);
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let canvas = &self.canvas;
        if !(canvas.line_width.is_finite() && canvas.line_width > 0.0) {
            return Err(Error::ConfigValidation {
                message: format!("line_width must be positive, got {}", canvas.line_width),
            });
        }

        if !(canvas.min_segment_length.is_finite() && canvas.min_segment_length >= 0.0) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "min_segment_length must be zero or positive, got {}",
                    canvas.min_segment_length
                ),
            });
        }

        if !(canvas.viewport_width > 0.0 && canvas.viewport_height > 0.0) {
            return Err(Error::ConfigValidation {
                message: "viewport_width and viewport_height must be greater than 0".to_string(),
            });
        }

        if self.autosave.debounce_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "debounce_ms must be greater than 0".to_string(),
            });
        }

        if self.profile.user_id.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "user_id must not be empty".to_string(),
            });
        }

        if let Some(email) = &self.profile.email {
            if !crate::notebook::is_valid_email(email) {
                return Err(Error::ConfigValidation {
                    message: format!("invalid email address: {email}"),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the autosave debounce delay as a Duration.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.autosave.debounce_ms)
    }

    /// Get the configured viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.canvas.viewport_width,
            height: self.canvas.viewport_height,
        }
    }

    /// Build canvas options from this configuration.
    #[must_use]
    pub fn canvas_options(&self, overrides: SizeOverrides) -> CanvasOptions {
        CanvasOptions {
            size: CanvasSize::resolve(self.viewport(), overrides),
            line_width: self.canvas.line_width,
            min_segment_length: self.canvas.min_segment_length,
            capability: SurfaceCapability::from_flag(self.canvas.native_surface),
        }
    }

    /// Build note editor options from this configuration.
    #[must_use]
    pub fn editor_options(&self, overrides: SizeOverrides) -> EditorOptions {
        EditorOptions {
            canvas: self.canvas_options(overrides),
            debounce: self.debounce(),
        }
    }
}
