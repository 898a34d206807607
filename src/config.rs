//! Configuration management for CrabLens
//!
//! Provides loading, saving and validation of the engine's startup
//! preferences and device snapshot location.

use crate::errors::LensError;
use crate::presets::MAX_DISPLAY_ZOOM;
use crate::types::{FlashMode, Position};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrabLensConfig {
    pub engine: EngineConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Selection engine startup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Camera position the engine starts on
    pub initial_position: Position,
    /// Display zoom the engine starts on (e.g. 1.0 for "1x")
    pub initial_display_zoom: f64,
    /// Flash mode applied when the initial device has a flash
    pub default_flash_mode: FlashMode,
    /// Buffered device-changed events per observer
    pub event_capacity: usize,
}

/// Device metadata source settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON device snapshot, used by the CLI and offline tests
    pub device_snapshot_path: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_position: Position::Back,
            initial_display_zoom: 1.0,
            default_flash_mode: FlashMode::Off,
            event_capacity: 16,
        }
    }
}

impl CrabLensConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, LensError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| LensError::Config(format!("Failed to read config file: {}", e)))?;

        let config: CrabLensConfig = toml::from_str(&contents)
            .map_err(|e| LensError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate().map_err(LensError::Config)?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), LensError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LensError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| LensError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| LensError::Config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("crablens.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        let zoom = self.engine.initial_display_zoom;
        if !zoom.is_finite() || zoom <= 0.0 || zoom > MAX_DISPLAY_ZOOM {
            return Err(format!(
                "Initial display zoom must be in (0, {}]",
                MAX_DISPLAY_ZOOM
            ));
        }
        if self.engine.event_capacity == 0 || self.engine.event_capacity > 1024 {
            return Err("Event capacity must be between 1 and 1024".to_string());
        }
        if let Some(path) = &self.catalog.device_snapshot_path {
            if path.trim().is_empty() {
                return Err("Device snapshot path must not be empty".to_string());
            }
        }
        Ok(())
    }
}
