//! User configuration file handling
//!
//! Manages settings from ~/.config/gpufont/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::io::{LoadOptions, MAX_GLYPH_POINTS, MAX_GLYPH_TRI_INDICES};
use crate::layout::LayoutOptions;

/// User configuration from ~/.config/gpufont/settings.json
///
/// These settings override built-in defaults but are overridden by CLI arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    pub max_glyph_points: Option<usize>,
    pub max_glyph_indices: Option<usize>,
    pub parallel_triangulation: Option<bool>,
    pub max_line_len: Option<usize>,
    pub line_height_scale: Option<f32>,
    /// Also write logs to ~/.config/gpufont/logs/
    pub log_to_file: Option<bool>,
}

impl ConfigFile {
    /// Every setting at its built-in default
    pub fn with_defaults() -> Self {
        Self {
            max_glyph_points: Some(MAX_GLYPH_POINTS),
            max_glyph_indices: Some(MAX_GLYPH_TRI_INDICES),
            parallel_triangulation: Some(false),
            max_line_len: None,
            line_height_scale: Some(1.0),
            log_to_file: Some(false),
        }
    }

    /// Get the path to the gpufont config directory
    pub fn config_dir() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
        config_dir.join("gpufont")
    }

    /// Get the path to the user config file
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("settings.json")
    }

    /// Get the path to the logs directory
    pub fn logs_dir() -> PathBuf {
        Self::config_dir().join("logs")
    }

    /// Load configuration from the user config file
    pub fn load() -> Option<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`; a missing or unreadable file is `None`
    pub fn load_from(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    debug!("Loaded user settings from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    warn!("Failed to parse settings.json: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read settings.json: {}", e);
                None
            }
        }
    }

    /// Save configuration to the user config file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        debug!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn log_to_file(&self) -> bool {
        self.log_to_file.unwrap_or(false)
    }

    pub fn apply_to_load_options(&self, options: &mut LoadOptions) {
        if let Some(points) = self.max_glyph_points {
            debug!("Using max glyph points from config file: {points}");
            options.max_glyph_points = points;
        }
        if let Some(indices) = self.max_glyph_indices {
            debug!("Using max glyph indices from config file: {indices}");
            options.max_glyph_indices = indices;
        }
        if let Some(parallel) = self.parallel_triangulation {
            options.parallel = parallel;
        }
    }

    pub fn apply_to_layout_options(&self, options: &mut LayoutOptions) {
        if self.max_line_len.is_some() {
            options.max_line_len = self.max_line_len;
        }
        if let Some(scale) = self.line_height_scale {
            options.line_height_scale = scale;
        }
    }

    /// Initialize the complete user configuration directory
    ///
    /// This creates the ~/.config/gpufont directory with a logs/ folder and a
    /// settings.json file holding the default values. An existing
    /// settings.json is left alone.
    pub fn initialize_config_directory() -> anyhow::Result<()> {
        let config_dir = Self::config_dir();
        fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {:?}", config_dir);

        let logs_dir = Self::logs_dir();
        fs::create_dir_all(&logs_dir)?;
        println!("Created logs directory: {:?}", logs_dir);

        let settings_path = Self::config_path();
        if !settings_path.exists() {
            Self::with_defaults().save_to(&settings_path)?;
            println!("Created settings file: {:?}", settings_path);
        } else {
            println!("Settings file already exists: {:?}", settings_path);
        }

        println!("\nConfiguration initialized successfully!");
        println!("You can now:");
        println!("  - Edit settings at: {:?}", settings_path);
        println!("  - View logs in: {:?}", logs_dir);

        Ok(())
    }
}
