//! Session settings

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::FillAlgorithm;

use crate::i18n::Lang;

/// Environment variable overriding [`ServiceSettings::base_url`]
pub const SERVICE_URL_ENV: &str = "GEODRAW_SERVICE_URL";

/// Where the geometry service lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// HTTP base URL; the WebSocket URL is derived from it
    pub base_url: String,
    /// Raw WebSocket path of the STOMP endpoint
    pub websocket_path: String,
    /// Timeout for polygon queries and the channel handshake
    pub request_timeout_secs: u64,
    /// How long the headless driver keeps pumping results after a script
    pub settle_millis: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            websocket_path: "/ws/websocket".to_string(),
            request_timeout_secs: 10,
            settle_millis: 500,
        }
    }
}

/// Defaults for the UI parameters of 2D commands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingDefaults {
    /// Line rasterization algorithm tag
    pub line_algorithm: String,
    pub fill_algorithm: FillAlgorithm,
    pub fill_color: String,
    pub boundary_color: String,
}

impl Default for DrawingDefaults {
    fn default() -> Self {
        Self {
            line_algorithm: "bresenham".to_string(),
            fill_algorithm: FillAlgorithm::Scanline,
            fill_color: "rgba(255, 20, 147, 0.2)".to_string(),
            boundary_color: "rgba(0, 0, 0, 1)".to_string(),
        }
    }
}

/// Step sizes of keyboard transform intents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSteps {
    /// Rotation step in degrees
    pub angle: f64,
    /// Uniform scale factor (its inverse scales down)
    pub scale_factor: f64,
    /// Translation step
    pub move_step: f64,
    /// Perspective distance step
    pub perspective_step: f64,
}

impl Default for TransformSteps {
    fn default() -> Self {
        Self {
            angle: 5.0,
            scale_factor: 1.1,
            move_step: 0.1,
            perspective_step: 10.0,
        }
    }
}

/// All session settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub service: ServiceSettings,
    pub drawing: DrawingDefaults,
    pub transform: TransformSteps,
    /// Язык сообщений
    pub language: Lang,
}

impl SessionSettings {
    /// Load settings from the user config dir, or defaults if not found.
    /// Environment overrides are not applied; see `with_env_overrides`.
    pub fn load() -> Self {
        settings_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings {}: {e}", path.display()))?;
        serde_json::from_str(&json)
            .map_err(|e| format!("Failed to parse settings {}: {e}", path.display()))
    }

    /// Apply `GEODRAW_SERVICE_URL` if set. The result is meant for this
    /// process only and should not be saved.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(SERVICE_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("Service URL overridden from {SERVICE_URL_ENV}: {url}");
                self.service.base_url = url;
            }
        }
        self
    }

    /// Save settings to the user config dir
    pub fn save(&self) {
        if let Some(path) = settings_path() {
            if let Err(e) = self.save_to(&path) {
                tracing::warn!("{e}");
            }
        }
    }

    /// Save settings to an explicit file, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to encode settings: {e}"))?;
        std::fs::write(path, json)
            .map_err(|e| format!("Failed to save settings to {}: {e}", path.display()))
    }
}

fn settings_path() -> Option<std::path::PathBuf> {
    directories::ProjectDirs::from("org", "geodraw", "geodraw")
        .map(|dirs| dirs.config_dir().join("settings.json"))
}
