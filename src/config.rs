//! Configuration management for the foyer kiosk

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

/// Foyer kiosk configuration
///
/// Loaded from a TOML file; every field has a default so an absent file
/// yields a runnable configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory of labeled reference images (`<name>.jpg` / `<name>.png`)
    pub known_faces_dir: PathBuf,

    /// Camera snapshot URL, polled once per frame
    pub camera_url: String,

    /// Face detection sidecar URL (accepts a JPEG, returns boxes + embeddings)
    pub detector_url: String,

    /// Maximum embedding distance to accept a gallery match
    pub match_tolerance: f32,

    /// Minimum seconds between two greetings for the same identity
    pub cooldown_secs: u64,

    /// Run detection on every Nth frame only
    pub frame_stride: u64,

    /// Linear downscale divisor applied before detection
    pub detect_downscale: u32,

    /// Delay between frame reads, in milliseconds
    pub frame_interval_ms: u64,

    /// Where the annotated preview frame is written
    pub preview_path: PathBuf,

    /// Speech synthesis settings
    pub tts: TtsConfig,
}

/// Speech synthesis configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Top-level domain for the translate TTS endpoint (accent selection)
    pub tld: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            known_faces_dir: PathBuf::from("known_faces"),
            camera_url: "http://127.0.0.1:8080/snapshot.jpg".to_string(),
            detector_url: "http://127.0.0.1:8420/detect".to_string(),
            match_tolerance: 0.45,
            cooldown_secs: 20,
            frame_stride: 3,
            detect_downscale: 4,
            frame_interval_ms: 100,
            preview_path: PathBuf::from("foyer-preview.jpg"),
            tts: TtsConfig::default(),
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            tld: "co.in".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist; otherwise the default location is tried
    /// and built-in defaults are used when no file is present.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => {
                let p = default_config_path();
                if !p.exists() {
                    tracing::debug!(path = %p.display(), "no config file, using defaults");
                    return Ok(Self::default());
                }
                p
            }
        };

        let raw = std::fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&raw)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Cooldown window as a [`Duration`]
    #[must_use]
    pub const fn cooldown_window(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Delay between frame reads as a [`Duration`]
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Default config file location (`~/.config/foyer/kiosk.toml` on Linux)
fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("dev", "foyer", "foyer").map_or_else(
        || PathBuf::from("kiosk.toml"),
        |d| d.config_dir().join("kiosk.toml"),
    )
}
