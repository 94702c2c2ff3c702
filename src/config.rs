//! Application configuration
//!
//! Loaded from a TOML file; every field has a default so a partial file
//! (or none at all) is fine.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::*;
use crate::error::ConfigError;

/// Top-level configuration shared by the sender and receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub playback: PlaybackConfig,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            playback: PlaybackConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// Device stream settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Interleaved channel count, passed through unchanged
    pub channels: u16,
    /// Frames per device callback
    pub block_size: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl AudioConfig {
    /// Samples per render block, all channels included
    pub fn samples_per_block(&self) -> usize {
        self.block_size as usize * self.channels as usize
    }

    /// Latency of one block in milliseconds
    pub fn block_latency_ms(&self) -> f64 {
        (self.block_size as f64 / self.sample_rate as f64) * 1000.0
    }
}

/// Playback buffer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Bytes read from the input stream per chunk
    pub chunk_bytes: usize,
    /// Cap on buffered audio; unbounded when unset
    pub max_buffered_ms: Option<u32>,
    /// Seconds between stats log lines
    pub stats_interval_secs: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            max_buffered_ms: None,
            stats_interval_secs: 5,
        }
    }
}

impl AppConfig {
    /// Default config file location for this platform
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("org", "pcm-stream-bridge", "pcm-stream-bridge")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Load from `path` or the default location, falling back to defaults
    /// when no file exists. A file that exists but is invalid is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Ok(p) => p,
                Err(e) => {
                    warn!("{}, using defaults", e);
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let config = Self::load(&path)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write as pretty TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(write_err)
    }

    /// Reject values the audio path cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| ConfigError::Invalid {
            field,
            reason: reason.to_string(),
        };

        if self.audio.sample_rate == 0 {
            return Err(invalid("audio.sample_rate", "must be non-zero"));
        }
        if self.audio.channels == 0 {
            return Err(invalid("audio.channels", "must be non-zero"));
        }
        if self.audio.block_size == 0 {
            return Err(invalid("audio.block_size", "must be non-zero"));
        }
        if self.playback.chunk_bytes == 0 || self.playback.chunk_bytes % 2 != 0 {
            return Err(invalid("playback.chunk_bytes", "must be a non-zero multiple of 2"));
        }
        if self.playback.max_buffered_ms == Some(0) {
            return Err(invalid("playback.max_buffered_ms", "must be non-zero when set"));
        }
        Ok(())
    }

    /// Playback buffer cap in samples, if configured
    pub fn playback_capacity_samples(&self) -> Option<usize> {
        self.playback.max_buffered_ms.map(|ms| {
            let frames = self.audio.sample_rate as u64 * ms as u64 / 1000;
            (frames as usize * self.audio.channels as usize).max(1)
        })
    }
}
