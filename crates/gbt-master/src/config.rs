//! Player settings, loadable from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use gbt_engine::MAX_VOLUME;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("sample_rate {0} is outside 8000..=192000")]
    SampleRate(u32),
    #[error("buffer_ms {0} is outside 10..=1000")]
    BufferMs(u32),
    #[error("output_volume {0} is above 7")]
    OutputVolume(u8),
}

/// Playback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Sample rate for offline rendering. Live playback uses the device rate.
    pub sample_rate: u32,
    /// Depth of the queue between the render thread and the device
    pub buffer_ms: u32,
    /// Output volume, 0-7
    pub output_volume: u8,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_ms: 100,
            output_volume: MAX_VOLUME,
        }
    }
}

impl PlayerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(8000..=192_000).contains(&self.sample_rate) {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }
        if !(10..=1000).contains(&self.buffer_ms) {
            return Err(ConfigError::BufferMs(self.buffer_ms));
        }
        if self.output_volume > MAX_VOLUME {
            return Err(ConfigError::OutputVolume(self.output_volume));
        }
        Ok(())
    }
}
