use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub data: DataConfig,
}

/// Generation pipeline tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum wait bound per stage attempt, in milliseconds.
    pub stage_timeout_ms: u64,
    /// Attempts per stage before the pipeline fails.
    pub max_stage_attempts: u32,
    /// Pause between completion and the auto-advance signal, in milliseconds.
    pub settle_delay_ms: u64,
}

/// Data directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            data: DataConfig::default(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            stage_timeout_ms: 30_000,
            max_stage_attempts: 3,
            settle_delay_ms: 400,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { data_dir: None }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/listingpress/config.toml`.
    /// Returns `Default` if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e} — using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {} — using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("listingpress"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    /// Path of the preference store document.
    pub fn preferences_path(&self) -> PathBuf {
        self.data_dir().join("preferences.json")
    }

    /// Pipeline configuration derived from the generation section.
    pub fn pipeline_config(&self) -> crate::core::campaign::PipelineConfig {
        crate::core::campaign::PipelineConfig {
            max_stage_attempts: self.generation.max_stage_attempts,
            stage_timeout: Duration::from_millis(self.generation.stage_timeout_ms),
            settle_delay: Duration::from_millis(self.generation.settle_delay_ms),
        }
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("listingpress").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
