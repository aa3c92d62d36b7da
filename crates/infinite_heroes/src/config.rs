//! Layered configuration.
//!
//! Sources, later ones winning:
//! 1. Bundled defaults (`infinite_heroes.toml` shipped with the crate)
//! 2. `~/.config/infinite_heroes/infinite_heroes.toml`
//! 3. `./infinite_heroes.toml`
//! 4. `HEROES__SECTION__KEY` environment variables

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use heroes_error::{ConfigError, HeroesError, HeroesResult};
use heroes_models::DEFAULT_BASE_URL;
use heroes_narrative::{
    DEFAULT_IMAGE_MODEL, DEFAULT_SAVE_KEY, DEFAULT_TEXT_MODEL, OrchestratorSettings,
};
use heroes_rate_limit::RateLimitConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../infinite_heroes.toml");

/// Generation models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ModelsConfig {
    /// Model for story beats
    #[serde(default = "default_text_model")]
    text_model: String,
    /// Model for portraits and panels
    #[serde(default = "default_image_model")]
    image_model: String,
    /// API base URL
    #[serde(default = "default_base_url")]
    base_url: String,
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_image_model() -> String {
    DEFAULT_IMAGE_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            text_model: default_text_model(),
            image_model: default_image_model(),
            base_url: default_base_url(),
        }
    }
}

/// Presentation delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct TimingConfig {
    /// Pause before the opening batches
    #[serde(default = "default_launch_delay_ms")]
    launch_delay_ms: u64,
    /// Pause between acknowledging and committing a choice
    #[serde(default = "default_choice_delay_ms")]
    choice_delay_ms: u64,
}

fn default_launch_delay_ms() -> u64 {
    1100
}

fn default_choice_delay_ms() -> u64 {
    1000
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            launch_delay_ms: default_launch_delay_ms(),
            choice_delay_ms: default_choice_delay_ms(),
        }
    }
}

/// Where stories are saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct StorageConfig {
    /// Directory for saved stories
    #[serde(default = "default_state_dir")]
    state_dir: PathBuf,
    /// Save slot
    #[serde(default = "default_save_key")]
    save_key: String,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".infinite_heroes")
}

fn default_save_key() -> String {
    DEFAULT_SAVE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            save_key: default_save_key(),
        }
    }
}

/// Top-level Infinite Heroes configuration.
///
/// # Example
///
/// ```no_run
/// use infinite_heroes::HeroesConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = HeroesConfig::load()?;
/// println!("Beats come from {}", config.models().text_model());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Getters)]
pub struct HeroesConfig {
    /// Generation models
    #[serde(default)]
    models: ModelsConfig,
    /// Presentation delays
    #[serde(default)]
    timing: TimingConfig,
    /// Request quotas
    #[serde(default)]
    rate_limit: RateLimitConfig,
    /// Save location
    #[serde(default)]
    storage: StorageConfig,
}

impl HeroesConfig {
    /// Load with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a present source fails to parse.
    #[instrument]
    pub fn load() -> HeroesResult<Self> {
        debug!("Loading configuration: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/infinite_heroes/infinite_heroes.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("infinite_heroes").required(false))
            .add_source(
                Environment::with_prefix("HEROES")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::finish(builder.build())
    }

    /// Load bundled defaults overlaid with one file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> HeroesResult<Self> {
        let built = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build();
        Self::finish(built)
    }

    fn finish(built: Result<Config, config::ConfigError>) -> HeroesResult<Self> {
        built
            .map_err(|e| {
                HeroesError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                HeroesError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Orchestrator settings derived from this configuration.
    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings::builder()
            .launch_delay(Duration::from_millis(self.timing.launch_delay_ms))
            .choice_delay(Duration::from_millis(self.timing.choice_delay_ms))
            .text_model(self.models.text_model.clone())
            .image_model(self.models.image_model.clone())
            .build()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_defaults_parse() {
        let config: HeroesConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.models().text_model(), "gemini-2.5-flash");
        assert_eq!(config.models().image_model(), "gemini-2.5-flash-image");
        assert_eq!(*config.timing().launch_delay_ms(), 1100);
        assert_eq!(config.storage().save_key(), "infinite_heroes_save_v1");
        assert_eq!(*config.rate_limit().max_concurrent(), Some(1));
    }

    #[test]
    fn test_settings_follow_timing() {
        let config = HeroesConfig::default();
        let settings = config.orchestrator_settings();
        assert_eq!(*settings.launch_delay(), Duration::from_millis(1100));
        assert_eq!(*settings.choice_delay(), Duration::from_millis(1000));
        assert_eq!(settings.image_model(), "gemini-2.5-flash-image");
    }
}
