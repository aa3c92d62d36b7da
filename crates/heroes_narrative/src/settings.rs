//! Orchestrator tuning.

use derive_builder::Builder;
use derive_getters::Getters;
use heroes_core::StoryLayout;
use std::time::Duration;

/// Default pause before the first story batches are scheduled.
pub const DEFAULT_LAUNCH_DELAY: Duration = Duration::from_millis(1100);

/// Default pause between acknowledging and committing a choice.
pub const DEFAULT_CHOICE_DELAY: Duration = Duration::from_millis(1000);

/// Default text model.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default image model.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Settings for a [`PageOrchestrator`](crate::PageOrchestrator).
///
/// # Examples
///
/// ```
/// use heroes_narrative::OrchestratorSettings;
/// use std::time::Duration;
///
/// let settings = OrchestratorSettings::builder()
///     .launch_delay(Duration::ZERO)
///     .build()
///     .unwrap();
/// assert_eq!(settings.text_model(), "gemini-2.5-flash");
/// assert_eq!(*settings.launch_delay(), Duration::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Getters, Builder)]
#[builder(setter(into))]
pub struct OrchestratorSettings {
    /// Page layout
    #[builder(default)]
    layout: StoryLayout,
    /// Pause before the first story batches
    #[builder(default = "DEFAULT_LAUNCH_DELAY")]
    launch_delay: Duration,
    /// Pause between choice acknowledgement and commitment
    #[builder(default = "DEFAULT_CHOICE_DELAY")]
    choice_delay: Duration,
    /// Model for beats
    #[builder(default = "DEFAULT_TEXT_MODEL.to_string()")]
    text_model: String,
    /// Model for portraits and panels
    #[builder(default = "DEFAULT_IMAGE_MODEL.to_string()")]
    image_model: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            layout: StoryLayout::default(),
            launch_delay: DEFAULT_LAUNCH_DELAY,
            choice_delay: DEFAULT_CHOICE_DELAY,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

impl OrchestratorSettings {
    /// Creates a new builder for `OrchestratorSettings`.
    pub fn builder() -> OrchestratorSettingsBuilder {
        OrchestratorSettingsBuilder::default()
    }
}
