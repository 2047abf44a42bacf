use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::SpeechError;
use crate::voice::VoicePreference;

/// Default target locale for spoken output.
pub const DEFAULT_LANG: &str = "en-US";

const DEFAULT_MALE_HINTS: &[&str] = &[
    "david", "mark", "daniel", "alex", "fred", "george", "james", "male",
];

const DEFAULT_FEMALE_HINTS: &[&str] = &[
    "samantha", "zira", "victoria", "karen", "susan", "hazel", "moira", "female",
];

/// Settings applied to every utterance an adapter dispatches.
///
/// Every field is optional in JSON; missing fields take their defaults.
/// Both JSON loading and the builder reject an empty `lang`, a rate that is
/// not a positive number, and a negative or non-finite pitch.
///
/// ```rust
/// use listen_rs::{SpeechConfigBuilder, VoicePreference};
///
/// let config = SpeechConfigBuilder::default()
///     .preference(VoicePreference::Female)
///     .build()?;
/// assert_eq!(config.lang, "en-US");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
#[builder(default, setter(into), build_fn(validate = "Self::validate"))]
pub struct SpeechConfig {
    /// Locale requested for every utterance, and used to filter voices.
    pub lang: String,
    /// Speech rate multiplier.
    pub rate: f32,
    /// Pitch multiplier.
    pub pitch: f32,
    /// Voice preference used by `SpeechOutput::speak`.
    pub preference: VoicePreference,
    /// Name fragments that identify male voices, in priority order.
    pub male_hints: Vec<String>,
    /// Name fragments that identify female voices, in priority order.
    pub female_hints: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            rate: 1.0,
            pitch: 1.0,
            preference: VoicePreference::default(),
            male_hints: DEFAULT_MALE_HINTS.iter().map(|s| s.to_string()).collect(),
            female_hints: DEFAULT_FEMALE_HINTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SpeechConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SpeechError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, SpeechError> {
        let content = std::fs::read_to_string(path)?;
        log::debug!("Loading speech config from {}", path.display());
        Self::from_json_str(&content)
    }

    pub fn hints_for(&self, preference: VoicePreference) -> &[String] {
        match preference {
            VoicePreference::Male => &self.male_hints,
            VoicePreference::Female => &self.female_hints,
        }
    }

    fn validate(&self) -> Result<(), SpeechError> {
        check_fields(&self.lang, self.rate, self.pitch).map_err(SpeechError::Config)
    }
}

impl SpeechConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let defaults = SpeechConfig::default();
        check_fields(
            self.lang.as_deref().unwrap_or(&defaults.lang),
            self.rate.unwrap_or(defaults.rate),
            self.pitch.unwrap_or(defaults.pitch),
        )
    }
}

fn check_fields(lang: &str, rate: f32, pitch: f32) -> Result<(), String> {
    if lang.trim().is_empty() {
        return Err("'lang' must not be empty".to_string());
    }
    if !(rate.is_finite() && rate > 0.0) {
        return Err(format!("'rate' must be a positive number, got {rate}"));
    }
    if !(pitch.is_finite() && pitch >= 0.0) {
        return Err(format!("'pitch' must be a non-negative number, got {pitch}"));
    }
    Ok(())
}
