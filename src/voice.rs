use serde::{Deserialize, Serialize};

/// A voice as enumerated by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Human-readable name (e.g. `"Microsoft David"`, `"English_(America)"`).
    pub name: String,
    /// BCP 47 style language tag (e.g. `"en-US"`).
    pub lang: String,
    /// Host-specific identifier used to address the voice.
    pub uri: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, lang: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            uri: uri.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoicePreference {
    #[default]
    Male,
    Female,
}

/// Whether a voice's language tag names the target locale.
///
/// Tags compare case-insensitively, and `_` is accepted in place of `-`
/// (some platforms report `en_US`).
pub fn lang_matches(voice_lang: &str, target: &str) -> bool {
    let normalize = |tag: &str| tag.replace('_', "-").to_ascii_lowercase();
    normalize(voice_lang) == normalize(target)
}

/// Whether a voice name contains any of the hint tokens, ignoring case.
///
/// This refines plain substring matching on purpose: for the male
/// preference, names carrying the word "female" never match, since the
/// literal hint "male" is a substring of it. Such voices can still be picked
/// by the locale fallback in [`select_voice`].
fn name_matches(name: &str, hints: &[String], preference: VoicePreference) -> bool {
    let name = name.to_lowercase();
    if preference == VoicePreference::Male && name.contains("female") {
        return false;
    }
    hints
        .iter()
        .filter(|hint| !hint.is_empty())
        .any(|hint| name.contains(&hint.to_lowercase()))
}

/// Pick a voice for `lang` from `catalog`.
///
/// Fallback order: first locale voice whose name matches a hint, then the
/// first locale voice, then `None` (host default). Ties go to catalog order.
pub fn select_voice<'a>(
    catalog: &'a [Voice],
    lang: &str,
    preference: VoicePreference,
    hints: &[String],
) -> Option<&'a Voice> {
    let mut local = catalog.iter().filter(|v| lang_matches(&v.lang, lang));

    let first_local = local.clone().next();
    local
        .find(|v| name_matches(&v.name, hints, preference))
        .or(first_local)
}
