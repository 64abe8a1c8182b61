//! Shared types for tarjeta flashcards.
//!
//! Kept in tarjeta-core so the navigator and deck tooling can use them
//! without pulling in tokio, reqwest, or rodio.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::audio::EncodedAudio;

// ─── Cards ─────────────────────────────────────────────────────────────────

/// Two fixed languages. `En` is the side shown first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    #[default]
    #[serde(rename = "EN")]
    En,
    #[serde(rename = "ES")]
    Es,
}

impl LanguageCode {
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageCode::En => "EN",
            LanguageCode::Es => "ES",
        }
    }

    /// The other side of the card.
    pub fn toggled(self) -> Self {
        match self {
            LanguageCode::En => LanguageCode::Es,
            LanguageCode::Es => LanguageCode::En,
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EN" => Ok(LanguageCode::En),
            "ES" => Ok(LanguageCode::Es),
            other => Err(format!("unsupported language code '{other}'; expected EN or ES")),
        }
    }
}

/// One vocabulary entry. Loaded once from the dataset and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: u32,
    pub english: String,
    pub spanish: String,
    pub definition: String,
    #[serde(default)]
    pub english_audio: EncodedAudio,
    #[serde(default)]
    pub spanish_audio: EncodedAudio,
}

impl Flashcard {
    pub fn text(&self, language: LanguageCode) -> &str {
        match language {
            LanguageCode::En => &self.english,
            LanguageCode::Es => &self.spanish,
        }
    }

    pub fn audio(&self, language: LanguageCode) -> &EncodedAudio {
        match language {
            LanguageCode::En => &self.english_audio,
            LanguageCode::Es => &self.spanish_audio,
        }
    }

    pub fn audio_mut(&mut self, language: LanguageCode) -> &mut EncodedAudio {
        match language {
            LanguageCode::En => &mut self.english_audio,
            LanguageCode::Es => &mut self.spanish_audio,
        }
    }
}

// ─── Navigation ────────────────────────────────────────────────────────────

/// Navigator operation triggered by a button or a bound key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Retreat,
    Advance,
}

/// How `advance()` picks a new card when it runs past the end of history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrawPolicy {
    /// Uniform over the whole deck; the previous card may come up again.
    #[default]
    Independent,
    /// Uniform over the deck minus the last card in history (decks of 2+).
    AvoidImmediateRepeat,
}

// ─── Synthesis ─────────────────────────────────────────────────────────────

/// Google Cloud text-to-speech endpoint.
pub const DEFAULT_SYNTHESIS_URL: &str =
    "https://texttospeech.googleapis.com/v1beta1/text:synthesize";

/// Environment variable holding the synthesis API key.
pub const API_KEY_ENV: &str = "GOOGLE_TEXT_TO_SPEECH_API_KEY";

/// Remote synthesis configuration.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    pub endpoint: String,
    /// Sent as the `key` query parameter. Not validated locally.
    pub api_key: String,
    pub default_language: LanguageCode,
    pub timeout: Duration,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SYNTHESIS_URL.into(),
            api_key: String::new(),
            default_language: LanguageCode::En,
            timeout: Duration::from_secs(15),
        }
    }
}

impl SynthesisConfig {
    /// Default config with the API key taken from [`API_KEY_ENV`] (empty if unset).
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_codes_parse_case_insensitively() {
        assert_eq!("es".parse::<LanguageCode>(), Ok(LanguageCode::Es));
        assert_eq!(" EN ".parse::<LanguageCode>(), Ok(LanguageCode::En));
        assert!("fr".parse::<LanguageCode>().is_err());
    }

    #[test]
    fn language_code_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&LanguageCode::Es).unwrap(), "\"ES\"");
        assert_eq!(LanguageCode::En.toggled(), LanguageCode::Es);
        assert_eq!(LanguageCode::Es.toggled(), LanguageCode::En);
    }

    #[test]
    fn flashcard_uses_camel_case_fields() {
        let json = r#"{
            "id": 7,
            "english": "house",
            "spanish": "casa",
            "definition": "a building for living in",
            "englishAudio": "aG91c2U=",
            "spanishAudio": "Y2FzYQ=="
        }"#;
        let card: Flashcard = serde_json::from_str(json).unwrap();
        assert_eq!(card.id, 7);
        assert_eq!(card.text(LanguageCode::Es), "casa");
        assert_eq!(card.audio(LanguageCode::En).as_str(), "aG91c2U=");
    }

    #[test]
    fn missing_audio_defaults_to_empty() {
        let json = r#"{"id":1,"english":"a","spanish":"un","definition":"article"}"#;
        let card: Flashcard = serde_json::from_str(json).unwrap();
        assert!(card.english_audio.is_empty());
        assert!(card.spanish_audio.is_empty());
    }
}
