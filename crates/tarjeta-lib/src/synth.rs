//! Remote text-to-speech client.
//!
//! One POST per call, MP3 only, no retry:
//!
//! ```text
//! POST {endpoint}?key={api_key}
//! {"input":{"text":…},"voice":{"languageCode":…},"audioConfig":{"audioEncoding":"MP3"}}
//! → {"audioContent":"<base64 mp3>"}
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tarjeta_core::audio::{DecodedAudio, EncodedAudio};
use tarjeta_core::types::{API_KEY_ENV, LanguageCode, SynthesisConfig};

use crate::error::SynthesisError;

const AUDIO_ENCODING: &str = "MP3";

/// JSON body sent to the synthesis endpoint. Field order is the wire order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest<'a> {
    pub input: SynthesisInput<'a>,
    pub voice: VoiceSelection,
    pub audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
pub struct SynthesisInput<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSelection {
    pub language_code: LanguageCode,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConfig {
    pub audio_encoding: &'static str,
}

impl<'a> SynthesisRequest<'a> {
    pub fn new(text: &'a str, language: LanguageCode) -> Self {
        Self {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: language,
            },
            audio_config: AudioConfig {
                audio_encoding: AUDIO_ENCODING,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisResponse {
    #[serde(default)]
    audio_content: Option<String>,
}

/// Cloneable handle to the synthesis endpoint.
#[derive(Clone)]
pub struct SynthesisClient {
    client: reqwest::Client,
    config: Arc<SynthesisConfig>,
}

impl SynthesisClient {
    pub fn new(config: SynthesisConfig) -> Self {
        if config.api_key.is_empty() {
            warn!("{API_KEY_ENV} is not set; the synthesis endpoint will likely reject requests");
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(
                    "synthesis: client setup failed ({e}); using defaults, {:?} timeout not applied",
                    config.timeout
                );
                reqwest::Client::new()
            });
        Self {
            client,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Synthesize `text` and return the raw base64 payload.
    ///
    /// `language` falls back to the configured default.
    pub async fn synthesize_encoded(
        &self,
        text: &str,
        language: Option<LanguageCode>,
    ) -> Result<EncodedAudio, SynthesisError> {
        let language = language.unwrap_or(self.config.default_language);
        let body = SynthesisRequest::new(text, language);

        debug!("synthesis: POST {} chars ({language})", text.len());

        let resp = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SynthesisError::Status { status, body });
        }

        let bytes = resp.bytes().await?;
        let parsed: SynthesisResponse = serde_json::from_slice(&bytes)
            .map_err(|e| SynthesisError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .audio_content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| SynthesisError::MalformedResponse("missing audioContent".into()))?;

        debug!("synthesis: received {} base64 chars", content.len());
        Ok(EncodedAudio::new(content))
    }

    /// Synthesize `text` and decode it through the embedded-audio decode step.
    pub async fn synthesize(
        &self,
        text: &str,
        language: Option<LanguageCode>,
    ) -> Result<DecodedAudio, SynthesisError> {
        self.synthesize_encoded(text, language)
            .await?
            .decode()
            .map_err(|e| SynthesisError::MalformedResponse(e.to_string()))
    }
}
