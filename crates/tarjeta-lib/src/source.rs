//! Audio sources: where a card's sound comes from.
//!
//! ```text
//! AudioRequest ─┬─ EmbeddedSource:  card payload ──┐
//!               └─ SynthesisSource: POST text ─────┴─ decode → DecodedAudio → Playback::play
//! ```
//!
//! The caller picks the source; the pipeline never branches on it.

use std::future::Future;

use tracing::debug;

use tarjeta_core::audio::{AudioError, DecodedAudio, EncodedAudio};
use tarjeta_core::types::{Flashcard, LanguageCode};

use crate::error::PlaybackError;
use crate::player::Playback;
use crate::synth::SynthesisClient;

/// What to play: the text in a language, plus its embedded payload if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRequest {
    pub text: String,
    pub language: LanguageCode,
    pub embedded: Option<EncodedAudio>,
}

impl AudioRequest {
    pub fn for_card(card: &Flashcard, language: LanguageCode) -> Self {
        Self {
            text: card.text(language).to_string(),
            language,
            embedded: Some(card.audio(language).clone()),
        }
    }

    /// Arbitrary text with no embedded audio.
    pub fn text(text: impl Into<String>, language: LanguageCode) -> Self {
        Self {
            text: text.into(),
            language,
            embedded: None,
        }
    }
}

/// Capability to turn an [`AudioRequest`] into playable audio.
pub trait AudioSource {
    fn name(&self) -> &'static str;

    fn resolve(
        &self,
        request: AudioRequest,
    ) -> impl Future<Output = Result<DecodedAudio, PlaybackError>> + Send;
}

/// Plays the payload shipped with the card. Never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl AudioSource for EmbeddedSource {
    fn name(&self) -> &'static str {
        "embedded"
    }

    async fn resolve(&self, request: AudioRequest) -> Result<DecodedAudio, PlaybackError> {
        let payload = request.embedded.ok_or(AudioError::MissingPayload)?;
        Ok(payload.decode()?)
    }
}

/// Synthesizes the request text remotely, ignoring any embedded payload.
#[derive(Clone)]
pub struct SynthesisSource {
    client: SynthesisClient,
}

impl SynthesisSource {
    pub fn new(client: SynthesisClient) -> Self {
        Self { client }
    }
}

impl AudioSource for SynthesisSource {
    fn name(&self) -> &'static str {
        "synthesis"
    }

    async fn resolve(&self, request: AudioRequest) -> Result<DecodedAudio, PlaybackError> {
        Ok(self
            .client
            .synthesize(&request.text, Some(request.language))
            .await?)
    }
}

/// Resolve `request` through `source` and start playing it.
///
/// Returns once playback has started. Overlapping calls each play.
pub async fn speak<S, P>(source: &S, player: &P, request: AudioRequest) -> Result<(), PlaybackError>
where
    S: AudioSource,
    P: Playback,
{
    debug!(
        "speak: {} chars ({}) via {}",
        request.text.len(),
        request.language,
        source.name()
    );
    let audio = source.resolve(request).await?;
    player.play(audio).await
}
