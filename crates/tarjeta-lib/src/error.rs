//! Engine error types.
//!
//! Only an empty deck is fatal to a session. Everything here is scoped to
//! the single playback action that raised it.

use thiserror::Error;

pub use tarjeta_core::audio::AudioError;
pub use tarjeta_core::deck::DeckError;

/// Remote synthesis failure. Never retried.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("synthesis failed: request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("synthesis failed: endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("synthesis failed: malformed response: {0}")]
    MalformedResponse(String),
}

/// Failure of one play action (resolve + decode + start).
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("audio output unavailable: {0}")]
    Output(String),

    #[error("could not decode MP3: {0}")]
    Decode(String),
}
