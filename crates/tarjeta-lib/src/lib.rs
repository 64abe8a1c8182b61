//! tarjeta-lib: Flashcard engine.
//!
//! Study session, key listeners, remote speech synthesis, embedded-audio
//! decoding, and rodio playback. Depends on tarjeta-core for pure types and
//! deck navigation.

pub mod bake;
pub mod deck;
pub mod error;
pub mod listener;
pub mod player;
pub mod session;
pub mod source;
pub mod synth;

#[cfg(test)]
mod mock;

// Re-export tarjeta-core for convenience
pub use tarjeta_core;
