//! tarjeta-core: Pure types and deck navigation.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod audio;
pub mod deck;
pub mod keys;
pub mod navigator;
pub mod types;
