//! Embedded audio payloads: base64 MP3 strings and their decoded form.
//!
//! Pure functions, no I/O. Decoding is shared by the embedded and the
//! synthesized audio paths.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix that turns a base64 MP3 payload into a playable source URI.
pub const MP3_DATA_URI_PREFIX: &str = "data:audio/mp3;base64,";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioError {
    /// Card has no audio for this language (dataset not baked).
    #[error("no embedded audio for this card")]
    MissingPayload,

    #[error("malformed audio payload: {0}")]
    Malformed(String),
}

/// Base64-encoded MP3, exactly as stored in the dataset or returned by synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedAudio(String);

impl EncodedAudio {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encode raw MP3 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(BASE64.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn data_uri(&self) -> String {
        format!("{MP3_DATA_URI_PREFIX}{}", self.0)
    }

    /// Decode into a playable clip. Fails on an empty or non-base64 payload.
    pub fn decode(&self) -> Result<DecodedAudio, AudioError> {
        if self.0.is_empty() {
            return Err(AudioError::MissingPayload);
        }
        let bytes = BASE64
            .decode(self.0.as_bytes())
            .map_err(|e| AudioError::Malformed(e.to_string()))?;
        Ok(DecodedAudio {
            source_uri: self.data_uri(),
            bytes,
        })
    }
}

/// Playable clip: the source URI it was built from plus the raw MP3 bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    source_uri: String,
    bytes: Vec<u8>,
}

impl DecodedAudio {
    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Decode a base64 MP3 string through the data-URI path.
pub fn decode_base64_mp3(encoded: &str) -> Result<DecodedAudio, AudioError> {
    EncodedAudio::new(encoded).decode()
}

#[cfg(test)]
mod tests {
    use super::*;

    // "ID3" header bytes followed by a few frame bytes.
    const SAMPLE: &str = "SUQzBAAAAAAAI1RTU0UAAAAPAAADTGF2ZjU4Ljc2LjEwMA==";

    #[test]
    fn source_uri_is_prefix_plus_payload() {
        let audio = decode_base64_mp3(SAMPLE).unwrap();
        assert_eq!(audio.source_uri(), format!("data:audio/mp3;base64,{SAMPLE}"));
        assert_eq!(&audio.source_uri()[MP3_DATA_URI_PREFIX.len()..], SAMPLE);
    }

    #[test]
    fn decodes_payload_bytes() {
        let audio = decode_base64_mp3(SAMPLE).unwrap();
        assert_eq!(&audio.bytes()[..3], b"ID3");
    }

    #[test]
    fn from_bytes_matches_standard_alphabet() {
        let encoded = EncodedAudio::from_bytes(b"hola");
        assert_eq!(encoded.as_str(), "aG9sYQ==");
        assert_eq!(encoded.decode().unwrap().into_bytes(), b"hola");
    }

    #[test]
    fn empty_payload_is_missing() {
        assert_eq!(decode_base64_mp3(""), Err(AudioError::MissingPayload));
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let err = decode_base64_mp3("not base64 at all!").unwrap_err();
        assert!(matches!(err, AudioError::Malformed(_)));
    }
}
