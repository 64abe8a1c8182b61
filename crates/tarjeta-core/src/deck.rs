//! Static flashcard dataset: parsing and validation.

use std::collections::HashSet;

use thiserror::Error;

use crate::audio::EncodedAudio;
use crate::types::{Flashcard, LanguageCode};

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("deck is empty")]
    Empty,

    #[error("duplicate card id {0}")]
    DuplicateId(u32),

    #[error("invalid deck JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("deck I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ordered, read-only sequence of cards with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Flashcard>,
}

impl Deck {
    pub fn new(cards: Vec<Flashcard>) -> Result<Self, DeckError> {
        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            if !seen.insert(card.id) {
                return Err(DeckError::DuplicateId(card.id));
            }
        }
        Ok(Self { cards })
    }

    /// Parse a JSON array of cards.
    pub fn from_json(json: &str) -> Result<Self, DeckError> {
        let cards: Vec<Flashcard> = serde_json::from_str(json)?;
        Self::new(cards)
    }

    pub fn to_json_pretty(&self) -> Result<String, DeckError> {
        Ok(serde_json::to_string_pretty(&self.cards)?)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Flashcard> {
        self.cards.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flashcard> {
        self.cards.iter()
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<Flashcard> {
        self.cards
    }

    /// Replace one audio payload. Ids and text never change after load.
    pub fn set_audio(&mut self, index: usize, language: LanguageCode, audio: EncodedAudio) -> bool {
        match self.cards.get_mut(index) {
            Some(card) => {
                *card.audio_mut(language) = audio;
                true
            }
            None => false,
        }
    }
}
