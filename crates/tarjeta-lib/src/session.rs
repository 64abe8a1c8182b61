//! Study session: a deck navigator plus the language side being shown.
//!
//! The displayed language resets to English whenever the displayed card
//! changes. Moving onto another history entry that holds the same card keeps
//! the side that was showing.

use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::debug;

use tarjeta_core::deck::{Deck, DeckError};
use tarjeta_core::navigator::DeckNavigator;
use tarjeta_core::types::{LanguageCode, NavAction};

use crate::source::AudioRequest;

/// What the front end renders for the current card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: u32,
    pub text: String,
    pub definition: String,
    pub language: LanguageCode,
    /// 1-based position in history.
    pub position: usize,
    pub history_len: usize,
    pub can_retreat: bool,
}

pub struct StudySession<R = StdRng> {
    navigator: DeckNavigator<R>,
    language: LanguageCode,
}

impl<R: Rng> StudySession<R> {
    pub fn new(navigator: DeckNavigator<R>) -> Self {
        Self {
            navigator,
            language: LanguageCode::default(),
        }
    }

    /// Seed the session from `deck`. Fatal for the session if the deck is empty.
    pub fn start(&mut self, deck: Deck) -> Result<CardView, DeckError> {
        let cards = deck.len();
        self.navigator.initialize(deck)?;
        self.language = LanguageCode::default();
        debug!("session: started with {cards} cards");
        self.view().ok_or(DeckError::Empty)
    }

    pub fn next(&mut self) -> Option<CardView> {
        self.apply(NavAction::Advance)
    }

    pub fn previous(&mut self) -> Option<CardView> {
        self.apply(NavAction::Retreat)
    }

    /// Run a navigator action. `None` while no deck is loaded.
    pub fn apply(&mut self, action: NavAction) -> Option<CardView> {
        let before = self.navigator.current().map(|card| card.id);
        let after = self.navigator.apply(action)?.id;
        if before != Some(after) {
            self.language = LanguageCode::default();
        }
        self.view()
    }

    /// Show the other side of the current card.
    pub fn flip(&mut self) -> Option<CardView> {
        self.navigator.current()?;
        self.language = self.language.toggled();
        self.view()
    }

    pub fn language(&self) -> LanguageCode {
        self.language
    }

    pub fn view(&self) -> Option<CardView> {
        let card = self.navigator.current()?;
        Some(CardView {
            id: card.id,
            text: card.text(self.language).to_string(),
            definition: card.definition.clone(),
            language: self.language,
            position: self.navigator.cursor() + 1,
            history_len: self.navigator.history_len(),
            can_retreat: self.navigator.can_retreat(),
        })
    }

    /// Audio for the current card in the displayed language.
    pub fn audio_request(&self) -> Option<AudioRequest> {
        self.navigator
            .current()
            .map(|card| AudioRequest::for_card(card, self.language))
    }

    pub fn navigator(&self) -> &DeckNavigator<R> {
        &self.navigator
    }
}
