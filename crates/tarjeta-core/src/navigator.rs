//! Deck navigator: append-only history of drawn cards with a cursor.
//!
//! ```text
//! history: [c3, c0, c3, c7]
//!                   ^ cursor
//! retreat → cursor-1 (history untouched)
//! advance → cursor+1 if history has it (replay), else draw + append
//! ```
//!
//! Draws come from an injected [`Rng`] so sessions are reproducible under a
//! seed. Each navigator owns its own state; independent sessions never share it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::deck::{Deck, DeckError};
use crate::types::{DrawPolicy, Flashcard, NavAction};

pub struct DeckNavigator<R = StdRng> {
    deck: Deck,
    /// Indices into `deck`, in visit order. Never shrinks while initialized.
    history: Vec<usize>,
    cursor: usize,
    rng: R,
    policy: DrawPolicy,
}

impl DeckNavigator<StdRng> {
    /// Navigator with a reproducible draw sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Navigator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> DeckNavigator<R> {
    /// Pending navigator: no deck, no history, `current()` is `None`.
    pub fn new(rng: R) -> Self {
        Self {
            deck: Deck::default(),
            history: Vec::new(),
            cursor: 0,
            rng,
            policy: DrawPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DrawPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Take `deck` and seed history with one random card at cursor 0.
    ///
    /// An empty deck is an error and leaves the navigator pending.
    pub fn initialize(&mut self, deck: Deck) -> Result<(), DeckError> {
        if deck.is_empty() {
            return Err(DeckError::Empty);
        }
        self.deck = deck;
        self.history.clear();
        let first = self.draw();
        self.history.push(first);
        self.cursor = 0;
        Ok(())
    }

    /// Back to the pending state. The RNG keeps its position.
    pub fn reset(&mut self) {
        self.deck = Deck::default();
        self.history.clear();
        self.cursor = 0;
    }

    /// Move forward: replay the next history entry if there is one,
    /// otherwise draw a new card and append it. No-op while pending.
    pub fn advance(&mut self) -> Option<&Flashcard> {
        if self.history.is_empty() {
            return None;
        }
        if self.cursor + 1 < self.history.len() {
            self.cursor += 1;
        } else {
            let next = self.draw();
            self.history.push(next);
            self.cursor = self.history.len() - 1;
        }
        self.current()
    }

    /// Move back one entry. No-op at the start of history or while pending.
    pub fn retreat(&mut self) -> Option<&Flashcard> {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        self.current()
    }

    pub fn apply(&mut self, action: NavAction) -> Option<&Flashcard> {
        match action {
            NavAction::Advance => self.advance(),
            NavAction::Retreat => self.retreat(),
        }
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.history
            .get(self.cursor)
            .and_then(|&index| self.deck.get(index))
    }

    pub fn is_pending(&self) -> bool {
        self.history.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Visited cards in order, including entries ahead of the cursor.
    pub fn history(&self) -> impl Iterator<Item = &Flashcard> {
        self.history.iter().filter_map(|&index| self.deck.get(index))
    }

    pub fn can_retreat(&self) -> bool {
        self.cursor > 0
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn policy(&self) -> DrawPolicy {
        self.policy
    }

    fn draw(&mut self) -> usize {
        let len = self.deck.len();
        match (self.policy, self.history.last()) {
            (DrawPolicy::AvoidImmediateRepeat, Some(&last)) if len > 1 => {
                let pick = self.rng.gen_range(0..len - 1);
                if pick >= last { pick + 1 } else { pick }
            }
            _ => self.rng.gen_range(0..len),
        }
    }
}
