//! Deck baking: fill a deck's embedded audio through remote synthesis.
//!
//! Run ahead of time so study sessions can use [`EmbeddedSource`] with no
//! network access. One request per payload, in deck order, stopping at the
//! first failure.
//!
//! [`EmbeddedSource`]: crate::source::EmbeddedSource

use tracing::{debug, info};

use tarjeta_core::deck::Deck;
use tarjeta_core::types::LanguageCode;

use crate::error::SynthesisError;
use crate::synth::SynthesisClient;

const LANGUAGES: [LanguageCode; 2] = [LanguageCode::En, LanguageCode::Es];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BakeReport {
    pub synthesized: usize,
    pub skipped: usize,
}

/// Synthesize every empty payload (every payload with `overwrite`).
pub async fn bake_deck(
    client: &SynthesisClient,
    deck: &Deck,
    overwrite: bool,
) -> Result<(Deck, BakeReport), SynthesisError> {
    let mut report = BakeReport::default();
    let mut baked = deck.clone();

    for (index, card) in deck.iter().enumerate() {
        for language in LANGUAGES {
            if !overwrite && !card.audio(language).is_empty() {
                report.skipped += 1;
                continue;
            }
            debug!("bake: card {} ({language})", card.id);
            let audio = client
                .synthesize_encoded(card.text(language), Some(language))
                .await?;
            baked.set_audio(index, language, audio);
            report.synthesized += 1;
        }
    }

    info!(
        "bake: {} payloads synthesized, {} already present",
        report.synthesized, report.skipped
    );
    Ok((baked, report))
}
