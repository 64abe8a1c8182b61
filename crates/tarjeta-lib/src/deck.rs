//! Deck files on disk.

use std::path::Path;

use tracing::debug;

use tarjeta_core::deck::{Deck, DeckError};

/// Read and validate a JSON deck file.
pub async fn load_deck(path: &Path) -> Result<Deck, DeckError> {
    let json = tokio::fs::read_to_string(path).await?;
    let deck = Deck::from_json(&json)?;
    debug!("deck: loaded {} cards from {}", deck.len(), path.display());
    Ok(deck)
}

/// Write a deck as pretty JSON, creating parent directories as needed.
pub async fn save_deck(path: &Path, deck: &Deck) -> Result<(), DeckError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, deck.to_json_pretty()?).await?;
    debug!("deck: wrote {} cards to {}", deck.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("tarjeta-deck-{}-{name}", std::process::id()))
            .join("deck.json")
    }

    #[tokio::test]
    async fn save_then_load() {
        let path = scratch("roundtrip");
        let deck = Deck::from_json(
            r#"[{"id":1,"english":"bread","spanish":"pan","definition":"baked food"}]"#,
        )
        .unwrap();

        save_deck(&path, &deck).await.unwrap();
        let loaded = load_deck(&path).await.unwrap();
        assert_eq!(loaded, deck);

        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = load_deck(&scratch("missing")).await.unwrap_err();
        assert!(matches!(err, DeckError::Io(_)));
    }
}
