//! JSON import/export module for flashcard decks.
//! Saves a deck's name and cards to a JSON file and loads them back.

use crate::models::Deck;
use log::info;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Deck '{0}' has no card with both a question and an answer")]
    EmptyDeck(String),
}

/// Exports a deck to a JSON file at the specified path.
pub fn export_json_to_path(deck: &Deck, path: &Path) -> Result<(), ExportError> {
    let json_string = serde_json::to_string_pretty(deck)?;
    fs::write(path, json_string)?;
    info!("Deck '{}' exported to '{}'", deck.name, path.display());
    Ok(())
}

/// Imports a deck from a JSON file. Cards missing a side are dropped and a
/// deck left with no cards is rejected.
pub fn import_json(path: &Path) -> Result<Deck, ExportError> {
    let contents = fs::read_to_string(path)?;
    let deck: Deck = serde_json::from_str(&contents)?;
    let name = deck.name.clone();

    let deck = deck.validated().ok_or(ExportError::EmptyDeck(name))?;
    info!("Deck '{}' imported from '{}'", deck.name, path.display());
    Ok(deck)
}
