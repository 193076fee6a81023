//! Reading an uploaded file into a deck.
//!
//! Failing to read the file is reported separately from a file that was
//! read fine but is not a valid flashcard CSV.

use crate::models::Deck;
use crate::parser::{self, ParseError};
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Error reading the file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Reads a CSV file as UTF-8 text and parses it into a deck named after
/// the file.
pub fn read_deck_file(path: &Path) -> Result<Deck, UploadError> {
    let text = fs::read_to_string(path).map_err(|source| UploadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let deck = deck_from_text(&Deck::name_from_path(path), &text)?;
    info!(
        "Loaded {} cards from '{}'",
        deck.cards.len(),
        path.display()
    );
    Ok(deck)
}

/// Parses already-read text into a deck with the given name.
pub fn deck_from_text(name: &str, text: &str) -> Result<Deck, ParseError> {
    let cards = parser::parse(text)?;
    Ok(Deck::new(name, cards))
}
