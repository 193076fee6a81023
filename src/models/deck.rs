//! Deck is a named, ordered set of flashcards
use super::Flashcard;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const UNTITLED_DECK: &str = "Untitled Deck";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    #[serde(alias = "flashcards")]
    pub cards: Vec<Flashcard>,
}

impl Deck {
    pub fn new(name: &str, cards: Vec<Flashcard>) -> Self {
        Self {
            name: normalize_name(name),
            cards,
        }
    }

    /// Derives a deck name from the file it was uploaded from (the file stem).
    pub fn name_from_path(path: &Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        normalize_name(&stem)
    }

    /// Re-checks the invariants the parser guarantees, for decks that
    /// arrive from somewhere else. Returns `None` if no card survives.
    pub fn validated(self) -> Option<Self> {
        let cards: Vec<Flashcard> = self
            .cards
            .iter()
            .filter_map(|c| Flashcard::new(&c.question, &c.answer))
            .collect();
        if cards.is_empty() {
            return None;
        }
        Some(Self::new(&self.name, cards))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        UNTITLED_DECK.to_string()
    } else {
        trimmed.to_string()
    }
}
