//! Container for all decks of one owner, oldest first
use super::StoredDeck;

#[derive(Clone, Debug, Default)]
pub struct DeckSet {
    pub decks: Vec<StoredDeck>,
}

impl DeckSet {
    pub fn find(&self, id: &str) -> Option<&StoredDeck> {
        self.decks.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }
}
