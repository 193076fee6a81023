//! A deck as persisted by the deck store: identity, owner and creation time
//! are assigned by the store, the cards are shared with whoever studies them.
use super::{Deck, Flashcard};
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct StoredDeck {
    pub id: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub deck: Arc<Deck>,
}

impl StoredDeck {
    pub fn name(&self) -> &str {
        &self.deck.name
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.deck.cards
    }
}
