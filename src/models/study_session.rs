//! Study session: which deck is active, which card is shown, and whether
//! its answer has been revealed.
//!
//! Every transition is total. Moving past either end of the deck is a
//! no-op, so callers never need to check bounds first.

use super::{Deck, Flashcard};
use std::sync::Arc;

/// Walks through one deck a card at a time.
/// The deck is shared with its owner (`Arc`), never copied.
#[derive(Clone, Debug, Default)]
pub struct StudySession {
    deck: Option<Arc<Deck>>,
    current_index: usize,
    show_answer: bool,
}

impl StudySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `deck` the active deck and rewinds to its first card.
    pub fn select_deck(&mut self, deck: Arc<Deck>) {
        self.deck = Some(deck);
        self.current_index = 0;
        self.show_answer = false;
    }

    pub fn clear(&mut self) {
        self.deck = None;
        self.current_index = 0;
        self.show_answer = false;
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.total_count() {
            self.current_index += 1;
            self.show_answer = false;
        }
    }

    pub fn previous_card(&mut self) {
        if self.current_index > 0 {
            self.current_index -= 1;
            self.show_answer = false;
        }
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        self.deck
            .as_ref()
            .and_then(|deck| deck.cards.get(self.current_index))
    }

    pub fn active_deck(&self) -> Option<&Arc<Deck>> {
        self.deck.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.deck.is_some()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_count(&self) -> usize {
        self.deck.as_ref().map_or(0, |deck| deck.cards.len())
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.total_count()
    }

    pub fn toggle_answer(&mut self) {
        if self.current_card().is_some() {
            self.show_answer = !self.show_answer;
        }
    }

    pub fn is_revealed(&self) -> bool {
        self.show_answer
    }

    pub fn position_message(&self) -> String {
        format!("Card {} / {}", self.current_index + 1, self.total_count())
    }
}
