pub mod config;
pub mod context;
pub mod database;
pub mod export;
pub mod models;
pub mod notify;
pub mod parser;
pub mod upload;

pub use models::{Deck, DeckSet, Flashcard, StoredDeck, StudySession, UserProfile};
