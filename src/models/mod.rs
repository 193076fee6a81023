pub mod deck;
pub mod deck_set;
pub mod flashcard;
pub mod stored_deck;
pub mod study_session;
pub mod user;

pub use deck::Deck;
pub use deck_set::DeckSet;
pub use flashcard::Flashcard;
pub use stored_deck::StoredDeck;
pub use study_session::StudySession;
pub use user::UserProfile;
