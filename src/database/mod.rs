pub mod db;
pub mod store;
pub mod users;

pub use store::{DeckStore, DeckSubscription, ErrorReporter, SqliteDeckStore, StoreError, StoreOperation};
pub use users::AuthError;
