pub mod csv;

pub use self::csv::{ParseError, parse};
