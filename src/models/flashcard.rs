//! Flashcard is a pair <question, answer>. Only text is used on both sides
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    /// Builds a card from raw text. Both sides are trimmed; returns `None`
    /// when either side ends up empty.
    pub fn new(question: &str, answer: &str) -> Option<Self> {
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() || answer.is_empty() {
            return None;
        }
        Some(Self {
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }

    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_creation() {
        let card = Flashcard::new("What is the capital of France?", "Paris").unwrap();

        assert_eq!(card.question, "What is the capital of France?");
        assert_eq!(card.answer, "Paris");
    }

    #[test]
    fn test_flashcard_trims_both_sides() {
        let card = Flashcard::new("  cześć \t", " hello ").unwrap();

        assert_eq!(card.question, "cześć");
        assert_eq!(card.answer, "hello");
    }

    #[test]
    fn test_flashcard_rejects_blank_side() {
        assert!(Flashcard::new("   ", "Mars").is_none());
        assert!(Flashcard::new("Red planet?", "").is_none());
    }

    #[test]
    fn test_is_valid() {
        let card = Flashcard {
            question: "q".to_string(),
            answer: " ".to_string(),
        };
        assert!(!card.is_valid());
    }
}
