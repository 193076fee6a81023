//! CSV to flashcard parser.
//!
//! The first non-blank line is a header naming at least a `question` and an
//! `answer` column, in any order and any casing. Extra columns are ignored.
//! Every following non-blank line is a row; fields may be double-quoted to
//! carry commas. Rows missing either side are skipped rather than rejected.

use crate::models::Flashcard;
use log::debug;
use thiserror::Error;

const DELIMITER: u8 = b',';
const QUESTION_COLUMN: &str = "question";
const ANSWER_COLUMN: &str = "answer";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("CSV must have a header row and at least one data row.")]
    TooFewLines,

    #[error("CSV header must contain 'question' and 'answer' columns (missing: {}).", .missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },

    #[error("No valid flashcards found in the file.")]
    NoValidRows,
}

/// Parses raw CSV text into flashcards, preserving row order.
pub fn parse(raw: &str) -> Result<Vec<Flashcard>, ParseError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let lines: Vec<&str> = raw.lines().filter(|line| !line.trim().is_empty()).collect();

    if lines.len() < 2 {
        return Err(ParseError::TooFewLines);
    }

    let header: Vec<String> = split_fields(lines[0])
        .into_iter()
        .map(|name| name.to_lowercase())
        .collect();
    let question_index = header.iter().position(|name| name == QUESTION_COLUMN);
    let answer_index = header.iter().position(|name| name == ANSWER_COLUMN);

    let (question_index, answer_index) = match (question_index, answer_index) {
        (Some(q), Some(a)) => (q, a),
        (q, a) => {
            let mut missing = Vec::new();
            if q.is_none() {
                missing.push(QUESTION_COLUMN);
            }
            if a.is_none() {
                missing.push(ANSWER_COLUMN);
            }
            return Err(ParseError::MissingColumns { missing });
        }
    };

    let rows = &lines[1..];
    let cards: Vec<Flashcard> = rows
        .iter()
        .filter_map(|line| {
            let fields = split_fields(line);
            let question = fields.get(question_index)?;
            let answer = fields.get(answer_index)?;
            Flashcard::new(question, answer)
        })
        .collect();

    debug!(
        "Parsed {} flashcards from {} rows ({} skipped)",
        cards.len(),
        rows.len(),
        rows.len() - cards.len()
    );

    if cards.is_empty() {
        return Err(ParseError::NoValidRows);
    }

    Ok(cards)
}

/// Splits one line into trimmed fields. A line the reader cannot make sense
/// of yields no fields, which drops the row.
fn split_fields(line: &str) -> Vec<String> {
    let aligned = align_quoted_fields(line);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(DELIMITER)
        .from_reader(aligned.as_bytes());

    let mut record = csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record.iter().map(|field| field.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}

/// Drops the blanks between a field start and its opening quote, so the
/// reader sees `a, "b, c"` as `a,"b, c"` and unquotes the field once.
fn align_quoted_fields(line: &str) -> String {
    let delimiter = char::from(DELIMITER);
    let is_blank = |c: char| c == ' ' || c == '\t';

    let mut aligned = String::with_capacity(line.len());
    let mut chars = line.char_indices().peekable();
    let mut in_quotes = false;
    let mut at_field_start = true;

    while let Some((i, c)) = chars.next() {
        if in_quotes {
            aligned.push(c);
            if c == '"' {
                if chars.peek().is_some_and(|&(_, next)| next == '"') {
                    chars.next();
                    aligned.push('"');
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        if at_field_start && is_blank(c) && line[i..].trim_start_matches(is_blank).starts_with('"') {
            continue;
        }

        aligned.push(c);
        in_quotes = at_field_start && c == '"';
        at_field_start = c == delimiter;
    }

    aligned
}
