//! Sentence splitting and address encoding.
//!
//! Sentences are never stored. They are recomputed from message content on
//! every render, so splitting must be deterministic and addresses must be
//! resolvable against a freshly fetched thread.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MarginaliaError, Result};
use crate::thread::{Message, MessageRole, Thread};

/// Separator between address fields. Never appears in RFC 3339 timestamps
/// or decimal indices.
pub const ADDRESS_SEPARATOR: char = '|';

/// Splits message text into sentences.
///
/// Splits on runs of `\n` or `.`, trims every piece and drops empty ones.
/// Text without a terminator yields a single sentence; empty text yields none.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(['\n', '.'])
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Position of one sentence inside a thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SentenceAddress {
    pub message_timestamp: String,
    pub message_index: usize,
    pub sentence_index: usize,
}

impl SentenceAddress {
    pub fn new(message_timestamp: impl Into<String>, message_index: usize, sentence_index: usize) -> Self {
        Self {
            message_timestamp: message_timestamp.into(),
            message_index,
            sentence_index,
        }
    }

    /// Encodes the address as the opaque id stored alongside annotations.
    pub fn encode(&self) -> String {
        encode(&self.message_timestamp, self.message_index, self.sentence_index)
    }

    pub fn decode(id: &str) -> Result<Self> {
        decode(id)
    }
}

impl fmt::Display for SentenceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for SentenceAddress {
    type Err = MarginaliaError;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

pub fn encode(message_timestamp: &str, message_index: usize, sentence_index: usize) -> String {
    format!("{message_timestamp}{ADDRESS_SEPARATOR}{message_index}{ADDRESS_SEPARATOR}{sentence_index}")
}

/// Inverse of [`encode`].
///
/// The two indices are taken from the right so the timestamp field is always
/// whatever remains.
pub fn decode(id: &str) -> Result<SentenceAddress> {
    let mut fields = id.rsplitn(3, ADDRESS_SEPARATOR);
    let (Some(sentence), Some(message), Some(timestamp)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(MarginaliaError::validation(format!(
            "Malformed sentence id: {id}"
        )));
    };

    let parse_index = |field: &str| {
        field.parse::<usize>().map_err(|_| {
            MarginaliaError::validation(format!("Malformed sentence id: {id}"))
        })
    };

    Ok(SentenceAddress {
        message_timestamp: timestamp.to_string(),
        message_index: parse_index(message)?,
        sentence_index: parse_index(sentence)?,
    })
}

/// Finds the message an address points at.
///
/// Tries the recorded index first and falls back to a timestamp scan when the
/// index is out of range or now holds a different message.
pub fn locate_message<'a>(thread: &'a Thread, address: &SentenceAddress) -> Option<&'a Message> {
    thread
        .messages
        .get(address.message_index)
        .filter(|message| message.timestamp == address.message_timestamp)
        .or_else(|| {
            thread
                .messages
                .iter()
                .find(|message| message.timestamp == address.message_timestamp)
        })
}

/// Resolves a sentence id to its current text within `thread`.
pub fn resolve_text(thread: &Thread, id: &str) -> Option<String> {
    let address = decode(id).ok()?;
    let message = locate_message(thread, &address)?;
    split_sentences(&message.content)
        .into_iter()
        .nth(address.sentence_index)
}

/// Enumerates every addressable sentence of a thread in render order.
///
/// Only assistant messages are split into selectable sentences.
pub fn sentences_of(thread: &Thread) -> Vec<(SentenceAddress, String)> {
    thread
        .messages
        .iter()
        .enumerate()
        .filter(|(_, message)| message.role == MessageRole::Assistant)
        .flat_map(|(message_index, message)| {
            split_sentences(&message.content)
                .into_iter()
                .enumerate()
                .map(move |(sentence_index, text)| {
                    (
                        SentenceAddress::new(message.timestamp.clone(), message_index, sentence_index),
                        text,
                    )
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::ThreadType;

    fn thread_with(messages: Vec<Message>) -> Thread {
        Thread::new("t1", "freud", ThreadType::Proceed, "").with_messages(messages)
    }

    #[test]
    fn test_split_basic() {
        assert_eq!(
            split_sentences("The dream is a wish.  It hides.\n\nIt returns"),
            vec!["The dream is a wish", "It hides", "It returns"]
        );
    }

    #[test]
    fn test_split_without_terminator() {
        assert_eq!(split_sentences("  just one thought  "), vec!["just one thought"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences(" ...\n\n. ").is_empty());
    }

    #[test]
    fn test_split_is_idempotent_under_rejoin() {
        let text = "First point.Second point...\nThird\n\n  fourth. ";
        let once = split_sentences(text);
        let again = split_sentences(&once.join(". "));
        assert_eq!(once, again);
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let ts = "2024-03-01T10:15:30.123+00:00";
        let id = encode(ts, 4, 2);
        let address = decode(&id).unwrap();
        assert_eq!(address, SentenceAddress::new(ts, 4, 2));
        assert_eq!(address.encode(), id);
    }

    #[test]
    fn test_round_trip_edge_addresses() {
        let cases = [
            ("", 0, 0),
            ("2024-03-01T10:15:30+00:00", usize::MAX, usize::MAX),
            ("2024-03-01T10:15:30+09:30", 0, usize::MAX),
            ("2024-03-01T10:15:30-05:00", 7, 3),
            ("legacy|ts", 1, 2),
        ];

        for (ts, message_index, sentence_index) in cases {
            let id = encode(ts, message_index, sentence_index);
            let address = decode(&id).unwrap();
            assert_eq!(
                address,
                SentenceAddress::new(ts, message_index, sentence_index),
                "{id}"
            );
            assert_eq!(address.encode(), id);
        }
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode("no-separators").unwrap_err().is_validation());
        assert!(decode("ts|x|1").is_err());
        assert!(decode("ts|1|-1").is_err());
    }

    #[test]
    fn test_resolve_by_index() {
        let thread = thread_with(vec![
            Message::new(MessageRole::User, "question", "t0"),
            Message::new(MessageRole::Assistant, "A. B. C", "t1"),
        ]);
        assert_eq!(resolve_text(&thread, &encode("t1", 1, 2)), Some("C".to_string()));
    }

    #[test]
    fn test_resolve_falls_back_to_timestamp_after_reorder() {
        // Refetched thread regenerated with an extra leading message.
        let thread = thread_with(vec![
            Message::new(MessageRole::User, "new prefix", "t-extra"),
            Message::new(MessageRole::User, "question", "t0"),
            Message::new(MessageRole::Assistant, "A. B. C", "t1"),
        ]);
        assert_eq!(resolve_text(&thread, &encode("t1", 1, 0)), Some("A".to_string()));
        // Index out of range entirely
        assert_eq!(resolve_text(&thread, &encode("t1", 99, 1)), Some("B".to_string()));
    }

    #[test]
    fn test_resolve_missing() {
        let thread = thread_with(vec![Message::new(MessageRole::Assistant, "A", "t1")]);
        assert_eq!(resolve_text(&thread, &encode("gone", 0, 0)), None);
        assert_eq!(resolve_text(&thread, &encode("t1", 0, 5)), None);
        assert_eq!(resolve_text(&thread, "garbage"), None);
    }

    #[test]
    fn test_sentences_of_skips_user_messages() {
        let thread = thread_with(vec![
            Message::new(MessageRole::User, "Q one. Q two", "t0"),
            Message::new(MessageRole::Assistant, "A one. A two", "t1"),
        ]);
        let sentences = sentences_of(&thread);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].0, SentenceAddress::new("t1", 1, 0));
        assert_eq!(sentences[1].1, "A two");
    }
}
