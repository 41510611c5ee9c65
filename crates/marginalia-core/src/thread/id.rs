//! Thread identifier formats.
//!
//! Interpretation threads were historically addressed as
//! `interpretation_{personaId}` (one per persona). Current ids carry a
//! millisecond suffix so several interpretation threads can coexist.

use once_cell::sync::Lazy;
use regex::Regex;

/// Literal prefix shared by every interpretation thread id.
pub const INTERPRETATION_MARKER: &str = "interpretation";
/// Field separator inside thread ids.
pub const ID_SEPARATOR: char = '_';

static TRAILING_MILLIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{10,}$").expect("valid regex"));

/// Historical format of a thread id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadIdFormat {
    /// `interpretation_{personaId}` with no timestamp suffix.
    Legacy,
    /// Any id with a timestamp suffix or hyphenated form.
    Current,
}

impl ThreadIdFormat {
    /// Classifies an id.
    ///
    /// An id is legacy iff it starts with `interpretation_`, contains no
    /// hyphen, and does not end in ten or more consecutive digits.
    pub fn classify(thread_id: &str) -> Self {
        let legacy = thread_id.starts_with("interpretation_")
            && !thread_id.contains('-')
            && !TRAILING_MILLIS.is_match(thread_id);

        if legacy {
            ThreadIdFormat::Legacy
        } else {
            ThreadIdFormat::Current
        }
    }
}

pub fn is_legacy_thread_id(thread_id: &str) -> bool {
    ThreadIdFormat::classify(thread_id) == ThreadIdFormat::Legacy
}

/// Extracts the persona id candidate from an interpretation thread id.
///
/// Returns the second `_`-separated field when the first field is the
/// interpretation marker.
pub fn interpretation_persona_candidate(thread_id: &str) -> Option<&str> {
    let mut fields = thread_id.split(ID_SEPARATOR);
    let marker = fields.next()?;
    if marker != INTERPRETATION_MARKER {
        return None;
    }
    fields.next().filter(|candidate| !candidate.is_empty())
}

/// Builds a current-format interpretation id.
pub fn new_interpretation_thread_id(persona_id: &str, unix_millis: i64) -> String {
    format!("{INTERPRETATION_MARKER}{ID_SEPARATOR}{persona_id}{ID_SEPARATOR}{unix_millis}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_classification() {
        assert!(is_legacy_thread_id("interpretation_freud"));
        assert!(!is_legacy_thread_id("interpretation_freud-1700000000000"));
        assert!(!is_legacy_thread_id("interpretation_freud_1700000000000"));
        assert!(!is_legacy_thread_id("proceed_freud"));
        // Fewer than ten trailing digits is still legacy
        assert!(is_legacy_thread_id("interpretation_persona42"));
    }

    #[test]
    fn test_persona_candidate() {
        assert_eq!(
            interpretation_persona_candidate("interpretation_freud"),
            Some("freud")
        );
        assert_eq!(
            interpretation_persona_candidate("interpretation_jung_1700000000000"),
            Some("jung")
        );
        assert_eq!(interpretation_persona_candidate("interpretation"), None);
        assert_eq!(interpretation_persona_candidate("proceed_freud"), None);
    }

    #[test]
    fn test_generated_ids_are_current() {
        let id = new_interpretation_thread_id("freud", 1_700_000_000_123);
        assert_eq!(id, "interpretation_freud_1700000000123");
        assert_eq!(ThreadIdFormat::classify(&id), ThreadIdFormat::Current);
        assert_eq!(interpretation_persona_candidate(&id), Some("freud"));
    }
}
