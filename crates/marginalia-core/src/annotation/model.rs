//! Annotation domain models.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::thread::ThreadType;

/// Memo and highlight state of one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub sentence_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo_text: Option<String>,
    #[serde(default)]
    pub highlighted: bool,
}

/// Annotation state of a single thread.
///
/// This is both the local cache entry and the authoritative snapshot
/// returned by the annotation service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadAnnotations {
    /// Memo text keyed by sentence id.
    #[serde(default)]
    pub memos: HashMap<String, String>,
    /// Sentence ids that are highlighted.
    #[serde(default)]
    pub highlighted: HashSet<String>,
}

impl ThreadAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.memos.is_empty() && self.highlighted.is_empty()
    }

    /// Combined view of one sentence, or `None` when it carries nothing.
    pub fn annotation(&self, sentence_id: &str) -> Option<Annotation> {
        let memo_text = self.memos.get(sentence_id).cloned();
        let highlighted = self.highlighted.contains(sentence_id);
        if memo_text.is_none() && !highlighted {
            return None;
        }
        Some(Annotation {
            sentence_id: sentence_id.to_string(),
            memo_text,
            highlighted,
        })
    }
}

/// A memo as persisted by the annotation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoRecord {
    pub thread_id: String,
    pub thread_type: ThreadType,
    pub sentence_id: String,
    pub content: String,
    /// Text of the sentence at the time the memo was written.
    pub sentence_content: String,
    pub updated_at: String,
}

/// A highlight as persisted by the annotation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRecord {
    pub thread_id: String,
    pub thread_type: ThreadType,
    pub sentence_id: String,
    pub created_at: String,
}

/// Payload for creating or updating a memo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoWrite {
    pub thread_id: String,
    pub thread_type: ThreadType,
    pub sentence_id: String,
    pub content: String,
    pub sentence_content: String,
}

impl MemoWrite {
    pub fn into_record(self) -> MemoRecord {
        MemoRecord {
            thread_id: self.thread_id,
            thread_type: self.thread_type,
            sentence_id: self.sentence_id,
            content: self.content,
            sentence_content: self.sentence_content,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
