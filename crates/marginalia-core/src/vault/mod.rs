//! Vault domain module.
//!
//! The vault is a cross-thread bookmark store. A batch of saved sentences is
//! kept as one item with parallel arrays; grouped memos are one item anchored
//! at their first sentence.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{MarginaliaError, Result};
use crate::thread::ThreadType;

/// Sentences saved together in one vault call.
///
/// `sentence_ids`, `sentences`, `highlight_states`, `highlight_colors` and
/// `memo_contents` are aligned by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceBatch {
    pub thread_id: String,
    pub thread_type: ThreadType,
    pub persona_id: Option<String>,
    pub sentence_ids: Vec<String>,
    pub sentences: Vec<String>,
    pub highlight_states: Vec<bool>,
    pub highlight_colors: Vec<Option<String>>,
    pub memo_contents: Vec<Option<String>>,
}

impl SentenceBatch {
    /// Rejects empty batches and misaligned arrays.
    pub fn validate(&self) -> Result<()> {
        let n = self.sentence_ids.len();
        if n == 0 {
            return Err(MarginaliaError::validation("No sentences selected"));
        }
        let aligned = self.sentences.len() == n
            && self.highlight_states.len() == n
            && self.highlight_colors.len() == n
            && self.memo_contents.len() == n;
        if !aligned {
            return Err(MarginaliaError::internal(format!(
                "Vault batch arrays are misaligned for {n} sentences"
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sentence_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentence_ids.is_empty()
    }
}

/// A sentence referenced by a grouped memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedSentence {
    pub sentence_id: String,
    pub content: String,
}

/// One memo covering one or more sentences.
///
/// Only `anchor_sentence_id` is addressable from a thread view; the other
/// sentences are carried as metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultMemo {
    pub thread_id: String,
    pub thread_type: ThreadType,
    pub persona_id: Option<String>,
    pub anchor_sentence_id: String,
    pub content: String,
    pub related_sentences: Vec<RelatedSentence>,
}

impl VaultMemo {
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(MarginaliaError::validation("Memo text must not be empty"));
        }
        if self.related_sentences.is_empty() {
            return Err(MarginaliaError::validation("No sentences selected"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VaultEntry {
    Sentences(SentenceBatch),
    Memo(VaultMemo),
}

impl VaultEntry {
    pub fn thread_id(&self) -> &str {
        match self {
            VaultEntry::Sentences(batch) => &batch.thread_id,
            VaultEntry::Memo(memo) => &memo.thread_id,
        }
    }
}

/// A stored vault item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    pub id: String,
    pub created_at: String,
    pub entry: VaultEntry,
}

impl VaultItem {
    pub fn new(entry: VaultEntry) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            entry,
        }
    }
}

/// Durable vault storage.
#[async_trait]
pub trait VaultService: Send + Sync {
    /// Saves a batch of sentences as a single item.
    async fn save_sentences(&self, batch: SentenceBatch) -> Result<VaultItem>;

    /// Saves one memo with its related sentences as a single item.
    async fn save_memo(&self, memo: VaultMemo) -> Result<VaultItem>;

    /// Lists all items, oldest first.
    async fn list(&self) -> Result<Vec<VaultItem>>;

    /// Deletes an item.
    ///
    /// # Returns
    ///
    /// - `Err(MarginaliaError::NotFound)`: No item with this id
    async fn delete(&self, item_id: &str) -> Result<()>;
}

/// Items that reference a given thread.
pub fn items_for_thread<'a>(items: &'a [VaultItem], thread_id: &str) -> Vec<&'a VaultItem> {
    items
        .iter()
        .filter(|item| item.entry.thread_id() == thread_id)
        .collect()
}
