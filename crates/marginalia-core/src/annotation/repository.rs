//! Annotation service trait.

use super::model::{HighlightRecord, MemoRecord, MemoWrite, ThreadAnnotations};
use crate::error::Result;
use crate::thread::ThreadType;
use async_trait::async_trait;

/// Remote persistence for memos and highlights.
///
/// Every write is addressed by `(thread_id, sentence_id)`; the sentence id is
/// the opaque string produced by the sentence codec.
#[async_trait]
pub trait AnnotationService: Send + Sync {
    /// Creates the memo or replaces its content.
    async fn upsert_memo(&self, memo: MemoWrite) -> Result<MemoRecord>;

    /// Deletes a memo. Deleting a missing memo succeeds.
    async fn delete_memo(&self, thread_id: &str, sentence_id: &str) -> Result<()>;

    /// Marks a sentence as highlighted. Idempotent.
    async fn create_highlight(
        &self,
        thread_id: &str,
        thread_type: ThreadType,
        sentence_id: &str,
    ) -> Result<()>;

    /// Clears a highlight. Idempotent.
    async fn delete_highlight(&self, thread_id: &str, sentence_id: &str) -> Result<()>;

    /// Lists every memo across all threads.
    async fn list_memos(&self) -> Result<Vec<MemoRecord>>;

    /// Lists every highlight across all threads.
    async fn list_highlights(&self) -> Result<Vec<HighlightRecord>>;

    /// Fetches the authoritative `{memos, highlights}` snapshot of one thread.
    async fn fetch_thread_annotations(&self, thread_id: &str) -> Result<ThreadAnnotations>;
}
