//! TOML-backed annotation service.

use crate::dto::AnnotationsFileV1;
use crate::paths::{MarginaliaPaths, ServiceType};
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use marginalia_core::annotation::{
    AnnotationService, HighlightRecord, MemoRecord, MemoWrite, ThreadAnnotations,
};
use marginalia_core::thread::ThreadType;
use marginalia_core::{MarginaliaError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Stores every memo and highlight in a single `annotations.toml`.
pub struct TomlAnnotationService {
    file: Arc<AtomicTomlFile<AnnotationsFileV1>>,
}

impl TomlAnnotationService {
    pub fn new(paths: &MarginaliaPaths) -> Result<Self> {
        Ok(Self::with_path(paths.get_path(ServiceType::Annotations)?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
        }
    }

    /// Runs blocking file work off the async executor.
    async fn with_file<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&AtomicTomlFile<AnnotationsFileV1>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || f(&file))
            .await
            .map_err(|e| MarginaliaError::internal(format!("Storage task failed: {e}")))?
    }

    async fn read_all(&self) -> Result<AnnotationsFileV1> {
        self.with_file(|file| Ok(file.load()?.unwrap_or_default()))
            .await
    }
}

#[async_trait]
impl AnnotationService for TomlAnnotationService {
    async fn upsert_memo(&self, memo: MemoWrite) -> Result<MemoRecord> {
        let record = memo.into_record();
        let stored = record.clone();
        self.with_file(move |file| {
            file.update(AnnotationsFileV1::default(), |data| {
                data.memos.retain(|m| {
                    !(m.thread_id == stored.thread_id && m.sentence_id == stored.sentence_id)
                });
                data.memos.push(stored);
                Ok(())
            })
        })
        .await?;
        tracing::debug!(
            "[TomlAnnotationService] Saved memo {} in thread {}",
            record.sentence_id,
            record.thread_id
        );
        Ok(record)
    }

    async fn delete_memo(&self, thread_id: &str, sentence_id: &str) -> Result<()> {
        let (thread_id, sentence_id) = (thread_id.to_string(), sentence_id.to_string());
        self.with_file(move |file| {
            file.update(AnnotationsFileV1::default(), |data| {
                data.memos
                    .retain(|m| !(m.thread_id == thread_id && m.sentence_id == sentence_id));
                Ok(())
            })
        })
        .await
    }

    async fn create_highlight(
        &self,
        thread_id: &str,
        thread_type: ThreadType,
        sentence_id: &str,
    ) -> Result<()> {
        let record = HighlightRecord {
            thread_id: thread_id.to_string(),
            thread_type,
            sentence_id: sentence_id.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.with_file(move |file| {
            file.update(AnnotationsFileV1::default(), |data| {
                let exists = data.highlights.iter().any(|h| {
                    h.thread_id == record.thread_id && h.sentence_id == record.sentence_id
                });
                if !exists {
                    data.highlights.push(record);
                }
                Ok(())
            })
        })
        .await
    }

    async fn delete_highlight(&self, thread_id: &str, sentence_id: &str) -> Result<()> {
        let (thread_id, sentence_id) = (thread_id.to_string(), sentence_id.to_string());
        self.with_file(move |file| {
            file.update(AnnotationsFileV1::default(), |data| {
                data.highlights
                    .retain(|h| !(h.thread_id == thread_id && h.sentence_id == sentence_id));
                Ok(())
            })
        })
        .await
    }

    async fn list_memos(&self) -> Result<Vec<MemoRecord>> {
        Ok(self.read_all().await?.memos)
    }

    async fn list_highlights(&self) -> Result<Vec<HighlightRecord>> {
        Ok(self.read_all().await?.highlights)
    }

    async fn fetch_thread_annotations(&self, thread_id: &str) -> Result<ThreadAnnotations> {
        let data = self.read_all().await?;
        let mut snapshot = ThreadAnnotations::new();
        for memo in data.memos.into_iter().filter(|m| m.thread_id == thread_id) {
            snapshot.memos.insert(memo.sentence_id, memo.content);
        }
        for highlight in data.highlights.into_iter().filter(|h| h.thread_id == thread_id) {
            snapshot.highlighted.insert(highlight.sentence_id);
        }
        Ok(snapshot)
    }
}
