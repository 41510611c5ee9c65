use crate::dto::AnnotationsFileV1;
use async_trait::async_trait;
use marginalia_core::Result;
use marginalia_core::annotation::{
    AnnotationService, HighlightRecord, MemoRecord, MemoWrite, ThreadAnnotations,
};
use marginalia_core::thread::ThreadType;
use tokio::sync::RwLock;

/// Annotation backend held in memory. Same semantics as the TOML service.
#[derive(Default)]
pub struct InMemoryAnnotationService {
    data: RwLock<AnnotationsFileV1>,
}

impl InMemoryAnnotationService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnnotationService for InMemoryAnnotationService {
    async fn upsert_memo(&self, memo: MemoWrite) -> Result<MemoRecord> {
        let record = memo.into_record();
        let mut data = self.data.write().await;
        data.memos
            .retain(|m| !(m.thread_id == record.thread_id && m.sentence_id == record.sentence_id));
        data.memos.push(record.clone());
        Ok(record)
    }

    async fn delete_memo(&self, thread_id: &str, sentence_id: &str) -> Result<()> {
        let mut data = self.data.write().await;
        data.memos
            .retain(|m| !(m.thread_id == thread_id && m.sentence_id == sentence_id));
        Ok(())
    }

    async fn create_highlight(
        &self,
        thread_id: &str,
        thread_type: ThreadType,
        sentence_id: &str,
    ) -> Result<()> {
        let mut data = self.data.write().await;
        let exists = data
            .highlights
            .iter()
            .any(|h| h.thread_id == thread_id && h.sentence_id == sentence_id);
        if !exists {
            data.highlights.push(HighlightRecord {
                thread_id: thread_id.to_string(),
                thread_type,
                sentence_id: sentence_id.to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
            });
        }
        Ok(())
    }

    async fn delete_highlight(&self, thread_id: &str, sentence_id: &str) -> Result<()> {
        let mut data = self.data.write().await;
        data.highlights
            .retain(|h| !(h.thread_id == thread_id && h.sentence_id == sentence_id));
        Ok(())
    }

    async fn list_memos(&self) -> Result<Vec<MemoRecord>> {
        Ok(self.data.read().await.memos.clone())
    }

    async fn list_highlights(&self) -> Result<Vec<HighlightRecord>> {
        Ok(self.data.read().await.highlights.clone())
    }

    async fn fetch_thread_annotations(&self, thread_id: &str) -> Result<ThreadAnnotations> {
        let data = self.data.read().await;
        Ok(ThreadAnnotations {
            memos: data
                .memos
                .iter()
                .filter(|m| m.thread_id == thread_id)
                .map(|m| (m.sentence_id.clone(), m.content.clone()))
                .collect(),
            highlighted: data
                .highlights
                .iter()
                .filter(|h| h.thread_id == thread_id)
                .map(|h| h.sentence_id.clone())
                .collect(),
        })
    }
}
