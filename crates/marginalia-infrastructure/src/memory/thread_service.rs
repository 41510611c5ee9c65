use async_trait::async_trait;
use marginalia_core::thread::{Message, Thread, ThreadService, ThreadType};
use marginalia_core::{MarginaliaError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Thread backend held in memory.
///
/// Used by the CLI demo data and as the default backend in tests.
#[derive(Default)]
pub struct InMemoryThreadService {
    threads: Arc<RwLock<Vec<Thread>>>,
    persona_list_calls: AtomicUsize,
}

impl InMemoryThreadService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threads(threads: Vec<Thread>) -> Self {
        Self {
            threads: Arc::new(RwLock::new(threads)),
            persona_list_calls: AtomicUsize::new(0),
        }
    }

    /// Adds or replaces a thread with the same id.
    pub async fn insert(&self, thread: Thread) {
        let mut threads = self.threads.write().await;
        match threads.iter_mut().find(|t| t.id == thread.id) {
            Some(existing) => *existing = thread,
            None => threads.push(thread),
        }
    }

    pub async fn get(&self, thread_id: &str) -> Option<Thread> {
        let threads = self.threads.read().await;
        threads.iter().find(|t| t.id == thread_id).cloned()
    }

    /// Number of `list_by_persona` calls served so far.
    pub fn persona_list_calls(&self) -> usize {
        self.persona_list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThreadService for InMemoryThreadService {
    async fn list_by_persona(&self, persona_id: &str) -> Result<Vec<Thread>> {
        self.persona_list_calls.fetch_add(1, Ordering::SeqCst);
        let threads = self.threads.read().await;
        Ok(threads
            .iter()
            .filter(|t| t.persona_id == persona_id && t.thread_type.is_persona_scoped())
            .cloned()
            .collect())
    }

    async fn list_by_persona_and_type(
        &self,
        persona_id: &str,
        thread_type: ThreadType,
    ) -> Result<Vec<Thread>> {
        let threads = self.threads.read().await;
        Ok(threads
            .iter()
            .filter(|t| t.persona_id == persona_id && t.thread_type == thread_type)
            .cloned()
            .collect())
    }

    async fn delete(&self, thread_id: &str) -> Result<()> {
        let mut threads = self.threads.write().await;
        threads.retain(|t| t.id != thread_id);
        Ok(())
    }

    async fn edit_message(
        &self,
        thread_id: &str,
        message_index: usize,
        content: &str,
    ) -> Result<Thread> {
        let mut threads = self.threads.write().await;
        let thread = threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| MarginaliaError::not_found("thread", thread_id))?;

        let role = thread
            .messages
            .get(message_index)
            .map(|m| m.role)
            .ok_or_else(|| {
                MarginaliaError::not_found("message", format!("{thread_id}#{message_index}"))
            })?;

        thread.messages.truncate(message_index);
        thread.push_message(Message::new(role, content, chrono::Utc::now().to_rfc3339()));
        Ok(thread.clone())
    }

    async fn list_verbalization_threads(&self) -> Result<Vec<Thread>> {
        let threads = self.threads.read().await;
        Ok(threads
            .iter()
            .filter(|t| t.thread_type == ThreadType::Verbalization)
            .cloned()
            .collect())
    }

    async fn create_verbalization_thread(
        &self,
        persona_id: &str,
        content: &str,
        initial: Message,
    ) -> Result<Thread> {
        let id = format!(
            "verbalization_{}_{}",
            persona_id,
            chrono::Utc::now().timestamp_millis()
        );
        let mut thread = Thread::new(id, persona_id, ThreadType::Verbalization, content);
        thread.push_message(initial);
        self.threads.write().await.push(thread.clone());
        Ok(thread)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_core::thread::MessageRole;

    fn thread(id: &str, persona: &str, thread_type: ThreadType) -> Thread {
        Thread::new(id, persona, thread_type, "").with_messages(vec![
            Message::new(MessageRole::User, "q", "t0"),
            Message::new(MessageRole::Assistant, "a. b", "t1"),
            Message::new(MessageRole::User, "follow up", "t2"),
        ])
    }

    #[tokio::test]
    async fn test_verbalization_threads_are_not_persona_listed() {
        let service = InMemoryThreadService::with_threads(vec![
            thread("i1", "freud", ThreadType::Interpretation),
            thread("v1", "freud", ThreadType::Verbalization),
        ]);

        let listed = service.list_by_persona("freud").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "i1");
        assert_eq!(service.list_verbalization_threads().await.unwrap().len(), 1);
        assert_eq!(service.persona_list_calls(), 1);
    }

    #[tokio::test]
    async fn test_edit_message_truncates_following_messages() {
        let service =
            InMemoryThreadService::with_threads(vec![thread("p1", "freud", ThreadType::Proceed)]);

        let edited = service.edit_message("p1", 0, "better question").await.unwrap();
        assert_eq!(edited.messages.len(), 1);
        assert_eq!(edited.messages[0].content, "better question");
        assert_eq!(edited.messages[0].role, MessageRole::User);

        assert!(service.edit_message("p1", 5, "x").await.unwrap_err().is_not_found());
        assert!(service.edit_message("nope", 0, "x").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_verbalization_thread() {
        let service = InMemoryThreadService::new();
        let created = service
            .create_verbalization_thread("jung", "source", Message::user_now("start"))
            .await
            .unwrap();
        assert!(created.id.starts_with("verbalization_jung_"));
        assert_eq!(service.get(&created.id).await, Some(created));
    }
}
