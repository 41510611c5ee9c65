//! Thread service trait.
//!
//! Defines the interface to the backend that owns threads.

use super::model::{Message, Thread, ThreadType};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract service for reading and mutating threads.
///
/// Threads are generated and stored remotely; this trait decouples the
/// resolver and the use cases from the transport.
#[async_trait]
pub trait ThreadService: Send + Sync {
    /// Lists every persona-scoped thread owned by a persona.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Thread>)`: Threads in backend order (possibly empty)
    /// - `Err(MarginaliaError)`: Error if retrieval fails
    async fn list_by_persona(&self, persona_id: &str) -> Result<Vec<Thread>>;

    /// Lists the threads of one type owned by a persona.
    async fn list_by_persona_and_type(
        &self,
        persona_id: &str,
        thread_type: ThreadType,
    ) -> Result<Vec<Thread>>;

    /// Deletes a thread.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Thread deleted (or didn't exist)
    async fn delete(&self, thread_id: &str) -> Result<()>;

    /// Replaces the content of one message.
    ///
    /// Every message after `message_index` is dropped so the backend can
    /// regenerate the remainder of the thread.
    ///
    /// # Returns
    ///
    /// - `Ok(Thread)`: The updated thread
    /// - `Err(MarginaliaError::NotFound)`: Unknown thread or message index
    async fn edit_message(
        &self,
        thread_id: &str,
        message_index: usize,
        content: &str,
    ) -> Result<Thread>;

    /// Lists the verbalization threads, which are not persona-scoped.
    async fn list_verbalization_threads(&self) -> Result<Vec<Thread>>;

    /// Creates a verbalization thread seeded with an initial message.
    async fn create_verbalization_thread(
        &self,
        persona_id: &str,
        content: &str,
        initial: Message,
    ) -> Result<Thread>;
}
