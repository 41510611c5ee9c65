//! Thread domain module.
//!
//! # Module Structure
//!
//! - `model`: `Thread`, `Message`, `MessageRole`, `ThreadType`
//! - `id`: thread id formats and the legacy-id heuristic
//! - `repository`: `ThreadService` trait for the thread backend

pub mod id;
mod model;
mod repository;

// Re-export public API
pub use id::{ThreadIdFormat, is_legacy_thread_id, new_interpretation_thread_id};
pub use model::{Message, MessageRole, Thread, ThreadType};
pub use repository::ThreadService;
