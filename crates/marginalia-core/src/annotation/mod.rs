//! Annotation domain module.
//!
//! - `model`: local/authoritative annotation state and persisted records
//! - `repository`: `AnnotationService` trait

mod model;
mod repository;

pub use model::{Annotation, HighlightRecord, MemoRecord, MemoWrite, ThreadAnnotations};
pub use repository::AnnotationService;
