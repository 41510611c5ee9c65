//! In-memory service implementations.

mod annotation_service;
mod persona_repository;
mod thread_service;
mod vault_service;

pub use annotation_service::InMemoryAnnotationService;
pub use persona_repository::InMemoryPersonaRepository;
pub use thread_service::InMemoryThreadService;
pub use vault_service::InMemoryVaultService;
