//! Infrastructure layer for Marginalia.
//!
//! File-backed and in-memory implementations of the service traits defined
//! in `marginalia-core`, plus configuration and path management.

pub mod config_service;
pub mod dto;
pub mod history;
pub mod memory;
pub mod paths;
pub mod session_slot;
pub mod storage;
pub mod toml_annotation_service;
pub mod toml_vault_service;

pub use crate::config_service::ConfigService;
pub use crate::history::InMemoryHistory;
pub use crate::memory::{
    InMemoryAnnotationService, InMemoryPersonaRepository, InMemoryThreadService,
    InMemoryVaultService,
};
pub use crate::session_slot::MemorySessionSlot;
pub use crate::toml_annotation_service::TomlAnnotationService;
pub use crate::toml_vault_service::TomlVaultService;
