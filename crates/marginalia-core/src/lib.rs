//! Domain layer for Marginalia.
//!
//! Contains the domain models (threads, personas, annotations, vault items,
//! navigation state), the sentence address codec, and the service traits the
//! application layer talks to.

pub mod action;
pub mod annotation;
pub mod config;
pub mod error;
pub mod navigation;
pub mod persona;
pub mod sentence;
pub mod session_slot;
pub mod thread;
pub mod vault;

// Re-export common error type
pub use error::{MarginaliaError, Result};
