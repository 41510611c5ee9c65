//! Application layer for Marginalia.
//!
//! Coordinates the domain services into the behaviour of a thread reader:
//! optimistic annotation state, thread id resolution, history-synchronized
//! navigation and sentence actions.

pub mod action_dispatcher;
pub mod annotation_store;
mod deadline;
pub mod navigation;
pub mod notification;
pub mod reader_usecase;
pub mod thread_resolver;

pub use action_dispatcher::{ActionDispatcher, ActionOutcome, ThreadContext};
pub use annotation_store::AnnotationStore;
pub use navigation::{NavigationCoordinator, Restoration};
pub use notification::{Notification, NotificationLevel, NotificationSender};
pub use reader_usecase::{PopView, ReaderServices, ReaderUseCase};
pub use thread_resolver::{ResolutionPath, ResolvedThread, ThreadIndex, ThreadResolver};
