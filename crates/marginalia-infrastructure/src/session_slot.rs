//! Process-local session slot.

use marginalia_core::session_slot::SessionSlot;
use std::sync::Mutex;

/// `SessionSlot` backed by a mutex-guarded option.
#[derive(Debug, Default)]
pub struct MemorySessionSlot {
    value: Mutex<Option<String>>,
}

impl MemorySessionSlot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionSlot for MemorySessionSlot {
    fn put(&self, value: String) {
        match self.value.lock() {
            Ok(mut slot) => *slot = Some(value),
            Err(poisoned) => *poisoned.into_inner() = Some(value),
        }
    }

    fn take(&self) -> Option<String> {
        match self.value.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}
