//! Session-scoped hand-off slot.

/// A single string slot that survives one navigation.
///
/// One view writes a "pre-fill this input" value, the next view takes it,
/// and taking clears it.
pub trait SessionSlot: Send + Sync {
    /// Stores a value, replacing any value not yet taken.
    fn put(&self, value: String);

    /// Returns the stored value and clears the slot.
    fn take(&self) -> Option<String>;
}
