//! Sentence actions and the selection they act on.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// What to do with the selected sentences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum ActionKind {
    /// Put the sentence texts into the message input box.
    SendToInput,
    /// Save the sentences with their annotation state into the vault.
    SaveToVault,
    /// Attach one memo to the selection.
    AddMemo(String),
    /// Flip the highlight of every selected sentence.
    ToggleHighlight,
    /// Copy the sentence texts to the clipboard.
    Copy,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::SendToInput => "send_to_input",
            ActionKind::SaveToVault => "save_to_vault",
            ActionKind::AddMemo(_) => "add_memo",
            ActionKind::ToggleHighlight => "toggle_highlight",
            ActionKind::Copy => "copy",
        }
    }

    /// Whether the action talks to a persistence service.
    pub fn persists(&self) -> bool {
        matches!(
            self,
            ActionKind::SaveToVault | ActionKind::AddMemo(_) | ActionKind::ToggleHighlight
        )
    }
}

/// Sentence ids in the order the user selected them.
///
/// Selecting an already selected id deselects it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles an id. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, sentence_id: impl Into<String>) -> bool {
        let sentence_id = sentence_id.into();
        if self.ids.shift_remove(&sentence_id) {
            false
        } else {
            self.ids.insert(sentence_id);
            true
        }
    }

    pub fn contains(&self, sentence_id: &str) -> bool {
        self.ids.contains(sentence_id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    pub fn first(&self) -> Option<&str> {
        self.ids.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
