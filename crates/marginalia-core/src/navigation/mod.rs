//! Navigation state and its address-bar encoding.
//!
//! The address bar carries three query parameters:
//!
//! ```text
//! ?persona=<section id>&conversation=<item id>&personaId=<active persona id>
//! ```
//!
//! History entries carry the same triple as their payload.

use serde::{Deserialize, Serialize};

use crate::error::{MarginaliaError, Result};
use crate::persona::PersonaMap;

pub const QUERY_SECTION: &str = "persona";
pub const QUERY_ITEM: &str = "conversation";
pub const QUERY_PERSONA_ID: &str = "personaId";

/// Section showing a persona's threads; the item is a thread id.
pub const SECTION_PERSONA: &str = "persona";
/// Section showing saved vault items.
pub const SECTION_VAULT: &str = "vault";

/// What the user currently has selected.
///
/// Empty `section_id`/`item_id` mean "nothing selected" at that level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub section_id: String,
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_persona_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_persona_name: Option<String>,
}

/// The part of `NavigationState` mirrored into the URL and history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationKey {
    pub section_id: String,
    pub item_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
}

impl NavigationState {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(section_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            item_id: item_id.into(),
            active_persona_id: None,
            active_persona_name: None,
        }
    }

    pub fn with_persona(mut self, persona_id: impl Into<String>, persona_name: impl Into<String>) -> Self {
        self.active_persona_id = Some(persona_id.into());
        self.active_persona_name = Some(persona_name.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.section_id.is_empty() && self.item_id.is_empty() && self.active_persona_id.is_none()
    }

    pub fn key(&self) -> NavigationKey {
        NavigationKey {
            section_id: self.section_id.clone(),
            item_id: self.item_id.clone(),
            persona_id: self.active_persona_id.clone(),
        }
    }

    /// Rebuilds a state from its key, filling the persona name from `personas`.
    ///
    /// A persona id that no longer exists is dropped.
    pub fn from_key(key: &NavigationKey, personas: &PersonaMap) -> Self {
        let persona = key.persona_id.as_deref().and_then(|id| personas.get(id));
        Self {
            section_id: key.section_id.clone(),
            item_id: key.item_id.clone(),
            active_persona_id: persona.map(|p| p.id.clone()),
            active_persona_name: persona.map(|p| p.name.clone()),
        }
    }

    /// Encodes the state as a query string without the leading `?`.
    pub fn to_query(&self) -> String {
        self.key().to_query()
    }
}

impl NavigationKey {
    pub fn to_query(&self) -> String {
        let mut pairs = Vec::new();
        if !self.section_id.is_empty() {
            pairs.push(format!("{QUERY_SECTION}={}", urlencoding::encode(&self.section_id)));
        }
        if !self.item_id.is_empty() {
            pairs.push(format!("{QUERY_ITEM}={}", urlencoding::encode(&self.item_id)));
        }
        if let Some(persona_id) = &self.persona_id {
            pairs.push(format!("{QUERY_PERSONA_ID}={}", urlencoding::encode(persona_id)));
        }
        pairs.join("&")
    }

    /// Parses a query string (with or without leading `?`).
    ///
    /// Unknown parameters are ignored. A pair without `=` or with invalid
    /// percent-encoding is a validation error.
    pub fn from_query(query: &str) -> Result<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut key = NavigationKey::default();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (name, raw) = pair.split_once('=').ok_or_else(|| {
                MarginaliaError::validation(format!("Malformed query parameter: {pair}"))
            })?;
            let value = urlencoding::decode(&raw.replace('+', " "))
                .map_err(|e| MarginaliaError::validation(format!("Malformed query value: {e}")))?
                .into_owned();

            match name {
                QUERY_SECTION => key.section_id = value,
                QUERY_ITEM => key.item_id = value,
                QUERY_PERSONA_ID if !value.is_empty() => key.persona_id = Some(value),
                _ => {}
            }
        }

        Ok(key)
    }
}

/// One entry of the history stack.
///
/// `payload` is `None` for the entry that existed before the app mounted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub payload: Option<NavigationKey>,
    pub query: String,
}

/// The browser history and address bar.
pub trait HistoryBackend: Send {
    /// Adds an entry after the current one, discarding forward entries.
    fn push(&mut self, entry: HistoryEntry);

    /// Overwrites the current entry.
    fn replace(&mut self, entry: HistoryEntry);

    /// Query string of the current entry, as shown in the address bar.
    fn current_query(&self) -> String;
}
