//! Persona domain module.
//!
//! Personas are administered elsewhere; this crate only needs to look them
//! up in a stable order when resolving thread ids.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A persona the user converses with.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    /// Unique identifier (slug such as `freud`, or a UUID)
    pub id: String,
    /// Display name of the persona
    pub name: String,
    /// Category the persona belongs to
    #[serde(default)]
    pub category: Option<String>,
}

impl Persona {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
        }
    }
}

/// Personas keyed by id, in display order.
///
/// Order matters: the global thread search visits personas in this order and
/// the first match wins.
pub type PersonaMap = IndexMap<String, Persona>;

/// Builds a `PersonaMap` preserving the order of `personas`.
pub fn persona_map(personas: impl IntoIterator<Item = Persona>) -> PersonaMap {
    personas.into_iter().map(|p| (p.id.clone(), p)).collect()
}

/// Read access to the persona list.
#[async_trait::async_trait]
pub trait PersonaRepository: Send + Sync {
    /// Retrieves all personas in display order.
    async fn get_all(&self) -> Result<Vec<Persona>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_map_preserves_order() {
        let map = persona_map(vec![
            Persona::new("jung", "Carl Jung"),
            Persona::new("freud", "Sigmund Freud"),
        ]);
        let ids: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["jung", "freud"]);
    }
}
