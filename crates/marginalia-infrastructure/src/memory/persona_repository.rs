use async_trait::async_trait;
use marginalia_core::Result;
use marginalia_core::persona::{Persona, PersonaRepository};
use tokio::sync::RwLock;

/// Persona list held in memory, in display order.
#[derive(Default)]
pub struct InMemoryPersonaRepository {
    personas: RwLock<Vec<Persona>>,
}

impl InMemoryPersonaRepository {
    pub fn new(personas: Vec<Persona>) -> Self {
        Self {
            personas: RwLock::new(personas),
        }
    }

    /// Replaces the whole list, as an administration screen would.
    pub async fn replace_all(&self, personas: Vec<Persona>) {
        *self.personas.write().await = personas;
    }
}

#[async_trait]
impl PersonaRepository for InMemoryPersonaRepository {
    async fn get_all(&self) -> Result<Vec<Persona>> {
        Ok(self.personas.read().await.clone())
    }
}
