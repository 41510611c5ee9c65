//! Keeps the navigation state, the address bar and the history stack in sync.

use marginalia_core::navigation::{HistoryBackend, HistoryEntry, NavigationKey, NavigationState};
use marginalia_core::persona::{Persona, PersonaMap};

/// View to show after a back/forward step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restoration {
    pub state: NavigationState,
    /// Persona to activate, if the restored state names a known one.
    pub persona: Option<Persona>,
}

pub struct NavigationCoordinator<H: HistoryBackend> {
    history: H,
    state: NavigationState,
    mounted: bool,
}

impl<H: HistoryBackend> NavigationCoordinator<H> {
    pub fn new(history: H) -> Self {
        Self {
            history,
            state: NavigationState::root(),
            mounted: false,
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    /// Reads the initial address bar and replaces the initial entry.
    ///
    /// A malformed query falls back to the root view.
    pub fn mount(&mut self, personas: &PersonaMap) -> Restoration {
        let query = self.history.current_query();
        let key = NavigationKey::from_query(&query).unwrap_or_else(|err| {
            tracing::warn!(
                "[Navigation] Ignoring malformed address {:?}: {}",
                query,
                err
            );
            NavigationKey::default()
        });

        self.state = NavigationState::from_key(&key, personas);
        self.history.replace(entry_for(&self.state));
        self.mounted = true;
        self.restoration(personas)
    }

    /// Moves to `state`. Returns whether a history entry was written.
    ///
    /// Before `mount` the initial entry is replaced instead of pushed.
    pub fn navigate(&mut self, state: NavigationState) -> bool {
        if !self.mounted {
            self.state = state;
            self.history.replace(entry_for(&self.state));
            self.mounted = true;
            return true;
        }

        if state.key() == self.state.key() {
            self.state = state;
            return false;
        }

        tracing::debug!("[Navigation] Push {}", state.to_query());
        self.state = state;
        self.history.push(entry_for(&self.state));
        true
    }

    /// Overwrites the current entry with `state`, leaving the stack depth alone.
    pub fn replace(&mut self, state: NavigationState, personas: &PersonaMap) -> Restoration {
        tracing::debug!("[Navigation] Replace with {}", state.to_query());
        self.state = state;
        self.history.replace(entry_for(&self.state));
        self.mounted = true;
        self.restoration(personas)
    }

    /// Restores the state carried by a popped entry. Never writes history.
    ///
    /// A missing payload means the root view.
    pub fn on_pop(&mut self, payload: Option<&NavigationKey>, personas: &PersonaMap) -> Restoration {
        self.state = match payload {
            Some(key) => NavigationState::from_key(key, personas),
            None => NavigationState::root(),
        };
        self.restoration(personas)
    }

    /// Like [`on_pop`](Self::on_pop), falling back to the entry's query when
    /// it has no payload.
    pub fn on_pop_entry(&mut self, entry: &HistoryEntry, personas: &PersonaMap) -> Restoration {
        match &entry.payload {
            Some(key) => self.on_pop(Some(key), personas),
            None => match NavigationKey::from_query(&entry.query) {
                Ok(key) => self.on_pop(Some(&key), personas),
                Err(err) => {
                    tracing::warn!("[Navigation] Malformed history entry: {}", err);
                    self.on_pop(None, personas)
                }
            },
        }
    }

    fn restoration(&self, personas: &PersonaMap) -> Restoration {
        let persona = self
            .state
            .active_persona_id
            .as_deref()
            .and_then(|id| personas.get(id))
            .cloned();
        Restoration {
            state: self.state.clone(),
            persona,
        }
    }
}

fn entry_for(state: &NavigationState) -> HistoryEntry {
    HistoryEntry {
        payload: Some(state.key()),
        query: state.to_query(),
    }
}
