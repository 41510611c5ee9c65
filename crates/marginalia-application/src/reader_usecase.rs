//! Reader use case.
//!
//! `ReaderUseCase` ties the annotation store, thread resolver, navigation
//! coordinator and action dispatcher together behind the operations a thread
//! reader view needs: open a thread, move between personas and the vault,
//! restore history entries and run actions on the sentence selection.

use crate::action_dispatcher::{
    ActionDispatcher, ActionOutcome, Clipboard, InputSink, ManualCopy, ThreadContext,
};
use crate::annotation_store::AnnotationStore;
use crate::deadline::bounded;
use crate::navigation::{NavigationCoordinator, Restoration};
use crate::notification::{Notification, NotificationSender, notify};
use crate::thread_resolver::{ResolvedThread, ThreadResolver};
use marginalia_core::action::{ActionKind, Selection};
use marginalia_core::annotation::{AnnotationService, ThreadAnnotations};
use marginalia_core::config::AppConfig;
use marginalia_core::navigation::{
    HistoryBackend, HistoryEntry, NavigationState, SECTION_PERSONA, SECTION_VAULT,
};
use marginalia_core::persona::{PersonaMap, PersonaRepository, persona_map};
use marginalia_core::session_slot::SessionSlot;
use marginalia_core::thread::{Thread, ThreadService, ThreadType};
use marginalia_core::vault::{VaultItem, VaultService, items_for_thread};
use marginalia_core::{MarginaliaError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Collaborators of the reader.
pub struct ReaderServices {
    pub personas: Arc<dyn PersonaRepository>,
    pub threads: Arc<dyn ThreadService>,
    pub annotations: Arc<dyn AnnotationService>,
    pub vault: Arc<dyn VaultService>,
    pub clipboard: Arc<dyn Clipboard>,
    pub manual_copy: Arc<dyn ManualCopy>,
    pub input: Arc<dyn InputSink>,
    pub session_slot: Arc<dyn SessionSlot>,
}

/// What a back/forward step shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PopView {
    pub restoration: Restoration,
    /// Annotations of the restored item, only if already cached.
    pub annotations: Option<ThreadAnnotations>,
}

pub struct ReaderUseCase<H: HistoryBackend> {
    /// Source of the persona map
    persona_repository: Arc<dyn PersonaRepository>,
    /// Thread listing and message editing
    thread_service: Arc<dyn ThreadService>,
    /// Vault listing
    vault_service: Arc<dyn VaultService>,
    /// Optimistic annotation state, shared with the dispatcher
    store: Arc<AnnotationStore>,
    resolver: ThreadResolver,
    dispatcher: ActionDispatcher,
    navigation: Mutex<NavigationCoordinator<H>>,
    /// Personas in display order, refreshed by `refresh_personas`
    personas: RwLock<PersonaMap>,
    /// Thread currently shown, if any
    current: RwLock<Option<ThreadContext>>,
    selection: Mutex<Selection>,
    /// Hand-off value for the next view's input box
    session_slot: Arc<dyn SessionSlot>,
    timeout: Duration,
    notifier: Option<NotificationSender>,
}

impl<H: HistoryBackend> ReaderUseCase<H> {
    pub fn new(
        services: ReaderServices,
        history: H,
        config: &AppConfig,
        notifier: Option<NotificationSender>,
    ) -> Self {
        let mut store = AnnotationStore::new(services.annotations, config);
        if let Some(tx) = &notifier {
            store = store.with_notifier(tx.clone());
        }
        let store = Arc::new(store);

        let mut dispatcher = ActionDispatcher::new(
            Arc::clone(&store),
            Arc::clone(&services.vault),
            services.clipboard,
            services.manual_copy,
            services.input,
            config,
        );
        if let Some(tx) = &notifier {
            dispatcher = dispatcher.with_notifier(tx.clone());
        }

        Self {
            persona_repository: services.personas,
            resolver: ThreadResolver::new(Arc::clone(&services.threads)),
            thread_service: services.threads,
            vault_service: services.vault,
            store,
            dispatcher,
            navigation: Mutex::new(NavigationCoordinator::new(history)),
            personas: RwLock::new(PersonaMap::new()),
            current: RwLock::new(None),
            selection: Mutex::new(Selection::new()),
            session_slot: services.session_slot,
            timeout: config.persistence_timeout(),
            notifier,
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn store(&self) -> &Arc<AnnotationStore> {
        &self.store
    }

    pub async fn state(&self) -> NavigationState {
        self.navigation.lock().await.state().clone()
    }

    pub async fn personas(&self) -> PersonaMap {
        self.personas.read().await.clone()
    }

    pub async fn current_thread(&self) -> Option<Thread> {
        self.current.read().await.as_ref().map(|c| c.thread.clone())
    }

    pub async fn selection(&self) -> Vec<String> {
        self.selection.lock().await.ids()
    }

    /// Gives access to the history backend, e.g. to step back or forward.
    pub async fn with_history<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        let mut navigation = self.navigation.lock().await;
        f(navigation.history_mut())
    }

    // ============================================================================
    // Personas and mounting
    // ============================================================================

    /// Reloads the persona map. The thread index is dropped when the set changed.
    pub async fn refresh_personas(&self) -> Result<PersonaMap> {
        let fresh = persona_map(self.persona_repository.get_all().await?);
        let mut personas = self.personas.write().await;
        if !personas.keys().eq(fresh.keys()) {
            tracing::debug!(
                "[ReaderUseCase] Persona set changed ({} -> {})",
                personas.len(),
                fresh.len()
            );
            self.resolver.invalidate().await;
        }
        *personas = fresh.clone();
        Ok(fresh)
    }

    /// Loads personas and restores the view named by the address bar.
    pub async fn mount(&self) -> Result<Restoration> {
        let personas = self.refresh_personas().await?;
        let restoration = self.navigation.lock().await.mount(&personas);

        let state = &restoration.state;
        if state.section_id != SECTION_PERSONA
            || state.item_id.is_empty()
            || state.item_id.parse::<ThreadType>().is_ok()
        {
            return Ok(restoration);
        }

        match self.activate(&state.item_id, None, &personas).await {
            Ok(_) => Ok(restoration),
            Err(err) => {
                tracing::warn!(
                    "[ReaderUseCase] Could not restore thread {} on mount: {}",
                    state.item_id,
                    err
                );
                self.report_open_failure(&err);
                if !err.is_not_found() {
                    return Ok(restoration);
                }

                // Drop the dead thread id from the address bar, keep the persona
                let mut fallback = NavigationState::new(SECTION_PERSONA, "");
                if let Some(persona) = &restoration.persona {
                    fallback = fallback.with_persona(&persona.id, &persona.name);
                }
                Ok(self.navigation.lock().await.replace(fallback, &personas))
            }
        }
    }

    // ============================================================================
    // Navigation
    // ============================================================================

    /// Resolves, navigates to and loads a thread.
    ///
    /// A failed lookup is reported to the user and leaves navigation untouched.
    pub async fn open_thread(
        &self,
        thread_id: &str,
        hint: Option<ThreadType>,
    ) -> Result<ResolvedThread> {
        let personas = self.personas().await;
        let resolved = match self.activate(thread_id, hint, &personas).await {
            Ok(resolved) => resolved,
            Err(err) => {
                self.report_open_failure(&err);
                return Err(err);
            }
        };

        let mut state = NavigationState::new(SECTION_PERSONA, thread_id);
        if let Some(persona) = personas.get(&resolved.persona_id) {
            state = state.with_persona(&persona.id, &persona.name);
        }
        self.navigation.lock().await.navigate(state);

        tracing::info!(
            "[ReaderUseCase] Opened thread {} of persona {}",
            thread_id,
            resolved.persona_id
        );
        Ok(resolved)
    }

    /// Activates a persona and shows its section with nothing selected.
    pub async fn select_persona(&self, persona_id: &str) -> Result<bool> {
        let personas = self.personas.read().await;
        let persona = personas
            .get(persona_id)
            .ok_or_else(|| MarginaliaError::not_found("persona", persona_id))?;

        let state = NavigationState::new(SECTION_PERSONA, "").with_persona(&persona.id, &persona.name);
        Ok(self.navigation.lock().await.navigate(state))
    }

    /// Selects an item inside the current section.
    pub async fn select_item(&self, item_id: &str) -> bool {
        let mut navigation = self.navigation.lock().await;
        let state = NavigationState {
            item_id: item_id.to_string(),
            ..navigation.state().clone()
        };
        navigation.navigate(state)
    }

    /// Shows the vault section and returns its items.
    pub async fn open_vault(&self) -> Result<Vec<VaultItem>> {
        {
            let mut navigation = self.navigation.lock().await;
            let state = NavigationState {
                section_id: SECTION_VAULT.to_string(),
                item_id: String::new(),
                ..navigation.state().clone()
            };
            navigation.navigate(state);
        }
        bounded(self.timeout, "list vault", self.vault_service.list()).await
    }

    /// Vault items that reference the thread being shown.
    pub async fn vault_items_for_current_thread(&self) -> Result<Vec<VaultItem>> {
        let Some(thread_id) = self.current.read().await.as_ref().map(|c| c.thread.id.clone())
        else {
            return Ok(Vec::new());
        };
        let items = bounded(self.timeout, "list vault", self.vault_service.list()).await?;
        Ok(items_for_thread(&items, &thread_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Restores a popped history entry. Never writes history.
    ///
    /// Only annotation data that is already cached is returned; anything else
    /// is loaded when the thread is opened again.
    pub async fn handle_pop(&self, entry: &HistoryEntry) -> PopView {
        let personas = self.personas().await;
        let restoration = self
            .navigation
            .lock()
            .await
            .on_pop_entry(entry, &personas);

        let item_id = &restoration.state.item_id;
        let annotations = if item_id.is_empty() {
            None
        } else {
            self.store.cached(item_id).await
        };

        {
            let mut current = self.current.write().await;
            if current.as_ref().is_some_and(|c| &c.thread.id != item_id) {
                *current = None;
            }
        }
        self.selection.lock().await.clear();

        PopView {
            restoration,
            annotations,
        }
    }

    // ============================================================================
    // Selection and actions
    // ============================================================================

    pub async fn toggle_selection(&self, sentence_id: &str) -> bool {
        self.selection.lock().await.toggle(sentence_id)
    }

    /// Runs an action on the current selection of the open thread.
    pub async fn dispatch(&self, kind: ActionKind) -> Result<ActionOutcome> {
        let context = self.current.read().await.clone();
        let mut selection = self.selection.lock().await;

        let Some(context) = context else {
            selection.clear();
            return Err(MarginaliaError::validation("No thread is open"));
        };
        self.dispatcher.dispatch(kind, &mut selection, &context).await
    }

    /// Edits a message of the open thread, dropping the messages after it.
    pub async fn edit_message(&self, message_index: usize, content: &str) -> Result<Thread> {
        let mut current = self.current.write().await;
        let context = current
            .as_mut()
            .ok_or_else(|| MarginaliaError::validation("No thread is open"))?;

        let edited = self
            .thread_service
            .edit_message(&context.thread.id, message_index, content)
            .await?;
        context.thread = edited.clone();
        drop(current);

        self.resolver.invalidate().await;
        self.selection.lock().await.clear();
        if let Err(err) = self.store.load_thread_sentence_data(&edited.id).await {
            tracing::warn!(
                "[ReaderUseCase] Reload after edit of {} failed: {}",
                edited.id,
                err
            );
        }
        Ok(edited)
    }

    // ============================================================================
    // Session hand-off
    // ============================================================================

    /// Stores text for the next view's input box.
    pub fn prefill_next_view(&self, text: impl Into<String>) {
        self.session_slot.put(text.into());
    }

    /// Takes the pre-fill value, clearing it.
    pub fn take_prefill(&self) -> Option<String> {
        self.session_slot.take()
    }

    // ============================================================================
    // Internals
    // ============================================================================

    /// Unknown threads raise an alert; anything else is a retryable warning.
    fn report_open_failure(&self, err: &MarginaliaError) {
        let notification = if err.is_not_found() {
            Notification::alert(err.user_message())
        } else {
            Notification::warning(err.user_message())
        };
        notify(self.notifier.as_ref(), notification);
    }

    /// Resolves a thread, loads its annotations and makes it current.
    async fn activate(
        &self,
        thread_id: &str,
        hint: Option<ThreadType>,
        personas: &PersonaMap,
    ) -> Result<ResolvedThread> {
        let resolved = self.resolver.resolve(thread_id, hint, personas).await?;

        if let Err(err) = self.store.load_thread_sentence_data(thread_id).await {
            tracing::warn!(
                "[ReaderUseCase] Annotations of {} unavailable: {}",
                thread_id,
                err
            );
            notify(
                self.notifier.as_ref(),
                Notification::warning(err.user_message()),
            );
        }

        *self.current.write().await = Some(ThreadContext::new(
            resolved.thread.clone(),
            Some(resolved.persona_id.clone()),
        ));
        self.selection.lock().await.clear();
        Ok(resolved)
    }
}
