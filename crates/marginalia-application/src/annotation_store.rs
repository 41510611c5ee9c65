//! Optimistic, thread-partitioned annotation state.
//!
//! Every mutation is applied locally first so the view can render it
//! immediately, then written through the `AnnotationService`. Recovery
//! depends on the operation:
//!
//! - memo writes reload the thread's authoritative snapshot on failure
//! - highlight toggles revert the single membership change on failure
//! - memo deletes are fire-and-forget
//!
//! State is keyed by thread id, so a write that resolves after the user has
//! switched threads only ever touches its own thread's partition.

use crate::deadline::bounded;
use crate::notification::{Notification, NotificationSender, notify};
use marginalia_core::annotation::{AnnotationService, MemoWrite, ThreadAnnotations};
use marginalia_core::config::AppConfig;
use marginalia_core::thread::ThreadType;
use marginalia_core::{MarginaliaError, Result};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;

type GateKey = (String, String);

pub struct AnnotationStore {
    service: Arc<dyn AnnotationService>,
    /// thread id -> memos and highlights
    state: Arc<RwLock<HashMap<String, ThreadAnnotations>>>,
    /// Per-(thread, sentence) ticket queues ordering highlight writes.
    highlight_turns: Mutex<HashMap<GateKey, Turnstile>>,
    timeout: Duration,
    notifier: Option<NotificationSender>,
}

impl AnnotationStore {
    pub fn new(service: Arc<dyn AnnotationService>, config: &AppConfig) -> Self {
        Self {
            service,
            state: Arc::new(RwLock::new(HashMap::new())),
            highlight_turns: Mutex::new(HashMap::new()),
            timeout: config.persistence_timeout(),
            notifier: None,
        }
    }

    /// Routes failure toasts to the given channel.
    pub fn with_notifier(mut self, notifier: NotificationSender) -> Self {
        self.notifier = Some(notifier);
        self
    }

    // ============================================================================
    // Reads
    // ============================================================================

    pub async fn memo(&self, thread_id: &str, sentence_id: &str) -> Option<String> {
        let state = self.state.read().await;
        state
            .get(thread_id)
            .and_then(|annotations| annotations.memos.get(sentence_id).cloned())
    }

    pub async fn is_highlighted(&self, thread_id: &str, sentence_id: &str) -> bool {
        let state = self.state.read().await;
        state
            .get(thread_id)
            .is_some_and(|annotations| annotations.highlighted.contains(sentence_id))
    }

    /// Local state of a thread, empty when nothing is cached.
    pub async fn snapshot(&self, thread_id: &str) -> ThreadAnnotations {
        self.cached(thread_id).await.unwrap_or_default()
    }

    /// Local state of a thread, or `None` if it was never loaded or touched.
    pub async fn cached(&self, thread_id: &str) -> Option<ThreadAnnotations> {
        self.state.read().await.get(thread_id).cloned()
    }

    // ============================================================================
    // Loading
    // ============================================================================

    /// Replaces the thread's local state with the authoritative snapshot.
    pub async fn load_thread_sentence_data(&self, thread_id: &str) -> Result<ThreadAnnotations> {
        let snapshot = self
            .persist(
                "fetch thread annotations",
                self.service.fetch_thread_annotations(thread_id),
            )
            .await?;

        tracing::debug!(
            "[AnnotationStore] Loaded {} memos and {} highlights for thread {}",
            snapshot.memos.len(),
            snapshot.highlighted.len(),
            thread_id
        );

        let mut state = self.state.write().await;
        state.insert(thread_id.to_string(), snapshot.clone());
        Ok(snapshot)
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Sets a memo optimistically.
    ///
    /// On a failed write the thread is reloaded from the service and the
    /// error is returned so an open editor can stay open.
    pub async fn set_memo(
        &self,
        thread_id: &str,
        thread_type: ThreadType,
        sentence_id: &str,
        text: &str,
        sentence_content: &str,
    ) -> Result<()> {
        if text.trim().is_empty() {
            return Err(MarginaliaError::validation("Memo text must not be empty"));
        }

        {
            let mut state = self.state.write().await;
            state
                .entry(thread_id.to_string())
                .or_default()
                .memos
                .insert(sentence_id.to_string(), text.to_string());
        }

        let write = MemoWrite {
            thread_id: thread_id.to_string(),
            thread_type,
            sentence_id: sentence_id.to_string(),
            content: text.to_string(),
            sentence_content: sentence_content.to_string(),
        };

        match self.persist("save memo", self.service.upsert_memo(write)).await {
            Ok(_) => Ok(()),
            Err(err) => {
                tracing::warn!(
                    "[AnnotationStore] Memo write for {} in thread {} failed: {}",
                    sentence_id,
                    thread_id,
                    err
                );
                notify(self.notifier.as_ref(), Notification::warning(err.user_message()));
                self.reload_truth(thread_id).await;
                Err(err)
            }
        }
    }

    /// Removes a memo locally and deletes it remotely in the background.
    ///
    /// The returned handle completes when the delete call settles; a failure
    /// is logged and does not restore the memo.
    pub async fn delete_memo(&self, thread_id: &str, sentence_id: &str) -> JoinHandle<()> {
        {
            let mut state = self.state.write().await;
            if let Some(annotations) = state.get_mut(thread_id) {
                annotations.memos.remove(sentence_id);
            }
        }

        let service = Arc::clone(&self.service);
        let notifier = self.notifier.clone();
        let timeout = self.timeout;
        let (thread_id, sentence_id) = (thread_id.to_string(), sentence_id.to_string());

        tokio::spawn(async move {
            let result = bounded(
                timeout,
                "delete memo",
                service.delete_memo(&thread_id, &sentence_id),
            )
            .await;

            if let Err(err) = result {
                tracing::warn!(
                    "[AnnotationStore] Memo delete for {} in thread {} failed: {}",
                    sentence_id,
                    thread_id,
                    err
                );
                notify(notifier.as_ref(), Notification::warning(err.user_message()));
            }
        })
    }

    /// Flips a sentence's highlight and returns the new local value.
    ///
    /// Writes for the same sentence reach the service in toggle order. A
    /// failed write restores the pre-toggle membership.
    pub async fn toggle_highlight(
        &self,
        sentence_id: &str,
        thread_id: &str,
        thread_type: ThreadType,
    ) -> Result<bool> {
        let key = (thread_id.to_string(), sentence_id.to_string());

        // The ticket is drawn under the state lock, so write order equals
        // the order in which targets were computed.
        let (target, turn) = {
            let mut state = self.state.write().await;
            let annotations = state.entry(thread_id.to_string()).or_default();
            let target = !annotations.highlighted.contains(sentence_id);
            set_membership(annotations, sentence_id, target);
            (target, HighlightTurn::issue(&self.highlight_turns, key))
        };

        let result = {
            turn.wait().await;
            if target {
                self.persist(
                    "create highlight",
                    self.service
                        .create_highlight(thread_id, thread_type, sentence_id),
                )
                .await
            } else {
                self.persist(
                    "delete highlight",
                    self.service.delete_highlight(thread_id, sentence_id),
                )
                .await
            }
        };
        drop(turn);

        match result {
            Ok(()) => Ok(target),
            Err(err) => {
                tracing::warn!(
                    "[AnnotationStore] Highlight write for {} in thread {} failed, reverting: {}",
                    sentence_id,
                    thread_id,
                    err
                );
                {
                    let mut state = self.state.write().await;
                    let annotations = state.entry(thread_id.to_string()).or_default();
                    set_membership(annotations, sentence_id, !target);
                }
                notify(self.notifier.as_ref(), Notification::warning(err.user_message()));
                Err(err)
            }
        }
    }

    // ============================================================================
    // Internals
    // ============================================================================

    async fn persist<T, F>(&self, operation: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        bounded(self.timeout, operation, call).await
    }

    /// Reloads a thread after a failed write.
    ///
    /// If the reload fails as well the partition is dropped, so the next view
    /// of the thread fetches it again instead of showing unconfirmed state.
    async fn reload_truth(&self, thread_id: &str) {
        if let Err(err) = self.load_thread_sentence_data(thread_id).await {
            tracing::warn!(
                "[AnnotationStore] Reload of thread {} failed, dropping local state: {}",
                thread_id,
                err
            );
            self.state.write().await.remove(thread_id);
        }
    }
}

/// FIFO ticket queue for one `(thread, sentence)` pair.
struct Turnstile {
    issued: u64,
    serving: watch::Sender<u64>,
    /// Tickets whose holder went away before being served.
    abandoned: HashSet<u64>,
}

impl Turnstile {
    fn new() -> Self {
        Self {
            issued: 0,
            serving: watch::channel(0).0,
            abandoned: HashSet::new(),
        }
    }

    fn current(&self) -> u64 {
        *self.serving.borrow()
    }

    fn advance(&mut self) {
        let mut next = self.current() + 1;
        while self.abandoned.remove(&next) {
            next += 1;
        }
        self.serving.send_replace(next);
    }
}

/// A place in a turnstile queue. Dropping it hands the turn on.
struct HighlightTurn<'a> {
    turns: &'a Mutex<HashMap<GateKey, Turnstile>>,
    key: GateKey,
    ticket: u64,
    serving: watch::Receiver<u64>,
}

impl<'a> HighlightTurn<'a> {
    fn issue(turns: &'a Mutex<HashMap<GateKey, Turnstile>>, key: GateKey) -> Self {
        let mut map = lock_turns(turns);
        let turnstile = map.entry(key.clone()).or_insert_with(Turnstile::new);
        let ticket = turnstile.issued;
        turnstile.issued += 1;
        let serving = turnstile.serving.subscribe();
        drop(map);

        Self {
            turns,
            key,
            ticket,
            serving,
        }
    }

    /// Resolves once every earlier ticket has finished or been abandoned.
    async fn wait(&self) {
        let mut serving = self.serving.clone();
        let ticket = self.ticket;
        // The sender lives in the map while this ticket is outstanding.
        let _ = serving.wait_for(|current| *current >= ticket).await;
    }
}

impl Drop for HighlightTurn<'_> {
    fn drop(&mut self) {
        let mut map = lock_turns(self.turns);
        let Some(turnstile) = map.get_mut(&self.key) else {
            return;
        };
        if turnstile.current() == self.ticket {
            turnstile.advance();
        } else {
            turnstile.abandoned.insert(self.ticket);
        }
        if turnstile.current() >= turnstile.issued {
            map.remove(&self.key);
        }
    }
}

fn lock_turns(
    turns: &Mutex<HashMap<GateKey, Turnstile>>,
) -> std::sync::MutexGuard<'_, HashMap<GateKey, Turnstile>> {
    match turns.lock() {
        Ok(map) => map,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn set_membership(annotations: &mut ThreadAnnotations, sentence_id: &str, highlighted: bool) {
    if highlighted {
        annotations.highlighted.insert(sentence_id.to_string());
    } else {
        annotations.highlighted.remove(sentence_id);
    }
}
