//! Applies a sentence action to the current selection.

use crate::annotation_store::AnnotationStore;
use crate::deadline::bounded;
use crate::notification::{Notification, NotificationSender, notify};
use marginalia_core::action::{ActionKind, Selection};
use marginalia_core::config::AppConfig;
use marginalia_core::sentence::resolve_text;
use marginalia_core::thread::Thread;
use marginalia_core::vault::{RelatedSentence, SentenceBatch, VaultItem, VaultMemo, VaultService};
use marginalia_core::{MarginaliaError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Platform clipboard.
pub trait Clipboard: Send + Sync {
    /// Fails with `ClipboardUnavailable` when the platform refuses the write.
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Selection-based copy used when the clipboard is unavailable.
pub trait ManualCopy: Send + Sync {
    fn copy_via_selection(&self, text: &str) -> Result<()>;
}

/// The message input box of the current view.
pub trait InputSink: Send + Sync {
    fn append(&self, text: &str);
}

/// The thread an action runs against.
#[derive(Debug, Clone)]
pub struct ThreadContext {
    pub thread: Thread,
    pub persona_id: Option<String>,
}

impl ThreadContext {
    pub fn new(thread: Thread, persona_id: Option<String>) -> Self {
        Self { thread, persona_id }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPath {
    Clipboard,
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    SentToInput { sentences: usize },
    Copied { sentences: usize, via: CopyPath },
    SavedToVault(VaultItem),
    MemoSet { sentence_id: String },
    /// Grouped memo stored in the vault, addressable at `anchor`.
    GroupMemoSaved { item: VaultItem, anchor: String },
    /// `(sentence id, highlighted afterwards)` for each toggle that succeeded.
    HighlightsToggled(Vec<(String, bool)>),
}

pub struct ActionDispatcher {
    store: Arc<AnnotationStore>,
    vault: Arc<dyn VaultService>,
    clipboard: Arc<dyn Clipboard>,
    manual_copy: Arc<dyn ManualCopy>,
    input: Arc<dyn InputSink>,
    highlight_color: String,
    timeout: Duration,
    notifier: Option<NotificationSender>,
}

impl ActionDispatcher {
    pub fn new(
        store: Arc<AnnotationStore>,
        vault: Arc<dyn VaultService>,
        clipboard: Arc<dyn Clipboard>,
        manual_copy: Arc<dyn ManualCopy>,
        input: Arc<dyn InputSink>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            vault,
            clipboard,
            manual_copy,
            input,
            highlight_color: config.highlight_color.clone(),
            timeout: config.persistence_timeout(),
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: NotificationSender) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Runs `kind` on the selected sentences. The selection is cleared
    /// whatever the outcome.
    pub async fn dispatch(
        &self,
        kind: ActionKind,
        selection: &mut Selection,
        context: &ThreadContext,
    ) -> Result<ActionOutcome> {
        let ids = selection.ids();
        let result = self.run(&kind, &ids, context).await;
        selection.clear();

        if let Err(err) = &result {
            tracing::warn!(
                "[ActionDispatcher] {} on {} sentences in thread {} failed: {}",
                kind.name(),
                ids.len(),
                context.thread.id,
                err
            );
        }
        result
    }

    async fn run(
        &self,
        kind: &ActionKind,
        ids: &[String],
        context: &ThreadContext,
    ) -> Result<ActionOutcome> {
        if ids.is_empty() {
            return Err(MarginaliaError::validation("No sentences selected"));
        }

        match kind {
            ActionKind::SendToInput => {
                let texts = texts_of(&context.thread, ids)?;
                self.input.append(&texts.join("\n"));
                Ok(ActionOutcome::SentToInput {
                    sentences: texts.len(),
                })
            }
            ActionKind::Copy => {
                let texts = texts_of(&context.thread, ids)?;
                let via = self.copy(&texts.join("\n"))?;
                Ok(ActionOutcome::Copied {
                    sentences: texts.len(),
                    via,
                })
            }
            ActionKind::SaveToVault => self.save_to_vault(ids, context).await,
            ActionKind::AddMemo(text) => self.add_memo(text, ids, context).await,
            ActionKind::ToggleHighlight => self.toggle_highlights(ids, context).await,
        }
    }

    fn copy(&self, text: &str) -> Result<CopyPath> {
        match self.clipboard.write_text(text) {
            Ok(()) => Ok(CopyPath::Clipboard),
            Err(MarginaliaError::ClipboardUnavailable(reason)) => {
                tracing::debug!(
                    "[ActionDispatcher] Clipboard unavailable ({}), using manual copy",
                    reason
                );
                self.manual_copy.copy_via_selection(text)?;
                Ok(CopyPath::Manual)
            }
            Err(err) => Err(err),
        }
    }

    /// Builds the parallel arrays from local annotation state.
    ///
    /// Ids that no longer resolve to text are left out of every array.
    async fn save_to_vault(&self, ids: &[String], context: &ThreadContext) -> Result<ActionOutcome> {
        let thread = &context.thread;
        let mut batch = SentenceBatch {
            thread_id: thread.id.clone(),
            thread_type: thread.thread_type,
            persona_id: context.persona_id.clone(),
            sentence_ids: Vec::with_capacity(ids.len()),
            sentences: Vec::with_capacity(ids.len()),
            highlight_states: Vec::with_capacity(ids.len()),
            highlight_colors: Vec::with_capacity(ids.len()),
            memo_contents: Vec::with_capacity(ids.len()),
        };

        for id in ids {
            let Some(text) = resolve_text(thread, id) else {
                tracing::debug!("[ActionDispatcher] Skipping unresolvable sentence {}", id);
                continue;
            };
            let highlighted = self.store.is_highlighted(&thread.id, id).await;

            batch.sentence_ids.push(id.clone());
            batch.sentences.push(text);
            batch.highlight_states.push(highlighted);
            batch
                .highlight_colors
                .push(highlighted.then(|| self.highlight_color.clone()));
            batch.memo_contents.push(self.store.memo(&thread.id, id).await);
        }

        let item = self
            .persist_vault("save sentences to vault", self.vault.save_sentences(batch))
            .await?;
        tracing::info!(
            "[ActionDispatcher] Saved vault item {} from thread {}",
            item.id,
            thread.id
        );
        Ok(ActionOutcome::SavedToVault(item))
    }

    async fn add_memo(
        &self,
        text: &str,
        ids: &[String],
        context: &ThreadContext,
    ) -> Result<ActionOutcome> {
        let thread = &context.thread;

        if let [sentence_id] = ids {
            let content = resolve_text(thread, sentence_id).unwrap_or_default();
            self.store
                .set_memo(&thread.id, thread.thread_type, sentence_id, text, &content)
                .await?;
            return Ok(ActionOutcome::MemoSet {
                sentence_id: sentence_id.clone(),
            });
        }

        if text.trim().is_empty() {
            return Err(MarginaliaError::validation("Memo text must not be empty"));
        }

        let related_sentences: Vec<RelatedSentence> = ids
            .iter()
            .map(|id| RelatedSentence {
                sentence_id: id.clone(),
                content: resolve_text(thread, id).unwrap_or_default(),
            })
            .collect();
        let anchor = ids[0].clone();
        let anchor_content = related_sentences[0].content.clone();

        let memo = VaultMemo {
            thread_id: thread.id.clone(),
            thread_type: thread.thread_type,
            persona_id: context.persona_id.clone(),
            anchor_sentence_id: anchor.clone(),
            content: text.to_string(),
            related_sentences,
        };
        let item = self
            .persist_vault("save grouped memo", self.vault.save_memo(memo))
            .await?;

        self.store
            .set_memo(&thread.id, thread.thread_type, &anchor, text, &anchor_content)
            .await?;

        Ok(ActionOutcome::GroupMemoSaved { item, anchor })
    }

    /// Toggles every id. Keeps going after a failure and returns the first error.
    async fn toggle_highlights(
        &self,
        ids: &[String],
        context: &ThreadContext,
    ) -> Result<ActionOutcome> {
        let thread = &context.thread;
        let mut toggled = Vec::with_capacity(ids.len());
        let mut first_error = None;

        for id in ids {
            match self
                .store
                .toggle_highlight(id, &thread.id, thread.thread_type)
                .await
            {
                Ok(highlighted) => toggled.push((id.clone(), highlighted)),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(ActionOutcome::HighlightsToggled(toggled)),
        }
    }

    async fn persist_vault<F>(&self, operation: &str, call: F) -> Result<VaultItem>
    where
        F: std::future::Future<Output = Result<VaultItem>>,
    {
        let result = bounded(self.timeout, operation, call).await;
        if let Err(err) = &result {
            notify(self.notifier.as_ref(), Notification::warning(err.user_message()));
        }
        result
    }
}

/// Texts of the selected sentences that still exist in `thread`.
fn texts_of(thread: &Thread, ids: &[String]) -> Result<Vec<String>> {
    let texts: Vec<String> = ids.iter().filter_map(|id| resolve_text(thread, id)).collect();
    if texts.is_empty() {
        return Err(MarginaliaError::validation(
            "None of the selected sentences could be found",
        ));
    }
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_core::sentence::encode;
    use marginalia_core::thread::{Message, MessageRole, ThreadType};
    use marginalia_core::vault::VaultEntry;
    use marginalia_infrastructure::{InMemoryAnnotationService, InMemoryVaultService};
    use std::sync::Mutex;

    const TS: &str = "2024-05-01T10:00:00+00:00";

    #[derive(Default)]
    struct Recorder {
        clipboard_broken: bool,
        clipboard: Mutex<Vec<String>>,
        manual: Mutex<Vec<String>>,
        input: Mutex<Vec<String>>,
    }

    impl Clipboard for Recorder {
        fn write_text(&self, text: &str) -> Result<()> {
            if self.clipboard_broken {
                return Err(MarginaliaError::ClipboardUnavailable("no permission".into()));
            }
            self.clipboard.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    impl ManualCopy for Recorder {
        fn copy_via_selection(&self, text: &str) -> Result<()> {
            self.manual.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    impl InputSink for Recorder {
        fn append(&self, text: &str) {
            self.input.lock().unwrap().push(text.to_string());
        }
    }

    struct Fixture {
        dispatcher: ActionDispatcher,
        store: Arc<AnnotationStore>,
        vault: Arc<InMemoryVaultService>,
        recorder: Arc<Recorder>,
        context: ThreadContext,
    }

    fn fixture(recorder: Recorder) -> Fixture {
        let config = AppConfig::default();
        let store = Arc::new(AnnotationStore::new(
            Arc::new(InMemoryAnnotationService::new()),
            &config,
        ));
        let vault = Arc::new(InMemoryVaultService::new());
        let recorder = Arc::new(recorder);
        let dispatcher = ActionDispatcher::new(
            store.clone(),
            vault.clone(),
            recorder.clone(),
            recorder.clone(),
            recorder.clone(),
            &config,
        );
        let thread = Thread::new("proceed_freud_1700000000000", "freud", ThreadType::Proceed, "")
            .with_messages(vec![
                Message::new(MessageRole::User, "Tell me about dreams", "2024-05-01T09:59:00+00:00"),
                Message::new(MessageRole::Assistant, "text1. text2. text3", TS),
            ]);
        Fixture {
            dispatcher,
            store,
            vault,
            recorder,
            context: ThreadContext::new(thread, Some("freud".into())),
        }
    }

    fn selection(ids: &[String]) -> Selection {
        ids.iter().cloned().collect()
    }

    #[tokio::test]
    async fn test_save_to_vault_builds_parallel_arrays() {
        let f = fixture(Recorder::default());
        let (s1, s2) = (encode(TS, 1, 0), encode(TS, 1, 1));
        let thread_id = f.context.thread.id.clone();

        f.store
            .toggle_highlight(&s1, &thread_id, ThreadType::Proceed)
            .await
            .unwrap();
        f.store
            .set_memo(&thread_id, ThreadType::Proceed, &s1, "note", "text1")
            .await
            .unwrap();

        let mut sel = selection(&[s1.clone(), s2.clone()]);
        let outcome = f
            .dispatcher
            .dispatch(ActionKind::SaveToVault, &mut sel, &f.context)
            .await
            .unwrap();
        assert!(sel.is_empty());

        let ActionOutcome::SavedToVault(item) = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        let VaultEntry::Sentences(batch) = item.entry else {
            panic!("expected a sentence batch");
        };
        assert_eq!(batch.sentence_ids, vec![s1, s2]);
        assert_eq!(batch.sentences, vec!["text1", "text2"]);
        assert_eq!(batch.highlight_states, vec![true, false]);
        assert_eq!(batch.highlight_colors, vec![Some("yellow".to_string()), None]);
        assert_eq!(batch.memo_contents, vec![Some("note".to_string()), None]);
    }

    #[tokio::test]
    async fn test_grouped_memo_is_anchored_at_first_sentence() {
        let f = fixture(Recorder::default());
        let ids = vec![encode(TS, 1, 2), encode(TS, 1, 0)];
        let mut sel = selection(&ids);

        let outcome = f
            .dispatcher
            .dispatch(ActionKind::AddMemo("both matter".into()), &mut sel, &f.context)
            .await
            .unwrap();

        let ActionOutcome::GroupMemoSaved { item, anchor } = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(anchor, ids[0]);
        let VaultEntry::Memo(memo) = item.entry else {
            panic!("expected a memo");
        };
        assert_eq!(memo.related_sentences.len(), 2);
        assert_eq!(memo.related_sentences[0].content, "text3");

        let thread_id = &f.context.thread.id;
        assert_eq!(f.store.memo(thread_id, &ids[0]).await.as_deref(), Some("both matter"));
        assert!(f.store.memo(thread_id, &ids[1]).await.is_none());
        assert_eq!(f.vault.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_single_memo_goes_through_store() {
        let f = fixture(Recorder::default());
        let id = encode(TS, 1, 1);
        let mut sel = selection(std::slice::from_ref(&id));

        let outcome = f
            .dispatcher
            .dispatch(ActionKind::AddMemo("just this".into()), &mut sel, &f.context)
            .await
            .unwrap();
        assert_eq!(outcome, ActionOutcome::MemoSet { sentence_id: id.clone() });
        assert!(f.vault.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_copy_falls_back_to_manual_path() {
        let f = fixture(Recorder {
            clipboard_broken: true,
            ..Recorder::default()
        });
        let mut sel = selection(&[encode(TS, 1, 0), encode(TS, 1, 1)]);

        let outcome = f
            .dispatcher
            .dispatch(ActionKind::Copy, &mut sel, &f.context)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::Copied {
                sentences: 2,
                via: CopyPath::Manual
            }
        );
        assert_eq!(f.recorder.manual.lock().unwrap().as_slice(), ["text1\ntext2"]);
    }

    #[tokio::test]
    async fn test_send_to_input_and_toggle_all() {
        let f = fixture(Recorder::default());
        let ids = vec![encode(TS, 1, 0), encode(TS, 1, 2)];

        let mut sel = selection(&ids);
        f.dispatcher
            .dispatch(ActionKind::SendToInput, &mut sel, &f.context)
            .await
            .unwrap();
        assert_eq!(f.recorder.input.lock().unwrap().as_slice(), ["text1\ntext3"]);

        let mut sel = selection(&ids);
        let outcome = f
            .dispatcher
            .dispatch(ActionKind::ToggleHighlight, &mut sel, &f.context)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ActionOutcome::HighlightsToggled(ids.iter().map(|id| (id.clone(), true)).collect())
        );
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected() {
        let f = fixture(Recorder::default());
        let mut sel = Selection::new();
        let err = f
            .dispatcher
            .dispatch(ActionKind::Copy, &mut sel, &f.context)
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_stale_selection_writes_nothing() {
        let f = fixture(Recorder::default());
        let stale = vec![encode("2023-01-01T00:00:00+00:00", 4, 0), encode(TS, 1, 9)];

        for kind in [ActionKind::Copy, ActionKind::SendToInput] {
            let mut sel = selection(&stale);
            let err = f
                .dispatcher
                .dispatch(kind, &mut sel, &f.context)
                .await
                .unwrap_err();
            assert!(err.is_validation());
            assert!(sel.is_empty());
        }
        assert!(f.recorder.clipboard.lock().unwrap().is_empty());
        assert!(f.recorder.input.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_selection_cleared_on_failure() {
        let f = fixture(Recorder::default());
        let mut sel = selection(&[encode(TS, 1, 0), encode(TS, 1, 1)]);

        let err = f
            .dispatcher
            .dispatch(ActionKind::AddMemo("  ".into()), &mut sel, &f.context)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(sel.is_empty());
    }
}
