#![allow(dead_code)]

use async_trait::async_trait;
use marginalia_application::action_dispatcher::{Clipboard, InputSink, ManualCopy};
use marginalia_application::{NotificationSender, ReaderServices, ReaderUseCase};
use marginalia_core::annotation::{
    AnnotationService, HighlightRecord, MemoRecord, MemoWrite, ThreadAnnotations,
};
use marginalia_core::config::AppConfig;
use marginalia_core::persona::Persona;
use marginalia_core::thread::{Message, MessageRole, Thread, ThreadService, ThreadType};
use marginalia_core::{MarginaliaError, Result};
use marginalia_infrastructure::{
    InMemoryAnnotationService, InMemoryHistory, InMemoryPersonaRepository, InMemoryThreadService,
    InMemoryVaultService, MemorySessionSlot,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const TS: &str = "2024-05-01T10:00:00+00:00";

/// Annotation backend whose writes fail while `failing` is set.
#[derive(Default)]
pub struct FlakyAnnotationService {
    pub inner: InMemoryAnnotationService,
    failing: AtomicBool,
}

impl FlakyAnnotationService {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MarginaliaError::persistence("503 Service Unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl AnnotationService for FlakyAnnotationService {
    async fn upsert_memo(&self, memo: MemoWrite) -> Result<MemoRecord> {
        self.check()?;
        self.inner.upsert_memo(memo).await
    }

    async fn delete_memo(&self, thread_id: &str, sentence_id: &str) -> Result<()> {
        self.check()?;
        self.inner.delete_memo(thread_id, sentence_id).await
    }

    async fn create_highlight(
        &self,
        thread_id: &str,
        thread_type: ThreadType,
        sentence_id: &str,
    ) -> Result<()> {
        self.check()?;
        self.inner
            .create_highlight(thread_id, thread_type, sentence_id)
            .await
    }

    async fn delete_highlight(&self, thread_id: &str, sentence_id: &str) -> Result<()> {
        self.check()?;
        self.inner.delete_highlight(thread_id, sentence_id).await
    }

    async fn list_memos(&self) -> Result<Vec<MemoRecord>> {
        self.inner.list_memos().await
    }

    async fn list_highlights(&self) -> Result<Vec<HighlightRecord>> {
        self.inner.list_highlights().await
    }

    async fn fetch_thread_annotations(&self, thread_id: &str) -> Result<ThreadAnnotations> {
        self.inner.fetch_thread_annotations(thread_id).await
    }
}

/// Thread backend that is down: every call fails with a transient error.
pub struct UnreachableThreadService;

impl UnreachableThreadService {
    fn down<T>() -> Result<T> {
        Err(MarginaliaError::persistence("503 Service Unavailable"))
    }
}

#[async_trait]
impl ThreadService for UnreachableThreadService {
    async fn list_by_persona(&self, _persona_id: &str) -> Result<Vec<Thread>> {
        Self::down()
    }

    async fn list_by_persona_and_type(
        &self,
        _persona_id: &str,
        _thread_type: ThreadType,
    ) -> Result<Vec<Thread>> {
        Self::down()
    }

    async fn delete(&self, _thread_id: &str) -> Result<()> {
        Self::down()
    }

    async fn edit_message(
        &self,
        _thread_id: &str,
        _message_index: usize,
        _content: &str,
    ) -> Result<Thread> {
        Self::down()
    }

    async fn list_verbalization_threads(&self) -> Result<Vec<Thread>> {
        Self::down()
    }

    async fn create_verbalization_thread(
        &self,
        _persona_id: &str,
        _content: &str,
        _initial: Message,
    ) -> Result<Thread> {
        Self::down()
    }
}

/// Records what the view collaborators received.
#[derive(Default)]
pub struct ViewRecorder {
    pub clipboard: Mutex<Vec<String>>,
    pub input: Mutex<Vec<String>>,
}

impl Clipboard for ViewRecorder {
    fn write_text(&self, text: &str) -> Result<()> {
        self.clipboard.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

impl ManualCopy for ViewRecorder {
    fn copy_via_selection(&self, text: &str) -> Result<()> {
        self.clipboard.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

impl InputSink for ViewRecorder {
    fn append(&self, text: &str) {
        self.input.lock().unwrap().push(text.to_string());
    }
}

pub struct Harness {
    pub reader: ReaderUseCase<InMemoryHistory>,
    pub threads: Arc<InMemoryThreadService>,
    pub annotations: Arc<FlakyAnnotationService>,
    pub vault: Arc<InMemoryVaultService>,
    pub personas: Arc<InMemoryPersonaRepository>,
    pub view: Arc<ViewRecorder>,
}

pub fn personas() -> Vec<Persona> {
    vec![
        Persona::new("freud", "Sigmund Freud"),
        Persona::new("jung", "Carl Jung"),
    ]
}

/// A thread whose assistant reply splits into three sentences.
pub fn thread(id: &str, persona_id: &str, thread_type: ThreadType) -> Thread {
    Thread::new(id, persona_id, thread_type, "").with_messages(vec![
        Message::new(MessageRole::User, "What did the dream mean?", "2024-05-01T09:59:00+00:00"),
        Message::new(
            MessageRole::Assistant,
            "The house is the self. The cellar is the unconscious. Keep writing",
            TS,
        ),
    ])
}

pub fn harness(initial_query: &str, notifier: Option<NotificationSender>) -> Harness {
    let threads = Arc::new(InMemoryThreadService::with_threads(vec![
        thread("interpretation_freud", "freud", ThreadType::Interpretation),
        thread("proceed_jung_1700000000000", "jung", ThreadType::Proceed),
        thread("verbalization_jung_1700000000001", "jung", ThreadType::Verbalization),
    ]));
    let annotations = Arc::new(FlakyAnnotationService::default());
    let vault = Arc::new(InMemoryVaultService::new());
    let personas = Arc::new(InMemoryPersonaRepository::new(personas()));
    let view = Arc::new(ViewRecorder::default());

    let services = ReaderServices {
        personas: personas.clone(),
        threads: threads.clone(),
        annotations: annotations.clone(),
        vault: vault.clone(),
        clipboard: view.clone(),
        manual_copy: view.clone(),
        input: view.clone(),
        session_slot: Arc::new(MemorySessionSlot::new()),
    };
    let reader = reader_over(services, initial_query, notifier);

    Harness {
        reader,
        threads,
        annotations,
        vault,
        personas,
        view,
    }
}

/// A reader whose thread backend is `threads` and everything else in memory.
pub fn reader_with_threads(
    initial_query: &str,
    threads: Arc<dyn ThreadService>,
    notifier: Option<NotificationSender>,
) -> ReaderUseCase<InMemoryHistory> {
    let view = Arc::new(ViewRecorder::default());
    let services = ReaderServices {
        personas: Arc::new(InMemoryPersonaRepository::new(personas())),
        threads,
        annotations: Arc::new(InMemoryAnnotationService::new()),
        vault: Arc::new(InMemoryVaultService::new()),
        clipboard: view.clone(),
        manual_copy: view.clone(),
        input: view,
        session_slot: Arc::new(MemorySessionSlot::new()),
    };
    reader_over(services, initial_query, notifier)
}

fn reader_over(
    services: ReaderServices,
    initial_query: &str,
    notifier: Option<NotificationSender>,
) -> ReaderUseCase<InMemoryHistory> {
    ReaderUseCase::new(
        services,
        InMemoryHistory::with_initial_query(initial_query),
        &AppConfig::default(),
        notifier,
    )
}
