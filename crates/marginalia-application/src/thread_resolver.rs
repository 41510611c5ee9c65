//! Locates the persona and thread that own a thread id.
//!
//! Resolution order:
//!
//! 1. `Verbalization` hint: the verbalization list, which is not persona scoped.
//! 2. `Interpretation` hint: the persona named inside the id, if it exists.
//! 3. Everything else: the global [`ThreadIndex`], first match in persona order.
//!
//! Legacy interpretation ids (`interpretation_{personaId}`) usually take path 2,
//! but resolve through path 3 when no hint is available.

use marginalia_core::persona::PersonaMap;
use marginalia_core::thread::id::interpretation_persona_candidate;
use marginalia_core::thread::{Thread, ThreadIdFormat, ThreadService, ThreadType};
use marginalia_core::{MarginaliaError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Which path found the thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPath {
    Verbalization,
    InterpretationHint,
    Index,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedThread {
    pub persona_id: String,
    pub thread: Thread,
    pub via: ResolutionPath,
}

/// Thread id -> (persona id, thread) over every persona's threads.
#[derive(Debug, Default)]
pub struct ThreadIndex {
    /// Persona ids in map order at build time.
    fingerprint: Vec<String>,
    entries: HashMap<String, (String, Thread)>,
}

impl ThreadIndex {
    /// Scans every persona in map order. On duplicate ids the first entry wins.
    pub async fn build(threads: &dyn ThreadService, personas: &PersonaMap) -> Result<Self> {
        let mut entries: HashMap<String, (String, Thread)> = HashMap::new();

        for persona_id in personas.keys() {
            for thread in threads.list_by_persona(persona_id).await? {
                if let Some((owner, _)) = entries.get(&thread.id) {
                    tracing::debug!(
                        "[ThreadResolver] Thread id {} also listed under persona {}, keeping {}",
                        thread.id,
                        persona_id,
                        owner
                    );
                    continue;
                }
                entries.insert(thread.id.clone(), (persona_id.clone(), thread));
            }
        }

        Ok(Self {
            fingerprint: fingerprint(personas),
            entries,
        })
    }

    pub fn get(&self, thread_id: &str) -> Option<&(String, Thread)> {
        self.entries.get(thread_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the index was built from the same persona set.
    pub fn matches(&self, personas: &PersonaMap) -> bool {
        self.fingerprint.len() == personas.len()
            && self.fingerprint.iter().zip(personas.keys()).all(|(a, b)| a == b)
    }
}

fn fingerprint(personas: &PersonaMap) -> Vec<String> {
    personas.keys().cloned().collect()
}

pub struct ThreadResolver {
    threads: Arc<dyn ThreadService>,
    index: RwLock<Option<ThreadIndex>>,
}

impl ThreadResolver {
    pub fn new(threads: Arc<dyn ThreadService>) -> Self {
        Self {
            threads,
            index: RwLock::new(None),
        }
    }

    /// Drops the index. The next global lookup rebuilds it.
    pub async fn invalidate(&self) {
        *self.index.write().await = None;
    }

    pub async fn resolve(
        &self,
        thread_id: &str,
        hint: Option<ThreadType>,
        personas: &PersonaMap,
    ) -> Result<ResolvedThread> {
        match hint {
            Some(ThreadType::Verbalization) => return self.resolve_verbalization(thread_id).await,
            Some(ThreadType::Interpretation) => {
                if let Some(resolved) = self.resolve_by_persona_hint(thread_id, personas).await? {
                    return Ok(resolved);
                }
            }
            _ => {}
        }

        self.resolve_from_index(thread_id, personas).await
    }

    async fn resolve_verbalization(&self, thread_id: &str) -> Result<ResolvedThread> {
        let thread = self
            .threads
            .list_verbalization_threads()
            .await?
            .into_iter()
            .find(|t| t.id == thread_id)
            .ok_or_else(|| MarginaliaError::not_found("verbalization thread", thread_id))?;

        Ok(ResolvedThread {
            persona_id: thread.persona_id.clone(),
            thread,
            via: ResolutionPath::Verbalization,
        })
    }

    async fn resolve_by_persona_hint(
        &self,
        thread_id: &str,
        personas: &PersonaMap,
    ) -> Result<Option<ResolvedThread>> {
        let Some(candidate) = interpretation_persona_candidate(thread_id) else {
            return Ok(None);
        };
        if !personas.contains_key(candidate) {
            return Ok(None);
        }

        let thread = self
            .threads
            .list_by_persona_and_type(candidate, ThreadType::Interpretation)
            .await?
            .into_iter()
            .find(|t| t.id == thread_id);

        Ok(thread.map(|thread| ResolvedThread {
            persona_id: candidate.to_string(),
            thread,
            via: ResolutionPath::InterpretationHint,
        }))
    }

    async fn resolve_from_index(
        &self,
        thread_id: &str,
        personas: &PersonaMap,
    ) -> Result<ResolvedThread> {
        let mut rebuilt = false;

        {
            let mut index = self.index.write().await;
            if !index.as_ref().is_some_and(|idx| idx.matches(personas)) {
                *index = Some(ThreadIndex::build(self.threads.as_ref(), personas).await?);
                rebuilt = true;
            }
        }

        if let Some(resolved) = self.lookup(thread_id).await {
            return Ok(resolved);
        }

        // The thread set may have changed without the persona set changing.
        if !rebuilt {
            tracing::debug!(
                "[ThreadResolver] Index miss for {}, rebuilding once",
                thread_id
            );
            let fresh = ThreadIndex::build(self.threads.as_ref(), personas).await?;
            *self.index.write().await = Some(fresh);
            if let Some(resolved) = self.lookup(thread_id).await {
                return Ok(resolved);
            }
        }

        Err(MarginaliaError::not_found("thread", thread_id))
    }

    async fn lookup(&self, thread_id: &str) -> Option<ResolvedThread> {
        let index = self.index.read().await;
        let (persona_id, thread) = index.as_ref()?.get(thread_id)?;

        if ThreadIdFormat::classify(thread_id) == ThreadIdFormat::Legacy {
            tracing::debug!(
                "[ThreadResolver] Legacy id {} resolved to persona {} by global search",
                thread_id,
                persona_id
            );
        }

        Some(ResolvedThread {
            persona_id: persona_id.clone(),
            thread: thread.clone(),
            via: ResolutionPath::Index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_core::persona::{Persona, persona_map};
    use marginalia_infrastructure::InMemoryThreadService;

    fn personas() -> PersonaMap {
        persona_map(vec![
            Persona::new("freud", "Sigmund Freud"),
            Persona::new("jung", "Carl Jung"),
        ])
    }

    fn service() -> Arc<InMemoryThreadService> {
        Arc::new(InMemoryThreadService::with_threads(vec![
            Thread::new("interpretation_freud", "freud", ThreadType::Interpretation, ""),
            Thread::new("interpretation_jung_1700000000000", "jung", ThreadType::Interpretation, ""),
            Thread::new("proceed_jung_1700000000001", "jung", ThreadType::Proceed, ""),
            Thread::new("verbalization_jung_1700000000002", "jung", ThreadType::Verbalization, ""),
        ]))
    }

    #[tokio::test]
    async fn test_legacy_id_without_hint_resolves_through_index() {
        let resolver = ThreadResolver::new(service());

        let resolved = resolver
            .resolve("interpretation_freud", None, &personas())
            .await
            .unwrap();
        assert_eq!(resolved.persona_id, "freud");
        assert_eq!(resolved.via, ResolutionPath::Index);
    }

    #[tokio::test]
    async fn test_interpretation_hint_uses_embedded_persona() {
        let resolver = ThreadResolver::new(service());

        let resolved = resolver
            .resolve(
                "interpretation_jung_1700000000000",
                Some(ThreadType::Interpretation),
                &personas(),
            )
            .await
            .unwrap();
        assert_eq!(resolved.persona_id, "jung");
        assert_eq!(resolved.via, ResolutionPath::InterpretationHint);
    }

    #[tokio::test]
    async fn test_interpretation_hint_with_unknown_persona_falls_through() {
        let threads = Arc::new(InMemoryThreadService::with_threads(vec![Thread::new(
            "interpretation_ghost",
            "jung",
            ThreadType::Interpretation,
            "",
        )]));
        let resolver = ThreadResolver::new(threads);

        let resolved = resolver
            .resolve("interpretation_ghost", Some(ThreadType::Interpretation), &personas())
            .await
            .unwrap();
        assert_eq!(resolved.persona_id, "jung");
        assert_eq!(resolved.via, ResolutionPath::Index);
    }

    #[tokio::test]
    async fn test_verbalization_is_searched_separately() {
        let resolver = ThreadResolver::new(service());

        let resolved = resolver
            .resolve(
                "verbalization_jung_1700000000002",
                Some(ThreadType::Verbalization),
                &personas(),
            )
            .await
            .unwrap();
        assert_eq!(resolved.via, ResolutionPath::Verbalization);

        // Not persona scoped, so the global search does not see it
        let err = resolver
            .resolve("verbalization_jung_1700000000002", None, &personas())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_index_is_reused_and_rebuilt_once_on_miss() {
        let threads = service();
        let resolver = ThreadResolver::new(threads.clone());
        let personas = personas();

        resolver.resolve("interpretation_freud", None, &personas).await.unwrap();
        resolver
            .resolve("proceed_jung_1700000000001", None, &personas)
            .await
            .unwrap();
        assert_eq!(threads.persona_list_calls(), 2);

        threads
            .insert(Thread::new("proceed_freud_1700000000003", "freud", ThreadType::Proceed, ""))
            .await;
        let resolved = resolver
            .resolve("proceed_freud_1700000000003", None, &personas)
            .await
            .unwrap();
        assert_eq!(resolved.persona_id, "freud");
        assert_eq!(threads.persona_list_calls(), 4);

        let err = resolver.resolve("missing", None, &personas).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_persona_change_rebuilds_index() {
        let threads = service();
        let resolver = ThreadResolver::new(threads.clone());

        let only_freud = persona_map(vec![Persona::new("freud", "Sigmund Freud")]);
        let err = resolver
            .resolve("proceed_jung_1700000000001", None, &only_freud)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let resolved = resolver
            .resolve("proceed_jung_1700000000001", None, &personas())
            .await
            .unwrap();
        assert_eq!(resolved.persona_id, "jung");
    }

    #[tokio::test]
    async fn test_first_persona_wins_on_duplicate_ids() {
        let threads = Arc::new(InMemoryThreadService::with_threads(vec![
            Thread::new("shared", "jung", ThreadType::Proceed, ""),
            Thread::new("shared", "freud", ThreadType::Proceed, ""),
        ]));
        let index = ThreadIndex::build(threads.as_ref(), &personas()).await.unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("shared").map(|(p, _)| p.as_str()), Some("freud"));
    }
}
