use crate::error::{AppError, Result};
use crate::model::{QUERY_PREVIEW_CHARS, SearchResult, preview};
use lru::LruCache;
use parking_lot::Mutex;
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

pub const MAX_SESSION_COUNT: usize = 4096;
const SESSION_ID_LEN: usize = 24;

/// State carried from the home view into the results and comparison views.
///
/// Created when a search succeeds; dropped when the user goes back home.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    query: String,
    results: Vec<SearchResult>,
    created_at: u64,
}

impl SessionContext {
    pub fn new(query: impl Into<String>, results: Vec<SearchResult>) -> Self {
        Self {
            query: query.into(),
            results,
            created_at: now_ts(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_preview(&self) -> String {
        preview(&self.query, QUERY_PREVIEW_CHARS)
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Looks up a paper from the stored result list.
    pub fn find_paper(&self, paper_id: &str) -> Result<&SearchResult> {
        self.results
            .iter()
            .find(|paper| paper.id == paper_id)
            .ok_or_else(|| AppError::not_found(paper_id))
    }
}

/// Per-browser session contexts, bounded by least-recent use.
#[derive(Clone)]
pub struct SessionStore {
    shared: Arc<Mutex<LruCache<String, SessionContext>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSION_COUNT)
    }
}

impl SessionStore {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            shared: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Stores `context` for `session_id`, replacing any previous search.
    pub fn put(&self, session_id: &str, context: SessionContext) {
        let mut guard = self.shared.lock();
        if let Some((evicted, _)) = guard.push(session_id.to_string(), context) {
            if evicted != session_id {
                debug!(session = %evicted, "evicted least recently used session");
            }
        }
    }

    /// Returns a snapshot of the session and marks it as recently used.
    pub fn get(&self, session_id: &str) -> Option<SessionContext> {
        self.shared.lock().get(session_id).cloned()
    }

    pub fn clear(&self, session_id: &str) -> bool {
        self.shared.lock().pop(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn generate_session_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

/// Session ids are the alphanumeric tokens produced by [`generate_session_id`].
pub fn is_valid_session_id(value: &str) -> bool {
    value.len() == SESSION_ID_LEN && value.chars().all(|ch| ch.is_ascii_alphanumeric())
}

fn now_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(id: &str) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            title: format!("Paper {id}"),
            authors: Vec::new(),
            year: "2023".to_string(),
            abstract_text: "Abstract".to_string(),
            similarity_score: 0.5,
            url: None,
        }
    }

    #[test]
    fn find_paper_reports_missing_ids() {
        let context = SessionContext::new("a research idea", vec![paper("p1")]);
        assert_eq!(context.find_paper("p1").unwrap().id, "p1");
        let err = context.find_paper("p2").unwrap_err();
        assert!(matches!(err, AppError::NotFound { ref paper_id } if paper_id == "p2"));
    }

    #[test]
    fn query_preview_truncates_long_ideas() {
        let idea = "x".repeat(QUERY_PREVIEW_CHARS + 5);
        let context = SessionContext::new(idea, Vec::new());
        let preview = context.query_preview();
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), QUERY_PREVIEW_CHARS + 3);
    }

    #[test]
    fn put_replaces_and_clear_removes() {
        let store = SessionStore::default();
        store.put("s1", SessionContext::new("first idea here", vec![paper("a")]));
        store.put("s1", SessionContext::new("second idea here", vec![paper("b")]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("s1").unwrap().query(), "second idea here");
        assert!(store.clear("s1"));
        assert!(!store.clear("s1"));
        assert!(store.get("s1").is_none());
    }

    #[test]
    fn least_recently_used_session_is_evicted() {
        let store = SessionStore::with_capacity(2);
        store.put("old", SessionContext::new("old idea text", Vec::new()));
        store.put("mid", SessionContext::new("mid idea text", Vec::new()));
        let _ = store.get("old");
        store.put("new", SessionContext::new("new idea text", Vec::new()));
        assert!(store.get("old").is_some());
        assert!(store.get("mid").is_none());
        assert!(store.get("new").is_some());
    }

    #[test]
    fn generated_ids_are_valid() {
        let id = generate_session_id();
        assert!(is_valid_session_id(&id));
        assert_ne!(id, generate_session_id());
        assert!(!is_valid_session_id("short"));
        assert!(!is_valid_session_id("../../../../etc/passwd!!!"));
    }
}
