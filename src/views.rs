//! View models for the home, results and comparison screens.
//!
//! These hold everything a renderer needs and drive the backend calls for
//! one user action at a time. The web UI and the CLI both render from them.

use crate::client::BackendClient;
use crate::error::{Action, AppError, Result, validate_idea};
use crate::highlight::{Segment, highlight};
use crate::model::{ComparisonResult, SearchResult};
use crate::session::SessionContext;
use crate::sort::{SortKey, sort_results};
use std::future::Future;
use tracing::{info, warn};

pub const NO_RESULTS_NOTICE: &str =
    "No similar papers found. Your research idea appears to be unique!";

/// Progress of one asynchronous user action.
#[derive(Debug)]
pub enum ActionState<T> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(AppError),
}

impl<T> Default for ActionState<T> {
    fn default() -> Self {
        ActionState::Idle
    }
}

impl<T> ActionState<T> {
    /// Moves to `Pending`, awaits `task`, then records its outcome.
    pub async fn run<F>(&mut self, task: F) -> &Self
    where
        F: Future<Output = Result<T>>,
    {
        *self = ActionState::Pending;
        *self = match task.await {
            Ok(value) => ActionState::Succeeded(value),
            Err(err) => ActionState::Failed(err),
        };
        self
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ActionState::Pending)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ActionState::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            ActionState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            ActionState::Succeeded(value) => Some(value),
            _ => None,
        }
    }
}

/// What a view wants the shell to do when it is entered.
#[derive(Debug)]
pub enum ViewOutcome<T> {
    Render(T),
    RedirectHome,
}

#[derive(Debug, Default)]
pub struct HomeView {
    idea: String,
    submission: ActionState<SessionContext>,
}

impl HomeView {
    pub fn with_idea(idea: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            submission: ActionState::Idle,
        }
    }

    pub fn idea(&self) -> &str {
        &self.idea
    }

    pub fn submission(&self) -> &ActionState<SessionContext> {
        &self.submission
    }

    pub fn error_message(&self) -> Option<String> {
        self.submission.error().map(AppError::user_message)
    }

    /// Validates the idea and, if it passes, runs the search.
    ///
    /// Short ideas fail without touching the network.
    pub async fn submit(&mut self, client: &BackendClient) -> &ActionState<SessionContext> {
        if let Err(err) = validate_idea(&self.idea) {
            self.submission = ActionState::Failed(err);
            return &self.submission;
        }
        let idea = self.idea.clone();
        self.submission
            .run(async move {
                let results = client
                    .search(&idea)
                    .await
                    .map_err(|err| AppError::network(Action::Search, err))?;
                info!(results = results.len(), "search completed");
                Ok(SessionContext::new(idea, results))
            })
            .await
    }

    pub fn into_session(self) -> Option<SessionContext> {
        self.submission.into_value()
    }
}

#[derive(Debug, Clone)]
pub struct ResultsView {
    query_preview: String,
    sort: SortKey,
    results: Vec<SearchResult>,
}

impl ResultsView {
    pub fn from_session(session: Option<&SessionContext>, sort: SortKey) -> ViewOutcome<Self> {
        match session {
            Some(session) => ViewOutcome::Render(Self {
                query_preview: session.query_preview(),
                sort,
                results: sort_results(session.results(), sort),
            }),
            None => ViewOutcome::RedirectHome,
        }
    }

    pub fn query_preview(&self) -> &str {
        &self.query_preview
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn count(&self) -> usize {
        self.results.len()
    }

    pub fn empty_notice(&self) -> Option<&'static str> {
        self.results.is_empty().then_some(NO_RESULTS_NOTICE)
    }
}

/// Highlighted segments for both sides of a comparison.
#[derive(Debug)]
pub struct ComparisonSides<'a> {
    pub query: Vec<Segment<'a>>,
    pub paper: Vec<Segment<'a>>,
}

#[derive(Debug)]
pub struct ComparisonView {
    query: String,
    paper: SearchResult,
    comparison: ActionState<ComparisonResult>,
}

impl ComparisonView {
    /// Resolves `paper_id` against the session and fetches its highlights.
    ///
    /// A missing session redirects home and an unknown id is a
    /// [`AppError::NotFound`]. A failed comparison call still yields a view,
    /// carrying the error so both texts can be shown unhighlighted.
    pub async fn load(
        session: Option<&SessionContext>,
        client: &BackendClient,
        paper_id: &str,
    ) -> Result<ViewOutcome<Self>> {
        let Some(session) = session else {
            return Ok(ViewOutcome::RedirectHome);
        };
        let paper = session.find_paper(paper_id)?.clone();
        let mut view = Self {
            query: session.query().to_string(),
            paper,
            comparison: ActionState::Idle,
        };
        let (query, abstract_text) = (view.query.clone(), view.paper.abstract_text.clone());
        view.comparison
            .run(async move {
                client
                    .compare(&query, &abstract_text)
                    .await
                    .map_err(|err| AppError::network(Action::Compare, err))
            })
            .await;
        if let Some(err) = view.comparison.error() {
            warn!(paper = %paper_id, error = %err, "comparison failed");
        }
        Ok(ViewOutcome::Render(view))
    }

    pub fn from_parts(query: String, paper: SearchResult, comparison: ComparisonResult) -> Self {
        Self {
            query,
            paper,
            comparison: ActionState::Succeeded(comparison),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn paper(&self) -> &SearchResult {
        &self.paper
    }

    pub fn comparison(&self) -> &ActionState<ComparisonResult> {
        &self.comparison
    }

    pub fn error_message(&self) -> Option<String> {
        self.comparison.error().map(AppError::user_message)
    }

    /// Highlights both texts. Without comparison data both sides are plain.
    pub fn sides(&self) -> Result<ComparisonSides<'_>> {
        let (user_spans, paper_spans) = match self.comparison.value() {
            Some(comparison) => (
                comparison.user_highlights.as_slice(),
                comparison.paper_highlights.as_slice(),
            ),
            None => (&[][..], &[][..]),
        };
        Ok(ComparisonSides {
            query: highlight(&self.query, user_spans)?,
            paper: highlight(&self.paper.abstract_text, paper_spans)?,
        })
    }

    /// Like [`ComparisonView::sides`], but falls back to plain text when the
    /// spans do not fit, returning the error for display.
    pub fn sides_or_plain(&self) -> (ComparisonSides<'_>, Option<AppError>) {
        match self.sides() {
            Ok(sides) => (sides, None),
            Err(err) => {
                warn!(paper = %self.paper.id, error = %err, "discarding invalid highlights");
                let sides = ComparisonSides {
                    query: vec![Segment::plain(&self.query)],
                    paper: vec![Segment::plain(&self.paper.abstract_text)],
                };
                (sides, Some(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::highlight::Span;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    const IDEA: &str = "Detecting overlapping research ideas with hybrid retrieval";

    async fn spawn_backend(router: Router) -> BackendClient {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        BackendClient::new(&ClientConfig {
            base_url: format!("http://{addr}"),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    fn paper(id: &str, year: &str, score: f64) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            title: format!("Paper {id}"),
            authors: vec!["Grace Hopper".to_string()],
            year: year.to_string(),
            abstract_text: "Hybrid retrieval finds overlapping ideas.".to_string(),
            similarity_score: score,
            url: None,
        }
    }

    fn paper_json() -> Value {
        json!({
            "id": "p1",
            "title": "Hybrid Retrieval",
            "authors": ["Grace Hopper"],
            "year": "2023",
            "abstract": "Hybrid retrieval finds overlapping ideas.",
            "similarityScore": 0.83,
            "url": "https://arxiv.org/abs/p1"
        })
    }

    #[tokio::test]
    async fn short_idea_skips_the_network() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/search",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "results": [] }))
                }
            }),
        );
        let client = spawn_backend(router).await;
        let mut view = HomeView::with_idea("tiny");
        view.submit(&client).await;
        assert!(matches!(
            view.submission().error(),
            Some(AppError::Validation(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_search_creates_session() {
        let router = Router::new().route(
            "/search",
            post(|| async { Json(json!({ "results": [paper_json()] })) }),
        );
        let client = spawn_backend(router).await;
        let mut view = HomeView::with_idea(IDEA);
        view.submit(&client).await;
        let session = view.into_session().expect("session created");
        assert_eq!(session.query(), IDEA);
        assert_eq!(session.results().len(), 1);
    }

    #[tokio::test]
    async fn failed_search_reports_network_error() {
        let router = Router::new().route(
            "/search",
            post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let client = spawn_backend(router).await;
        let mut view = HomeView::with_idea(IDEA);
        view.submit(&client).await;
        assert_eq!(
            view.error_message().as_deref(),
            Some("Error searching for similar papers. Please try again.")
        );
    }

    #[test]
    fn results_view_requires_session() {
        assert!(matches!(
            ResultsView::from_session(None, SortKey::Relevance),
            ViewOutcome::RedirectHome
        ));
    }

    #[test]
    fn results_view_sorts_and_reports_empty() {
        let session = SessionContext::new(
            IDEA,
            vec![paper("a", "2020", 0.5), paper("b", "2023", 0.9)],
        );
        let ViewOutcome::Render(view) = ResultsView::from_session(Some(&session), SortKey::Year)
        else {
            panic!("expected a rendered view");
        };
        assert_eq!(view.results()[0].id, "b");
        assert_eq!(view.count(), 2);
        assert!(view.empty_notice().is_none());

        let empty = SessionContext::new(IDEA, Vec::new());
        let ViewOutcome::Render(view) = ResultsView::from_session(Some(&empty), SortKey::Relevance)
        else {
            panic!("expected a rendered view");
        };
        assert_eq!(view.empty_notice(), Some(NO_RESULTS_NOTICE));
    }

    #[tokio::test]
    async fn comparison_highlights_both_sides() {
        let router = Router::new().route(
            "/compare",
            post(|| async {
                Json(json!({
                    "userHighlights": [{"start": 42, "end": 48, "category": "concept"}],
                    "paperHighlights": [{"start": 0, "end": 6, "category": "concept"}]
                }))
            }),
        );
        let client = spawn_backend(router).await;
        let session = SessionContext::new(IDEA, vec![paper("p1", "2023", 0.8)]);
        let ViewOutcome::Render(view) = ComparisonView::load(Some(&session), &client, "p1")
            .await
            .unwrap()
        else {
            panic!("expected a rendered view");
        };
        let sides = view.sides().unwrap();
        assert_eq!(sides.query[1], Segment::highlighted("hybrid", "concept"));
        assert_eq!(sides.paper[0], Segment::highlighted("Hybrid", "concept"));
        assert!(view.error_message().is_none());
    }

    #[tokio::test]
    async fn comparison_with_unknown_paper_is_not_found() {
        let client = spawn_backend(Router::new()).await;
        let session = SessionContext::new(IDEA, vec![paper("p1", "2023", 0.8)]);
        let err = ComparisonView::load(Some(&session), &client, "missing")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Paper not found");
    }

    #[tokio::test]
    async fn comparison_failure_keeps_plain_texts() {
        let router = Router::new().route(
            "/compare",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let client = spawn_backend(router).await;
        let session = SessionContext::new(IDEA, vec![paper("p1", "2023", 0.8)]);
        let ViewOutcome::Render(view) = ComparisonView::load(Some(&session), &client, "p1")
            .await
            .unwrap()
        else {
            panic!("expected a rendered view");
        };
        assert_eq!(
            view.error_message().as_deref(),
            Some("Error loading comparison data")
        );
        let sides = view.sides().unwrap();
        assert_eq!(sides.query, vec![Segment::plain(IDEA)]);
    }

    #[test]
    fn invalid_spans_fall_back_to_plain() {
        let comparison = ComparisonResult {
            user_highlights: vec![Span::new(0, 999)],
            paper_highlights: Vec::new(),
        };
        let view = ComparisonView::from_parts(IDEA.to_string(), paper("p1", "2023", 0.8), comparison);
        assert!(matches!(view.sides(), Err(AppError::InvalidSpan(_))));
        let (sides, err) = view.sides_or_plain();
        assert!(err.is_some());
        assert_eq!(sides.query, vec![Segment::plain(IDEA)]);
    }
}
