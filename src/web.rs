use crate::client::{BackendClient, ClientConfig, ClientError};
use crate::error::AppError;
use crate::highlight::{Segment, Span, highlight};
use crate::model::{SearchResult, SimilarityBand};
use crate::session::{SessionStore, generate_session_id, is_valid_session_id};
use crate::sort::SortKey;
use crate::style::{HighlightPalette, StyledSegment};
use crate::views::{ComparisonView, HomeView, ResultsView, ViewOutcome};
use askama::Template;
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{
        HeaderMap, StatusCode,
        header::{COOKIE, SET_COOKIE},
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use cookie::{Cookie, SameSite};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, info};

type SharedState = Arc<AppState>;
pub const SESSION_COOKIE: &str = "researchy_session";
const APP_TITLE: &str = "ReSearchy";

pub struct AppState {
    pub client: BackendClient,
    pub sessions: SessionStore,
    pub palette: HighlightPalette,
    pub theme: WebTheme,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum WebTheme {
    #[default]
    Tailwind,
    Bootstrap,
}

impl fmt::Display for WebTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebTheme::Tailwind => write!(f, "tailwind"),
            WebTheme::Bootstrap => write!(f, "bootstrap"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Chrome {
    use_tailwind: bool,
    use_bootstrap: bool,
    body_class: &'static str,
    nav_class: &'static str,
    main_class: &'static str,
    card_class: &'static str,
    headline_class: &'static str,
    lede_class: &'static str,
    button_class: &'static str,
    link_button_class: &'static str,
    input_class: &'static str,
    panel_class: &'static str,
    alert_class: &'static str,
    info_class: &'static str,
    grid_class: &'static str,
}

impl Chrome {
    fn new(theme: WebTheme) -> Self {
        match theme {
            WebTheme::Tailwind => Self {
                use_tailwind: true,
                use_bootstrap: false,
                body_class: "bg-slate-50 text-slate-900",
                nav_class: "bg-indigo-700 text-white px-6 py-3 flex items-center justify-between",
                main_class: "min-h-screen flex flex-col items-center justify-start py-10 px-4",
                card_class: "max-w-5xl w-full space-y-6 bg-white shadow rounded-lg p-8",
                headline_class: "text-3xl font-extrabold tracking-tight",
                lede_class: "text-lg text-slate-600",
                button_class: "inline-flex items-center rounded-md bg-indigo-700 px-4 py-2 text-white font-semibold shadow hover:bg-indigo-600 transition-colors",
                link_button_class: "inline-flex items-center text-indigo-700 font-semibold hover:underline",
                input_class: "w-full rounded-md border border-slate-300 p-3 focus:outline-none focus:ring-2 focus:ring-indigo-500",
                panel_class: "border border-slate-200 rounded-lg p-5 space-y-3",
                alert_class: "flex justify-between items-start rounded-md border border-red-200 bg-red-50 p-4 text-red-800",
                info_class: "rounded-md border border-sky-200 bg-sky-50 p-4 text-sky-800",
                grid_class: "grid gap-6 md:grid-cols-2",
            },
            WebTheme::Bootstrap => Self {
                use_tailwind: false,
                use_bootstrap: true,
                body_class: "bg-light text-dark",
                nav_class: "navbar navbar-dark bg-primary px-4",
                main_class: "container py-5",
                card_class: "mx-auto col-lg-10 card card-body shadow-sm",
                headline_class: "h3 fw-bold",
                lede_class: "lead mb-4",
                button_class: "btn btn-primary btn-lg px-4 py-2",
                link_button_class: "btn btn-link",
                input_class: "form-control",
                panel_class: "card card-body h-100",
                alert_class: "alert alert-danger alert-dismissible",
                info_class: "alert alert-info",
                grid_class: "row row-cols-1 row-cols-md-2 g-4",
            },
        }
    }

    fn badge_class(&self, band: SimilarityBand) -> &'static str {
        match (self.use_tailwind, band) {
            (true, SimilarityBand::High) => "rounded-full bg-red-100 px-3 py-1 text-xs font-semibold text-red-800",
            (true, SimilarityBand::Moderate) => "rounded-full bg-amber-100 px-3 py-1 text-xs font-semibold text-amber-800",
            (true, SimilarityBand::Low) => "rounded-full bg-emerald-100 px-3 py-1 text-xs font-semibold text-emerald-800",
            (false, SimilarityBand::High) => "badge text-bg-danger",
            (false, SimilarityBand::Moderate) => "badge text-bg-warning",
            (false, SimilarityBand::Low) => "badge text-bg-success",
        }
    }
}

#[derive(Clone)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub theme: WebTheme,
    pub client: ClientConfig,
    pub palette: HighlightPalette,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            theme: WebTheme::default(),
            client: ClientConfig::default(),
            palette: HighlightPalette::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend client error: {0}")]
    Client(#[from] ClientError),
}

pub async fn serve(config: WebConfig) -> Result<(), WebError> {
    let state = Arc::new(AppState {
        client: BackendClient::new(&config.client)?,
        sessions: SessionStore::default(),
        palette: config.palette.clone(),
        theme: config.theme,
    });
    let router = build_router(state);
    info!(
        %config.addr,
        theme = %config.theme,
        backend = %config.client.base_url,
        top_k = config.client.top_k,
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/search", post(submit_search))
        .route("/results", get(results_html))
        .route("/comparison/:paper_id", get(comparison_html))
        .route("/api/highlight", post(api_highlight))
        .route("/healthz", get(health))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "researchy-web" }))
}

async fn home(State(state): State<SharedState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(session_id) = session_id_from_headers(&headers) {
        if state.sessions.clear(&session_id) {
            debug!(session = %session_id, "cleared session on return home");
        }
    }
    Html(render_home(&state, "", None, None))
}

#[derive(Debug, Deserialize)]
struct SearchForm {
    #[serde(default)]
    idea: String,
}

async fn submit_search(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(form): Form<SearchForm>,
) -> Response {
    let mut view = HomeView::with_idea(form.idea);
    view.submit(&state.client).await;

    if let Some(err) = view.submission().error() {
        let (status, page) = match err {
            AppError::Validation(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                render_home(&state, view.idea(), Some(err.user_message()), None),
            ),
            _ => (
                StatusCode::BAD_GATEWAY,
                render_home(&state, view.idea(), None, Some(err.user_message())),
            ),
        };
        return (status, Html(page)).into_response();
    }
    let Some(session) = view.into_session() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(render_error_page(state.theme, "Search did not complete", "/", "Back to home")),
        )
            .into_response();
    };

    if let Some(previous) = session_id_from_headers(&headers) {
        state.sessions.clear(&previous);
    }
    let session_id = generate_session_id();
    info!(
        session = %session_id,
        results = session.results().len(),
        "stored search results"
    );
    state.sessions.put(&session_id, session);
    (
        [(SET_COOKIE, session_cookie(&session_id))],
        Redirect::to("/results"),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct ResultsParams {
    sort: Option<String>,
}

async fn results_html(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<ResultsParams>,
) -> Response {
    let sort = params
        .sort
        .as_deref()
        .and_then(|value| value.parse::<SortKey>().ok())
        .unwrap_or_default();
    let session = session_id_from_headers(&headers).and_then(|id| state.sessions.get(&id));
    match ResultsView::from_session(session.as_ref(), sort) {
        ViewOutcome::RedirectHome => Redirect::to("/").into_response(),
        ViewOutcome::Render(view) => Html(render_results(&state, &view)).into_response(),
    }
}

async fn comparison_html(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(paper_id): Path<String>,
) -> Response {
    let session = session_id_from_headers(&headers).and_then(|id| state.sessions.get(&id));
    match ComparisonView::load(session.as_ref(), &state.client, &paper_id).await {
        Ok(ViewOutcome::RedirectHome) => Redirect::to("/").into_response(),
        Ok(ViewOutcome::Render(view)) => Html(render_comparison(&state, &view)).into_response(),
        Err(err) => {
            let status = match err {
                AppError::NotFound { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let page = render_error_page(
                state.theme,
                err.user_message(),
                "/results",
                "Back to Results",
            );
            (status, Html(page)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct HighlightRequest {
    text: String,
    #[serde(default)]
    spans: Vec<Span>,
}

#[derive(Debug, Serialize)]
struct HighlightSegmentPayload<'a> {
    #[serde(flatten)]
    segment: Segment<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct HighlightResponsePayload<'a> {
    segments: Vec<HighlightSegmentPayload<'a>>,
}

async fn api_highlight(
    State(state): State<SharedState>,
    request: Result<Json<HighlightRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let segments = highlight(&request.text, &request.spans)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    let payload = HighlightResponsePayload {
        segments: segments
            .into_iter()
            .map(|segment| HighlightSegmentPayload {
                style: segment
                    .highlighted
                    .then(|| state.palette.style_for(segment.category.unwrap_or_default())),
                segment,
            })
            .collect(),
    };
    Ok(Json(payload).into_response())
}

fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|id| is_valid_session_id(id))
}

fn session_cookie(session_id: &str) -> String {
    Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
        .to_string()
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

fn comparison_path(paper_id: &str) -> String {
    format!("/comparison/{}", encode_component(paper_id))
}

struct ResultCard<'a> {
    paper: &'a SearchResult,
    percent: i64,
    badge_class: &'static str,
    authors: String,
    preview: String,
    compare_href: String,
}

struct SortOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

fn render_home(
    state: &AppState,
    idea: &str,
    error: Option<String>,
    banner: Option<String>,
) -> String {
    let template = HomeTemplate {
        chrome: Chrome::new(state.theme),
        title: APP_TITLE,
        idea,
        error,
        banner,
    };
    template
        .render()
        .unwrap_or_else(|err| render_error_page(state.theme, err.to_string(), "/", "Back to home"))
}

fn render_results(state: &AppState, view: &ResultsView) -> String {
    let chrome = Chrome::new(state.theme);
    let cards = view
        .results()
        .iter()
        .map(|paper| ResultCard {
            paper,
            percent: paper.similarity_percent(),
            badge_class: chrome.badge_class(paper.similarity_band()),
            authors: paper.authors_line(),
            preview: paper.abstract_preview(),
            compare_href: comparison_path(&paper.id),
        })
        .collect();
    let sort_options = SortKey::ALL
        .iter()
        .map(|key| SortOption {
            value: key.query_value(),
            label: key.label(),
            selected: *key == view.sort(),
        })
        .collect();
    let template = ResultsTemplate {
        chrome,
        title: APP_TITLE,
        query_preview: view.query_preview(),
        count: view.count(),
        cards,
        sort_options,
        empty_notice: view.empty_notice(),
    };
    template
        .render()
        .unwrap_or_else(|err| render_error_page(state.theme, err.to_string(), "/", "Back to home"))
}

fn render_comparison(state: &AppState, view: &ComparisonView) -> String {
    let (sides, span_error) = view.sides_or_plain();
    let banner = view
        .error_message()
        .or_else(|| span_error.map(|err| err.user_message()));
    let paper = view.paper();
    let template = ComparisonTemplate {
        chrome: Chrome::new(state.theme),
        title: APP_TITLE,
        paper,
        percent: paper.similarity_percent(),
        authors: paper.authors_line(),
        banner,
        query_segments: state.palette.apply(&sides.query),
        paper_segments: state.palette.apply(&sides.paper),
    };
    template.render().unwrap_or_else(|err| {
        render_error_page(state.theme, err.to_string(), "/results", "Back to Results")
    })
}

fn render_error_page(
    theme: WebTheme,
    message: impl Into<String>,
    back_href: &str,
    back_label: &str,
) -> String {
    let chrome = Chrome::new(theme);
    let (css_tag, js_tag) = match theme {
        WebTheme::Tailwind => (
            r#"<script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>"#,
            "",
        ),
        WebTheme::Bootstrap => (
            r#"<link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.8/dist/css/bootstrap.min.css" rel="stylesheet" integrity="sha384-sRIl4kxILFvY47J16cr9ZwB07vP4J8+LH7qKQnuqkuIAvNWLzeN8tE5YBujZqJLB" crossorigin="anonymous">"#,
            r#"<script src="https://cdn.jsdelivr.net/npm/bootstrap@5.3.8/dist/js/bootstrap.bundle.min.js" integrity="sha384-FKyoEForCGlyvwx9Hj09JcYn3nv7wiPVlz7YYwJrWVcXK/BmnVDxM+D2scQbITxI" crossorigin="anonymous"></script>"#,
        ),
    };
    let message = html_escape(&message.into());
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{app} • Error</title>
    {css_tag}
    {js_tag}
  </head>
  <body class="{body_class}">
    <main class="{main_class}">
      <div class="{card_class}">
        <div class="{alert_class}" role="alert">{message}</div>
        <a href="{back_href}" class="{link_class}">← {back_label}</a>
      </div>
    </main>
  </body>
</html>"#,
        app = APP_TITLE,
        css_tag = css_tag,
        js_tag = js_tag,
        body_class = chrome.body_class,
        main_class = chrome.main_class,
        card_class = chrome.card_class,
        alert_class = chrome.alert_class,
        link_class = chrome.link_button_class,
        message = message,
        back_href = back_href,
        back_label = back_label,
    )
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ title }} • Guarding Novelty, Guiding Ideas</title>
    {% if chrome.use_tailwind %}
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
    {% endif %}
    {% if chrome.use_bootstrap %}
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.8/dist/css/bootstrap.min.css" rel="stylesheet" integrity="sha384-sRIl4kxILFvY47J16cr9ZwB07vP4J8+LH7qKQnuqkuIAvNWLzeN8tE5YBujZqJLB" crossorigin="anonymous">
    {% endif %}
  </head>
  <body class="{{ chrome.body_class }}">
    <nav class="{{ chrome.nav_class }}">
      <a href="/" class="text-white text-decoration-none font-semibold">🔍 {{ title }}</a>
      <a href="/" class="text-white text-decoration-none">Home</a>
    </nav>
    <main class="{{ chrome.main_class }}">
      <div class="{{ chrome.card_class }}">
        {% match banner %}
        {% when Some with (message) %}
        <div class="{{ chrome.alert_class }}" role="alert">
          <span>{{ message }}</span>
          <button type="button" class="btn-close font-bold" aria-label="Dismiss" onclick="this.parentElement.remove()">×</button>
        </div>
        {% when None %}
        {% endmatch %}
        <h1 class="{{ chrome.headline_class }} text-center">{{ title }}: Guarding Novelty, Guiding Ideas</h1>
        <p class="{{ chrome.lede_class }}">
          Input your research idea or abstract below, and we'll help you discover
          potentially overlapping research, saving you time and ensuring your work is novel.
        </p>
        <form method="post" action="/search" class="space-y-3">
          <label for="idea" class="font-semibold form-label">Your Research Idea or Abstract</label>
          <textarea id="idea" name="idea" rows="8" required
            class="{{ chrome.input_class }}{% if error.is_some() %} is-invalid border-red-500{% endif %}"
            placeholder="Enter your research idea or abstract here...">{{ idea }}</textarea>
          {% match error %}
          {% when Some with (message) %}
          <p class="text-sm text-red-700 invalid-feedback d-block" role="alert">{{ message }}</p>
          {% when None %}
          {% endmatch %}
          <div class="flex justify-center d-flex justify-content-center">
            <button type="submit" class="{{ chrome.button_class }}">Find Similar Research</button>
          </div>
        </form>
      </div>
    </main>
  </body>
</html>"#,
    ext = "html"
)]
struct HomeTemplate<'a> {
    chrome: Chrome,
    title: &'a str,
    idea: &'a str,
    error: Option<String>,
    banner: Option<String>,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ title }} • Search Results</title>
    {% if chrome.use_tailwind %}
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
    {% endif %}
    {% if chrome.use_bootstrap %}
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.8/dist/css/bootstrap.min.css" rel="stylesheet" integrity="sha384-sRIl4kxILFvY47J16cr9ZwB07vP4J8+LH7qKQnuqkuIAvNWLzeN8tE5YBujZqJLB" crossorigin="anonymous">
    {% endif %}
  </head>
  <body class="{{ chrome.body_class }}">
    <nav class="{{ chrome.nav_class }}">
      <a href="/" class="text-white text-decoration-none font-semibold">🔍 {{ title }}</a>
      <a href="/" class="text-white text-decoration-none">Home</a>
    </nav>
    <main class="{{ chrome.main_class }}">
      <div class="{{ chrome.card_class }}">
        <h1 class="{{ chrome.headline_class }}">Search Results</h1>
        <section>
          <p class="font-semibold mb-1">Your research idea:</p>
          <div class="bg-slate-100 bg-body-tertiary rounded p-3 text-sm">{{ query_preview }}</div>
        </section>
        <div class="flex justify-between items-center d-flex justify-content-between align-items-center my-3">
          <h2 class="text-xl font-semibold h5 mb-0">Similar Papers ({{ count }})</h2>
          <form method="get" action="/results" class="d-flex gap-2 items-center">
            <label for="sort" class="text-sm form-label mb-0">Sort by</label>
            <select id="sort" name="sort" onchange="this.form.submit()" class="rounded border border-slate-300 px-2 py-1 form-select form-select-sm">
              {% for option in sort_options %}
              <option value="{{ option.value }}"{% if option.selected %} selected{% endif %}>{{ option.label }}</option>
              {% endfor %}
            </select>
            <noscript><button type="submit" class="{{ chrome.link_button_class }}">Apply</button></noscript>
          </form>
        </div>
        {% match empty_notice %}
        {% when Some with (notice) %}
        <div class="{{ chrome.info_class }}" role="status">{{ notice }}</div>
        {% when None %}
        <div class="{{ chrome.grid_class }}">
          {% for card in cards %}
          <article class="col">
            <div class="{{ chrome.panel_class }}">
              <div class="flex justify-between d-flex justify-content-between mb-1">
                <span class="{{ card.badge_class }}">{{ card.percent }}% similar</span>
                <span class="text-xs text-slate-500 text-muted small">{{ card.paper.year }}</span>
              </div>
              <h3 class="text-lg font-semibold h6">{{ card.paper.title }}</h3>
              <p class="text-sm text-slate-500 text-muted small">{{ card.authors }}</p>
              <p class="text-sm">{{ card.preview }}</p>
              <div class="flex gap-3 d-flex gap-3">
                <a href="{{ card.compare_href }}" class="{{ chrome.link_button_class }}">⇄ Compare</a>
                {% match card.paper.link() %}
                {% when Some with (url) %}
                <a href="{{ url }}" target="_blank" rel="noopener noreferrer" class="{{ chrome.link_button_class }}">View Paper</a>
                {% when None %}
                {% endmatch %}
              </div>
            </div>
          </article>
          {% endfor %}
        </div>
        {% endmatch %}
      </div>
    </main>
  </body>
</html>"#,
    ext = "html"
)]
struct ResultsTemplate<'a> {
    chrome: Chrome,
    title: &'a str,
    query_preview: &'a str,
    count: usize,
    cards: Vec<ResultCard<'a>>,
    sort_options: Vec<SortOption>,
    empty_notice: Option<&'static str>,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ title }} • {{ paper.title }}</title>
    {% if chrome.use_tailwind %}
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
    {% endif %}
    {% if chrome.use_bootstrap %}
    <link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.8/dist/css/bootstrap.min.css" rel="stylesheet" integrity="sha384-sRIl4kxILFvY47J16cr9ZwB07vP4J8+LH7qKQnuqkuIAvNWLzeN8tE5YBujZqJLB" crossorigin="anonymous">
    {% endif %}
  </head>
  <body class="{{ chrome.body_class }}">
    <nav class="{{ chrome.nav_class }}">
      <a href="/" class="text-white text-decoration-none font-semibold">🔍 {{ title }}</a>
      <a href="/" class="text-white text-decoration-none">Home</a>
    </nav>
    <main class="{{ chrome.main_class }}">
      <div class="{{ chrome.card_class }}">
        <a href="/results" class="{{ chrome.link_button_class }}">← Back to Results</a>
        {% match banner %}
        {% when Some with (message) %}
        <div class="{{ chrome.alert_class }}" role="alert">
          <span>{{ message }}</span>
          <button type="button" class="btn-close font-bold" aria-label="Dismiss" onclick="this.parentElement.remove()">×</button>
        </div>
        {% when None %}
        {% endmatch %}
        <h1 class="{{ chrome.headline_class }}">Content Comparison</h1>
        <div class="flex justify-center d-flex justify-content-center">
          <span class="rounded-lg bg-indigo-700 px-6 py-2 text-white text-lg font-semibold badge text-bg-primary fs-5">{{ percent }}% Overall Similarity</span>
        </div>
        <div class="{{ chrome.grid_class }}">
          <section class="col">
            <div class="{{ chrome.panel_class }}">
              <h2 class="text-lg font-semibold h5">Your Research Idea</h2>
              <hr />
              <p class="leading-relaxed">{% for segment in query_segments %}{% match segment.style %}{% when Some with (style) %}<mark class="rounded-sm" style="background-color: {{ style }}; padding: 2px 0">{{ segment.text }}</mark>{% when None %}<span>{{ segment.text }}</span>{% endmatch %}{% endfor %}</p>
            </div>
          </section>
          <section class="col">
            <div class="{{ chrome.panel_class }}">
              <h2 class="text-lg font-semibold h5">{{ paper.title }} ({{ paper.year }})</h2>
              <p class="text-sm text-slate-500 text-muted small">{{ authors }}</p>
              <hr />
              <p class="leading-relaxed">{% for segment in paper_segments %}{% match segment.style %}{% when Some with (style) %}<mark class="rounded-sm" style="background-color: {{ style }}; padding: 2px 0">{{ segment.text }}</mark>{% when None %}<span>{{ segment.text }}</span>{% endmatch %}{% endfor %}</p>
              {% match paper.link() %}
              {% when Some with (url) %}
              <a href="{{ url }}" target="_blank" rel="noopener noreferrer" class="{{ chrome.button_class }}">View Full Paper</a>
              {% when None %}
              {% endmatch %}
            </div>
          </section>
        </div>
      </div>
    </main>
  </body>
</html>"#,
    ext = "html"
)]
struct ComparisonTemplate<'a> {
    chrome: Chrome,
    title: &'a str,
    paper: &'a SearchResult,
    percent: i64,
    authors: String,
    banner: Option<String>,
    query_segments: Vec<StyledSegment<'a>>,
    paper_segments: Vec<StyledSegment<'a>>,
}
