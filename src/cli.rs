use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use atty::Stream;
use clap::{ArgAction, Parser, Subcommand};
use researchy::client::{BackendClient, ClientConfig, DEFAULT_BACKEND_URL};
use researchy::model::DEFAULT_TOP_K;
use researchy::style::{DEFAULT_HIGHLIGHT_STYLE, HighlightPalette, StyleRule, parse_hex_color};
use researchy::views::{ComparisonView, HomeView, ResultsView, ViewOutcome};
use researchy::{SearchResult, SessionContext, SortKey, Span, StyledSegment, highlight};
use serde::Deserialize;
use serde_json::json;
use termimad::{CompoundStyle, rgb};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "researchy",
    about = "Find published research that overlaps with your idea",
    version
)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// Base URL of the similarity backend.
    #[arg(
        long,
        global = true,
        env = "RESEARCHY_BACKEND_URL",
        default_value = DEFAULT_BACKEND_URL
    )]
    backend_url: String,

    /// Abort backend requests after this many seconds.
    #[arg(long, global = true)]
    request_timeout_secs: Option<u64>,

    /// Highlight colour for a span category, e.g. `methodology=#90CAF9`.
    #[arg(long = "highlight-style", value_name = "CATEGORY=STYLE", global = true)]
    highlight_styles: Vec<StyleRule>,

    /// Highlight colour for categories without their own style.
    #[arg(long, global = true, default_value = DEFAULT_HIGHLIGHT_STYLE)]
    default_highlight: String,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for papers similar to a research idea.
    Search {
        /// Research idea or abstract (at least 10 characters).
        idea: String,
        /// Number of papers to request.
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
        /// Result ordering: relevance or year.
        #[arg(long, default_value_t = SortKey::Relevance)]
        sort: SortKey,
    },
    /// Search, then show the highlighted overlap with one of the results.
    Compare {
        /// Research idea or abstract (at least 10 characters).
        idea: String,
        /// Identifier of a paper from the search results.
        paper_id: String,
        /// Number of papers to request.
        #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Split text into highlighted segments from `{"text", "spans"}` JSON.
    Highlight {
        /// JSON file to read; stdin when omitted.
        file: Option<PathBuf>,
    },
    /// Run the web interface.
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: std::net::SocketAddr,
        /// Front-end styling.
        #[arg(long, value_enum, default_value_t = ThemeArg::Tailwind)]
        theme: ThemeArg,
    },
}

#[cfg(feature = "web")]
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ThemeArg {
    Tailwind,
    Bootstrap,
}

#[cfg(feature = "web")]
impl From<ThemeArg> for researchy::web::WebTheme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Tailwind => researchy::web::WebTheme::Tailwind,
            ThemeArg::Bootstrap => researchy::web::WebTheme::Bootstrap,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HighlightInput {
    text: String,
    #[serde(default)]
    spans: Vec<Span>,
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let palette = build_palette(&cli);
    let client_config = |top_k: usize| ClientConfig {
        base_url: cli.backend_url.clone(),
        timeout: cli.request_timeout_secs.map(Duration::from_secs),
        top_k,
    };

    match &cli.command {
        Command::Search { idea, top_k, sort } => {
            let client = BackendClient::new(&client_config(*top_k))?;
            handle_search(&client, idea, *sort, cli.json).await
        }
        Command::Compare {
            idea,
            paper_id,
            top_k,
        } => {
            let client = BackendClient::new(&client_config(*top_k))?;
            handle_compare(&client, &palette, idea, paper_id, cli.json).await
        }
        Command::Highlight { file } => handle_highlight(&palette, file.as_ref(), cli.json),
        #[cfg(feature = "web")]
        Command::Serve { addr, theme } => {
            let config = researchy::web::WebConfig {
                addr: *addr,
                theme: (*theme).into(),
                client: client_config(DEFAULT_TOP_K),
                palette,
            };
            researchy::web::serve(config).await?;
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn build_palette(cli: &Cli) -> HighlightPalette {
    let mut palette = HighlightPalette::default().with_default_style(&cli.default_highlight);
    for rule in &cli.highlight_styles {
        palette.insert(rule.clone());
    }
    palette
}

async fn search_session(client: &BackendClient, idea: &str) -> Result<SessionContext, Box<dyn Error>> {
    let mut view = HomeView::with_idea(idea);
    view.submit(client).await;
    if let Some(err) = view.submission().error() {
        return Err(err.user_message().into());
    }
    view.into_session()
        .ok_or_else(|| "search did not complete".into())
}

async fn handle_search(
    client: &BackendClient,
    idea: &str,
    sort: SortKey,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let session = search_session(client, idea).await?;
    let ViewOutcome::Render(view) = ResultsView::from_session(Some(&session), sort) else {
        return Err("no search session".into());
    };

    if as_json {
        let payload = json!({
            "query": session.query(),
            "sort": view.sort(),
            "results": view.results(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_results(&view);
    }
    Ok(())
}

async fn handle_compare(
    client: &BackendClient,
    palette: &HighlightPalette,
    idea: &str,
    paper_id: &str,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let session = search_session(client, idea).await?;
    let view = match ComparisonView::load(Some(&session), client, paper_id)
        .await
        .map_err(|err| err.user_message())?
    {
        ViewOutcome::Render(view) => view,
        ViewOutcome::RedirectHome => return Err("no search session".into()),
    };
    if let Some(message) = view.error_message() {
        return Err(message.into());
    }
    let sides = view.sides().map_err(|err| err.user_message())?;

    if as_json {
        let payload = json!({
            "paper": view.paper(),
            "query": sides.query,
            "abstract": sides.paper,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let paper = view.paper();
    println!(
        "{} ({}): {}% overall similarity",
        paper.title,
        paper.year,
        paper.similarity_percent()
    );
    println!("{}", paper.authors_line());
    println!("\nYour Research Idea:");
    println!("{}", render_segments(&palette.apply(&sides.query)));
    println!("\nPaper Abstract:");
    println!("{}", render_segments(&palette.apply(&sides.paper)));
    if let Some(url) = &paper.url {
        println!("\nView Full Paper: {url}");
    }
    Ok(())
}

fn handle_highlight(
    palette: &HighlightPalette,
    file: Option<&PathBuf>,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let raw = match file {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let input: HighlightInput = serde_json::from_str(&raw)?;
    let segments = highlight(&input.text, &input.spans)?;

    if as_json {
        let payload = json!({ "segments": segments });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", render_segments(&palette.apply(&segments)));
    }
    Ok(())
}

fn print_results(view: &ResultsView) {
    println!("Your research idea:\n{}\n", view.query_preview());
    if let Some(notice) = view.empty_notice() {
        println!("{notice}");
        return;
    }
    println!(
        "Similar Papers ({}), sorted by {}:",
        view.count(),
        view.sort().label()
    );
    let width = view
        .results()
        .iter()
        .map(|paper| paper.id.len())
        .max()
        .unwrap_or(2)
        .max("ID".len());
    println!("{:<width$}  {:>5}  {:<4}  {}", "ID", "SIM", "YEAR", "TITLE", width = width);
    println!("{:-<width$}  {:->5}  {:-<4}  {}", "", "", "", "-----", width = width);
    for paper in view.results() {
        print_result_row(paper, width);
    }
}

fn print_result_row(paper: &SearchResult, width: usize) {
    println!(
        "{:<width$}  {:>4}%  {:<4}  {}",
        paper.id,
        paper.similarity_percent(),
        paper.year,
        paper.title,
        width = width
    );
    println!("{:width$}  {}", "", paper.authors_line(), width = width + 13);
    println!("{:width$}  {}", "", paper.abstract_preview(), width = width + 13);
}

/// Draws highlighted segments with their background colour on a terminal,
/// or wraps them in `[[...]]` when colour is unavailable.
fn render_segments(segments: &[StyledSegment<'_>]) -> String {
    let colour = stdout_is_tty();
    segments
        .iter()
        .map(|segment| match segment.style {
            None => segment.text.to_string(),
            Some(style) => match parse_hex_color(style).filter(|_| colour) {
                Some((r, g, b)) => {
                    let mut compound = CompoundStyle::with_bg(rgb(r, g, b));
                    compound.set_fg(rgb(0, 0, 0));
                    compound.apply_to(segment.text).to_string()
                }
                None => format!("[[{}]]", segment.text),
            },
        })
        .collect()
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}
