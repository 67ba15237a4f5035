//! Presentation layer for research-idea similarity search.
//!
//! The backend does the embedding, scoring and span detection; this crate
//! calls it, keeps the per-session query and results, and renders results
//! and side-by-side comparisons with the overlapping spans highlighted.

pub mod client;
pub mod error;
pub mod highlight;
pub mod model;
pub mod session;
pub mod sort;
pub mod style;
pub mod views;

#[cfg(feature = "web")]
pub mod web;

pub use client::{BackendClient, ClientConfig, ClientError};
pub use error::{AppError, Result};
pub use highlight::{DEFAULT_CATEGORY, InvalidSpanError, Segment, Span, highlight};
pub use model::{ComparisonResult, SearchResult, SimilarityBand};
pub use session::{SessionContext, SessionStore};
pub use sort::{SortKey, sort_results};
pub use style::{HighlightPalette, StyledSegment};
