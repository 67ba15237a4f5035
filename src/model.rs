use crate::highlight::Span;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Number of results requested when the caller does not say otherwise.
pub const DEFAULT_TOP_K: usize = 5;
pub const QUERY_PREVIEW_CHARS: usize = 300;
pub const ABSTRACT_PREVIEW_CHARS: usize = 200;

/// A candidate paper returned by the search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(deserialize_with = "year_from_string_or_number")]
    pub year: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub similarity_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SearchResult {
    /// Numeric value of the leading digits of `year`, if any.
    pub fn year_value(&self) -> Option<i32> {
        let digits: String = self
            .year
            .trim()
            .chars()
            .take_while(|ch| ch.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    /// The paper URL, if it is an `http(s)` link safe to put in an `href`.
    pub fn link(&self) -> Option<&str> {
        let url = self.url.as_deref()?.trim();
        let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
        (lower.starts_with("http://") || lower.starts_with("https://")).then_some(url)
    }

    pub fn similarity_percent(&self) -> i64 {
        (self.similarity_score * 100.0).round() as i64
    }

    pub fn similarity_band(&self) -> SimilarityBand {
        SimilarityBand::from_score(self.similarity_score)
    }

    pub fn authors_line(&self) -> String {
        self.authors.join(", ")
    }

    pub fn abstract_preview(&self) -> String {
        preview(&self.abstract_text, ABSTRACT_PREVIEW_CHARS)
    }
}

fn year_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawYear::deserialize(deserializer)? {
        RawYear::Text(text) => text,
        RawYear::Int(value) => value.to_string(),
        RawYear::Float(value) => value.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityBand {
    High,
    Moderate,
    Low,
}

impl SimilarityBand {
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            SimilarityBand::High
        } else if score > 0.4 {
            SimilarityBand::Moderate
        } else {
            SimilarityBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SimilarityBand::High => "high",
            SimilarityBand::Moderate => "moderate",
            SimilarityBand::Low => "low",
        }
    }
}

impl fmt::Display for SimilarityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Highlight spans for one (query, candidate) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    #[serde(default)]
    pub user_highlights: Vec<Span>,
    #[serde(default)]
    pub paper_highlights: Vec<Span>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    pub query: String,
    pub paper_text: String,
}

/// Truncates to `max_chars` chars, appending `...` when anything was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paper_json() -> serde_json::Value {
        json!({
            "id": "2301.00001",
            "title": "Sparse Retrieval for Idea Novelty",
            "authors": ["A. Author", "B. Author"],
            "year": "2023",
            "abstract": "We study novelty detection.",
            "similarityScore": 0.8123,
            "url": "https://arxiv.org/abs/2301.00001"
        })
    }

    #[test]
    fn decodes_backend_payload() {
        let paper: SearchResult = serde_json::from_value(paper_json()).unwrap();
        assert_eq!(paper.abstract_text, "We study novelty detection.");
        assert_eq!(paper.year_value(), Some(2023));
        assert_eq!(paper.similarity_percent(), 81);
        assert_eq!(paper.similarity_band(), SimilarityBand::High);
        assert_eq!(paper.authors_line(), "A. Author, B. Author");
    }

    #[test]
    fn link_only_allows_http_schemes() {
        let mut paper: SearchResult = serde_json::from_value(paper_json()).unwrap();
        paper.url = Some(" HTTPS://arxiv.org/abs/1".to_string());
        assert_eq!(paper.link(), Some("HTTPS://arxiv.org/abs/1"));
        paper.url = Some("javascript:alert(1)".to_string());
        assert_eq!(paper.link(), None);
        paper.url = Some("data:text/html,hi".to_string());
        assert_eq!(paper.link(), None);
        paper.url = None;
        assert_eq!(paper.link(), None);
    }

    #[test]
    fn numeric_year_is_accepted() {
        let mut value = paper_json();
        value["year"] = json!(2019);
        let paper: SearchResult = serde_json::from_value(value).unwrap();
        assert_eq!(paper.year, "2019");
        assert_eq!(paper.year_value(), Some(2019));
    }

    #[test]
    fn serializes_with_backend_field_names() {
        let paper: SearchResult = serde_json::from_value(paper_json()).unwrap();
        let value = serde_json::to_value(&paper).unwrap();
        assert_eq!(value["similarityScore"], json!(0.8123));
        assert_eq!(value["abstract"], json!("We study novelty detection."));
    }

    #[test]
    fn unparseable_year_has_no_value() {
        let mut value = paper_json();
        value["year"] = json!("n.d.");
        let paper: SearchResult = serde_json::from_value(value).unwrap();
        assert_eq!(paper.year_value(), None);
    }

    #[test]
    fn comparison_spans_default_category() {
        let value = json!({
            "userHighlights": [{"start": 0, "end": 4, "category": "concept"}],
            "paperHighlights": [{"start": 2, "end": 5}]
        });
        let comparison: ComparisonResult = serde_json::from_value(value).unwrap();
        assert_eq!(comparison.user_highlights[0].category(), "concept");
        assert_eq!(comparison.paper_highlights[0].category(), "default");
    }

    #[test]
    fn negative_offsets_fail_to_decode() {
        let value = json!({ "userHighlights": [{"start": -1, "end": 2}] });
        assert!(serde_json::from_value::<ComparisonResult>(value).is_err());
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(SimilarityBand::from_score(0.71), SimilarityBand::High);
        assert_eq!(SimilarityBand::from_score(0.7), SimilarityBand::Moderate);
        assert_eq!(SimilarityBand::from_score(0.41), SimilarityBand::Moderate);
        assert_eq!(SimilarityBand::from_score(0.4), SimilarityBand::Low);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("ééééé", 2), "éé...");
        assert_eq!(preview("abc", 3), "abc");
    }
}
