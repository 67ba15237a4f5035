use crate::model::SearchResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Relevance,
    Year,
}

impl SortKey {
    pub const ALL: [SortKey; 2] = [SortKey::Relevance, SortKey::Year];

    pub fn query_value(&self) -> &'static str {
        match self {
            SortKey::Relevance => "relevance",
            SortKey::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Relevance => "Relevance",
            SortKey::Year => "Year (newest first)",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(SortKey::Relevance),
            "year" => Ok(SortKey::Year),
            other => Err(format!("unknown sort key {other:?} (expected relevance or year)")),
        }
    }
}

/// Returns a copy of `results` ordered by `key`, newest/most similar first.
///
/// The sort is stable. Results without a numeric year go last under
/// [`SortKey::Year`].
pub fn sort_results(results: &[SearchResult], key: SortKey) -> Vec<SearchResult> {
    let mut sorted = results.to_vec();
    match key {
        SortKey::Relevance => sorted.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(Ordering::Equal)
        }),
        SortKey::Year => sorted.sort_by(|a, b| match (a.year_value(), b.year_value()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
    }
    sorted
}
