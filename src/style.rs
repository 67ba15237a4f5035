use crate::highlight::Segment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Background used for every category unless configured otherwise.
pub const DEFAULT_HIGHLIGHT_STYLE: &str = "#FFAB91";

/// Maps highlight categories to style tokens (CSS colours).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightPalette {
    default_style: String,
    #[serde(default)]
    categories: BTreeMap<String, String>,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            default_style: DEFAULT_HIGHLIGHT_STYLE.to_string(),
            categories: BTreeMap::new(),
        }
    }
}

impl HighlightPalette {
    pub fn with_default_style(mut self, style: impl Into<String>) -> Self {
        self.default_style = style.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>, style: impl Into<String>) -> Self {
        self.categories.insert(category.into(), style.into());
        self
    }

    pub fn insert(&mut self, rule: StyleRule) {
        self.categories.insert(rule.category, rule.style);
    }

    pub fn default_style(&self) -> &str {
        &self.default_style
    }

    /// Returns the token for `category`, or the default token if unmapped.
    pub fn style_for(&self, category: &str) -> &str {
        self.categories
            .get(category)
            .map(String::as_str)
            .unwrap_or(&self.default_style)
    }

    /// Pairs each segment with the style it should be drawn with.
    pub fn apply<'a>(&'a self, segments: &[Segment<'a>]) -> Vec<StyledSegment<'a>> {
        segments
            .iter()
            .map(|segment| StyledSegment {
                text: segment.text,
                style: if segment.highlighted {
                    Some(self.style_for(segment.category.unwrap_or_default()))
                } else {
                    None
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledSegment<'a> {
    pub text: &'a str,
    pub style: Option<&'a str>,
}

impl StyledSegment<'_> {
    pub fn is_highlighted(&self) -> bool {
        self.style.is_some()
    }
}

/// `CATEGORY=STYLE` pair as accepted on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub category: String,
    pub style: String,
}

impl FromStr for StyleRule {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (category, style) = value
            .split_once('=')
            .ok_or_else(|| format!("expected CATEGORY=STYLE, got {value:?}"))?;
        let category = category.trim();
        let style = style.trim();
        if category.is_empty() || style.is_empty() {
            return Err(format!("expected CATEGORY=STYLE, got {value:?}"));
        }
        Ok(Self {
            category: category.to_string(),
            style: style.to_string(),
        })
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.category, self.style)
    }
}

/// Parses `#RRGGBB` (or `RRGGBB`) into its channels.
pub fn parse_hex_color(token: &str) -> Option<(u8, u8, u8)> {
    let hex = token.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{Span, highlight};

    #[test]
    fn unmapped_categories_use_default() {
        let palette = HighlightPalette::default();
        assert_eq!(palette.style_for("concept"), DEFAULT_HIGHLIGHT_STYLE);
        assert_eq!(palette.style_for("methodology"), DEFAULT_HIGHLIGHT_STYLE);
    }

    #[test]
    fn mapped_categories_override_default() {
        let palette = HighlightPalette::default()
            .with_default_style("#eeeeee")
            .with_category("methodology", "#90CAF9");
        assert_eq!(palette.style_for("methodology"), "#90CAF9");
        assert_eq!(palette.style_for("concept"), "#eeeeee");
    }

    #[test]
    fn apply_only_styles_highlighted_segments() {
        let spans = [Span::new(0, 3).with_category("concept")];
        let segments = highlight("abcdef", &spans).unwrap();
        let palette = HighlightPalette::default().with_category("concept", "yellow");
        let styled = palette.apply(&segments);
        assert_eq!(
            styled,
            vec![
                StyledSegment {
                    text: "abc",
                    style: Some("yellow")
                },
                StyledSegment {
                    text: "def",
                    style: None
                },
            ]
        );
    }

    #[test]
    fn style_rule_parses_pairs() {
        let rule: StyleRule = "concept = #FFAB91".parse().unwrap();
        assert_eq!(rule.category, "concept");
        assert_eq!(rule.style, "#FFAB91");
        assert!("concept".parse::<StyleRule>().is_err());
        assert!("=red".parse::<StyleRule>().is_err());
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(parse_hex_color("#FFAB91"), Some((255, 171, 145)));
        assert_eq!(parse_hex_color("90caf9"), Some((144, 202, 249)));
        assert_eq!(parse_hex_color("yellow"), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }
}
