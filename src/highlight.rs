use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category assigned to spans that arrive without one.
pub const DEFAULT_CATEGORY: &str = "default";

/// A region of interest inside a text, in char (Unicode scalar) offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Returns the span category, falling back to [`DEFAULT_CATEGORY`].
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A contiguous slice of the input, either plain or highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub highlighted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<&'a str>,
}

impl<'a> Segment<'a> {
    pub fn plain(text: &'a str) -> Self {
        Self {
            text,
            highlighted: false,
            category: None,
        }
    }

    pub fn highlighted(text: &'a str, category: &'a str) -> Self {
        Self {
            text,
            highlighted: true,
            category: Some(category),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSpanError {
    #[error("span #{index} ends before it starts ({start}..{end})")]
    Reversed {
        index: usize,
        start: usize,
        end: usize,
    },
    #[error("span #{index} ({start}..{end}) exceeds text length {len}")]
    OutOfBounds {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },
}

/// Splits `text` into plain and highlighted segments.
///
/// Spans are validated up front; a reversed or out-of-range span fails the
/// whole call and `index` in the error refers to the caller's ordering.
/// Valid spans are stable-sorted by `start`. A span starting strictly inside
/// the current highlighted region is merged into it (the region keeps the
/// category of its first span); spans that merely touch stay separate.
/// Concatenating the returned texts always yields `text`.
pub fn highlight<'a>(
    text: &'a str,
    spans: &'a [Span],
) -> Result<Vec<Segment<'a>>, InvalidSpanError> {
    if spans.is_empty() {
        return Ok(vec![Segment::plain(text)]);
    }

    let offsets = CharOffsets::new(text);
    let len = offsets.char_len();
    for (index, span) in spans.iter().enumerate() {
        validate(index, span, len)?;
    }

    let mut ordered: Vec<&Span> = spans.iter().collect();
    ordered.sort_by_key(|span| span.start);
    let regions = merge_regions(&ordered);

    let mut segments = Vec::with_capacity(regions.len() * 2 + 1);
    let mut last_index = 0;
    for region in regions {
        if region.start > last_index {
            segments.push(Segment::plain(offsets.slice(text, last_index, region.start)));
        }
        segments.push(Segment::highlighted(
            offsets.slice(text, region.start, region.end),
            region.category,
        ));
        last_index = region.end;
    }
    if last_index < len {
        segments.push(Segment::plain(offsets.slice(text, last_index, len)));
    }
    Ok(segments)
}

fn validate(index: usize, span: &Span, len: usize) -> Result<(), InvalidSpanError> {
    if span.start > span.end {
        return Err(InvalidSpanError::Reversed {
            index,
            start: span.start,
            end: span.end,
        });
    }
    if span.end > len {
        return Err(InvalidSpanError::OutOfBounds {
            index,
            start: span.start,
            end: span.end,
            len,
        });
    }
    Ok(())
}

struct Region<'a> {
    start: usize,
    end: usize,
    category: &'a str,
}

fn merge_regions<'a>(ordered: &[&'a Span]) -> Vec<Region<'a>> {
    let mut regions: Vec<Region<'a>> = Vec::with_capacity(ordered.len());
    for span in ordered {
        match regions.last_mut() {
            Some(current) if span.start < current.end => {
                current.end = current.end.max(span.end);
            }
            _ => regions.push(Region {
                start: span.start,
                end: span.end,
                category: span.category(),
            }),
        }
    }
    regions
}

/// Maps char offsets to byte offsets. ASCII input skips the table.
struct CharOffsets {
    boundaries: Option<Vec<usize>>,
    ascii_len: usize,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                boundaries: None,
                ascii_len: text.len(),
            };
        }
        let mut boundaries: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
        boundaries.push(text.len());
        Self {
            boundaries: Some(boundaries),
            ascii_len: 0,
        }
    }

    fn char_len(&self) -> usize {
        match &self.boundaries {
            Some(boundaries) => boundaries.len() - 1,
            None => self.ascii_len,
        }
    }

    fn byte(&self, char_idx: usize) -> usize {
        match &self.boundaries {
            Some(boundaries) => boundaries[char_idx],
            None => char_idx,
        }
    }

    fn slice<'a>(&self, text: &'a str, start: usize, end: usize) -> &'a str {
        &text[self.byte(start)..self.byte(end)]
    }
}
