//! Character-offset spans into a job description.
//!
//! Offsets count Unicode scalar values (not bytes) so they line up with what a
//! browser-side `String.prototype.slice` sees for BMP text. Every pair handed to
//! a client satisfies `0 <= start < end <= len(jd)` and each list is ordered.

use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` range, serialized as a two-element array.
pub type Span = (usize, usize);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JdSpans {
    #[serde(default)]
    pub requirements: Vec<Span>,
    #[serde(default)]
    pub responsibilities: Vec<Span>,
    #[serde(default)]
    pub nice_to_haves: Vec<Span>,
}

impl JdSpans {
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
            && self.responsibilities.is_empty()
            && self.nice_to_haves.is_empty()
    }

    pub fn iter_all(&self) -> impl Iterator<Item = &Span> {
        self.requirements
            .iter()
            .chain(self.responsibilities.iter())
            .chain(self.nice_to_haves.iter())
    }

    /// Drops out-of-bounds or empty pairs, then sorts and de-duplicates each list.
    /// Overlap between categories is left alone.
    pub fn sanitized(mut self, text_len: usize) -> Self {
        for list in [
            &mut self.requirements,
            &mut self.responsibilities,
            &mut self.nice_to_haves,
        ] {
            list.retain(|&(start, end)| start < end && end <= text_len);
            list.sort_unstable();
            list.dedup();
        }
        self
    }

    /// True when every pair is in bounds and every list is ordered.
    pub fn is_valid_for(&self, text_len: usize) -> bool {
        [&self.requirements, &self.responsibilities, &self.nice_to_haves]
            .iter()
            .all(|list| {
                list.iter().all(|&(s, e)| s < e && e <= text_len)
                    && list.windows(2).all(|w| w[0] <= w[1])
            })
    }

    /// Fraction of characters covered by at least one span.
    pub fn coverage(&self, text_len: usize) -> f64 {
        if text_len == 0 {
            return 0.0;
        }
        let mut covered = vec![false; text_len];
        for &(start, end) in self.iter_all() {
            let end = end.min(text_len);
            if start < end {
                covered[start..end].iter_mut().for_each(|c| *c = true);
            }
        }
        covered.iter().filter(|&&c| c).count() as f64 / text_len as f64
    }
}

/// Number of characters in `text` (the unit spans are measured in).
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Converts a byte offset on a char boundary into a character offset.
pub fn byte_to_char(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset.min(text.len())].chars().count()
}

/// Converts a character offset into a byte offset, clamping to the end of `text`.
pub fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Slice `text` by a character-offset span.
pub fn slice_chars(text: &str, (start, end): Span) -> &str {
    let s = char_to_byte(text, start);
    let e = char_to_byte(text, end);
    if s <= e {
        &text[s..e]
    } else {
        ""
    }
}
