//! Applying automatic fixes to source text.

use crate::types::Replacement;

/// Outcome of applying a batch of replacements to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    /// The rewritten source text.
    pub content: String,
    /// Number of replacements applied.
    pub applied: usize,
    /// Number of replacements dropped because they overlapped an earlier one
    /// or fell outside the source.
    pub rejected: usize,
}

/// Applies replacements to `content`.
///
/// Replacements are ordered by start offset; one that overlaps an already
/// accepted replacement, or whose range is out of bounds or not on a char
/// boundary, is rejected. Accepted replacements are spliced back to front so
/// earlier offsets stay valid.
#[must_use]
pub fn apply_replacements<'a, I>(content: &str, replacements: I) -> FixOutcome
where
    I: IntoIterator<Item = &'a Replacement>,
{
    let mut sorted: Vec<&Replacement> = replacements.into_iter().collect();
    sorted.sort_by_key(|r| (r.location.offset, r.location.length));

    let mut accepted: Vec<&Replacement> = Vec::with_capacity(sorted.len());
    let mut rejected = 0;
    let mut cursor = 0;

    for r in sorted {
        let range = r.location.byte_range();
        let in_bounds = range.end <= content.len()
            && content.is_char_boundary(range.start)
            && content.is_char_boundary(range.end);
        if !in_bounds || range.start < cursor {
            rejected += 1;
            continue;
        }
        cursor = range.end;
        accepted.push(r);
    }

    let mut out = content.to_string();
    for r in accepted.iter().rev() {
        out.replace_range(r.location.byte_range(), &r.new_text);
    }

    FixOutcome {
        content: out,
        applied: accepted.len(),
        rejected,
    }
}
