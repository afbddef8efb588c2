//! Infers the byte range of every character's tree data.
//!
//! A tree's end is never stored: it runs up to the start of the *next*
//! character's lookup table, which itself is only known once that lookup
//! table has been parsed (its length is inferred too). So spans can only be
//! computed after every non-empty character's lookup table is in hand.

use super::root_pair::RootPointerPair;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LayoutError {
    #[error("Tree for character {char_code:#x} got the non-positive span {start:#x}..{end:#x}, offsets or an inferred lookup boundary are corrupt")]
    EmptySpan {
        char_code: u8,
        start: usize,
        end: usize,
    },
}

/// The byte range `start..end` of one character's tree data in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSpan {
    pub char_code: u8,
    pub start: usize,
    pub end: usize,
}

/// Computes the span of every non-empty character.
///
/// `entries` pairs each non-empty character's `(char_code, raw_offset)`
/// with the byte size of its parsed lookup table. Neighbor relationships
/// are taken over this subsequence only; empty characters own no bytes.
/// The character with the greatest offset ends at `offset_table_base - 1`.
///
/// Returned spans are in ascending offset order.
pub fn tree_spans(
    root: &RootPointerPair,
    entries: &[(u8, u16, usize)],
) -> Result<Vec<TreeSpan>, LayoutError> {
    let mut by_offset: Vec<(u8, u16, usize)> = entries.to_vec();
    by_offset.sort_by_key(|&(_, raw_offset, _)| raw_offset);

    let mut spans = Vec::with_capacity(by_offset.len());
    for (i, &(char_code, raw_offset, _)) in by_offset.iter().enumerate() {
        let start = root.tree_block_base + raw_offset as usize;
        let end = match by_offset.get(i + 1) {
            Some(&(_, next_offset, next_lookup_size)) => {
                (root.tree_block_base + next_offset as usize).saturating_sub(next_lookup_size)
            }
            None => root.offset_table_base - 1,
        };
        if start >= end {
            return Err(LayoutError::EmptySpan {
                char_code,
                start,
                end,
            });
        }
        spans.push(TreeSpan {
            char_code,
            start,
            end,
        });
    }

    Ok(spans)
}
