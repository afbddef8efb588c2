//! A decoder for the context-adaptive Huffman text compression used by
//! Camelot's GBA games (Golden Sun and friends).
//!
//! Instead of one big Huffman tree, every character has its own small tree
//! that decides the *next* character of the string. Whatever character was
//! decoded last selects the tree used for the following one, and every
//! string starts from the tree of the NUL character.
//!
//! The text data is laid out in five regions, in this order:
//!
//! 1. Character tree block: per-character lookup tables and tree shapes,
//!    packed back to back. Each lookup table is stored *reversed*,
//!    immediately before its tree, as 12-bit symbol codes.
//! 2. Character offset table: 16-bit offsets into the tree block, one per
//!    character code. `0x8000` marks a character with no tree at all,
//!    `0x0000` is end-of-table padding.
//! 3. Character data pointer pair: two 32-bit pointers to the tree block
//!    and the offset table. Its address is per-ROM configuration.
//! 4. Compressed text data blocks.
//! 5. String pointer table: `(text, meta)` pointer pairs, one per string.
//!
//! Nothing in the format stores a lookup table's length or where one
//! character's tree ends and the next one's lookup table begins, so both
//! are inferred. See [`decoding::lookup_table`] and [`decoding::tree_layout`]
//! for how (and how approximately) that works.
//!
//! Decoding runs over an immutable ROM image ([`RomBytes`]): build a
//! [`TextForest`] once per loaded ROM, then decode as many strings as you
//! like through [`TextDecoder`] values that share the frozen forest.

#![deny(trivial_casts, trivial_numeric_casts, rust_2018_idioms)]

pub mod decoding;
pub mod rom;
#[cfg(test)]
mod tests;

pub use decoding::bit_cursor::BitOrder;
pub use decoding::text_decoder::{DecodeError, DecoderState, TextDecoder};
pub use decoding::tree::{ForestError, ForestParams, TextForest, TreeConvention};
pub use rom::RomBytes;
