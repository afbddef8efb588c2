//! Structures and utilities used for decoding the compressed text data.
//!
//! The pieces compose bottom-up: [`root_pair`] anchors the layout,
//! [`offset_table`] locates each character's data in the tree block,
//! [`lookup_table`] and [`tree_layout`] infer the boundaries the format
//! never stores, [`tree`] builds the frozen per-character forest, and
//! [`text_decoder`] walks the compressed bit stream through it.

pub mod bit_cursor;
pub mod lookup_table;
pub mod offset_table;
pub mod root_pair;
pub mod string_table;
pub mod text_decoder;
pub mod tree;
pub mod tree_layout;
