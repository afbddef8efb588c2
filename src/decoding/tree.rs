//! Per-character Huffman trees and the frozen forest built from them.
//!
//! A tree's bytes encode its *shape*: one structure bit per node, read in
//! pre-order, telling leaf from branch. Those bits are consumed once, at
//! construction time. During decode the path bits come from the compressed
//! text stream instead, and a walk to a leaf yields that leaf's ordinal,
//! which indexes the same character's lookup table.

use super::bit_cursor::{BitCursor, BitCursorError, BitOrder};
use super::lookup_table::{LookupTable, LookupTableError};
use super::offset_table::{OffsetTable, OffsetTableError};
use super::root_pair::{RootPairError, RootPointerPair};
use super::tree_layout::{tree_spans, LayoutError, TreeSpan};
use crate::rom::{RomBytes, RomReadError};

/// How tree-shape bits are laid out.
///
/// The format documents neither the bit order nor which structure-bit value
/// marks a leaf. Both have to be calibrated against a real dump before
/// decoding anything, which is why this type has no `Default`: stating a
/// convention is a claim that it was validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConvention {
    pub bit_order: BitOrder,
    /// `true` if a set structure bit marks a leaf, `false` if a clear one does.
    pub leaf_when_set: bool,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TreeError {
    #[error("Tree data ended after {bits_read} structure bits with {open_branches} branch(es) still missing children")]
    Truncated {
        bits_read: usize,
        open_branches: usize,
    },
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(u32),
    Branch([u32; 2]),
}

const UNSET: u32 = u32::MAX;

/// One character's tree, as a flat pre-order arena.
pub struct CharTree {
    nodes: Vec<Node>,
    leaves: u32,
    bits_used: usize,
}

impl CharTree {
    /// Rebuilds the tree shape from its span bytes.
    ///
    /// One structure bit per node, pre-order, zero-child before one-child.
    /// Leaves are numbered in the order they appear, which is the lookup
    /// index a decode walk produces. Bits past the last node are padding
    /// (the span end is inferred, so there usually are some) and ignored.
    pub fn parse(data: &[u8], convention: TreeConvention) -> Result<CharTree, TreeError> {
        let mut bits = BitCursor::new(data, convention.bit_order);
        let mut nodes: Vec<Node> = Vec::new();
        // Branch indexes still waiting for at least one child.
        let mut open: Vec<u32> = Vec::new();
        let mut leaves = 0;

        loop {
            let bit = bits.get_bit().map_err(|_| TreeError::Truncated {
                bits_read: bits.position(),
                open_branches: open.len(),
            })?;
            let is_leaf = (bit == 1) == convention.leaf_when_set;

            let idx = nodes.len() as u32;
            if let Some(&parent) = open.last() {
                let children = match &mut nodes[parent as usize] {
                    Node::Branch(children) => children,
                    Node::Leaf(_) => unreachable!("only branches are kept open"),
                };
                if children[0] == UNSET {
                    children[0] = idx;
                } else {
                    children[1] = idx;
                    open.pop();
                }
            }

            if is_leaf {
                nodes.push(Node::Leaf(leaves));
                leaves += 1;
            } else {
                nodes.push(Node::Branch([UNSET, UNSET]));
                open.push(idx);
            }

            if open.is_empty() {
                break;
            }
        }

        Ok(CharTree {
            nodes,
            leaves,
            bits_used: bits.position(),
        })
    }

    /// Walks the tree with bits taken from `bits` until a leaf is reached.
    /// Returns the leaf's lookup index and the number of bits consumed.
    ///
    /// Child indexes only ever point forward in the arena, so the walk
    /// always terminates.
    pub fn decode_next(&self, bits: &mut BitCursor<'_>) -> Result<(u32, usize), BitCursorError> {
        let mut idx = 0usize;
        let mut consumed = 0usize;
        loop {
            match self.nodes[idx] {
                Node::Leaf(lookup_index) => return Ok((lookup_index, consumed)),
                Node::Branch(children) => {
                    let bit = bits.get_bit()?;
                    idx = children[bit as usize] as usize;
                    consumed += 1;
                }
            }
        }
    }

    /// Number of leaves, i.e. the number of distinct lookup indexes a walk
    /// can produce.
    pub fn leaf_count(&self) -> u32 {
        self.leaves
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Structure bits the shape actually used, excluding span padding.
    pub fn bits_used(&self) -> usize {
        self.bits_used
    }
}

/// Everything the decoder needs for one character: its tree, its lookup
/// table and where in the image they came from.
pub struct CharEntry {
    tree: CharTree,
    lookup: LookupTable,
    span: TreeSpan,
}

impl CharEntry {
    pub fn tree(&self) -> &CharTree {
        &self.tree
    }

    pub fn lookup(&self) -> &LookupTable {
        &self.lookup
    }

    pub fn span(&self) -> TreeSpan {
        self.span
    }
}

enum Slot {
    /// Offset `0x8000`: the character never precedes another character.
    Empty,
    Tree(Box<CharEntry>),
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ForestError {
    #[error(transparent)]
    RootPair(#[from] RootPairError),
    #[error(transparent)]
    OffsetTable(#[from] OffsetTableError),
    #[error("Failed to parse the lookup table for character {char_code:#x}: {source}")]
    LookupTable {
        char_code: u8,
        #[source]
        source: LookupTableError,
    },
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("Failed to rebuild the tree for character {char_code:#x}: {source}")]
    Tree {
        char_code: u8,
        #[source]
        source: TreeError,
    },
    #[error(transparent)]
    Read(#[from] RomReadError),
}

/// Per-ROM configuration for building a forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestParams {
    /// File offset of the character data pointer pair. There is no known
    /// signature to search for; every supported ROM version carries its own
    /// value.
    pub pair_address: usize,
    pub convention: TreeConvention,
}

/// The full set of per-character trees, built once per loaded ROM and
/// read-only afterwards. Decodes running in parallel can all share one
/// forest by reference.
pub struct TextForest {
    root: RootPointerPair,
    slots: Vec<Slot>,
    convention: TreeConvention,
}

impl TextForest {
    /// Parses the offset table, infers every lookup table and tree span,
    /// and rebuilds all trees. Any format violation surfaces here, before
    /// a single string is decoded; a forest that builds is internally
    /// consistent.
    pub fn build(rom: &RomBytes, params: &ForestParams) -> Result<TextForest, ForestError> {
        let root = RootPointerPair::read(rom, params.pair_address)?;
        let table = OffsetTable::parse(rom, root.offset_table_base, root.pair_address)?;

        // Lookup tables first: tree boundaries depend on all of them.
        let mut lookups: Vec<(u8, u16, LookupTable)> = Vec::new();
        for entry in table.non_empty() {
            let tree_address = root.tree_block_base + entry.raw_offset as usize;
            let lookup =
                LookupTable::parse(rom, tree_address).map_err(|source| ForestError::LookupTable {
                    char_code: entry.char_code,
                    source,
                })?;
            lookups.push((entry.char_code, entry.raw_offset, lookup));
        }

        let sized: Vec<(u8, u16, usize)> = lookups
            .iter()
            .map(|(code, offset, lookup)| (*code, *offset, lookup.size_bytes()))
            .collect();
        let spans = tree_spans(&root, &sized)?;

        let mut slots: Vec<Slot> = Vec::with_capacity(table.len());
        for _ in 0..table.len() {
            slots.push(Slot::Empty);
        }

        for span in spans {
            let data = rom.slice(span.start, span.end)?;
            let tree = CharTree::parse(data, params.convention).map_err(|source| {
                ForestError::Tree {
                    char_code: span.char_code,
                    source,
                }
            })?;
            let pos = lookups
                .iter()
                .position(|(code, _, _)| *code == span.char_code)
                .expect("span exists only for parsed lookups");
            let (_, _, lookup) = lookups.swap_remove(pos);
            slots[span.char_code as usize] = Slot::Tree(Box::new(CharEntry {
                tree,
                lookup,
                span,
            }));
        }

        Ok(TextForest {
            root,
            slots,
            convention: params.convention,
        })
    }

    /// A forest assembled by hand, for crafted decode tests.
    #[cfg(test)]
    pub(crate) fn from_entries(
        entries: Vec<(u8, CharTree, LookupTable)>,
        convention: TreeConvention,
    ) -> TextForest {
        let max_code = entries.iter().map(|(code, _, _)| *code).max().unwrap_or(0);
        let mut slots: Vec<Slot> = (0..=max_code).map(|_| Slot::Empty).collect();
        for (code, tree, lookup) in entries {
            slots[code as usize] = Slot::Tree(Box::new(CharEntry {
                tree,
                lookup,
                span: TreeSpan {
                    char_code: code,
                    start: 0,
                    end: 0,
                },
            }));
        }
        TextForest {
            root: RootPointerPair {
                pair_address: 0,
                tree_block_base: 0,
                offset_table_base: 0,
            },
            slots,
            convention,
        }
    }

    pub fn root(&self) -> RootPointerPair {
        self.root
    }

    pub fn bit_order(&self) -> BitOrder {
        self.convention.bit_order
    }

    /// The entry for `char_code`, or `None` for empty characters and codes
    /// past the end of the offset table.
    pub fn entry(&self, char_code: u16) -> Option<&CharEntry> {
        match self.slots.get(char_code as usize) {
            Some(Slot::Tree(entry)) => Some(entry),
            _ => None,
        }
    }

    /// Number of character codes the offset table covered.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// All character codes with their entries, empty ones included.
    pub fn entries(&self) -> impl Iterator<Item = (u8, Option<&CharEntry>)> + '_ {
        self.slots.iter().enumerate().map(|(code, slot)| {
            let entry = match slot {
                Slot::Tree(entry) => Some(&**entry),
                Slot::Empty => None,
            };
            (code as u8, entry)
        })
    }
}
