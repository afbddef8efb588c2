//! The character offset table: 16-bit offsets into the tree block, one per
//! character code, in character-code order.

use crate::rom::{RomBytes, RomReadError};

/// Dummy offset for a character that never precedes another character in
/// the script. It owns no bytes in the tree block at all.
pub const NO_TREE_OFFSET: u16 = 0x8000;

/// End-of-table padding, presumably to align the pointer pair that follows.
const END_PADDING: u16 = 0x0000;

/// Highest character code we expect a table entry for. The observed ROMs
/// only ever encode the printable ASCII range, so a table running past
/// this is corrupt data, not a bigger alphabet.
pub const MAX_CHAR_CODE: u16 = 0x7E;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum OffsetTableError {
    #[error(transparent)]
    Read(#[from] RomReadError),
    #[error("Offset table ran past character code {:#x} without end padding, table is probably corrupt", MAX_CHAR_CODE)]
    TooManyEntries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetEntry {
    pub char_code: u8,
    pub raw_offset: u16,
}

impl OffsetEntry {
    /// Whether this character has no tree data at all.
    pub fn is_empty(&self) -> bool {
        self.raw_offset == NO_TREE_OFFSET
    }
}

pub struct OffsetTable {
    entries: Vec<OffsetEntry>,
}

impl OffsetTable {
    /// Scans 16-bit words upward from `offset_table_base`, assigning
    /// successive character codes. Stops at the `0x0000` padding word or at
    /// `pair_address`, whichever comes first; the stopping entry and
    /// everything after it do not exist.
    pub fn parse(
        rom: &RomBytes,
        offset_table_base: usize,
        pair_address: usize,
    ) -> Result<OffsetTable, OffsetTableError> {
        let mut entries = Vec::new();
        let mut address = offset_table_base;
        let mut char_code: u16 = 0;

        while address + 2 <= pair_address {
            let raw_offset = rom.get_u16(address)?;
            if raw_offset == END_PADDING {
                break;
            }
            if char_code > MAX_CHAR_CODE {
                return Err(OffsetTableError::TooManyEntries);
            }
            entries.push(OffsetEntry {
                char_code: char_code as u8,
                raw_offset,
            });
            address += 2;
            char_code += 1;
        }

        Ok(OffsetTable { entries })
    }

    pub fn entries(&self) -> &[OffsetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries that actually own tree data, in character-code order.
    pub fn non_empty(&self) -> impl Iterator<Item = &OffsetEntry> + '_ {
        self.entries.iter().filter(|e| !e.is_empty())
    }
}
