//! The character data pointer pair: the two 32-bit pointers that anchor
//! the whole text structure.

use crate::rom::{PointerError, RomBytes, RomReadError};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RootPairError {
    #[error(transparent)]
    Read(#[from] RomReadError),
    #[error(transparent)]
    Pointer(#[from] PointerError),
    #[error("Root pointers out of order: tree block {tree_block_base:#x}, offset table {offset_table_base:#x}, pair at {pair_address:#x}")]
    Misordered {
        tree_block_base: usize,
        offset_table_base: usize,
        pair_address: usize,
    },
}

/// The resolved pointer pair. The tree block and the offset table both sit
/// below the pair itself, which is what makes the pair address usable as
/// the hard upper bound when scanning the offset table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootPointerPair {
    pub pair_address: usize,
    pub tree_block_base: usize,
    pub offset_table_base: usize,
}

impl RootPointerPair {
    /// Reads the two consecutive pointers at `pair_address` and resolves
    /// them into file offsets.
    ///
    /// There is no known signature to search for, the pair address is
    /// per-ROM configuration supplied by the caller.
    pub fn read(rom: &RomBytes, pair_address: usize) -> Result<RootPointerPair, RootPairError> {
        let tree_block_base = rom.resolve(rom.get_u32(pair_address)?)?;
        let offset_table_base = rom.resolve(rom.get_u32(pair_address + 4)?)?;

        if tree_block_base >= offset_table_base || offset_table_base >= pair_address {
            return Err(RootPairError::Misordered {
                tree_block_base,
                offset_table_base,
                pair_address,
            });
        }

        Ok(RootPointerPair {
            pair_address,
            tree_block_base,
            offset_table_base,
        })
    }
}
