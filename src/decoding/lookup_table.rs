//! Per-character lookup tables: the 12-bit-packed symbol lists stored
//! reversed, immediately before each character's tree data.

use crate::rom::{RomBytes, RomReadError};

/// A decoded symbol code. Symbols are packed as 12 bits in the ROM even
/// though the observed character set fits in 7.
pub type Symbol = u16;

/// Whether `symbol` can be a real script character.
///
/// This predicate doubles as the table delimiter: nothing in the format
/// stores a lookup table's length, so parsing reads symbols until one
/// fails this check and assumes the table ended there. That makes it a
/// heuristic, isolated here so a ROM variant that violates it (another
/// language, say) only has to swap this function.
pub fn is_valid_symbol(symbol: Symbol) -> bool {
    0x00 < symbol && symbol < 0x7E
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LookupTableError {
    #[error(transparent)]
    Read(#[from] RomReadError),
    #[error("Lookup table read backward from {tree_address:#x} ran into the start of the image")]
    Underflow { tree_address: usize },
}

/// One character's lookup table, in logical (read) order. The logical index
/// of a symbol is what a tree traversal produces during decode.
pub struct LookupTable {
    symbols: Vec<Symbol>,
}

impl LookupTable {
    /// Reads the table that ends at `tree_address - 1`, walking backward in
    /// 3-byte groups. Each group packs two 12-bit symbols; the first symbol
    /// that fails [`is_valid_symbol`] is discarded and ends the table.
    pub fn parse(rom: &RomBytes, tree_address: usize) -> Result<LookupTable, LookupTableError> {
        let mut symbols = Vec::new();
        let mut address = tree_address;

        loop {
            if address < 3 {
                return Err(LookupTableError::Underflow { tree_address });
            }
            let b0 = u16::from(rom.get_u8(address - 1)?);
            let b1 = u16::from(rom.get_u8(address - 2)?);
            let b2 = u16::from(rom.get_u8(address - 3)?);

            let first = (b0 << 4) | (b1 >> 4);
            let second = ((b1 & 0xF) << 8) | b2;

            if !is_valid_symbol(first) {
                break;
            }
            symbols.push(first);

            if !is_valid_symbol(second) {
                break;
            }
            symbols.push(second);

            address -= 3;
        }

        Ok(LookupTable { symbols })
    }

    /// A table with the given symbols, for crafted images in tests.
    #[cfg(test)]
    pub(crate) fn from_symbols(symbols: Vec<Symbol>) -> LookupTable {
        LookupTable { symbols }
    }

    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.symbols.get(index).copied()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Bytes this table occupies in the ROM. Symbols are 12 bits, so this
    /// is not a multiple of the symbol count.
    pub fn size_bytes(&self) -> usize {
        (self.symbols.len() * 12 + 7) / 8
    }
}

/// Packs `symbols` the way the ROM stores them: reversed, two 12-bit values
/// per 3-byte group, ending at the returned vec's end. Prepends one group of
/// zero bytes so a backward parse terminates.
#[cfg(test)]
pub(crate) fn pack_reversed(symbols: &[Symbol]) -> Vec<u8> {
    let mut out = vec![0u8; 3]; // invalid group, stops the backward scan
    for pair in symbols.chunks(2).rev() {
        let first = pair[0];
        let second = if pair.len() == 2 { pair[1] } else { 0 };
        out.push(second as u8); // b2
        out.push((((first & 0xF) << 4) | (second >> 8)) as u8); // b1
        out.push((first >> 4) as u8); // b0
    }
    out
}
