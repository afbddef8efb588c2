//! The string pointer table: per-string `(text, meta)` pointer pairs.
//!
//! The text pointer locates the start of one compressed string. What the
//! second pointer refers to exactly (a length table, most likely) has not
//! been confirmed against enough dumps, so it is carried opaquely and never
//! interpreted here.

use super::text_decoder::{DecodeError, TextDecoder};
use super::tree::TextForest;
use crate::rom::{PointerError, RomBytes, RomReadError};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StringTableError {
    #[error(transparent)]
    Read(#[from] RomReadError),
}

/// Why one particular string failed to decode. Isolated per entry: a bad
/// string never stops enumeration of the rest.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StringDecodeError {
    #[error(transparent)]
    Pointer(#[from] PointerError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringEntry {
    /// In-ROM pointer to the start of this string's compressed bits.
    pub text_pointer: u32,
    /// In-ROM pointer of unconfirmed meaning, kept as read.
    pub meta_pointer: u32,
}

impl StringEntry {
    /// Bit position of this string's first compressed bit.
    pub fn start_bit(&self, rom: &RomBytes) -> Result<usize, PointerError> {
        Ok(rom.resolve(self.text_pointer)? * 8)
    }
}

pub struct StringTable {
    entries: Vec<StringEntry>,
}

impl StringTable {
    /// Reads `count` consecutive pointer pairs starting at `table_base`.
    pub fn parse(
        rom: &RomBytes,
        table_base: usize,
        count: usize,
    ) -> Result<StringTable, StringTableError> {
        let mut entries = Vec::with_capacity(count);
        for i in 0..count {
            let address = table_base + i * 8;
            entries.push(StringEntry {
                text_pointer: rom.get_u32(address)?,
                meta_pointer: rom.get_u32(address + 4)?,
            });
        }
        Ok(StringTable { entries })
    }

    pub fn entries(&self) -> &[StringEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<StringEntry> {
        self.entries.get(index).copied()
    }

    /// Decodes every entry against the shared forest, yielding one result
    /// per entry in table order.
    pub fn decode_all<'a>(
        &'a self,
        forest: &'a TextForest,
        rom: &'a RomBytes,
        max_len: usize,
    ) -> impl Iterator<Item = Result<String, StringDecodeError>> + 'a {
        self.entries.iter().map(move |entry| {
            let start_bit = entry.start_bit(rom)?;
            let decoded = TextDecoder::new(forest, rom, start_bit)
                .with_limit(max_len)
                .decode_string()?;
            Ok(decoded)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{StringTable, StringTableError};
    use crate::rom::{RomBytes, ROM_BASE};
    use byteorder::{ByteOrder, LittleEndian};

    #[test]
    fn parses_pointer_pairs() {
        let mut data = vec![0u8; 0x20];
        LittleEndian::write_u32(&mut data[0x00..], ROM_BASE + 0x10);
        LittleEndian::write_u32(&mut data[0x04..], ROM_BASE + 0x18);
        LittleEndian::write_u32(&mut data[0x08..], ROM_BASE + 0x14);
        LittleEndian::write_u32(&mut data[0x0c..], ROM_BASE + 0x1c);
        let rom = RomBytes::new(data);

        let table = StringTable::parse(&rom, 0, 2).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().text_pointer, ROM_BASE + 0x10);
        assert_eq!(table.get(0).unwrap().meta_pointer, ROM_BASE + 0x18);
        assert_eq!(table.get(1).unwrap().text_pointer, ROM_BASE + 0x14);

        assert_eq!(table.get(0).unwrap().start_bit(&rom).unwrap(), 0x10 * 8);
    }

    #[test]
    fn short_table_is_a_read_error() {
        let rom = RomBytes::new(vec![0u8; 12]);
        assert!(matches!(
            StringTable::parse(&rom, 0, 2),
            Err(StringTableError::Read(_))
        ));
    }
}
