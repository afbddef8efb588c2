//! Bounds-checked, little-endian access to a loaded ROM image.

use byteorder::{ByteOrder, LittleEndian};

/// Address the cartridge is mapped to in the GBA address space. In-ROM
/// pointers are absolute addresses, so this is subtracted from every
/// pointer before it can be used as a file offset.
pub const ROM_BASE: u32 = 0x0800_0000;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RomReadError {
    #[error("Read of {len} bytes at offset {offset:#x} is outside the image (size: {image_len:#x})")]
    OutOfBounds {
        offset: usize,
        len: usize,
        image_len: usize,
    },
    #[error("Bytes at offset {offset:#x} are not printable ASCII")]
    NotAscii { offset: usize },
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PointerError {
    #[error("Pointer {pointer:#010x} is below the ROM base {:#010x}", ROM_BASE)]
    BelowRomBase { pointer: u32 },
    #[error("Pointer {pointer:#010x} resolves to offset {offset:#x}, outside the image (size: {image_len:#x})")]
    OutsideImage {
        pointer: u32,
        offset: usize,
        image_len: usize,
    },
}

/// An immutable ROM image. All multi-byte reads are little-endian and all
/// reads are bounds-checked, a bad address is an error, never a panic.
pub struct RomBytes {
    data: Vec<u8>,
}

impl RomBytes {
    pub fn new(data: Vec<u8>) -> RomBytes {
        RomBytes { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    fn checked(&self, offset: usize, len: usize) -> Result<&[u8], RomReadError> {
        let end = offset.checked_add(len);
        match end {
            Some(end) if end <= self.data.len() => Ok(&self.data[offset..end]),
            _ => Err(RomReadError::OutOfBounds {
                offset,
                len,
                image_len: self.data.len(),
            }),
        }
    }

    pub fn get_u8(&self, offset: usize) -> Result<u8, RomReadError> {
        Ok(self.checked(offset, 1)?[0])
    }

    pub fn get_u16(&self, offset: usize) -> Result<u16, RomReadError> {
        Ok(LittleEndian::read_u16(self.checked(offset, 2)?))
    }

    pub fn get_u32(&self, offset: usize) -> Result<u32, RomReadError> {
        Ok(LittleEndian::read_u32(self.checked(offset, 4)?))
    }

    /// Reads `len` bytes at `offset` as an ASCII string.
    pub fn get_ascii(&self, offset: usize, len: usize) -> Result<&str, RomReadError> {
        let raw = self.checked(offset, len)?;
        if !raw.is_ascii() {
            return Err(RomReadError::NotAscii { offset });
        }
        // Just checked that this is ASCII, so it is valid UTF-8 too.
        Ok(core::str::from_utf8(raw).unwrap())
    }

    pub fn slice(&self, start: usize, end: usize) -> Result<&[u8], RomReadError> {
        let len = end.checked_sub(start).unwrap_or(0);
        self.checked(start, len)
    }

    /// Converts an in-ROM pointer into an offset into this image.
    pub fn resolve(&self, pointer: u32) -> Result<usize, PointerError> {
        if pointer < ROM_BASE {
            return Err(PointerError::BelowRomBase { pointer });
        }
        let offset = (pointer - ROM_BASE) as usize;
        if offset >= self.data.len() {
            return Err(PointerError::OutsideImage {
                pointer,
                offset,
                image_len: self.data.len(),
            });
        }
        Ok(offset)
    }
}
