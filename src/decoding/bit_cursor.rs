//! Single-bit reads over a byte slice, used both for the serialized tree
//! shapes and for the compressed text stream itself.

/// Which bit of a byte is read first.
///
/// The format has never been seen documenting this, it has to be calibrated
/// against a real dump (see [`crate::TreeConvention`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Most significant bit first.
    Msb0,
    /// Least significant bit first.
    Lsb0,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BitCursorError {
    #[error("Cannot read a bit at position {position}, the stream holds only {len_bits} bits")]
    NotEnoughBits { position: usize, len_bits: usize },
}

/// A forward-only bit reader.
pub struct BitCursor<'s> {
    source: &'s [u8],
    idx: usize, // index counts bits already read
    order: BitOrder,
}

impl<'s> BitCursor<'s> {
    pub fn new(source: &'s [u8], order: BitOrder) -> BitCursor<'s> {
        BitCursor {
            source,
            idx: 0,
            order,
        }
    }

    /// A cursor positioned at an arbitrary bit, for streams that start
    /// mid-buffer (the compressed text area shares the ROM image).
    pub fn starting_at(source: &'s [u8], order: BitOrder, bit: usize) -> BitCursor<'s> {
        BitCursor {
            source,
            idx: bit,
            order,
        }
    }

    /// Bits already read, counted from the start of the source.
    pub fn position(&self) -> usize {
        self.idx
    }

    pub fn bits_left(&self) -> usize {
        (self.source.len() * 8).saturating_sub(self.idx)
    }

    pub fn get_bit(&mut self) -> Result<u8, BitCursorError> {
        if self.bits_left() == 0 {
            return Err(BitCursorError::NotEnoughBits {
                position: self.idx,
                len_bits: self.source.len() * 8,
            });
        }
        let byte = self.source[self.idx / 8];
        let shift = match self.order {
            BitOrder::Msb0 => 7 - (self.idx % 8),
            BitOrder::Lsb0 => self.idx % 8,
        };
        self.idx += 1;
        Ok((byte >> shift) & 1)
    }
}
