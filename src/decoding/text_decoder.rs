//! Decodes one compressed string by walking the forest.

use super::bit_cursor::{BitCursor, BitCursorError};
use super::tree::TextForest;
use crate::rom::RomBytes;

/// Terminates a string. Also the context character every string starts
/// from: the first real character is decoded through the NUL tree.
pub const TERMINATOR: u16 = 0x00;

/// Default ceiling on decoded string length. Malformed data can describe a
/// stream that never reaches a terminator; the guard turns that into an
/// error instead of an endless loop.
pub const DEFAULT_MAX_LEN: usize = 0x1000;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("No tree for character {char_code:#x}, which should never precede another character. The data is corrupt or the start position is wrong")]
    MissingTree { char_code: u16 },
    #[error("Tree walk for character {char_code:#x} produced lookup index {index}, but its table only holds {len} symbols")]
    InvalidLookupIndex {
        char_code: u16,
        index: usize,
        len: usize,
    },
    #[error("String exceeded {limit} characters without a terminator")]
    Runaway { limit: usize },
    #[error(transparent)]
    Bits(#[from] BitCursorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Mid-string, more characters may follow.
    Decoding,
    /// The terminator was decoded. The string is complete.
    Terminated,
    /// Decoding failed. The cursor position is no longer meaningful.
    Faulted,
}

/// Decoder for a single string, starting at a bit position in the
/// compressed text area.
///
/// Not restartable: decoding another string (or the same one again) takes
/// a fresh decoder with a fresh start position.
pub struct TextDecoder<'f, 'd> {
    forest: &'f TextForest,
    cursor: BitCursor<'d>,
    current: u16,
    state: DecoderState,
    emitted: usize,
    max_len: usize,
}

impl<'f, 'd> TextDecoder<'f, 'd> {
    pub fn new(forest: &'f TextForest, rom: &'d RomBytes, start_bit: usize) -> TextDecoder<'f, 'd> {
        TextDecoder {
            forest,
            cursor: BitCursor::starting_at(rom.as_slice(), forest.bit_order(), start_bit),
            current: TERMINATOR,
            state: DecoderState::Decoding,
            emitted: 0,
            max_len: DEFAULT_MAX_LEN,
        }
    }

    /// Replaces the runaway guard. `max_len` characters may be emitted
    /// before the decoder faults.
    pub fn with_limit(mut self, max_len: usize) -> TextDecoder<'f, 'd> {
        self.max_len = max_len;
        self
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Bit position of the cursor, relative to the start of the image.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Decodes the next character. `Ok(None)` once the terminator has been
    /// reached (the terminator itself is never emitted). Any error leaves
    /// the decoder faulted; further calls keep returning `Ok(None)`.
    pub fn decode_next(&mut self) -> Result<Option<char>, DecodeError> {
        if self.state != DecoderState::Decoding {
            return Ok(None);
        }
        match self.step() {
            Ok(symbol) => Ok(symbol),
            Err(e) => {
                self.state = DecoderState::Faulted;
                Err(e)
            }
        }
    }

    fn step(&mut self) -> Result<Option<char>, DecodeError> {
        let entry = self
            .forest
            .entry(self.current)
            .ok_or(DecodeError::MissingTree {
                char_code: self.current,
            })?;

        let (index, _bits) = entry.tree().decode_next(&mut self.cursor)?;
        let symbol = entry
            .lookup()
            .get(index as usize)
            .ok_or(DecodeError::InvalidLookupIndex {
                char_code: self.current,
                index: index as usize,
                len: entry.lookup().len(),
            })?;

        if symbol == TERMINATOR {
            self.state = DecoderState::Terminated;
            return Ok(None);
        }
        if self.emitted >= self.max_len {
            return Err(DecodeError::Runaway {
                limit: self.max_len,
            });
        }

        self.emitted += 1;
        self.current = symbol;
        Ok(Some(char::from(symbol as u8)))
    }

    /// Runs the decoder to completion and collects the string.
    pub fn decode_string(mut self) -> Result<String, DecodeError> {
        let mut out = String::new();
        while let Some(c) = self.decode_next()? {
            out.push(c);
        }
        Ok(out)
    }
}
