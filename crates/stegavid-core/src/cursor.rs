use std::io::Cursor;

use crate::bit_iterator::BitIterator;

/// Position inside an envelope that is spread over many carrier units.
///
/// One cursor belongs to exactly one embedding run, it is handed by `&mut` to
/// every per-frame or per-block step so the bit offset carries over.
pub struct EmbeddingCursor {
    bits: BitIterator<Cursor<Vec<u8>>>,
    position: usize,
    total_bits: usize,
}

impl EmbeddingCursor {
    pub fn new(envelope: Vec<u8>) -> Self {
        let total_bits = envelope.len() * 8;

        Self {
            bits: BitIterator::new(Cursor::new(envelope)),
            position: 0,
            total_bits,
        }
    }

    /// next envelope bit, `None` once everything was handed out
    pub fn next_bit(&mut self) -> Option<bool> {
        if self.is_exhausted() {
            return None;
        }
        let bit = self.bits.next()?;
        self.position += 1;

        Some(bit)
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.total_bits
    }

    pub fn bits_written(&self) -> usize {
        self.position
    }

    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    pub fn remaining_bits(&self) -> usize {
        self.total_bits - self.position
    }
}
