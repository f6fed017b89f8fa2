use std::io::Read;

use bitstream_io::{BigEndian, BitRead, BitReader};

/// Iterates the bits of a byte source, most significant bit of every byte first.
pub struct BitIterator<R: Read> {
    reader: BitReader<R, BigEndian>,
}

impl<R: Read> BitIterator<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BitReader::endian(source, BigEndian),
        }
    }
}

impl<R: Read> Iterator for BitIterator<R> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_bit().ok()
    }
}

/// Packs single bits back into bytes, the first bit pushed ends up as the most significant one.
#[derive(Debug, Default)]
pub struct ByteAssembler {
    current: u8,
    filled: u8,
}

impl ByteAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// returns the byte once 8 bits have been pushed
    pub fn push_bit(&mut self, bit: bool) -> Option<u8> {
        self.current = (self.current << 1) | u8::from(bit);
        self.filled += 1;
        if self.filled < 8 {
            return None;
        }
        let byte = self.current;
        self.current = 0;
        self.filled = 0;

        Some(byte)
    }

    /// number of bits waiting for the byte to be completed
    pub fn pending_bits(&self) -> u8 {
        self.filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assembler_restores_iterated_bytes() {
        let data = b"STEG";
        let mut assembler = ByteAssembler::new();
        let bytes: Vec<u8> = BitIterator::new(&data[..])
            .filter_map(|bit| assembler.push_bit(bit))
            .collect();

        assert_eq!(bytes.as_slice(), data);
        assert_eq!(assembler.pending_bits(), 0);
    }

    #[test]
    fn test_assembler_keeps_partial_byte() {
        let mut assembler = ByteAssembler::new();
        assert_eq!(assembler.push_bit(true), None);
        assert_eq!(assembler.push_bit(false), None);
        assert_eq!(assembler.pending_bits(), 2);
    }
}
