/// Stores one bit in the least significant bit of a carrier sample
pub trait HideBit {
    fn hide_bit(self, bit: bool);
}

impl HideBit for &mut u8 {
    fn hide_bit(self, bit: bool) {
        *self = (*self & (u8::MAX - 1)) | u8::from(bit);
    }
}

/// Reads the bit stored by [`HideBit`]
pub trait UnveilBit {
    fn unveil_bit(&self) -> bool;
}

impl UnveilBit for u8 {
    fn unveil_bit(&self) -> bool {
        self & 1 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hide_and_unveil() {
        let mut sample = 0b1010_1010u8;
        (&mut sample).hide_bit(true);
        assert_eq!(sample, 0b1010_1011);
        assert!(sample.unveil_bit());

        (&mut sample).hide_bit(false);
        assert_eq!(sample, 0b1010_1010);
        assert!(!sample.unveil_bit());
    }
}
