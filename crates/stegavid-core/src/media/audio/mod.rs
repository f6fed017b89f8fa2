mod dct;
mod dct_codec;
mod wav;

pub use dct::*;
pub use dct_codec::*;
pub use wav::*;

/// What the capacity math needs to know about an audio carrier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioGeometry {
    /// samples of a single channel
    pub sample_count: usize,
    pub channels: u16,
    pub sample_rate: u32,
    pub block_size: usize,
}

impl AudioGeometry {
    pub fn blocks(&self) -> usize {
        if self.block_size == 0 {
            return 0;
        }
        self.sample_count / self.block_size
    }
}
