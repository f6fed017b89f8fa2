use crate::error::StegError;
use crate::result::Result;

/// Hiding method together with its tunables
///
/// The method decides which carriers are accepted and which envelope is used:
/// - `FrameLsb` → a file in the pixel LSBs of all three channels of video frames
/// - `TextLsb` → a password encrypted text in the blue channel LSBs of video frames
/// - `AudioDct` → a text in the relation of two DCT coefficients per audio block
/// - `ContainerAppend` → a file appended behind the end of any file
#[derive(Debug, Clone, PartialEq)]
pub enum CodecOptions {
    FrameLsb(FrameLsbOptions),
    TextLsb(TextLsbOptions),
    AudioDct(DctCodecOptions),
    ContainerAppend,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self::FrameLsb(FrameLsbOptions::default())
    }
}

impl CodecOptions {
    pub fn frame_lsb() -> Self {
        Self::FrameLsb(FrameLsbOptions::default())
    }

    pub fn text_lsb() -> Self {
        Self::TextLsb(TextLsbOptions::default())
    }

    pub fn audio_dct() -> Self {
        Self::AudioDct(DctCodecOptions::default())
    }

    /// whether the method protects its payload with a password
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::TextLsb(_))
    }

    /// whether the method carries a whole file instead of a text
    pub fn carries_file(&self) -> bool {
        matches!(self, Self::FrameLsb(_) | Self::ContainerAppend)
    }
}

/// Which color channels of a BGR frame carry bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelection {
    /// every channel, flattened in row major and channel interleaved order
    All,
    /// only the channel at this index, 0 is blue
    Single(usize),
}

impl ChannelSelection {
    pub fn channels_used(&self, channels: usize) -> usize {
        match self {
            ChannelSelection::All => channels,
            ChannelSelection::Single(index) if *index < channels => 1,
            ChannelSelection::Single(_) => 0,
        }
    }
}

/// Options for hiding a file in video frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLsbOptions {
    /// trailing frames kept free as safety margin, they are not counted as capacity
    pub reserved_frames: usize,
}

impl Default for FrameLsbOptions {
    fn default() -> Self {
        Self { reserved_frames: 10 }
    }
}

impl FrameLsbOptions {
    pub fn with_reserved_frames(mut self, reserved_frames: usize) -> Self {
        self.reserved_frames = reserved_frames;
        self
    }
}

/// Options for hiding an encrypted text in video frames
#[derive(Debug, Clone, PartialEq)]
pub struct TextLsbOptions {
    /// the channel carrying the bits, 0 is blue
    pub channel: usize,
    /// fraction of frames counted as capacity, at least one frame is always used
    pub frame_fraction: f64,
}

impl Default for TextLsbOptions {
    fn default() -> Self {
        Self {
            channel: 0,
            frame_fraction: 0.8,
        }
    }
}

impl TextLsbOptions {
    pub fn with_channel(mut self, channel: usize) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_frame_fraction(mut self, frame_fraction: f64) -> Self {
        self.frame_fraction = frame_fraction;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel > 2 {
            return Err(StegError::InvalidCodecOptions(format!(
                "channel {} does not exist in a BGR frame",
                self.channel
            )));
        }
        if !(self.frame_fraction > 0.0 && self.frame_fraction <= 1.0) {
            return Err(StegError::InvalidCodecOptions(format!(
                "frame fraction {} is not within (0, 1]",
                self.frame_fraction
            )));
        }

        Ok(())
    }
}

/// Options for hiding a text in the DCT coefficients of audio blocks
#[derive(Debug, Clone, PartialEq)]
pub struct DctCodecOptions {
    /// samples per block, every block carries one bit
    pub block_size: usize,
    /// the two coefficient positions compared, the first has to be the lower one
    pub coefficients: (usize, usize),
    /// minimum distance between both coefficients after embedding
    pub margin: f64,
}

impl Default for DctCodecOptions {
    fn default() -> Self {
        Self {
            block_size: 128,
            coefficients: (4, 8),
            margin: 400.0,
        }
    }
}

impl DctCodecOptions {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_coefficients(mut self, low: usize, high: usize) -> Self {
        self.coefficients = (low, high);
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let (low, high) = self.coefficients;
        if self.block_size < 2 {
            return Err(StegError::InvalidCodecOptions(format!(
                "block size {} is too small",
                self.block_size
            )));
        }
        if low >= high || high >= self.block_size {
            return Err(StegError::InvalidCodecOptions(format!(
                "coefficients ({low}, {high}) do not fit a block of {}",
                self.block_size
            )));
        }
        if !(self.margin.is_finite() && self.margin > 0.0) {
            return Err(StegError::InvalidCodecOptions(format!(
                "margin {} is not a positive number",
                self.margin
            )));
        }

        Ok(())
    }
}
