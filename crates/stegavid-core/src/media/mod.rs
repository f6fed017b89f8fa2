pub mod audio;
pub mod codec_options;
pub mod container;
pub mod payload;
mod primitives;
pub mod video;

use std::path::Path;

pub use codec_options::{
    ChannelSelection, CodecOptions, DctCodecOptions, FrameLsbOptions, TextLsbOptions,
};
pub use primitives::*;

pub trait Persist {
    fn save_as(&mut self, _: &Path) -> crate::Result<()>;
}

/// How a carrier path is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind {
    /// a directory of PNG frames
    FrameSequence,
    /// a video container handled by ffmpeg
    Video,
    /// a 16 bit PCM WAV file
    Wav,
    /// anything else, only usable for appending
    Other,
}

impl CarrierKind {
    pub fn of(path: &Path) -> Self {
        if path.is_dir() {
            return CarrierKind::FrameSequence;
        }
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("wav"))
            .unwrap_or(false);
        if is_wav {
            CarrierKind::Wav
        } else if video::is_video_file(path) {
            CarrierKind::Video
        } else {
            CarrierKind::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carrier_kind() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(CarrierKind::of(dir.path()), CarrierKind::FrameSequence);
        assert_eq!(CarrierKind::of(Path::new("a.WAV")), CarrierKind::Wav);
        assert_eq!(CarrierKind::of(Path::new("a.mov")), CarrierKind::Video);
        assert_eq!(CarrierKind::of(Path::new("a.pdf")), CarrierKind::Other);
    }
}
