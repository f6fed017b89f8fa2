mod frame;
mod frame_sequence;
mod lsb_codec;
mod raw_pipe;
mod source;

pub use frame::*;
pub use frame_sequence::*;
pub use lsb_codec::*;
pub use raw_pipe::*;
pub use source::*;

use std::path::Path;

/// container extensions handed to ffmpeg
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "avi", "mkv", "mov", "webm"];

pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// frames re-encoded losslessly have to land in a container that takes FFV1,
/// anything but `.mkv` and `.avi` is replaced by `.mkv`
pub fn lossless_output_path(output: &Path) -> std::path::PathBuf {
    match output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("mkv") | Some("avi") => output.to_path_buf(),
        _ => output.with_extension("mkv"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_extensions() {
        assert!(is_video_file(Path::new("movie.MP4")));
        assert!(is_video_file(Path::new("a/b/clip.webm")));
        assert!(!is_video_file(Path::new("song.wav")));
        assert!(!is_video_file(Path::new("frames")));
    }

    #[test]
    fn test_lossless_output_path() {
        assert_eq!(lossless_output_path(Path::new("out.mp4")), Path::new("out.mkv"));
        assert_eq!(lossless_output_path(Path::new("out.avi")), Path::new("out.avi"));
        assert_eq!(lossless_output_path(Path::new("out.MKV")), Path::new("out.MKV"));
        assert_eq!(lossless_output_path(Path::new("out")), Path::new("out.mkv"));
    }
}
