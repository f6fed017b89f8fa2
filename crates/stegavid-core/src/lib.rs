//! # Stegavid Core API
//!
//! Hides a text or a whole file inside a media carrier so that the carrier
//! stays usable and the payload can be recovered bit exactly later on.
//! The method is picked with [`CodecOptions`]:
//!
//! - [`CodecOptions::FrameLsb`] hides a file in the pixel LSBs of video frames
//! - [`CodecOptions::TextLsb`] hides a password encrypted text in the blue channel of video frames
//! - [`CodecOptions::AudioDct`] hides a text in DCT coefficients of audio blocks
//! - [`CodecOptions::ContainerAppend`] appends a file behind the end of any file
//!
//! The builders in [`api`] are the entry points, [`commands`] wraps them in
//! plain functions. Video carriers are decoded and encoded by `ffmpeg`,
//! frame directories (PNG) and WAV files are handled in process.
//!
//! # Usage Examples
//!
//! ## Hide a file behind the end of another file
//!
//! ```rust
//! use stegavid_core::CodecOptions;
//! use tempfile::tempdir;
//!
//! let temp_dir = tempdir().expect("Failed to create temporary directory");
//!
//! let outcome = stegavid_core::api::hide::prepare()
//!     .with_file("Cargo.toml")            // will hide this file
//!     .with_carrier("src/lib.rs")         // behind the end of this one
//!     .with_options(CodecOptions::ContainerAppend)
//!     .with_output(temp_dir.path().join("lib-with-a-file-inside.rs"))
//!     .execute()
//!     .expect("Failed to hide file");
//!
//! assert!(!outcome.warnings.is_empty());
//! ```
//!
//! ## Hide an encrypted text in the frames of a video
//!
//! ```rust,no_run
//! use stegavid_core::{CodecOptions, EngineConfig};
//!
//! stegavid_core::api::hide::prepare()
//!     .with_message("Hello, World!")
//!     .with_password("SuperSecret42")
//!     .with_carrier("holiday.mp4")
//!     .with_options(CodecOptions::text_lsb())
//!     .with_config(EngineConfig::default().with_ffmpeg("/usr/local/bin/ffmpeg"))
//!     .with_output("holiday-with-secret.mkv")
//!     .with_progress(|percent: u8| eprint!("\r{percent:>3}%"))
//!     .execute()
//!     .expect("Failed to hide message in video");
//! ```
//!
//! ## Unveil a text from a WAV file
//!
//! ```rust,no_run
//! use stegavid_core::api::unveil::Recovered;
//! use stegavid_core::CodecOptions;
//!
//! let outcome = stegavid_core::api::unveil::prepare()
//!     .from_secret_file("voice-with-secret.wav")
//!     .with_options(CodecOptions::audio_dct())
//!     .execute()
//!     .expect("Failed to unveil message from audio");
//!
//! if let Recovered::Text(text) = outcome.recovered {
//!     println!("{text}");
//! }
//! ```

#![warn(
    // clippy::unwrap_used,
    // clippy::expect_used,
// clippy::cargo_common_metadata,
// clippy::branches_sharing_code,
// clippy::cast_lossless,
// clippy::cognitive_complexity,
// clippy::get_unwrap,
// clippy::if_then_some_else_none,
// clippy::inefficient_to_string,
// clippy::match_bool,
// clippy::missing_const_for_fn,
// clippy::missing_panics_doc,
// clippy::option_if_let_else,
// clippy::redundant_closure,
    clippy::redundant_else,
// clippy::redundant_pub_crate,
// clippy::ref_binding_to_reference,
// clippy::ref_option_ref,
// clippy::same_functions_in_if_condition,
// clippy::unneeded_field_pattern,
// clippy::unnested_or_patterns,
// clippy::use_self,
)]

pub mod api;
pub mod bit_iterator;
pub mod capacity;
pub mod commands;
pub mod config;
pub mod cursor;
pub mod error;
pub mod media;
pub mod progress;
pub mod result;
pub mod transcoder;

pub use crate::api::hide::HideOutcome;
pub use crate::api::unveil::{Recovered, UnveilOutcome};
pub use crate::api::Password;
pub use crate::capacity::{CapacityReport, CapacityUnit, CapacityUsage, CarrierDescriptor};
pub use crate::config::EngineConfig;
pub use crate::error::StegError;
pub use crate::media::payload::{Metadata, Payload};
pub use crate::media::CodecOptions;
pub use crate::progress::{Interrupt, ProgressSink};
pub use crate::result::Result;
