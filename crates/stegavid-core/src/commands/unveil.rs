use std::path::Path;

use crate::api::unveil::UnveilOutcome;
use crate::progress::ProgressSink;
use crate::{CodecOptions, EngineConfig, StegError};

pub fn unveil<P: ProgressSink>(
    secret_media: &Path,
    output_folder: &Path,
    password: Option<String>,
    options: CodecOptions,
    config: EngineConfig,
    progress: P,
) -> Result<UnveilOutcome, StegError> {
    crate::api::unveil::prepare()
        .with_options(options)
        .with_config(config)
        .from_secret_file(secret_media)
        .into_output_folder(output_folder)
        .using_password(password)
        .with_progress(progress)
        .execute()
}
