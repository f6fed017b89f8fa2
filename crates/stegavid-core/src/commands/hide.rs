use std::path::{Path, PathBuf};

use crate::api::hide::HideOutcome;
use crate::progress::ProgressSink;
use crate::{CodecOptions, EngineConfig, StegError};

#[allow(clippy::too_many_arguments)]
pub fn hide<P: ProgressSink>(
    carrier: &Path,
    write_to_file: &Path,
    data_file: Option<PathBuf>,
    message: Option<String>,
    password: Option<String>,
    options: CodecOptions,
    config: EngineConfig,
    progress: P,
) -> Result<HideOutcome, StegError> {
    crate::api::hide::prepare()
        .with_options(options)
        .with_config(config)
        .with_carrier(carrier)
        .with_output(write_to_file)
        .use_password(password)
        .use_file(data_file)
        .use_message(message)
        .with_progress(progress)
        .execute()
}
