use std::path::Path;

use crate::capacity::CapacityReport;
use crate::{CodecOptions, EngineConfig, StegError};

pub fn capacity(
    carrier: &Path,
    options: CodecOptions,
    config: EngineConfig,
) -> Result<CapacityReport, StegError> {
    crate::api::capacity::prepare()
        .with_options(options)
        .with_config(config)
        .with_carrier(carrier)
        .execute()
}
