use std::path::{Path, PathBuf};

use crate::capacity::{estimate, CapacityReport};
use crate::config::EngineConfig;
use crate::error::StegError;
use crate::media::CodecOptions;

use super::shared::describe;

pub fn prepare() -> CapacityApi {
    CapacityApi::default()
}

#[derive(Default, Debug)]
pub struct CapacityApi {
    carrier: Option<PathBuf>,
    options: CodecOptions,
    config: EngineConfig,
}

impl CapacityApi {
    /// The hiding method the capacity is computed for
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// A frame directory, video, WAV or any file for appending
    pub fn with_carrier<A: AsRef<Path>>(mut self, carrier: A) -> Self {
        self.carrier = Some(carrier.as_ref().to_path_buf());
        self
    }

    pub fn execute(self) -> Result<CapacityReport, StegError> {
        let Some(carrier) = self.carrier else {
            return Err(StegError::CarrierNotSet);
        };
        let descriptor = describe(&carrier, &self.options, &self.config)?;

        estimate(descriptor, &self.options)
    }
}
