use crate::error::StegError;

pub type Result<T> = std::result::Result<T, StegError>;
