use crate::error::StegDetectError;

pub type Result<T> = std::result::Result<T, StegDetectError>;
