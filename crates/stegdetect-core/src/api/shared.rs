use std::fs;
use std::path::PathBuf;

use crate::error::StegDetectError;
use crate::result::Result;

/// where the bytes to analyze come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    File(PathBuf),
    Bytes(Vec<u8>),
}

impl Input {
    /// Reads the whole input, a file bigger than `limit` is rejected before it is read.
    pub(crate) fn read(self, subject: &'static str, limit: u64) -> Result<Vec<u8>> {
        match self {
            Input::File(path) => {
                let size = fs::metadata(&path)
                    .map_err(|source| StegDetectError::ReadError { source })?
                    .len();
                if size > limit {
                    return Err(StegDetectError::ResourceLimitExceeded {
                        subject,
                        actual: size,
                        limit,
                    });
                }
                fs::read(&path).map_err(|source| StegDetectError::ReadError { source })
            }
            Input::Bytes(bytes) => Ok(bytes),
        }
    }
}
