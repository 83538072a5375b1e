use std::path::Path;

use crate::api::Input;
use crate::{BatchReport, BatchRunner, DetectorOptions, StegDetectError, StegDetector};

pub fn prepare() -> AnalyzeZipApi {
    AnalyzeZipApi::default()
}

#[derive(Default, Debug)]
pub struct AnalyzeZipApi {
    input: Option<Input>,
    options: DetectorOptions,
}

impl AnalyzeZipApi {
    /// Use the given thresholds and limits
    pub fn with_options(mut self, options: DetectorOptions) -> Self {
        self.options = options;
        self
    }

    /// The ZIP archive whose images are analyzed
    pub fn from_file(mut self, archive: impl AsRef<Path>) -> Self {
        self.input = Some(Input::File(archive.as_ref().to_path_buf()));
        self
    }

    pub fn from_bytes(mut self, archive: impl Into<Vec<u8>>) -> Self {
        self.input = Some(Input::Bytes(archive.into()));
        self
    }

    /// Read the archive and analyze every image member, blocks until all are done
    pub fn execute(self) -> Result<BatchReport, StegDetectError> {
        let Some(input) = self.input else {
            return Err(StegDetectError::MissingInput);
        };
        let bytes = input.read("archive size in bytes", self.options.max_archive_bytes)?;

        BatchRunner::new(StegDetector::with_options(self.options)).run_archive(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_fail_without_input() {
        assert!(matches!(
            prepare().execute(),
            Err(StegDetectError::MissingInput)
        ));
    }

    #[test]
    fn should_fail_on_bytes_that_are_not_a_zip() {
        assert!(matches!(
            prepare().from_bytes(b"not a zip".to_vec()).execute(),
            Err(StegDetectError::UnsupportedArchive(_))
        ));
    }
}
