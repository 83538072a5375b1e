use std::path::Path;

use crate::api::Input;
use crate::{AnalysisReport, DetectorOptions, StegDetectError, StegDetector};

pub fn prepare() -> AnalyzeApi {
    AnalyzeApi::default()
}

#[derive(Default, Debug)]
pub struct AnalyzeApi {
    input: Option<Input>,
    options: DetectorOptions,
}

impl AnalyzeApi {
    /// Use the given thresholds and limits
    pub fn with_options(mut self, options: DetectorOptions) -> Self {
        self.options = options;
        self
    }

    /// The image file to analyze
    pub fn from_file(mut self, image: impl AsRef<Path>) -> Self {
        self.input = Some(Input::File(image.as_ref().to_path_buf()));
        self
    }

    /// The encoded image to analyze, for example an upload kept in memory
    pub fn from_bytes(mut self, image: impl Into<Vec<u8>>) -> Self {
        self.input = Some(Input::Bytes(image.into()));
        self
    }

    /// Decode the image and run all detection methods on it
    pub fn execute(self) -> Result<AnalysisReport, StegDetectError> {
        let Some(input) = self.input else {
            return Err(StegDetectError::MissingInput);
        };
        let bytes = input.read("image size in bytes", self.options.max_image_bytes)?;

        StegDetector::with_options(self.options).analyze_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::{encode_png, gradient_rgb_image};

    #[test]
    fn illustrate_api_usage() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let image = temp_dir.path().join("gradient.png");
        fs::write(&image, encode_png(&gradient_rgb_image(16, 16))).unwrap();

        let report = crate::api::analyze::prepare()
            .from_file(&image)
            .execute()
            .expect("Failed to analyze the image");

        assert!(!report.steganography_detected);
    }

    #[test]
    fn should_fail_without_input() {
        assert!(matches!(
            prepare().execute(),
            Err(StegDetectError::MissingInput)
        ));
    }

    #[test]
    fn should_reject_big_files_before_reading_them() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let image = temp_dir.path().join("big.png");
        fs::write(&image, vec![0u8; 1024]).unwrap();

        let result = prepare()
            .with_options(DetectorOptions::default().with_max_image_bytes(100))
            .from_file(&image)
            .execute();

        assert!(matches!(
            result,
            Err(StegDetectError::ResourceLimitExceeded { actual: 1024, .. })
        ));
    }

    #[test]
    fn should_fail_on_missing_files() {
        assert!(matches!(
            prepare().from_file("does/not/exist.png").execute(),
            Err(StegDetectError::ReadError { .. })
        ));
    }
}
