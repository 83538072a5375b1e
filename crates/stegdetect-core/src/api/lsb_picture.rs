use std::fs;
use std::path::{Path, PathBuf};

use crate::api::Input;
use crate::media::image::{decode, render_lsb_png};
use crate::{DetectorOptions, StegDetectError};

pub fn prepare() -> LsbPictureApi {
    LsbPictureApi::default()
}

#[derive(Default, Debug)]
pub struct LsbPictureApi {
    input: Option<Input>,
    output: Option<PathBuf>,
    options: DetectorOptions,
}

impl LsbPictureApi {
    pub fn with_options(mut self, options: DetectorOptions) -> Self {
        self.options = options;
        self
    }

    /// The image whose LSB planes are rendered
    pub fn from_file(mut self, image: impl AsRef<Path>) -> Self {
        self.input = Some(Input::File(image.as_ref().to_path_buf()));
        self
    }

    pub fn from_bytes(mut self, image: impl Into<Vec<u8>>) -> Self {
        self.input = Some(Input::Bytes(image.into()));
        self
    }

    /// The PNG file that is written
    pub fn into_file(mut self, output: impl AsRef<Path>) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    pub fn execute(self) -> Result<(), StegDetectError> {
        let Some(input) = self.input else {
            return Err(StegDetectError::MissingInput);
        };
        let Some(output) = self.output else {
            return Err(StegDetectError::MissingOutput);
        };

        let bytes = input.read("image size in bytes", self.options.max_image_bytes)?;
        let png = render_lsb_png(&decode(&bytes, &self.options)?)?;

        fs::write(output, png).map_err(|source| StegDetectError::WriteError { source })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::{encode_png, noise_rgb_image};

    #[test]
    fn illustrate_api_usage() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let target = temp_dir.path().join("lsb.png");

        crate::api::lsb_picture::prepare()
            .from_bytes(encode_png(&noise_rgb_image(10, 7, 3)))
            .into_file(&target)
            .execute()
            .expect("Failed to render the LSB picture");

        let rendered = image::open(&target).unwrap().to_rgb8();
        assert_eq!(rendered.dimensions(), (10, 7));
        assert!(rendered.pixels().flat_map(|p| p.0).all(|s| s == 0 || s == 255));
    }

    #[test]
    fn should_fail_without_output() {
        assert!(matches!(
            prepare().from_bytes(vec![1, 2, 3]).execute(),
            Err(StegDetectError::MissingOutput)
        ));
    }
}
