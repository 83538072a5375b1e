use std::path::PathBuf;

use clap::Args;
use stegdetect_core::DetectorOptions;

use crate::CliResult;

/// Renders the least significant bits of an image as a black and white PNG
#[derive(Args, Debug)]
pub struct LsbPictureArgs {
    /// Image file such as PNG or JPEG, used readonly.
    #[arg(short = 'i', long = "in", value_name = "image file", required = true)]
    pub media: PathBuf,

    /// The rendered PNG will be stored as file
    #[arg(
        short = 'o',
        long = "out",
        value_name = "output image file",
        required = true
    )]
    pub write_to_file: PathBuf,
}

impl LsbPictureArgs {
    pub fn run(self, options: DetectorOptions) -> CliResult<()> {
        stegdetect_core::commands::lsb_picture(&self.media, &self.write_to_file, options)
    }
}
