//! Path based entry points, used by the command line front-end.

use std::path::Path;

use crate::{AnalysisReport, BatchReport, DetectorOptions, StegDetectError};

pub fn analyze(image: &Path, options: DetectorOptions) -> Result<AnalysisReport, StegDetectError> {
    crate::api::analyze::prepare()
        .with_options(options)
        .from_file(image)
        .execute()
}

pub fn analyze_zip(archive: &Path, options: DetectorOptions) -> Result<BatchReport, StegDetectError> {
    crate::api::analyze_zip::prepare()
        .with_options(options)
        .from_file(archive)
        .execute()
}

/// renders the amplified LSB planes of `image` into the PNG file `target`
pub fn lsb_picture(
    image: &Path,
    target: &Path,
    options: DetectorOptions,
) -> Result<(), StegDetectError> {
    crate::api::lsb_picture::prepare()
        .with_options(options)
        .from_file(image)
        .into_file(target)
        .execute()
}
