use std::fs;
use std::path::Path;

use stegdetect_core::StegDetectError;

use crate::CliResult;

pub mod analyze;
pub mod analyze_zip;
pub mod lsb_picture;

/// prints the document to stdout, or writes it into `target`
pub(crate) fn emit(json: String, target: Option<&Path>) -> CliResult<()> {
    match target {
        Some(target) => {
            fs::write(target, json).map_err(|source| StegDetectError::WriteError { source })
        }
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
