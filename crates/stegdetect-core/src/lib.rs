//! # Stegdetect Core API
//!
//! Statistical detection of data hidden in the least significant bits of
//! raster images. Every image is inspected by four independent methods:
//! - LSB analysis: randomness and balance of the LSB planes
//! - chi-square test: pairs-of-values frequencies
//! - sample extraction: brute force search for known file formats or text
//! - histogram analysis: comb like irregularities
//!
//! and the [`StegDetector`] combines their verdicts into an [`AnalysisReport`].
//!
//! # Usage Examples
//!
//! ## Analyze an image
//!
//! ```rust
//! use stegdetect_core::PixelImage;
//!
//! let image = PixelImage::new(3, 1, 3, vec![10, 20, 30, 11, 21, 31, 12, 22, 32]).unwrap();
//! let report = stegdetect_core::StegDetector::new().analyze(&image);
//!
//! println!("{}", report.to_json_pretty().expect("Failed to serialize the report"));
//! ```
//!
//! ## Analyze all images of an archive
//!
//! ```rust,no_run
//! let report = stegdetect_core::api::analyze_zip::prepare()
//!     .from_file("images.zip")
//!     .execute()
//!     .expect("Failed to analyze the archive");
//!
//! for entry in report.entries {
//!     println!("{}: {:?}", entry.filename, entry.mime_type);
//! }
//! ```

#![warn(clippy::redundant_else)]

pub mod analysis;
pub mod api;
pub mod batch;
pub mod commands;
pub mod detector;
pub mod error;
pub mod media;
pub mod options;
pub mod report;
pub mod result;

pub use crate::batch::{BatchReport, BatchRunner};
pub use crate::detector::StegDetector;
pub use crate::error::StegDetectError;
pub use crate::media::PixelImage;
pub use crate::options::DetectorOptions;
pub use crate::report::AnalysisReport;
pub use crate::result::Result;
