//! The statistical analyzers.
//!
//! Every analyzer inspects one [`PixelImage`] and produces a [`MethodResult`]
//! with its method specific findings. Analyzers are pure, they can run
//! concurrently on the same image.

pub mod chi_square;
pub mod extraction;
pub mod histogram;
pub mod lsb;
pub mod stats;

use std::fmt::Display;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::media::PixelImage;
use crate::result::Result;

pub use chi_square::{ChiSquareAnalyzer, ChiSquareFindings};
pub use extraction::{DataType, ExtractionFindings, SampleExtractor};
pub use histogram::{HistogramAnalyzer, HistogramFindings};
pub use lsb::{LsbAnalyzer, LsbFindings};

/// Method specific fields of a [`MethodResult`].
pub trait MethodFindings: Serialize {
    /// serialized field names, written as `null` when the method failed
    const FIELDS: &'static [&'static str];
}

/// the verdict of one detection method
///
/// `findings` carries the method specific fields, they are flattened into the
/// serialized object. A failed method still serializes every field, as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = "F: MethodFindings"))]
pub struct MethodResult<F> {
    pub detected: bool,
    pub confidence: f64,
    pub details: String,
    #[serde(flatten, serialize_with = "findings_or_nulls")]
    pub findings: Option<F>,
}

fn findings_or_nulls<F, S>(
    findings: &Option<F>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    F: MethodFindings,
    S: Serializer,
{
    match findings {
        Some(findings) => findings.serialize(serializer),
        None => {
            let mut map = serializer.serialize_map(Some(F::FIELDS.len()))?;
            for field in F::FIELDS {
                map.serialize_entry(field, &None::<()>)?;
            }
            map.end()
        }
    }
}

impl<F> MethodResult<F> {
    pub fn new(detected: bool, confidence: f64, details: impl Into<String>, findings: F) -> Self {
        Self {
            detected,
            confidence: unit_interval(confidence),
            details: details.into(),
            findings: Some(findings),
        }
    }

    /// a method that did not produce a verdict
    pub fn failed(cause: &dyn Display) -> Self {
        Self {
            detected: false,
            confidence: 0.0,
            details: format!("analysis failed: {cause}"),
            findings: None,
        }
    }
}

/// A detection method working on decoded pixels.
pub trait Analyzer {
    type Findings;

    /// human readable name, used in the report conclusion
    fn label(&self) -> &'static str;

    fn analyze(&self, image: &PixelImage) -> Result<MethodResult<Self::Findings>>;
}

/// clamps into [0, 1], NaN becomes 0
pub(crate) fn unit_interval(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StegDetectError;

    #[derive(Serialize)]
    struct Score {
        score: u8,
    }

    impl MethodFindings for Score {
        const FIELDS: &'static [&'static str] = &["score"];
    }

    #[test]
    fn should_clamp_confidence() {
        assert_eq!(MethodResult::new(true, 1.7, "", ()).confidence, 1.0);
        assert_eq!(MethodResult::new(false, -0.2, "", ()).confidence, 0.0);
        assert_eq!(MethodResult::new(false, f64::NAN, "", ()).confidence, 0.0);
    }

    #[test]
    fn should_flatten_findings_into_the_result() {
        let result = MethodResult::new(true, 0.5, "found", Score { score: 3 });
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["score"], 3);
        assert_eq!(json["detected"], true);
        assert_eq!(json["details"], "found");
    }

    #[test]
    fn failed_results_keep_the_findings_fields_as_null() {
        let result: MethodResult<Score> = MethodResult::failed(&StegDetectError::InvalidBitIndex(9));
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["detected"], false);
        assert_eq!(json["confidence"], 0.0);
        assert!(json.get("score").is_some_and(|score| score.is_null()));
        assert!(result.details.starts_with("analysis failed: "));
    }
}
