use serde::Serialize;

use crate::analysis::{
    ChiSquareFindings, ExtractionFindings, HistogramFindings, LsbFindings, MethodResult,
};
use crate::result::Result;

/// the four method verdicts, always in this order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionMethods {
    pub lsb_analysis: MethodResult<LsbFindings>,
    pub chi_square: MethodResult<ChiSquareFindings>,
    pub sample_extraction: MethodResult<ExtractionFindings>,
    pub histogram_analysis: MethodResult<HistogramFindings>,
}

/// Verdict on one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub steganography_detected: bool,
    pub conclusion: String,
    /// base64 encoded PNG of the amplified LSB plane, `null` if it could not be rendered
    pub lsbpic: Option<String>,
    pub detection_methods: DetectionMethods,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
