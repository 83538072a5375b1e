use base64::{engine::general_purpose, Engine as _};
use log::{debug, warn};

use crate::analysis::{
    Analyzer, ChiSquareAnalyzer, HistogramAnalyzer, LsbAnalyzer, MethodResult, SampleExtractor,
};
use crate::media::image::{decode, render_lsb_png};
use crate::media::PixelImage;
use crate::options::DetectorOptions;
use crate::report::{AnalysisReport, DetectionMethods};
use crate::result::Result;

/// Runs every analyzer on an image and combines their verdicts.
///
/// ## Example of usage
/// ```rust
/// use stegdetect_core::{PixelImage, StegDetector};
///
/// let image = PixelImage::new(2, 2, 1, vec![10, 10, 10, 10]).unwrap();
/// let report = StegDetector::new().analyze(&image);
///
/// assert!(!report.steganography_detected);
/// assert_eq!(report.conclusion, "No hidden data detected");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StegDetector {
    options: DetectorOptions,
}

impl StegDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DetectorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Decodes an encoded image and analyzes it.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<AnalysisReport> {
        let image = decode(bytes, &self.options)?;
        Ok(self.analyze(&image))
    }

    /// An analyzer that fails ends up as an undetected method result,
    /// the remaining analyzers are not affected.
    pub fn analyze(&self, image: &PixelImage) -> AnalysisReport {
        let options = &self.options;
        let ((lsb_analysis, chi_square), (sample_extraction, (histogram_analysis, lsbpic))) = join(
            || {
                join(
                    || run(&LsbAnalyzer::new(options), image),
                    || run(&ChiSquareAnalyzer::new(options), image),
                )
            },
            || {
                join(
                    || run(&SampleExtractor::new(options), image),
                    || {
                        join(
                            || run(&HistogramAnalyzer::new(options), image),
                            || lsb_picture(image),
                        )
                    },
                )
            },
        );

        let fired: Vec<&'static str> = [
            (lsb_analysis.detected, LsbAnalyzer::new(options).label()),
            (chi_square.detected, ChiSquareAnalyzer::new(options).label()),
            (
                sample_extraction.detected,
                SampleExtractor::new(options).label(),
            ),
            (
                histogram_analysis.detected,
                HistogramAnalyzer::new(options).label(),
            ),
        ]
        .into_iter()
        .filter_map(|(detected, label)| detected.then_some(label))
        .collect();
        debug!("Methods that detected hidden data: {fired:?}");

        AnalysisReport {
            steganography_detected: !fired.is_empty(),
            conclusion: conclude(&fired),
            lsbpic,
            detection_methods: DetectionMethods {
                lsb_analysis,
                chi_square,
                sample_extraction,
                histogram_analysis,
            },
        }
    }
}

fn run<A: Analyzer>(analyzer: &A, image: &PixelImage) -> MethodResult<A::Findings> {
    analyzer.analyze(image).unwrap_or_else(|e| {
        warn!("{} failed: {e}", analyzer.label());
        MethodResult::failed(&e)
    })
}

fn lsb_picture(image: &PixelImage) -> Option<String> {
    match render_lsb_png(image) {
        Ok(png) => Some(general_purpose::STANDARD.encode(png)),
        Err(e) => {
            warn!("LSB picture could not be rendered: {e}");
            None
        }
    }
}

pub(crate) fn conclude(fired: &[&str]) -> String {
    match fired {
        [] => "No hidden data detected".to_string(),
        [method] => format!("Possible hidden data detected ({method})"),
        methods => format!("High probability of hidden data ({})", methods.join(", ")),
    }
}

#[cfg(feature = "parallel")]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    rayon::join(a, b)
}

#[cfg(not(feature = "parallel"))]
fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA,
    B: FnOnce() -> RB,
{
    (a(), b())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StegDetectError;
    use crate::test_utils::{
        embed_lsb_first, encode_png, gradient_rgb_image, noise_rgb_image, solid_rgb_image,
    };

    #[test]
    fn should_phrase_the_conclusion_by_number_of_methods() {
        assert_eq!(conclude(&[]), "No hidden data detected");
        assert_eq!(
            conclude(&["chi-square test"]),
            "Possible hidden data detected (chi-square test)"
        );
        assert_eq!(
            conclude(&["LSB analysis", "sample extraction"]),
            "High probability of hidden data (LSB analysis, sample extraction)"
        );
    }

    #[test]
    fn clean_images_are_not_flagged() {
        let report = StegDetector::new().analyze(&gradient_rgb_image(24, 24));

        assert!(!report.steganography_detected);
        assert_eq!(report.conclusion, "No hidden data detected");
        assert!(report.lsbpic.is_some());
    }

    #[test]
    fn embedded_text_is_reported() {
        let img = embed_lsb_first(&solid_rgb_image(32, 32, [11, 21, 31]), 2, b"secret words");
        let report = StegDetector::new().analyze(&img);
        let extraction = &report.detection_methods.sample_extraction;
        let findings = extraction.findings.as_ref().unwrap();

        assert!(report.steganography_detected);
        assert!(extraction.detected);
        assert_eq!(findings.sample_text.as_deref(), Some("secret words"));
        assert!(report.conclusion.contains("sample extraction"));
    }

    #[test]
    fn should_decode_and_analyze_bytes() {
        let png = encode_png(&noise_rgb_image(32, 32, 1));
        let report = StegDetector::new().analyze_bytes(&png).unwrap();
        let lsbpic = general_purpose::STANDARD
            .decode(report.lsbpic.unwrap())
            .unwrap();

        assert!(lsbpic.starts_with(b"\x89PNG"));
    }

    #[test]
    fn should_fail_on_garbage_bytes() {
        assert!(matches!(
            StegDetector::new().analyze_bytes(b"not an image"),
            Err(StegDetectError::DecodeError(_))
        ));
    }

    #[test]
    fn should_survive_a_single_pixel() {
        let img = PixelImage::new(1, 1, 3, vec![1, 2, 3]).unwrap();
        let report = StegDetector::new().analyze(&img);
        let methods = &report.detection_methods;

        for confidence in [
            methods.lsb_analysis.confidence,
            methods.chi_square.confidence,
            methods.sample_extraction.confidence,
            methods.histogram_analysis.confidence,
        ] {
            assert!((0.0..=1.0).contains(&confidence));
        }
    }
}
