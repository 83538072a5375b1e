use serde::Serialize;

use crate::analysis::{Analyzer, MethodFindings, MethodResult};
use crate::media::image::{extract_lsb, BitPlane};
use crate::media::PixelImage;
use crate::options::DetectorOptions;
use crate::result::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LsbFindings {
    /// 1.0 when the LSB plane flips as often as random data does
    pub randomness_score: f64,
    /// 1.0 when the LSB plane holds as many ones as zeros
    pub bit_distribution_score: f64,
}

impl MethodFindings for LsbFindings {
    const FIELDS: &'static [&'static str] = &["randomness_score", "bit_distribution_score"];
}

/// Randomness and balance of the LSB planes of all color channels.
///
/// Natural images have structured LSBs in flat regions, embedded (usually
/// compressed or encrypted) data makes them random and balanced. Both scores
/// have to be high, one alone also fires on noisy natural images.
pub struct LsbAnalyzer<'o> {
    options: &'o DetectorOptions,
}

impl<'o> LsbAnalyzer<'o> {
    pub fn new(options: &'o DetectorOptions) -> Self {
        Self { options }
    }
}

impl Analyzer for LsbAnalyzer<'_> {
    type Findings = LsbFindings;

    fn label(&self) -> &'static str {
        "LSB analysis"
    }

    fn analyze(&self, image: &PixelImage) -> Result<MethodResult<LsbFindings>> {
        let channels = image.color_channels();
        let mut randomness = 0.0;
        let mut distribution = 0.0;
        for channel in 0..channels {
            let plane = extract_lsb(image, channel)?;
            randomness += randomness_score(&plane);
            distribution += distribution_score(&plane);
        }
        randomness /= channels as f64;
        distribution /= channels as f64;

        let detected = randomness > self.options.lsb_randomness_threshold
            && distribution > self.options.lsb_distribution_threshold;
        let details = if detected {
            format!(
                "LSB patterns are random and balanced, a sign of embedded data (randomness {randomness:.3}, bit distribution {distribution:.3})"
            )
        } else {
            format!(
                "LSB patterns show natural structure (randomness {randomness:.3}, bit distribution {distribution:.3})"
            )
        };

        Ok(MethodResult::new(
            detected,
            (randomness + distribution) / 2.0,
            details,
            LsbFindings {
                randomness_score: randomness,
                bit_distribution_score: distribution,
            },
        ))
    }
}

/// transition ratio mapped so that 0.5 (random) scores 1.0
pub fn randomness_score(plane: &BitPlane) -> f64 {
    let max = plane.max_transitions();
    if max == 0 {
        return 0.0;
    }
    let ratio = plane.transitions() as f64 / max as f64;
    1.0 - 2.0 * (ratio - 0.5).abs()
}

/// ones ratio mapped so that 0.5 (balanced) scores 1.0
pub fn distribution_score(plane: &BitPlane) -> f64 {
    if plane.is_empty() {
        return 0.0;
    }
    let ratio = plane.ones() as f64 / plane.len() as f64;
    1.0 - 2.0 * (ratio - 0.5).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{noise_rgb_image, solid_rgb_image};

    #[test]
    fn solid_images_have_structured_lsbs() {
        let options = DetectorOptions::default();
        let result = LsbAnalyzer::new(&options)
            .analyze(&solid_rgb_image(32, 32, [200, 201, 17]))
            .unwrap();
        let findings = result.findings.unwrap();

        assert!(!result.detected);
        assert_eq!(findings.randomness_score, 0.0);
        assert_eq!(findings.bit_distribution_score, 0.0);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn random_lsbs_are_detected() {
        let options = DetectorOptions::default();
        let result = LsbAnalyzer::new(&options)
            .analyze(&noise_rgb_image(128, 128, 7))
            .unwrap();

        assert!(result.detected, "{}", result.details);
        assert!(result.confidence >= options.lsb_confidence_threshold());
    }

    #[test]
    fn checkerboard_is_balanced_but_not_random() {
        let mut samples = Vec::new();
        for y in 0..16u32 {
            for x in 0..16u32 {
                samples.push(((x + y) % 2) as u8);
            }
        }
        let img = PixelImage::new(16, 16, 1, samples).unwrap();
        let options = DetectorOptions::default();
        let result = LsbAnalyzer::new(&options).analyze(&img).unwrap();
        let findings = result.findings.unwrap();

        assert!(!result.detected);
        assert_eq!(findings.bit_distribution_score, 1.0);
        assert_eq!(findings.randomness_score, 0.0, "every neighbour differs");
    }

    #[test]
    fn should_not_crash_on_a_single_pixel() {
        let options = DetectorOptions::default();
        let img = PixelImage::new(1, 1, 4, vec![1, 2, 3, 4]).unwrap();
        let result = LsbAnalyzer::new(&options).analyze(&img).unwrap();

        assert!(!result.detected);
        assert!((0.0..=1.0).contains(&result.confidence));
    }
}
