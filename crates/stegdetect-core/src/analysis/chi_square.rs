use serde::Serialize;

use crate::analysis::stats::chi_square_upper_tail;
use crate::analysis::{Analyzer, MethodFindings, MethodResult};
use crate::media::PixelImage;
use crate::options::DetectorOptions;
use crate::result::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareFindings {
    pub chi_square_value: f64,
    pub p_value: f64,
}

impl MethodFindings for ChiSquareFindings {
    const FIELDS: &'static [&'static str] = &["chi_square_value", "p_value"];
}

/// Pairs-of-values test over the pooled color histogram.
///
/// Each pair `(2k, 2k+1)` is compared against its own mean. A large deviation
/// measured against the number of samples means the LSBs of the pixels are far
/// from an even split, as happens when a payload forces them.
pub struct ChiSquareAnalyzer<'o> {
    options: &'o DetectorOptions,
}

impl<'o> ChiSquareAnalyzer<'o> {
    pub fn new(options: &'o DetectorOptions) -> Self {
        Self { options }
    }
}

/// statistic and degrees of freedom of the pairs-of-values test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairsOfValues {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub samples: u64,
}

impl PairsOfValues {
    pub fn from_histogram(hist: &[u64; 256]) -> Self {
        let mut statistic = 0.0;
        let mut pairs: usize = 0;
        for pair in hist.chunks_exact(2) {
            let (even, odd) = (pair[0] as f64, pair[1] as f64);
            let expected = (even + odd) / 2.0;
            if expected > 0.0 {
                statistic += (even - expected).powi(2) / expected;
                statistic += (odd - expected).powi(2) / expected;
                pairs += 1;
            }
        }

        Self {
            statistic,
            degrees_of_freedom: pairs.saturating_sub(1),
            samples: hist.iter().sum(),
        }
    }

    pub fn p_value(&self) -> f64 {
        chi_square_upper_tail(self.statistic, self.degrees_of_freedom)
    }

    /// statistic per sample
    pub fn deviation(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.statistic / self.samples as f64
        }
    }
}

impl Analyzer for ChiSquareAnalyzer<'_> {
    type Findings = ChiSquareFindings;

    fn label(&self) -> &'static str {
        "chi-square test"
    }

    fn analyze(&self, image: &PixelImage) -> Result<MethodResult<ChiSquareFindings>> {
        let mut pooled = [0u64; 256];
        for channel in 0..image.color_channels() {
            for (total, count) in pooled.iter_mut().zip(image.histogram(channel)) {
                *total += count;
            }
        }

        let test = PairsOfValues::from_histogram(&pooled);
        let p_value = test.p_value();
        let deviation = test.deviation();
        let min_deviation = self.options.chi_square_min_deviation;

        let conclusive = test.degrees_of_freedom > 0;
        let detected = conclusive
            && p_value < self.options.chi_square_significance
            && deviation >= min_deviation;
        let weight = if min_deviation > 0.0 {
            (deviation / min_deviation).min(1.0)
        } else {
            1.0
        };
        let confidence = if conclusive {
            (1.0 - p_value) * weight
        } else {
            0.0
        };

        let details = if !conclusive {
            "Too few distinct pixel values for a chi-square test".to_string()
        } else if detected {
            format!(
                "Pairs of values are unbalanced (chi-square {:.2}, p-value {:.4}, {} degrees of freedom)",
                test.statistic, p_value, test.degrees_of_freedom
            )
        } else {
            format!(
                "Pairs of values look natural (chi-square {:.2}, p-value {:.4}, {} degrees of freedom)",
                test.statistic, p_value, test.degrees_of_freedom
            )
        };

        Ok(MethodResult::new(
            detected,
            confidence,
            details,
            ChiSquareFindings {
                chi_square_value: test.statistic,
                p_value,
            },
        ))
    }
}
