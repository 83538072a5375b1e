use serde::Serialize;

use crate::analysis::{Analyzer, MethodFindings, MethodResult};
use crate::media::PixelImage;
use crate::options::DetectorOptions;
use crate::result::Result;

/// sparse histograms carry no LSB evidence for the distribution checks
const MIN_OCCUPIED_BINS: usize = 16;
const COMB_MIN_BINS: usize = 10;
const PEAK_MIN_BINS: usize = 5;
const EVEN_ODD_MAX_RATIO: f64 = 0.1;
const PERIODIC_MIN_MAXIMA: usize = 6;
const PERIODIC_MAX_VARIATION: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramFindings {
    pub suspicious_patterns: u32,
}

impl MethodFindings for HistogramFindings {
    const FIELDS: &'static [&'static str] = &["suspicious_patterns"];
}

/// one check that fired on one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pattern {
    Comb,
    Peaks,
    EvenOddImbalance,
    PeriodicMaxima,
}

impl Pattern {
    fn describe(&self, channel: &str) -> String {
        match self {
            Pattern::Comb => format!("{channel} channel shows comb pattern in histogram"),
            Pattern::Peaks => format!("{channel} channel has unusual peaks in histogram"),
            Pattern::EvenOddImbalance => {
                format!("{channel} channel has abnormal even/odd value distribution")
            }
            Pattern::PeriodicMaxima => {
                format!("{channel} channel has regularly spaced histogram maxima")
            }
        }
    }
}

/// Looks for the irregularities LSB replacement leaves in a histogram.
pub struct HistogramAnalyzer<'o> {
    options: &'o DetectorOptions,
}

impl<'o> HistogramAnalyzer<'o> {
    pub fn new(options: &'o DetectorOptions) -> Self {
        Self { options }
    }
}

impl Analyzer for HistogramAnalyzer<'_> {
    type Findings = HistogramFindings;

    fn label(&self) -> &'static str {
        "histogram analysis"
    }

    fn analyze(&self, image: &PixelImage) -> Result<MethodResult<HistogramFindings>> {
        let mut details = Vec::new();
        let mut severities = Vec::new();

        for channel in 0..image.color_channels() {
            let hist = image.histogram(channel);
            for (pattern, severity) in inspect(&hist) {
                details.push(pattern.describe(image.channel_name(channel)));
                severities.push(severity);
            }
        }

        let patterns = severities.len() as u32;
        let threshold = self.options.histogram_pattern_threshold.max(1);
        let confidence = if patterns == 0 {
            0.0
        } else {
            let mean_severity = severities.iter().sum::<f64>() / severities.len() as f64;
            0.5 * patterns as f64 / threshold as f64 + 0.5 * mean_severity
        };
        let details = if details.is_empty() {
            "No suspicious histogram patterns detected".to_string()
        } else {
            details.join("; ")
        };

        Ok(MethodResult::new(
            patterns >= threshold,
            confidence,
            details,
            HistogramFindings {
                suspicious_patterns: patterns,
            },
        ))
    }
}

/// Runs all checks on one channel histogram, every fired check comes with
/// its severity in [0, 1].
pub fn inspect(hist: &[u64; 256]) -> Vec<(Pattern, f64)> {
    let occupied = hist.iter().filter(|c| **c > 0).count();
    let mut fired = Vec::new();

    let combs = comb_bins(hist);
    if combs > COMB_MIN_BINS {
        fired.push((Pattern::Comb, (combs as f64 / 64.0).min(1.0)));
    }

    let peaks = peak_bins(hist);
    if peaks > PEAK_MIN_BINS {
        fired.push((Pattern::Peaks, (peaks as f64 / 32.0).min(1.0)));
    }

    if occupied >= MIN_OCCUPIED_BINS {
        let ratio = even_odd_ratio(hist);
        if ratio > EVEN_ODD_MAX_RATIO {
            fired.push((Pattern::EvenOddImbalance, (ratio * 2.0).min(1.0)));
        }

        if let Some(variation) = maxima_spacing_variation(hist) {
            if variation < PERIODIC_MAX_VARIATION {
                fired.push((
                    Pattern::PeriodicMaxima,
                    1.0 - variation / PERIODIC_MAX_VARIATION,
                ));
            }
        }
    }

    fired
}

/// odd bins far below their two non-empty neighbours
fn comb_bins(hist: &[u64; 256]) -> usize {
    (1..255)
        .step_by(2)
        .filter(|&j| {
            let (left, right) = (hist[j - 1], hist[j + 1]);
            left > 0 && right > 0 && (hist[j] as f64) < (left + right) as f64 / 4.0
        })
        .count()
}

/// bins more than three times the mean of their neighbours
fn peak_bins(hist: &[u64; 256]) -> usize {
    (1..255)
        .filter(|&j| hist[j] as f64 > 3.0 * (hist[j - 1] + hist[j + 1]) as f64 / 2.0)
        .count()
}

fn even_odd_ratio(hist: &[u64; 256]) -> f64 {
    let even: u64 = hist.iter().step_by(2).sum();
    let odd: u64 = hist.iter().skip(1).step_by(2).sum();
    let total = even + odd;
    if total == 0 {
        return 0.0;
    }
    even.abs_diff(odd) as f64 / total as f64
}

/// coefficient of variation of the distances between local maxima
fn maxima_spacing_variation(hist: &[u64; 256]) -> Option<f64> {
    let maxima: Vec<usize> = (1..255)
        .filter(|&j| hist[j] > 0 && hist[j] > hist[j - 1] && hist[j] >= hist[j + 1])
        .collect();
    if maxima.len() < PERIODIC_MIN_MAXIMA {
        return None;
    }

    let spacings: Vec<f64> = maxima.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
    let n = spacings.len() as f64;
    let mean = spacings.iter().sum::<f64>() / n;
    let variance = spacings.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

    Some(variance.sqrt() / mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{noise_rgb_image, solid_rgb_image};

    fn even_values_only() -> PixelImage {
        let samples = (0..512u32).map(|i| (i % 256) as u8 & !1).collect();
        PixelImage::new(256, 2, 1, samples).unwrap()
    }

    #[test]
    fn solid_images_have_no_patterns() {
        let options = DetectorOptions::default();
        let result = HistogramAnalyzer::new(&options)
            .analyze(&solid_rgb_image(20, 20, [90, 91, 92]))
            .unwrap();

        assert!(!result.detected);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.details, "No suspicious histogram patterns detected");
        assert_eq!(result.findings.unwrap().suspicious_patterns, 0);
    }

    #[test]
    fn even_values_only_trigger_every_check() {
        let img = even_values_only();
        let fired: Vec<Pattern> = inspect(&img.histogram(0)).into_iter().map(|(p, _)| p).collect();

        assert_eq!(
            fired,
            vec![
                Pattern::Comb,
                Pattern::Peaks,
                Pattern::EvenOddImbalance,
                Pattern::PeriodicMaxima
            ]
        );
    }

    #[test]
    fn should_detect_and_name_the_channel() {
        let options = DetectorOptions::default();
        let result = HistogramAnalyzer::new(&options)
            .analyze(&even_values_only())
            .unwrap();

        assert!(result.detected);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.findings.unwrap().suspicious_patterns, 4);
        assert!(result
            .details
            .starts_with("Gray channel shows comb pattern in histogram; "));
    }

    #[test]
    fn uniform_noise_is_not_suspicious() {
        let options = DetectorOptions::default();
        let result = HistogramAnalyzer::new(&options)
            .analyze(&noise_rgb_image(128, 128, 5))
            .unwrap();

        assert!(!result.detected, "{}", result.details);
    }

    #[test]
    fn sparse_histograms_skip_the_distribution_checks() {
        let mut hist = [0u64; 256];
        hist[10] = 100;
        hist[12] = 100;

        assert!(inspect(&hist).is_empty());
    }
}
