/// Thresholds and resource limits used by the detector
///
/// Every analyzer reads its decision thresholds from here, the `Default`
/// values are the ones the report contract documents.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorOptions {
    /// LSB analysis: combined randomness score must be above this value
    pub lsb_randomness_threshold: f64,

    /// LSB analysis: combined bit distribution score must be above this value
    pub lsb_distribution_threshold: f64,

    /// Chi-square test: p-values below this are significant
    pub chi_square_significance: f64,

    /// Chi-square test: minimum statistic per sample, keeps uniform noise from being flagged
    pub chi_square_min_deviation: f64,

    /// Histogram analysis: number of suspicious patterns that count as a detection
    pub histogram_pattern_threshold: u32,

    /// Sample extraction: number of bytes reconstructed per configuration,
    /// also the cap of `sample_text` and `sample_hex`
    pub sample_cap: usize,

    /// Sample extraction: the leading window that is tested for printable text
    pub text_window: usize,

    /// Sample extraction: minimum share of printable ASCII in the text window
    pub printable_ratio_threshold: f64,

    /// Resource guard: maximum size of one encoded image in bytes
    pub max_image_bytes: u64,

    /// Resource guard: maximum `width * height` of one image, checked before decoding
    pub max_pixels: u64,

    /// Resource guard: maximum size of one archive in bytes
    pub max_archive_bytes: u64,

    /// Resource guard: maximum number of members in one archive
    pub max_archive_entries: usize,
}

impl Default for DetectorOptions {
    /// The good old golden options
    fn default() -> Self {
        Self {
            lsb_randomness_threshold: 0.92,
            lsb_distribution_threshold: 0.95,
            chi_square_significance: 0.05,
            chi_square_min_deviation: 0.05,
            histogram_pattern_threshold: 2,
            sample_cap: 256,
            text_window: 64,
            printable_ratio_threshold: 0.9,
            max_image_bytes: 32 * 1024 * 1024,
            max_pixels: 40_000_000,
            max_archive_bytes: 256 * 1024 * 1024,
            max_archive_entries: 1024,
        }
    }
}

impl DetectorOptions {
    pub fn with_max_image_bytes(mut self, max_image_bytes: u64) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = max_pixels;
        self
    }

    pub fn with_max_archive_bytes(mut self, max_archive_bytes: u64) -> Self {
        self.max_archive_bytes = max_archive_bytes;
        self
    }

    pub fn with_sample_cap(mut self, sample_cap: usize) -> Self {
        self.sample_cap = sample_cap;
        self
    }

    pub fn with_chi_square_significance(mut self, significance: f64) -> Self {
        self.chi_square_significance = significance;
        self
    }

    /// The confidence an LSB detection implies, the mean of both thresholds
    pub fn lsb_confidence_threshold(&self) -> f64 {
        (self.lsb_randomness_threshold + self.lsb_distribution_threshold) / 2.0
    }

    /// The confidence a chi-square detection implies
    pub fn chi_square_confidence_threshold(&self) -> f64 {
        1.0 - self.chi_square_significance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_derive_confidence_thresholds_from_decision_thresholds() {
        let options = DetectorOptions::default();

        assert!((options.lsb_confidence_threshold() - 0.935).abs() < 1e-12);
        assert!((options.chi_square_confidence_threshold() - 0.95).abs() < 1e-12);
    }

    #[test]
    fn builder_methods_should_only_touch_their_field() {
        let options = DetectorOptions::default().with_max_pixels(16);

        assert_eq!(options.max_pixels, 16);
        assert_eq!(
            options.max_image_bytes,
            DetectorOptions::default().max_image_bytes
        );
    }
}
