use criterion::{criterion_group, criterion_main, Criterion};
use stegdetect_core::analysis::{Analyzer, ChiSquareAnalyzer, SampleExtractor};
use stegdetect_core::{DetectorOptions, PixelImage, StegDetector};

fn noise_image(width: u32, height: u32) -> PixelImage {
    let mut rng = fastrand::Rng::with_seed(42);
    let samples = (0..width * height * 3).map(|_| rng.u8(..)).collect();
    PixelImage::new(width, height, 3, samples).expect("Noise image is not valid.")
}

pub fn image_analysis(c: &mut Criterion) {
    let img = noise_image(512, 512);
    let options = DetectorOptions::default();

    c.bench_function("Image Analysis", |b| {
        let detector = StegDetector::new();
        b.iter(|| detector.analyze(&img))
    });

    c.bench_function("Chi-Square Test", |b| {
        let analyzer = ChiSquareAnalyzer::new(&options);
        b.iter(|| analyzer.analyze(&img).expect("Chi-square test failed"))
    });

    c.bench_function("Sample Extraction", |b| {
        let extractor = SampleExtractor::new(&options);
        b.iter(|| extractor.analyze(&img).expect("Sample extraction failed"))
    });
}

criterion_group!(benches, image_analysis);
criterion_main!(benches);
