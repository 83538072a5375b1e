use image::{ColorType, DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::error::StegDetectError;
use crate::result::Result;

/// a decoded image, normalized to 8-bit samples
///
/// Samples are stored row-major and interleaved, `channels` per pixel.
/// Only gray (1), RGB (3) and RGBA (4) layouts exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    width: u32,
    height: u32,
    channels: usize,
    samples: Vec<u8>,
}

impl PixelImage {
    pub fn new(width: u32, height: u32, channels: usize, samples: Vec<u8>) -> Result<Self> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(StegDetectError::DecodeError(format!(
                "unsupported channel layout with {channels} channel(s)"
            )));
        }
        if width == 0 || height == 0 {
            return Err(StegDetectError::DecodeError(
                "image has no pixels".to_string(),
            ));
        }
        let expected = width as usize * height as usize * channels;
        if samples.len() != expected {
            return Err(StegDetectError::DecodeError(format!(
                "expected {expected} samples, got {}",
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    pub fn from_gray(img: GrayImage) -> Result<Self> {
        let (w, h) = img.dimensions();
        Self::new(w, h, 1, img.into_raw())
    }

    pub fn from_rgb(img: RgbImage) -> Result<Self> {
        let (w, h) = img.dimensions();
        Self::new(w, h, 3, img.into_raw())
    }

    pub fn from_rgba(img: RgbaImage) -> Result<Self> {
        let (w, h) = img.dimensions();
        Self::new(w, h, 4, img.into_raw())
    }

    /// gray+alpha is widened to RGBA, deeper images are reduced to 8 bits
    pub fn from_dynamic(img: DynamicImage) -> Result<Self> {
        match img {
            DynamicImage::ImageLuma8(i) => Self::from_gray(i),
            DynamicImage::ImageRgb8(i) => Self::from_rgb(i),
            DynamicImage::ImageRgba8(i) => Self::from_rgba(i),
            other if other.color() == ColorType::L16 => Self::from_gray(other.to_luma8()),
            other if other.color().has_alpha() => Self::from_rgba(other.to_rgba8()),
            other => Self::from_rgb(other.to_rgb8()),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// number of channels that carry color, that is all but alpha
    pub fn color_channels(&self) -> usize {
        if self.has_alpha() {
            3
        } else {
            self.channels
        }
    }

    /// `None` when the pixel or the channel is outside of the image
    pub fn sample(&self, x: u32, y: u32, channel: usize) -> Option<u8> {
        if x >= self.width || y >= self.height || channel >= self.channels {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * self.channels + channel;
        self.samples.get(idx).copied()
    }

    /// all samples of one channel in row-major order
    pub fn channel_samples(&self, channel: usize) -> impl Iterator<Item = u8> + '_ {
        self.samples
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .copied()
    }

    /// 256-bin histogram of one channel
    pub fn histogram(&self, channel: usize) -> [u64; 256] {
        let mut hist = [0u64; 256];
        for s in self.channel_samples(channel) {
            hist[s as usize] += 1;
        }
        hist
    }

    pub fn channel_name(&self, channel: usize) -> &'static str {
        match (self.channels, channel) {
            (1, 0) => "Gray",
            (_, 0) => "Red",
            (_, 1) => "Green",
            (_, 2) => "Blue",
            (_, 3) => "Alpha",
            _ => "Unknown",
        }
    }

    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let samples = self.samples.clone();
        let img = match self.channels {
            1 => GrayImage::from_raw(self.width, self.height, samples).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(self.width, self.height, samples).map(DynamicImage::ImageRgb8),
            _ => RgbaImage::from_raw(self.width, self.height, samples).map(DynamicImage::ImageRgba8),
        };
        img.ok_or(StegDetectError::ImageEncodingError)
    }
}
