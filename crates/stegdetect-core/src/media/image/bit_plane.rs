use crate::error::StegDetectError;
use crate::media::image::iterators::{ChannelSelection, ColorIter};
use crate::media::PixelImage;
use crate::result::Result;

/// one bit per pixel, taken at a fixed bit index from one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPlane {
    width: u32,
    height: u32,
    bits: Vec<u8>,
}

impl BitPlane {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// the bits in row-major order, each either 0 or 1
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// the bit at `(x, y)`, `None` outside of the plane
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.bits
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn ones(&self) -> usize {
        self.bits.iter().filter(|b| **b == 1).count()
    }

    /// number of horizontally and vertically adjacent bit pairs that differ
    pub fn transitions(&self) -> usize {
        let w = self.width as usize;
        let horizontal: usize = self
            .bits
            .chunks_exact(w)
            .map(|row| row.windows(2).filter(|p| p[0] != p[1]).count())
            .sum();
        let vertical = self
            .bits
            .iter()
            .zip(self.bits.iter().skip(w))
            .filter(|(a, b)| a != b)
            .count();

        horizontal + vertical
    }

    /// the most transitions a plane of this size can have
    pub fn max_transitions(&self) -> usize {
        let (w, h) = (self.width as usize, self.height as usize);
        2 * w * h - w - h
    }
}

/// Extracts the bit plane at `bit_index` (0 = least significant) of `channel`.
pub fn extract(image: &PixelImage, channel: usize, bit_index: u8) -> Result<BitPlane> {
    if channel >= image.channels() {
        return Err(StegDetectError::InvalidChannel {
            channel,
            channels: image.channels(),
        });
    }
    if bit_index > 7 {
        return Err(StegDetectError::InvalidBitIndex(bit_index));
    }

    let bits = ColorIter::new(image, ChannelSelection::Single(channel))
        .map(|s| (s >> bit_index) & 1)
        .collect();

    Ok(BitPlane {
        width: image.width(),
        height: image.height(),
        bits,
    })
}

/// Extracts the least significant bit plane of `channel`.
pub fn extract_lsb(image: &PixelImage, channel: usize) -> Result<BitPlane> {
    extract(image, channel, 0)
}
