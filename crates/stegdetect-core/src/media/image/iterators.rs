use std::iter::{Skip, Take};
use std::slice::{ChunksExact, Iter};

use crate::media::PixelImage;

/// which samples of a pixel are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelection {
    /// all color channels of a pixel, alpha is skipped
    Interleaved,
    /// exactly one channel of a pixel
    Single(usize),
}

/// Walks the samples of an image row by row, pixel by pixel,
/// yielding only the selected channels of each pixel.
pub(crate) struct ColorIter<'a> {
    pixels: ChunksExact<'a, u8>,
    colors: Take<Skip<Iter<'a, u8>>>,
    skip: usize,
    take: usize,
}

impl<'a> ColorIter<'a> {
    pub fn new(image: &'a PixelImage, selection: ChannelSelection) -> Self {
        let (skip, take) = match selection {
            ChannelSelection::Interleaved => (0, image.color_channels()),
            ChannelSelection::Single(c) => (c, 1),
        };
        let empty: &'a [u8] = &[];

        Self {
            pixels: image.samples().chunks_exact(image.channels()),
            colors: empty.iter().skip(0).take(0),
            skip,
            take,
        }
    }
}

impl<'a> Iterator for ColorIter<'a> {
    type Item = &'a u8;

    fn next(&mut self) -> Option<Self::Item> {
        self.colors.next().or_else(|| {
            if let Some(pixel) = self.pixels.next() {
                self.colors = pixel.iter().skip(self.skip).take(self.take);
            }
            self.colors.next()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::prepare_5x5_image;

    #[test]
    fn should_skip_alpha_when_interleaving() {
        let img = PixelImage::from_rgba(prepare_5x5_image()).unwrap();
        let colors: Vec<u8> = ColorIter::new(&img, ChannelSelection::Interleaved)
            .take(6)
            .copied()
            .collect();

        assert_eq!(colors, vec![0, 1, 2, 4, 5, 6]);
    }

    #[test]
    fn should_visit_every_pixel_once_for_a_single_channel() {
        let img = PixelImage::from_rgba(prepare_5x5_image()).unwrap();
        let blue: Vec<u8> = ColorIter::new(&img, ChannelSelection::Single(2))
            .copied()
            .collect();

        assert_eq!(blue.len(), 25);
        assert_eq!(blue[0], 2);
        assert_eq!(blue[5], 22, "6th pixel starts the 2nd row");
        assert_eq!(blue.last(), Some(&(4 * 4 + 20 * 4 + 2)));
    }

    #[test]
    fn should_interleave_the_only_channel_of_gray_images() {
        let img = PixelImage::new(3, 1, 1, vec![7, 8, 9]).unwrap();
        let colors: Vec<u8> = ColorIter::new(&img, ChannelSelection::Interleaved)
            .copied()
            .collect();

        assert_eq!(colors, vec![7, 8, 9]);
    }
}
