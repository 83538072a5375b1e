use std::io::Cursor;

use image::ImageFormat;
use log::error;

use crate::error::StegDetectError;
use crate::media::image::bit_plane::extract_lsb;
use crate::media::PixelImage;
use crate::result::Result;

/// Amplifies the LSB plane of every color channel to full contrast,
/// a set bit becomes 255 and a cleared bit 0.
///
/// Width, height and channel layout are kept, an alpha channel is rendered opaque.
pub fn render_lsb(image: &PixelImage) -> Result<PixelImage> {
    let channels = image.channels();
    let mut samples = vec![u8::MAX; image.samples().len()];

    for channel in 0..image.color_channels() {
        let plane = extract_lsb(image, channel)?;
        for (sample, bit) in samples
            .iter_mut()
            .skip(channel)
            .step_by(channels)
            .zip(plane.bits())
        {
            *sample = bit * u8::MAX;
        }
    }

    PixelImage::new(image.width(), image.height(), channels, samples)
}

/// [`render_lsb`] encoded as PNG
pub fn render_lsb_png(image: &PixelImage) -> Result<Vec<u8>> {
    let rendered = render_lsb(image)?.to_dynamic()?;
    let mut buf = Cursor::new(Vec::new());

    rendered.write_to(&mut buf, ImageFormat::Png).map_err(|e| {
        error!("Error encoding LSB picture: {e}");
        StegDetectError::ImageEncodingError
    })?;

    Ok(buf.into_inner())
}
