use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::io::Reader;
use image::ImageFormat;
use log::{debug, error};

use crate::error::StegDetectError;
use crate::media::PixelImage;
use crate::options::DetectorOptions;
use crate::result::Result;

/// Decodes an encoded image (PNG, JPEG, GIF or BMP) into a [`PixelImage`].
///
/// The byte and pixel limits of `options` are checked before any pixel
/// data is decoded.
///
/// ## Example of usage
/// ```rust
/// use stegdetect_core::media::image::decode;
/// use stegdetect_core::DetectorOptions;
///
/// let result = decode(b"definitely not an image", &DetectorOptions::default());
/// assert!(result.is_err());
/// ```
pub fn decode(bytes: &[u8], options: &DetectorOptions) -> Result<PixelImage> {
    let size = bytes.len() as u64;
    if size > options.max_image_bytes {
        return Err(StegDetectError::ResourceLimitExceeded {
            subject: "image size in bytes",
            actual: size,
            limit: options.max_image_bytes,
        });
    }

    let (width, height) = reader_for(bytes)?.into_dimensions().map_err(|e| {
        debug!("Unable to read image dimensions: {e}");
        StegDetectError::DecodeError(e.to_string())
    })?;
    let pixels = width as u64 * height as u64;
    if pixels > options.max_pixels {
        return Err(StegDetectError::ResourceLimitExceeded {
            subject: "image pixel count",
            actual: pixels,
            limit: options.max_pixels,
        });
    }

    let img = reader_for(bytes)?.decode().map_err(|e| {
        error!("Error decoding image: {e}");
        StegDetectError::DecodeError(e.to_string())
    })?;

    PixelImage::from_dynamic(img)
}

/// Reads and decodes an image file.
pub fn open(path: &Path, options: &DetectorOptions) -> Result<PixelImage> {
    let bytes = fs::read(path).map_err(|source| StegDetectError::ReadError { source })?;
    decode(&bytes, options)
}

/// Mime type of an image, sniffed from its content.
pub fn guess_mime_type(bytes: &[u8]) -> Option<&'static str> {
    let mime = match image::guess_format(bytes).ok()? {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        ImageFormat::Pnm => "image/x-portable-anymap",
        ImageFormat::Tga => "image/x-tga",
        _ => return None,
    };

    Some(mime)
}

fn reader_for(bytes: &[u8]) -> Result<Reader<Cursor<&[u8]>>> {
    let reader = Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|source| StegDetectError::ReadError { source })?;

    if reader.format().is_none() {
        return Err(StegDetectError::DecodeError(
            "image format is not supported".to_string(),
        ));
    }

    Ok(reader)
}
