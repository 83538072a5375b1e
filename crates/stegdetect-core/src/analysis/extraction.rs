use std::fmt;
use std::io;
use std::ops::Range;

use bitstream_io::{BigEndian, BitWrite, BitWriter, Endianness, LittleEndian};
use log::debug;
use serde::Serialize;

use crate::analysis::{Analyzer, MethodFindings, MethodResult};
use crate::media::image::iterators::{ChannelSelection, ColorIter};
use crate::media::PixelImage;
use crate::options::DetectorOptions;
use crate::result::Result;

const SIGNATURE_CONFIDENCE: f64 = 0.9;
const TEXT_CONFIDENCE: f64 = 0.8;
const TEXT_MIN_LEN: usize = 8;
const TEXT_MIN_DISTINCT: usize = 4;
/// runs repeating with a period up to this are carrier patterns, not text
const TEXT_MAX_PERIOD: usize = 4;
/// digits of the decimal length in a `<len>:<message>` frame
const FRAME_MAX_DIGITS: usize = 10;

/// formats recognized in an extracted byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Png,
    Zip,
    Jpeg,
    Gif,
    Pdf,
    Text,
}

const SIGNATURES: [(&[u8], DataType); 7] = [
    (b"\x89PNG\r\n\x1a\n", DataType::Png),
    (b"PK\x03\x04", DataType::Zip),
    (b"PK\x05\x06", DataType::Zip),
    (b"\xff\xd8\xff", DataType::Jpeg),
    (b"GIF87a", DataType::Gif),
    (b"GIF89a", DataType::Gif),
    (b"%PDF-", DataType::Pdf),
];

impl DataType {
    /// format whose magic number starts `bytes`
    pub fn sniff(bytes: &[u8]) -> Option<DataType> {
        SIGNATURES
            .iter()
            .find(|(magic, _)| bytes.starts_with(magic))
            .map(|(_, data_type)| *data_type)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Png => "PNG",
            DataType::Zip => "ZIP",
            DataType::Jpeg => "JPEG",
            DataType::Gif => "GIF",
            DataType::Pdf => "PDF",
            DataType::Text => "text",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// the first extracted bit is the least significant bit of a byte
    LsbFirst,
    MsbFirst,
}

/// which samples the bits are taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    /// all color channels of a pixel in turn
    Interleaved,
    Red,
    Green,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionConfig {
    pub channels: ChannelOrder,
    pub bit_order: BitOrder,
}

const fn config(channels: ChannelOrder, bit_order: BitOrder) -> ExtractionConfig {
    ExtractionConfig {
        channels,
        bit_order,
    }
}

/// every configuration tried, in order
pub const SEARCH_SPACE: [ExtractionConfig; 8] = [
    config(ChannelOrder::Interleaved, BitOrder::LsbFirst),
    config(ChannelOrder::Interleaved, BitOrder::MsbFirst),
    config(ChannelOrder::Red, BitOrder::LsbFirst),
    config(ChannelOrder::Red, BitOrder::MsbFirst),
    config(ChannelOrder::Green, BitOrder::LsbFirst),
    config(ChannelOrder::Green, BitOrder::MsbFirst),
    config(ChannelOrder::Blue, BitOrder::LsbFirst),
    config(ChannelOrder::Blue, BitOrder::MsbFirst),
];

impl ExtractionConfig {
    fn selection(&self, image: &PixelImage) -> Option<ChannelSelection> {
        let channel = match self.channels {
            ChannelOrder::Interleaved => return Some(ChannelSelection::Interleaved),
            ChannelOrder::Red => 0,
            ChannelOrder::Green => 1,
            ChannelOrder::Blue => 2,
        };
        (image.color_channels() >= 3).then_some(ChannelSelection::Single(channel))
    }

    /// number of whole bytes the selected samples can hold
    pub fn capacity(&self, image: &PixelImage) -> usize {
        let pixels = image.width() as usize * image.height() as usize;
        match self.channels {
            ChannelOrder::Interleaved => pixels * image.color_channels() / 8,
            _ if image.color_channels() >= 3 => pixels / 8,
            _ => 0,
        }
    }

    /// Reassembles up to `cap` bytes from bit 0 of the selected samples,
    /// `None` when the image has no such channel.
    pub fn reconstruct(&self, image: &PixelImage, cap: usize) -> Result<Option<Vec<u8>>> {
        let Some(selection) = self.selection(image) else {
            return Ok(None);
        };
        let bits = ColorIter::new(image, selection)
            .take(cap * 8)
            .map(|s| s & 1 == 1);

        let bytes = match self.bit_order {
            BitOrder::LsbFirst => pack_bits(bits, cap, LittleEndian)?,
            BitOrder::MsbFirst => pack_bits(bits, cap, BigEndian)?,
        };
        Ok(Some(bytes))
    }
}

impl fmt::Display for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels = match self.channels {
            ChannelOrder::Interleaved => "interleaved color channels",
            ChannelOrder::Red => "red channel",
            ChannelOrder::Green => "green channel",
            ChannelOrder::Blue => "blue channel",
        };
        let order = match self.bit_order {
            BitOrder::LsbFirst => "LSB first",
            BitOrder::MsbFirst => "MSB first",
        };
        write!(f, "{channels}, {order}")
    }
}

/// incomplete trailing bytes are dropped
fn pack_bits<E: Endianness>(
    bits: impl Iterator<Item = bool>,
    cap: usize,
    endian: E,
) -> io::Result<Vec<u8>> {
    let mut writer = BitWriter::endian(Vec::with_capacity(cap), endian);
    for bit in bits {
        writer.write_bit(bit)?;
    }
    Ok(writer.into_writer())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionFindings {
    pub data_type: Option<DataType>,
    pub sample_text: Option<String>,
    pub sample_hex: Option<String>,
}

impl MethodFindings for ExtractionFindings {
    const FIELDS: &'static [&'static str] = &["data_type", "sample_text", "sample_hex"];
}

impl ExtractionFindings {
    fn nothing() -> Self {
        Self {
            data_type: None,
            sample_text: None,
            sample_hex: None,
        }
    }

    fn found(data_type: DataType, sample: &[u8]) -> Self {
        Self {
            data_type: Some(data_type),
            sample_text: Some(escape(sample)),
            sample_hex: Some(hex::encode(sample)),
        }
    }
}

/// Brute force search for a payload at the start of the LSB stream.
pub struct SampleExtractor<'o> {
    options: &'o DetectorOptions,
}

impl<'o> SampleExtractor<'o> {
    pub fn new(options: &'o DetectorOptions) -> Self {
        Self { options }
    }

    /// Recognizes a payload at the start of `bytes`, a stream that could hold
    /// `capacity` bytes in total.
    fn validate(&self, bytes: &[u8], capacity: usize) -> Option<Payload> {
        if let Some(data_type) = DataType::sniff(bytes) {
            return Some(Payload {
                data_type,
                confidence: SIGNATURE_CONFIDENCE,
                span: 0..bytes.len(),
                declared_len: None,
            });
        }
        self.framed_text(bytes, capacity).or_else(|| self.text_run(bytes))
    }

    /// `<len>:<message>` with a decimal length, as written by common LSB tools
    fn framed_text(&self, bytes: &[u8], capacity: usize) -> Option<Payload> {
        let digits = bytes
            .iter()
            .take(FRAME_MAX_DIGITS)
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 || bytes[0] == b'0' || bytes.get(digits) != Some(&b':') {
            return None;
        }
        let declared_len: usize = std::str::from_utf8(&bytes[..digits]).ok()?.parse().ok()?;
        let start = digits + 1;
        if declared_len > capacity.saturating_sub(start) {
            return None;
        }

        let end = bytes.len().min(start + declared_len);
        let message = bytes.get(start..end).filter(|m| !m.is_empty())?;
        let ratio = share(message, is_text);
        if ratio < self.options.printable_ratio_threshold {
            return None;
        }

        Some(Payload {
            data_type: DataType::Text,
            confidence: SIGNATURE_CONFIDENCE,
            span: start..end,
            declared_len: Some(declared_len),
        })
    }

    /// The run of text bytes the stream starts with. Tab, CR and LF may end
    /// up in the run but count against the printable ratio.
    fn text_run(&self, bytes: &[u8]) -> Option<Payload> {
        let len = bytes.iter().take_while(|b| is_text(**b)).count();
        if len < TEXT_MIN_LEN {
            return None;
        }

        let window = &bytes[..len.min(self.options.text_window)];
        if distinct(window) < TEXT_MIN_DISTINCT || periodic(window) {
            return None;
        }
        let ratio = share(window, |b| (0x20..=0x7e).contains(&b));
        if ratio < self.options.printable_ratio_threshold {
            return None;
        }

        Some(Payload {
            data_type: DataType::Text,
            confidence: TEXT_CONFIDENCE * ratio,
            span: 0..len,
            declared_len: None,
        })
    }
}

/// a payload found at the start of an extracted stream
#[derive(Debug)]
struct Payload {
    data_type: DataType,
    confidence: f64,
    /// the sample within the extracted bytes
    span: Range<usize>,
    /// length announced by a `<len>:` frame
    declared_len: Option<usize>,
}

impl Analyzer for SampleExtractor<'_> {
    type Findings = ExtractionFindings;

    fn label(&self) -> &'static str {
        "sample extraction"
    }

    fn analyze(&self, image: &PixelImage) -> Result<MethodResult<ExtractionFindings>> {
        for config in SEARCH_SPACE.iter() {
            let Some(bytes) = config.reconstruct(image, self.options.sample_cap)? else {
                continue;
            };
            let Some(payload) = self.validate(&bytes, config.capacity(image)) else {
                continue;
            };

            let data_type = payload.data_type;
            debug!("Found {data_type} data in {config}");
            let details = match payload.declared_len {
                Some(len) => {
                    format!("Extracted {data_type} data from {config}, {len} byte length prefix")
                }
                None => format!("Extracted {data_type} data from {config}"),
            };
            return Ok(MethodResult::new(
                true,
                payload.confidence,
                details,
                ExtractionFindings::found(data_type, &bytes[payload.span]),
            ));
        }

        Ok(MethodResult::new(
            false,
            0.0,
            "No recognizable data found in LSBs",
            ExtractionFindings::nothing(),
        ))
    }
}

fn share(bytes: &[u8], pred: impl Fn(u8) -> bool) -> f64 {
    bytes.iter().filter(|b| pred(**b)).count() as f64 / bytes.len() as f64
}

/// `bytes` repeats itself with a short period, like alternating LSBs do
fn periodic(bytes: &[u8]) -> bool {
    (1..=TEXT_MAX_PERIOD)
        .filter(|p| *p < bytes.len())
        .any(|p| bytes[p..] == bytes[..bytes.len() - p])
}

fn distinct(bytes: &[u8]) -> usize {
    let mut seen = [false; 256];
    bytes.iter().for_each(|b| seen[*b as usize] = true);
    seen.iter().filter(|s| **s).count()
}

fn is_text(b: u8) -> bool {
    matches!(b, 0x20..=0x7e | b'\t' | b'\n' | b'\r')
}

/// printable ASCII as is, everything else escaped
fn escape(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for b in bytes {
        if (0x20..=0x7e).contains(b) {
            text.push(*b as char);
        } else {
            text.extend(std::ascii::escape_default(*b).map(char::from));
        }
    }
    text
}
