use thiserror::Error;
use zip::result::ZipError;

#[derive(Error, Debug)]
pub enum StegDetectError {
    /// Represents an image that could not be decoded. For example a broken PNG or a text file
    #[error("Image could not be decoded: {0}")]
    DecodeError(String),

    /// Represents a channel index outside of the channels an image has
    #[error("Channel {channel} is out of range for an image with {channels} channel(s)")]
    InvalidChannel { channel: usize, channels: usize },

    /// Represents a bit plane index outside of an 8-bit sample
    #[error("Bit index {0} is out of range, samples have 8 bits")]
    InvalidBitIndex(u8),

    /// Represents an archive that could not be opened or read
    #[error("Archive could not be opened: {0}")]
    UnsupportedArchive(#[from] ZipError),

    /// Represents an input that is bigger than the configured limits allow
    #[error("Resource limit exceeded: {subject} is {actual}, limit is {limit}")]
    ResourceLimitExceeded {
        subject: &'static str,
        actual: u64,
        limit: u64,
    },

    /// Represents a failure when encoding an image file.
    #[error("Image encoding error")]
    ImageEncodingError,

    /// Represents a failure to read from input.
    #[error("Read error")]
    ReadError { source: std::io::Error },

    /// Represents a failure to write target file.
    #[error("Write error")]
    WriteError { source: std::io::Error },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    /// Represents the report serialization failing
    #[error("Report serialization error")]
    SerializationError(#[from] serde_json::Error),

    #[error("API Error: Missing input")]
    MissingInput,

    #[error("API Error: Missing output")]
    MissingOutput,
}
