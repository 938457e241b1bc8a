//! Error types for property documents.

use thiserror::Error;

/// Errors that can occur when reading, writing, or building property trees.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The first byte of the input matched neither format.
    #[error("avsproperty: could not detect format")]
    UnknownFormat,

    /// The binary header magic is not one of the known values.
    #[error("avsproperty: invalid magic number")]
    InvalidMagic,

    /// The header codepage byte does not match its complement.
    #[error("avsproperty: invalid encoding checksum")]
    EncodingChecksum,

    /// The header codepage id is not in the encoding registry.
    #[error("avsproperty: invalid encoding")]
    InvalidCodepage,

    /// An XML declaration named an encoding the registry does not know.
    #[error("avsproperty: encoding not found")]
    EncodingNotFound,

    /// A string contains characters the active encoding cannot represent.
    #[error("avsproperty: string cannot be encoded as {0}")]
    Unencodable(&'static str),

    /// Structural error in the binary metadata section.
    #[error("avsproperty: malformed metadata")]
    MalformedMetadata,

    /// Structural error in the binary databody section.
    #[error("avsproperty: malformed databody")]
    MalformedDatabody,

    /// A section size field is not a multiple of four.
    #[error("avsproperty: invalid section alignment")]
    SectionAlignment,

    /// The metadata nesting exceeded the depth cap.
    #[error("avsproperty: max depth exceeded")]
    MaxDepthExceeded,

    /// The input ended before a read completed.
    #[error("avsproperty: unexpected end of input (needed {needed} bytes, {available} available)")]
    UnexpectedEof { needed: usize, available: usize },

    /// A node name is empty or longer than 36 symbols.
    #[error("avsproperty: illegal node name")]
    IllegalNodeName,

    /// A node name contains a character outside the 64-symbol alphabet.
    #[error("avsproperty: invalid character in node name")]
    InvalidNameCharacter,

    /// A binary name length byte is zero or larger than 36.
    #[error("avsproperty: invalid node name size")]
    InvalidNameSize,

    /// The name starts with the reserved `__` prefix.
    #[error("avsproperty: node name uses reserved name")]
    ReservedNodeName,

    /// A boolean byte on the wire was neither 0 nor 1.
    #[error("avsproperty: invalid bool byte")]
    InvalidBoolByte,

    /// A boolean text value was neither "1" nor "0".
    #[error("avsproperty: invalid bool string")]
    InvalidBoolString,

    /// A text value did not parse as a dotted-quad IPv4 address.
    #[error("avsproperty: invalid ip address")]
    InvalidIpAddress,

    /// A text value did not parse as an integer of the required width.
    #[error("avsproperty: invalid integer value: {0}")]
    InvalidInt(#[from] std::num::ParseIntError),

    /// A text value did not parse as a float.
    #[error("avsproperty: invalid float value: {0}")]
    InvalidFloat(#[from] std::num::ParseFloatError),

    /// A binary value's text form contained invalid hex.
    #[error("avsproperty: invalid hex digit in binary value")]
    InvalidHex,

    /// A vector text value had the wrong number of elements.
    #[error("avsproperty: vector string contains an invalid number of elements")]
    VectorElementCount,

    /// A typed node carries no value at serialization time.
    #[error("avsproperty: node has a nil value")]
    NilValue,

    /// Write was called on a property without a root.
    #[error("avsproperty: property is empty")]
    EmptyProperty,

    /// XML syntax or document-structure error.
    #[error("avsproperty: {0}")]
    Xml(String),

    /// An error attributable to a specific node.
    #[error("avsproperty: {name}: {message}")]
    Node { name: String, message: String },
}

/// Result type for property operations.
pub type Result<T> = std::result::Result<T, Error>;
