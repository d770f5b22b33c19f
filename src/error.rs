use thiserror::Error;

use crate::protocol::response::ErrPayload;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Server Error: {0}")]
    Server(#[from] ErrPayload),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid packet")]
    InvalidPacket,

    #[error("Unexpected end of packet")]
    UnexpectedEof,

    /// A column's byte range does not match any length permitted for its wire type.
    #[error("invalid length {length} for {wire_type}")]
    DecodeLength {
        wire_type: &'static str,
        length: usize,
    },

    /// No conversion is defined from the decoded wire value to the requested type.
    #[error("unsupported conversion: {from} -> {to}")]
    DataConversion {
        from: &'static str,
        to: &'static str,
    },

    #[error("value {value} out of range for {target}")]
    NumberOutOfRange { value: String, target: &'static str },

    #[error("{op} is not supported by a forward-only result")]
    UnsupportedNavigation { op: &'static str },

    #[error("column '{0}' not found")]
    NoSuchColumn(String),

    #[error("result set is not positioned on a row")]
    NotOnRow,

    /// The connection byte stream may be misaligned. The connection must not
    /// be reused for further commands.
    #[error("connection stream desynchronized: {0}")]
    ProtocolDesync(String),
}

impl Error {
    pub(crate) fn conversion(from: &'static str, to: &'static str) -> Self {
        Error::DataConversion { from, to }
    }

    pub(crate) fn out_of_range(value: impl std::fmt::Display, target: &'static str) -> Self {
        Error::NumberOutOfRange {
            value: value.to_string(),
            target,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
