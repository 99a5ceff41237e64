//! Error types for codec operations

use thiserror::Error;

/// Error type for codec operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid schema for {0}: {1}")]
    Schema(String, String), // type, message
    #[error("unexpected end of input")]
    EndOfInput,
    #[error("truncated input: need {0} bytes, {1} remaining")]
    Truncated(usize, usize), // needed, remaining
    #[error("buffer full: need {0} bytes, {1} available")]
    BufferFull(usize, usize), // needed, available
    #[error("missing field: {0}")]
    MissingField(String),
    #[error("invalid value for {0}: expected {1}, found {2}")]
    InvalidValue(String, &'static str, &'static str), // field, expected, found
    #[error("invalid data in {0}: {1}")]
    InvalidData(String, String), // field, message
    #[error("length exceeded in {0}: {1} > {2}")]
    LengthExceeded(String, usize, usize), // field, found, max
    #[error("extra data found: {0} bytes")]
    ExtraData(usize),
    #[error("failed to decode {0}")]
    Decode(String, #[source] Box<Error>), // type, cause
    #[error("failed to encode {0}")]
    Encode(String, #[source] Box<Error>), // type, cause
}
