//! Error types for schema operations.

use thiserror::Error;

/// Error type for parsing definitions and reflecting over messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("{0}:{1}: malformed line: {2}")]
    Malformed(String, usize, String), // type, line, text
    #[error("{0}:{1}: invalid array length: {2}")]
    InvalidArrayLength(String, usize, String), // type, line, length
    #[error("{0}:{1}: invalid constant: {2}")]
    InvalidConstant(String, usize, String), // type, line, text
    #[error("{0}: duplicate field: {1}")]
    DuplicateField(String, String), // type, field
    #[error("{0}: invalid type name")]
    InvalidTypeName(String),
    #[error("{0}: unknown field: {1}")]
    UnknownField(String, String), // type, field
    #[error("wrong kind: expected {0}, found {1}")]
    WrongKind(&'static str, &'static str), // expected, found
}
