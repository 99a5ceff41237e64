//! Strategies for encoding and decoding the fields of a message.
//!
//! A [Handler] owns one field (or, for [FixedFields], a run of fields) and knows how to write
//! it to and read it from a cursor. Handlers are built once per type and never change.

mod array;
mod fixed;
mod message;
mod string;

pub use array::SubMessageArray;
pub use fixed::{FixedFields, Slot};
pub use message::SubMessage;
pub use string::{VariableString, PREFIX_LEN};

use crate::Error;
use bytes::{Buf, BufMut};
use reflex_schema::Message;

/// Encoder/decoder for one field or run of fields.
#[derive(Clone, Debug)]
pub enum Handler {
    /// A packed run of scalars and fixed-length byte arrays.
    FixedFields(FixedFields),
    /// A length-prefixed string or byte blob.
    VariableString(VariableString),
    /// A single nested message.
    SubMessage(SubMessage),
    /// An array of nested messages.
    SubMessageArray(SubMessageArray),
}

impl Handler {
    /// Encoded size if this handler always writes the same number of bytes.
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::FixedFields(fixed) => Some(fixed.size()),
            _ => None,
        }
    }

    /// Updates fields derived from others (array counts) before encoding.
    pub(crate) fn preserialize(&self, msg: &mut Message) -> Result<(), Error> {
        match self {
            Self::FixedFields(_) | Self::VariableString(_) => Ok(()),
            Self::SubMessage(handler) => handler.preserialize(msg),
            Self::SubMessageArray(handler) => handler.preserialize(msg),
        }
    }

    pub(crate) fn write(&self, buf: &mut impl BufMut, msg: &Message) -> Result<(), Error> {
        match self {
            Self::FixedFields(handler) => handler.write(buf, msg),
            Self::VariableString(handler) => handler.write(buf, msg),
            Self::SubMessage(handler) => handler.write(buf, msg),
            Self::SubMessageArray(handler) => handler.write(buf, msg),
        }
    }

    pub(crate) fn read(&self, buf: &mut impl Buf, msg: &mut Message) -> Result<(), Error> {
        match self {
            Self::FixedFields(handler) => handler.read(buf, msg),
            Self::VariableString(handler) => handler.read(buf, msg),
            Self::SubMessage(handler) => handler.read(buf, msg),
            Self::SubMessageArray(handler) => handler.read(buf, msg),
        }
    }
}
