//! Length-prefixed text and byte blobs.

use crate::{
    util::{at_least, boundary, capacity},
    Error,
};
use bytes::{Buf, BufMut, Bytes};
use reflex_schema::{Message, Value};

/// Size of the little-endian length prefix.
pub const PREFIX_LEN: usize = 2;

/// A `string` or `uint8[]` field, encoded as a `u16` length followed by the raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableString {
    name: String,
    text: bool,
}

impl VariableString {
    /// A handler for field `name`. `text` fields hold UTF-8 strings, others raw bytes.
    pub fn new(name: impl Into<String>, text: bool) -> Self {
        Self {
            name: name.into(),
            text,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default value of the field.
    pub fn default_value(&self) -> Value {
        match self.text {
            true => Value::String(String::new()),
            false => Value::Bytes(Bytes::new()),
        }
    }

    pub(crate) fn write(&self, buf: &mut impl BufMut, msg: &Message) -> Result<(), Error> {
        let value = msg
            .get(&self.name)
            .ok_or_else(|| Error::MissingField(self.name.clone()))?;
        let data = match (self.text, value) {
            (true, Value::String(s)) => s.as_bytes(),
            (false, Value::Bytes(b)) => b.as_ref(),
            _ => {
                let expected = if self.text { "string" } else { "bytes" };
                return Err(Error::InvalidValue(self.name.clone(), expected, value.kind()));
            }
        };
        let len = u16::try_from(data.len()).map_err(|_| {
            Error::LengthExceeded(self.name.clone(), data.len(), u16::MAX as usize)
        })?;
        capacity(&*buf, PREFIX_LEN + data.len())?;
        buf.put_u16_le(len);
        buf.put_slice(data);
        Ok(())
    }

    pub(crate) fn read(&self, buf: &mut impl Buf, msg: &mut Message) -> Result<(), Error> {
        boundary(&*buf, PREFIX_LEN)?;
        let len = buf.get_u16_le() as usize;
        at_least(&*buf, len)?;
        let data = buf.copy_to_bytes(len);
        let value = match self.text {
            true => {
                let text = String::from_utf8(data.to_vec())
                    .map_err(|err| Error::InvalidData(self.name.clone(), err.to_string()))?;
                Value::String(text)
            }
            false => Value::Bytes(data),
        };
        msg.insert(self.name.as_str(), value);
        Ok(())
    }
}
