//! Nested messages.

use crate::{Error, TypeCodec};
use bytes::{Buf, BufMut};
use reflex_schema::{Message, Value};
use std::sync::Arc;

/// A field holding a single nested message, encoded inline with no prefix.
#[derive(Clone, Debug)]
pub struct SubMessage {
    name: String,
    codec: Arc<TypeCodec>,
}

impl SubMessage {
    pub fn new(name: impl Into<String>, codec: Arc<TypeCodec>) -> Self {
        Self {
            name: name.into(),
            codec,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Codec of the nested type.
    pub fn codec(&self) -> &Arc<TypeCodec> {
        &self.codec
    }

    fn nested<'a>(&self, msg: &'a Message) -> Result<&'a Message, Error> {
        match msg.get(&self.name) {
            Some(Value::Message(nested)) => Ok(nested),
            Some(other) => Err(Error::InvalidValue(self.name.clone(), "message", other.kind())),
            None => Err(Error::MissingField(self.name.clone())),
        }
    }

    pub(crate) fn preserialize(&self, msg: &mut Message) -> Result<(), Error> {
        match msg.get_mut(&self.name) {
            Some(Value::Message(nested)) => self.codec.sync(nested),
            Some(other) => Err(Error::InvalidValue(self.name.clone(), "message", other.kind())),
            None => Err(Error::MissingField(self.name.clone())),
        }
    }

    pub(crate) fn write(&self, buf: &mut impl BufMut, msg: &Message) -> Result<(), Error> {
        self.codec.write(buf, self.nested(msg)?)
    }

    pub(crate) fn read(&self, buf: &mut impl Buf, msg: &mut Message) -> Result<(), Error> {
        // Decode in place when the field already holds an instance of the nested type
        if let Some(Value::Message(nested)) = msg.get_mut(&self.name) {
            if nested.type_name() == self.codec.name() {
                return self.codec.read(buf, nested);
            }
        }
        let mut nested = self.codec.instantiate();
        self.codec.read(buf, &mut nested)?;
        msg.insert(self.name.as_str(), nested);
        Ok(())
    }
}
