//! Sequences of nested messages.
//!
//! Elements are concatenated with no delimiter. How many to decode is decided at runtime:
//!
//! - **Fixed**: a fixed-length array decodes exactly its declared number of elements.
//! - **Bounded**: when the message holds the array's linked count field, `count * element size`
//!   bytes are sliced off the cursor and elements are decoded until that window is exhausted.
//! - **Unbounded**: otherwise, elements are decoded until the cursor is exhausted at an
//!   element boundary. This is only safe when the array is the last thing in a bounded buffer.

use crate::{util::at_least, Error, TypeCodec};
use bytes::{Buf, BufMut};
use reflex_schema::{Message, Value};
use std::sync::Arc;

/// A field holding an array of nested messages.
#[derive(Clone, Debug)]
pub struct SubMessageArray {
    name: String,
    count: Option<String>,
    fixed_len: Option<usize>,
    element: Arc<TypeCodec>,
    max_len: usize,
}

impl SubMessageArray {
    /// A handler for field `name` holding elements of type `element`.
    ///
    /// `count` names the integer field carrying the element count, `fixed_len` the length of
    /// a fixed-length array, and `max_len` bounds the number of elements decoded.
    pub fn new(
        name: impl Into<String>,
        count: Option<String>,
        fixed_len: Option<usize>,
        element: Arc<TypeCodec>,
        max_len: usize,
    ) -> Self {
        Self {
            name: name.into(),
            count,
            fixed_len,
            element,
            max_len,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the linked count field, if any.
    pub fn count(&self) -> Option<&str> {
        self.count.as_deref()
    }

    /// Codec of the element type.
    pub fn element(&self) -> &Arc<TypeCodec> {
        &self.element
    }

    fn count_name(&self) -> &str {
        self.count.as_deref().unwrap_or(&self.name)
    }

    fn elements<'a>(&self, msg: &'a Message) -> Result<&'a [Message], Error> {
        match msg.get(&self.name) {
            Some(Value::Array(elements)) => Ok(elements),
            Some(other) => Err(Error::InvalidValue(self.name.clone(), "array", other.kind())),
            None => Err(Error::MissingField(self.name.clone())),
        }
    }

    /// Syncs the count field with the array length, then each element's own derived fields.
    pub(crate) fn preserialize(&self, msg: &mut Message) -> Result<(), Error> {
        let len = self.elements(msg)?.len();
        if let Some(count) = &self.count {
            let current = msg
                .get(count)
                .ok_or_else(|| Error::MissingField(count.clone()))?;
            let updated = current.integer_like(len).ok_or_else(|| match current.as_integer() {
                Some(_) => Error::InvalidData(
                    count.clone(),
                    format!("count {len} does not fit in {}", current.kind()),
                ),
                None => Error::InvalidValue(count.clone(), "integer", current.kind()),
            })?;
            msg.insert(count.as_str(), updated);
        }
        if let Some(Value::Array(elements)) = msg.get_mut(&self.name) {
            for element in elements {
                self.element.sync(element)?;
            }
        }
        Ok(())
    }

    pub(crate) fn write(&self, buf: &mut impl BufMut, msg: &Message) -> Result<(), Error> {
        let elements = self.elements(msg)?;
        if let Some(len) = self.fixed_len {
            if elements.len() != len {
                return Err(Error::InvalidData(
                    self.name.clone(),
                    format!("expected {len} elements, found {}", elements.len()),
                ));
            }
        }
        for element in elements {
            self.element.write(buf, element)?;
        }
        Ok(())
    }

    pub(crate) fn read(&self, buf: &mut impl Buf, msg: &mut Message) -> Result<(), Error> {
        let elements = match (self.fixed_len, self.bound(msg)?) {
            (Some(len), _) => self.read_exact(buf, len)?,
            (None, Some(count)) => {
                let size = self.element.size().ok_or_else(|| {
                    Error::Schema(
                        self.element.name().to_string(),
                        "counted array elements must have a fixed size".into(),
                    )
                })?;
                let window = count.checked_mul(size).ok_or_else(|| {
                    Error::InvalidData(
                        self.count_name().to_string(),
                        format!("window of {count} elements overflows"),
                    )
                })?;
                at_least(&*buf, window)?;
                let mut window = buf.copy_to_bytes(window);
                self.read_until_end(&mut window)?
            }
            (None, None) => self.read_until_end(buf)?,
        };
        msg.insert(self.name.as_str(), elements);
        Ok(())
    }

    /// Returns the element count carried by the linked count field, if the message has one.
    fn bound(&self, msg: &Message) -> Result<Option<usize>, Error> {
        let Some(value) = self.count.as_ref().and_then(|count| msg.get(count)) else {
            return Ok(None);
        };
        let name = self.count_name();
        let count = value
            .as_integer()
            .ok_or_else(|| Error::InvalidValue(name.to_string(), "integer", value.kind()))?;
        let count = usize::try_from(count).map_err(|_| {
            Error::InvalidData(name.to_string(), format!("invalid element count: {count}"))
        })?;
        if count > self.max_len {
            return Err(Error::LengthExceeded(self.name.clone(), count, self.max_len));
        }
        Ok(Some(count))
    }

    fn read_exact(&self, buf: &mut impl Buf, len: usize) -> Result<Vec<Message>, Error> {
        if len > self.max_len {
            return Err(Error::LengthExceeded(self.name.clone(), len, self.max_len));
        }
        let mut elements = Vec::with_capacity(len);
        for _ in 0..len {
            let mut element = self.element.instantiate();
            match self.element.read(buf, &mut element) {
                Err(Error::EndOfInput) => {
                    return Err(Error::InvalidData(
                        self.name.clone(),
                        format!("expected {len} elements, found {}", elements.len()),
                    ))
                }
                result => result?,
            }
            elements.push(element);
        }
        Ok(elements)
    }

    /// Decodes elements until the element decoder reports [Error::EndOfInput] at an element
    /// boundary.
    fn read_until_end(&self, buf: &mut impl Buf) -> Result<Vec<Message>, Error> {
        let mut elements = Vec::new();
        loop {
            let start = buf.remaining();
            let mut element = self.element.instantiate();
            match self.element.read(buf, &mut element) {
                // An element that reads nothing from an empty cursor marks a clean end
                Ok(()) if start == 0 => break,
                Ok(()) if buf.remaining() == start => {
                    return Err(Error::InvalidData(
                        self.name.clone(),
                        "element encodes to zero bytes".into(),
                    ));
                }
                Ok(()) => {}
                Err(Error::EndOfInput) if buf.remaining() == start => break,
                Err(Error::EndOfInput) => {
                    return Err(Error::InvalidData(
                        self.name.clone(),
                        format!("element truncated after {} bytes", start - buf.remaining()),
                    ));
                }
                Err(err) => return Err(err),
            }
            if elements.len() == self.max_len {
                return Err(Error::LengthExceeded(
                    self.name.clone(),
                    elements.len() + 1,
                    self.max_len,
                ));
            }
            elements.push(element);
        }
        Ok(elements)
    }
}
