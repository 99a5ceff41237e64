//! Per-type codecs and their binding to message instances.

use crate::{
    classify::{self, Batch, Strategy},
    handler::{FixedFields, Handler, SubMessage, SubMessageArray, VariableString},
    Config, Error,
};
use bytes::{Buf, BufMut, BytesMut};
use reflex_schema::{FieldSchema, Message, MessageSchema};
use std::sync::Arc;

/// The ordered handlers that encode and decode one message type.
///
/// A [TypeCodec] is a pure function of its type's schema (and the [Config] it was built with):
/// building it twice yields codecs that behave identically. Once built it is immutable and can
/// be shared across threads.
#[derive(Clone, Debug)]
pub struct TypeCodec {
    name: String,
    handlers: Vec<Handler>,
    size: Option<usize>,
    template: Message,
}

impl TypeCodec {
    /// Builds the codec for `schema`.
    ///
    /// `resolve` returns the codec of a nested message type (typically from a cache). Any field
    /// that cannot be encoded fails the build with [Error::Schema].
    pub fn build<F>(schema: &MessageSchema, cfg: &Config, mut resolve: F) -> Result<Self, Error>
    where
        F: FnMut(&str) -> Result<Arc<TypeCodec>, Error>,
    {
        let invalid = |message: String| Error::Schema(schema.name.clone(), message);
        let mut handlers = Vec::new();
        let mut template = Message::new(schema.name.as_str());
        for batch in classify::batches(&schema.fields) {
            let field = match batch {
                Batch::Fixed(run) => {
                    let fixed = FixedFields::new(&run).map_err(invalid)?;
                    for (name, slot) in fixed.fields() {
                        template.insert(name.as_str(), slot.default_value());
                    }
                    handlers.push(Handler::FixedFields(fixed));
                    continue;
                }
                Batch::Single(field) => field,
            };
            let handler = match classify::classify(field).map_err(invalid)? {
                Strategy::VariableString { text } => {
                    let handler = VariableString::new(&field.name, text);
                    template.insert(field.name.as_str(), handler.default_value());
                    Handler::VariableString(handler)
                }
                Strategy::SubMessage => {
                    let codec = resolve(&field.base_type)?;
                    template.insert(field.name.as_str(), codec.instantiate());
                    Handler::SubMessage(SubMessage::new(&field.name, codec))
                }
                Strategy::SubMessageArray => {
                    let element = resolve(&field.base_type)?;
                    let count = count_field(schema, field, &element, cfg)?;
                    let len = field.array_len.unwrap_or(0);
                    template.insert(field.name.as_str(), vec![element.instantiate(); len]);
                    Handler::SubMessageArray(SubMessageArray::new(
                        &field.name,
                        count,
                        field.array_len,
                        element,
                        cfg.max_array_len,
                    ))
                }
            };
            handlers.push(handler);
        }

        let size = match handlers.as_slice() {
            [only] => only.size(),
            _ => None,
        };
        Ok(Self {
            name: schema.name.clone(),
            handlers,
            size,
            template,
        })
    }

    /// Name of the message type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handlers in wire order.
    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    /// Encoded size of every instance, if the type reduces to a single fixed-size block.
    pub fn size(&self) -> Option<usize> {
        self.size
    }

    /// A new instance of the type with every field set to its default.
    pub fn instantiate(&self) -> Message {
        self.template.clone()
    }

    /// Binds this codec to `msg` for one encode or decode.
    pub fn bind<'a>(&'a self, msg: &'a mut Message) -> Instance<'a> {
        Instance { codec: self, msg }
    }

    /// Decodes a new instance from `buf`, leaving any trailing bytes unread.
    pub fn decode(&self, buf: &mut impl Buf) -> Result<Message, Error> {
        let mut msg = self.instantiate();
        self.bind(&mut msg).deserialize(buf)?;
        Ok(msg)
    }

    /// Decodes a new instance from `buf`, ensuring the buffer is fully consumed.
    ///
    /// For types with a known size, the buffer length is checked before reading.
    pub fn decode_exact(&self, mut buf: impl Buf) -> Result<Message, Error> {
        if let Some(size) = self.size {
            let remaining = buf.remaining();
            if remaining < size {
                return Err(self.decode_error(Error::Truncated(size, remaining)));
            }
            if remaining > size {
                return Err(Error::ExtraData(remaining - size));
            }
        }

        let msg = self.decode(&mut buf)?;

        // Check that the buffer is fully consumed.
        let remaining = buf.remaining();
        if remaining > 0 {
            return Err(Error::ExtraData(remaining));
        }
        Ok(msg)
    }

    pub(crate) fn sync(&self, msg: &mut Message) -> Result<(), Error> {
        self.handlers.iter().try_for_each(|h| h.preserialize(msg))
    }

    pub(crate) fn write(&self, buf: &mut impl BufMut, msg: &Message) -> Result<(), Error> {
        self.handlers.iter().try_for_each(|h| h.write(buf, msg))
    }

    pub(crate) fn read(&self, buf: &mut impl Buf, msg: &mut Message) -> Result<(), Error> {
        self.handlers.iter().try_for_each(|h| h.read(buf, msg))
    }

    fn encode_error(&self, err: Error) -> Error {
        Error::Encode(self.name.clone(), Box::new(err))
    }

    fn decode_error(&self, err: Error) -> Error {
        Error::Decode(self.name.clone(), Box::new(err))
    }
}

/// Validates the count field linked to an array of `element`, returning its name.
fn count_field(
    schema: &MessageSchema,
    field: &FieldSchema,
    element: &TypeCodec,
    cfg: &Config,
) -> Result<Option<String>, Error> {
    let Some(count) = &field.count_field else {
        return Ok(None);
    };
    let invalid = |message: String| {
        Error::Schema(schema.name.clone(), format!("{}: {message}", field.name))
    };
    if field.array_len.is_some() {
        return Err(invalid("fixed-length arrays cannot have a count field".into()));
    }
    let Some(position) = schema.position(count) else {
        return Err(invalid(format!("count field {count} does not exist")));
    };
    let counter = &schema.fields[position];
    let integer = counter.primitive().is_some_and(|p| p.is_integer());
    if counter.is_array || !integer {
        return Err(invalid(format!(
            "count field {count} has non-integer type {}",
            counter.type_name
        )));
    }
    let follows = schema
        .position(&field.name)
        .is_some_and(|array| position > array);
    if cfg.check_count_order && follows {
        return Err(invalid(format!("count field {count} must precede the array")));
    }
    if element.size().is_none() {
        return Err(invalid(format!(
            "elements of {} have no fixed size",
            element.name()
        )));
    }
    Ok(Some(count.clone()))
}

/// A [TypeCodec] bound to one message instance.
pub struct Instance<'a> {
    codec: &'a TypeCodec,
    msg: &'a mut Message,
}

impl Instance<'_> {
    /// The bound message.
    pub fn message(&self) -> &Message {
        &*self.msg
    }

    /// Updates derived fields (array counts), recursively. Must run before [Instance::serialize].
    pub fn preserialize(&mut self) -> Result<(), Error> {
        self.codec
            .sync(self.msg)
            .map_err(|err| self.codec.encode_error(err))
    }

    /// Writes the bound message to `buf`.
    pub fn serialize(&self, buf: &mut impl BufMut) -> Result<(), Error> {
        self.codec
            .write(buf, &*self.msg)
            .map_err(|err| self.codec.encode_error(err))
    }

    /// Reads `buf` into the bound message.
    ///
    /// On failure the message is left partially populated and should not be used.
    pub fn deserialize(&mut self, buf: &mut impl Buf) -> Result<(), Error> {
        self.codec
            .read(buf, self.msg)
            .map_err(|err| self.codec.decode_error(err))
    }

    /// Runs [Instance::preserialize] and [Instance::serialize] into a new buffer.
    pub fn encode(&mut self) -> Result<BytesMut, Error> {
        self.preserialize()?;
        let mut buf = BytesMut::with_capacity(self.codec.size.unwrap_or_default());
        self.serialize(&mut buf)?;
        if let Some(size) = self.codec.size {
            assert_eq!(buf.len(), size, "serialize() did not write expected bytes");
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;
    use reflex_schema::{Catalog, Value};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::with_std();
        catalog.parse("pkg/Point", "float32 x\nfloat32 y").unwrap();
        catalog
            .parse("pkg/Labeled", "Header header\nstring label\nPoint point")
            .unwrap();
        catalog
    }

    #[test]
    fn test_fixed_size() {
        let registry = Registry::new(catalog(), Config::default());
        let point = registry.get_or_build("pkg/Point").unwrap();
        assert_eq!(point.size(), Some(8));
        assert_eq!(point.handlers().len(), 1);

        let header = registry.get_or_build("std_msgs/Header").unwrap();
        assert_eq!(header.size(), Some(4 + 4 + 4 + 16));

        let labeled = registry.get_or_build("pkg/Labeled").unwrap();
        assert_eq!(labeled.size(), None);
        assert_eq!(labeled.handlers().len(), 3);
    }

    #[test]
    fn test_template() {
        let registry = Registry::new(catalog(), Config::default());
        let labeled = registry.get_or_build("pkg/Labeled").unwrap();
        let msg = labeled.instantiate();
        assert_eq!(msg.type_name(), "pkg/Labeled");
        assert_eq!(msg.get("label"), Some(&Value::String(String::new())));

        let point = msg.get("point").and_then(Value::as_message).unwrap();
        assert_eq!(point.type_name(), "pkg/Point");
        assert_eq!(point.get("x"), Some(&Value::F32(0.0)));

        let header = msg.get("header").and_then(Value::as_message).unwrap();
        assert_eq!(header.get_as::<bytes::Bytes>("frame_id").unwrap().len(), 16);
    }

    #[test]
    fn test_fixed_encode_len() {
        let registry = Registry::new(catalog(), Config::default());
        let header = registry.get_or_build("std_msgs/Header").unwrap();
        let mut msg = header.instantiate();
        msg.set("seq", 7u32).unwrap();
        msg.set("frame_id", &b"base_link"[..]).unwrap();
        let encoded = header.bind(&mut msg).encode().unwrap();
        assert_eq!(encoded.len(), 28);

        let decoded = header.decode_exact(encoded.freeze()).unwrap();
        assert_eq!(decoded.get("seq"), Some(&Value::U32(7)));
        assert_eq!(
            &decoded.get_as::<bytes::Bytes>("frame_id").unwrap()[..9],
            b"base_link"
        );
    }

    #[test]
    fn test_decode_exact_lengths() {
        let registry = Registry::new(catalog(), Config::default());
        let point = registry.get_or_build("pkg/Point").unwrap();
        assert!(matches!(
            point.decode_exact(&[0u8; 9][..]),
            Err(Error::ExtraData(1))
        ));
        assert!(matches!(
            point.decode_exact(&[0u8; 7][..]),
            Err(Error::Decode(_, cause)) if matches!(*cause, Error::Truncated(8, 7))
        ));

        // Variable-size types check for trailing bytes after reading
        let labeled = registry.get_or_build("pkg/Labeled").unwrap();
        let mut msg = labeled.instantiate();
        let mut encoded = labeled.bind(&mut msg).encode().unwrap().to_vec();
        encoded.push(0);
        assert!(matches!(
            labeled.decode_exact(&encoded[..]),
            Err(Error::ExtraData(1))
        ));
    }

    #[test]
    fn test_wrapped_errors() {
        let registry = Registry::new(catalog(), Config::default());
        let point = registry.get_or_build("pkg/Point").unwrap();

        // A clean end of input is reported as a decode failure at the top level
        let err = point.decode(&mut &[0u8; 0][..]).unwrap_err();
        assert!(matches!(&err, Error::Decode(name, cause)
            if name == "pkg/Point" && matches!(**cause, Error::EndOfInput)));
        assert!(std::error::Error::source(&err).is_some());

        let mut msg = Message::new("pkg/Point").with("x", 1.0f32);
        let err = point.bind(&mut msg).serialize(&mut BytesMut::new()).unwrap_err();
        assert!(matches!(&err, Error::Encode(_, cause)
            if matches!(&**cause, Error::MissingField(name) if name == "y")));
    }
}
