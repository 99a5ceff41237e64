//! Dynamic message values.

use crate::Error;
use bytes::Bytes;
use std::sync::Arc;

/// The value of one message field.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    /// Fixed-length byte arrays and variable-length byte blobs.
    Bytes(Bytes),
    /// Length-prefixed text.
    String(String),
    /// A nested message.
    Message(Message),
    /// A sequence of nested messages.
    Array(Vec<Message>),
}

impl Value {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I8(_) => "int8",
            Self::U8(_) => "uint8",
            Self::I16(_) => "int16",
            Self::U16(_) => "uint16",
            Self::I32(_) => "int32",
            Self::U32(_) => "uint32",
            Self::I64(_) => "int64",
            Self::U64(_) => "uint64",
            Self::F32(_) => "float32",
            Self::F64(_) => "float64",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Message(_) => "message",
            Self::Array(_) => "array",
        }
    }

    /// Returns the value as a wide integer if it is one.
    pub fn as_integer(&self) -> Option<i128> {
        let v = match *self {
            Self::I8(v) => v as i128,
            Self::U8(v) => v as i128,
            Self::I16(v) => v as i128,
            Self::U16(v) => v as i128,
            Self::I32(v) => v as i128,
            Self::U32(v) => v as i128,
            Self::I64(v) => v as i128,
            Self::U64(v) => v as i128,
            _ => return None,
        };
        Some(v)
    }

    /// Returns `n` stored in the same integer variant as `self`.
    ///
    /// Returns `None` if `self` is not an integer or `n` does not fit.
    pub fn integer_like(&self, n: usize) -> Option<Self> {
        let v = match self {
            Self::I8(_) => Self::I8(n.try_into().ok()?),
            Self::U8(_) => Self::U8(n.try_into().ok()?),
            Self::I16(_) => Self::I16(n.try_into().ok()?),
            Self::U16(_) => Self::U16(n.try_into().ok()?),
            Self::I32(_) => Self::I32(n.try_into().ok()?),
            Self::U32(_) => Self::U32(n.try_into().ok()?),
            Self::I64(_) => Self::I64(n.try_into().ok()?),
            Self::U64(_) => Self::U64(n.try_into().ok()?),
            _ => return None,
        };
        Some(v)
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Message]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }
}

macro_rules! impl_scalar {
    ($type:ty, $variant:ident) => {
        impl From<$type> for Value {
            fn from(v: $type) -> Self {
                Self::$variant(v)
            }
        }

        impl TryFrom<&Value> for $type {
            type Error = Error;

            fn try_from(value: &Value) -> Result<Self, Error> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(Error::WrongKind(stringify!($variant), other.kind())),
                }
            }
        }
    };
}

impl_scalar!(bool, Bool);
impl_scalar!(i8, I8);
impl_scalar!(u8, U8);
impl_scalar!(i16, I16);
impl_scalar!(u16, U16);
impl_scalar!(i32, I32);
impl_scalar!(u32, U32);
impl_scalar!(i64, I64);
impl_scalar!(u64, U64);
impl_scalar!(f32, F32);
impl_scalar!(f64, F64);
impl_scalar!(Bytes, Bytes);
impl_scalar!(String, String);
impl_scalar!(Message, Message);
impl_scalar!(Vec<Message>, Array);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<&'static [u8]> for Value {
    fn from(v: &'static [u8]) -> Self {
        Self::Bytes(Bytes::from_static(v))
    }
}

/// An instance of a message type: named field values in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    type_name: Arc<str>,
    fields: Vec<(String, Value)>,
}

impl Message {
    /// An instance of `type_name` with no fields.
    pub fn new(type_name: impl Into<Arc<str>>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder form of [Message::insert].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Reads field `name` as `T`.
    pub fn get_as<'a, T>(&'a self, name: &str) -> Result<T, Error>
    where
        T: TryFrom<&'a Value, Error = Error>,
    {
        let value = self
            .get(name)
            .ok_or_else(|| Error::UnknownField(self.type_name.to_string(), name.to_string()))?;
        T::try_from(value)
    }

    /// Adds field `name`, or replaces its value if it already exists.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.get_mut(&name) {
            Some(slot) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Replaces the value of an existing field, returning the previous value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Value, Error> {
        let type_name = self.type_name.clone();
        let slot = self
            .get_mut(name)
            .ok_or_else(|| Error::UnknownField(type_name.to_string(), name.to_string()))?;
        Ok(std::mem::replace(slot, value.into()))
    }

    /// Iterates over fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}
