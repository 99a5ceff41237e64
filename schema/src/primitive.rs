//! Built-in scalar types of the message definition language.

use crate::Value;
use std::fmt;

/// A scalar type with a fixed-width little-endian encoding.
///
/// `char` and `byte` are legacy aliases of `uint8` and `int8` respectively. They keep their
/// own variants so that a parsed schema prints back the way it was written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Char,
    Byte,
}

impl Primitive {
    /// Resolves a type name (e.g. `uint16`) to a [Primitive].
    pub fn from_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "bool" => Self::Bool,
            "int8" => Self::Int8,
            "uint8" => Self::UInt8,
            "int16" => Self::Int16,
            "uint16" => Self::UInt16,
            "int32" => Self::Int32,
            "uint32" => Self::UInt32,
            "int64" => Self::Int64,
            "uint64" => Self::UInt64,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "char" => Self::Char,
            "byte" => Self::Byte,
            _ => return None,
        };
        Some(primitive)
    }

    /// The name used for this type in message definitions.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::UInt8 => "uint8",
            Self::Int16 => "int16",
            Self::UInt16 => "uint16",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Char => "char",
            Self::Byte => "byte",
        }
    }

    /// Encoded width in bytes.
    pub const fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 | Self::Char | Self::Byte => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Returns true for the single-byte types whose arrays are treated as raw bytes.
    pub const fn is_byte(&self) -> bool {
        matches!(self, Self::UInt8 | Self::Char)
    }

    /// Returns true for integer types (the only types a count field may have).
    pub const fn is_integer(&self) -> bool {
        !matches!(self, Self::Bool | Self::Float32 | Self::Float64)
    }

    /// The zero value of this type.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int8 | Self::Byte => Value::I8(0),
            Self::UInt8 | Self::Char => Value::U8(0),
            Self::Int16 => Value::I16(0),
            Self::UInt16 => Value::U16(0),
            Self::Int32 => Value::I32(0),
            Self::UInt32 => Value::U32(0),
            Self::Int64 => Value::I64(0),
            Self::UInt64 => Value::U64(0),
            Self::Float32 => Value::F32(0.0),
            Self::Float64 => Value::F64(0.0),
        }
    }

    /// Returns true if `value` holds the variant this type decodes to.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Bool, Value::Bool(_))
                | (Self::Int8 | Self::Byte, Value::I8(_))
                | (Self::UInt8 | Self::Char, Value::U8(_))
                | (Self::Int16, Value::I16(_))
                | (Self::UInt16, Value::U16(_))
                | (Self::Int32, Value::I32(_))
                | (Self::UInt32, Value::U32(_))
                | (Self::Int64, Value::I64(_))
                | (Self::UInt64, Value::U64(_))
                | (Self::Float32, Value::F32(_))
                | (Self::Float64, Value::F64(_))
        )
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
