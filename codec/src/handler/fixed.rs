//! Packed little-endian layout for runs of fixed-width fields.

use crate::{
    util::{boundary, capacity},
    Error,
};
use bytes::{Buf, BufMut, Bytes};
use reflex_schema::{FieldSchema, Message, Primitive, Value};

/// Encoding of one field within a [FixedFields] block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    /// A primitive scalar.
    Scalar(Primitive),
    /// A byte array of exactly this many bytes.
    Bytes(usize),
}

impl Slot {
    /// Encoded width in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Scalar(primitive) => primitive.size(),
            Self::Bytes(len) => *len,
        }
    }

    /// Default value of a field with this slot.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Scalar(primitive) => primitive.default_value(),
            Self::Bytes(len) => Value::Bytes(Bytes::from(vec![0; *len])),
        }
    }
}

/// A contiguous run of fixed-width fields packed into a single block.
///
/// The block is the concatenation of each field in declaration order, with no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedFields {
    fields: Vec<(String, Slot)>,
    size: usize,
}

impl FixedFields {
    /// Builds the layout for `fields`.
    ///
    /// Fails with a description of the offending field if one has no fixed-width encoding.
    pub fn new(fields: &[&FieldSchema]) -> Result<Self, String> {
        let fields = fields
            .iter()
            .map(|field| Ok((field.name.clone(), slot(field)?)))
            .collect::<Result<Vec<_>, String>>()?;
        let size = fields.iter().map(|(_, slot)| slot.size()).sum();
        Ok(Self { fields, size })
    }

    /// Size of the packed block in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Field names and slots in layout order.
    pub fn fields(&self) -> &[(String, Slot)] {
        &self.fields
    }

    pub(crate) fn write(&self, buf: &mut impl BufMut, msg: &Message) -> Result<(), Error> {
        capacity(&*buf, self.size)?;
        for (name, slot) in &self.fields {
            let value = msg
                .get(name)
                .ok_or_else(|| Error::MissingField(name.clone()))?;
            match slot {
                Slot::Scalar(primitive) => put_scalar(buf, name, *primitive, value)?,
                Slot::Bytes(len) => {
                    let bytes = value
                        .as_bytes()
                        .ok_or_else(|| Error::InvalidValue(name.clone(), "bytes", value.kind()))?;
                    if bytes.len() > *len {
                        return Err(Error::LengthExceeded(name.clone(), bytes.len(), *len));
                    }
                    buf.put_slice(bytes);
                    buf.put_bytes(0, len - bytes.len());
                }
            }
        }
        Ok(())
    }

    pub(crate) fn read(&self, buf: &mut impl Buf, msg: &mut Message) -> Result<(), Error> {
        boundary(&*buf, self.size)?;
        for (name, slot) in &self.fields {
            let value = match slot {
                Slot::Scalar(primitive) => get_scalar(buf, name, *primitive)?,
                Slot::Bytes(len) => Value::Bytes(buf.copy_to_bytes(*len)),
            };
            msg.insert(name.as_str(), value);
        }
        Ok(())
    }
}

fn slot(field: &FieldSchema) -> Result<Slot, String> {
    let primitive = field
        .primitive()
        .ok_or_else(|| format!("{}: {} is not a primitive", field.name, field.base_type))?;
    match (field.is_array, field.array_len) {
        (false, _) => Ok(Slot::Scalar(primitive)),
        (true, Some(len)) if primitive.is_byte() => Ok(Slot::Bytes(len)),
        _ => Err(format!(
            "{}: no fixed-width encoding for {}",
            field.name, field.type_name
        )),
    }
}

fn put_scalar(
    buf: &mut impl BufMut,
    name: &str,
    primitive: Primitive,
    value: &Value,
) -> Result<(), Error> {
    match (primitive, value) {
        (Primitive::Bool, Value::Bool(v)) => buf.put_u8(u8::from(*v)),
        (Primitive::Int8 | Primitive::Byte, Value::I8(v)) => buf.put_i8(*v),
        (Primitive::UInt8 | Primitive::Char, Value::U8(v)) => buf.put_u8(*v),
        (Primitive::Int16, Value::I16(v)) => buf.put_i16_le(*v),
        (Primitive::UInt16, Value::U16(v)) => buf.put_u16_le(*v),
        (Primitive::Int32, Value::I32(v)) => buf.put_i32_le(*v),
        (Primitive::UInt32, Value::U32(v)) => buf.put_u32_le(*v),
        (Primitive::Int64, Value::I64(v)) => buf.put_i64_le(*v),
        (Primitive::UInt64, Value::U64(v)) => buf.put_u64_le(*v),
        (Primitive::Float32, Value::F32(v)) => buf.put_f32_le(*v),
        (Primitive::Float64, Value::F64(v)) => buf.put_f64_le(*v),
        _ => {
            return Err(Error::InvalidValue(
                name.to_string(),
                primitive.name(),
                value.kind(),
            ))
        }
    }
    Ok(())
}

fn get_scalar(buf: &mut impl Buf, name: &str, primitive: Primitive) -> Result<Value, Error> {
    let value = match primitive {
        Primitive::Bool => match buf.get_u8() {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            b => return Err(Error::InvalidData(name.to_string(), format!("invalid bool: {b}"))),
        },
        Primitive::Int8 | Primitive::Byte => Value::I8(buf.get_i8()),
        Primitive::UInt8 | Primitive::Char => Value::U8(buf.get_u8()),
        Primitive::Int16 => Value::I16(buf.get_i16_le()),
        Primitive::UInt16 => Value::U16(buf.get_u16_le()),
        Primitive::Int32 => Value::I32(buf.get_i32_le()),
        Primitive::UInt32 => Value::U32(buf.get_u32_le()),
        Primitive::Int64 => Value::I64(buf.get_i64_le()),
        Primitive::UInt64 => Value::U64(buf.get_u64_le()),
        Primitive::Float32 => Value::F32(buf.get_f32_le()),
        Primitive::Float64 => Value::F64(buf.get_f64_le()),
    };
    Ok(value)
}
