//! Field and message schemas.

use crate::Primitive;
use std::fmt;

/// Metadata describing one field of a message type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSchema {
    /// Field name.
    pub name: String,

    /// Declared type as written, including any array suffix (e.g. `Point[]`, `uint8[4]`).
    pub type_name: String,

    /// Element type for arrays, otherwise equal to `type_name`.
    pub base_type: String,

    /// Whether the field is an array.
    pub is_array: bool,

    /// Length of a fixed-size array, `None` for scalars and variable-length arrays.
    pub array_len: Option<usize>,

    /// Name of an integer field in the same message that carries this array's element count.
    pub count_field: Option<String>,
}

impl FieldSchema {
    /// A non-array field of type `ty`.
    pub fn scalar(name: impl Into<String>, ty: impl Into<String>) -> Self {
        let ty = ty.into();
        Self {
            name: name.into(),
            type_name: ty.clone(),
            base_type: ty,
            is_array: false,
            array_len: None,
            count_field: None,
        }
    }

    /// A variable-length array of `base`.
    pub fn array(name: impl Into<String>, base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            name: name.into(),
            type_name: format!("{base}[]"),
            base_type: base,
            is_array: true,
            array_len: None,
            count_field: None,
        }
    }

    /// A fixed-length array of `len` elements of `base`.
    pub fn fixed_array(name: impl Into<String>, base: impl Into<String>, len: usize) -> Self {
        let base = base.into();
        Self {
            name: name.into(),
            type_name: format!("{base}[{len}]"),
            base_type: base,
            is_array: true,
            array_len: Some(len),
            count_field: None,
        }
    }

    /// Links this array to the integer field `count` holding its element count.
    pub fn with_count(mut self, count: impl Into<String>) -> Self {
        self.count_field = Some(count.into());
        self
    }

    /// The primitive base type, if any.
    pub fn primitive(&self) -> Option<Primitive> {
        Primitive::from_name(&self.base_type)
    }

    /// Returns true for a length-prefixed `string` field.
    pub fn is_string(&self) -> bool {
        !self.is_array && self.base_type == "string"
    }

    /// Returns true for primitive scalars and fixed-length arrays of primitives.
    ///
    /// These are the fields that can be packed into a single fixed-width block.
    pub fn is_simple_fixed(&self) -> bool {
        self.primitive().is_some() && (!self.is_array || self.array_len.is_some())
    }

    /// Returns true for variable-length arrays of single bytes (`uint8[]`, `char[]`).
    pub fn is_byte_blob(&self) -> bool {
        self.is_array
            && self.array_len.is_none()
            && self.primitive().is_some_and(|p| p.is_byte())
    }
}

impl fmt::Display for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_name, self.name)
    }
}

/// A constant declared in a message definition. Constants are not encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub type_name: String,
    pub value: String,
}

/// The ordered fields of one message type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageSchema {
    /// Fully-qualified type name (e.g. `applanix_msgs/GNSSStatus`).
    pub name: String,

    /// Fields in declaration (and therefore wire) order.
    pub fields: Vec<FieldSchema>,

    /// Constants declared alongside the fields.
    pub constants: Vec<Constant>,
}

impl MessageSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            fields,
            constants: Vec::new(),
        }
    }

    /// Returns the field called `name`.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the declaration index of the field called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the constant called `name`.
    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|c| c.name == name)
    }

    /// The package part of the type name, if qualified.
    pub fn package(&self) -> Option<&str> {
        self.name.split_once('/').map(|(package, _)| package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let count = FieldSchema::scalar("count", "uint16");
        assert!(count.is_simple_fixed());
        assert!(!count.is_array);

        let tag = FieldSchema::fixed_array("tag", "char", 4);
        assert!(tag.is_simple_fixed());
        assert_eq!(tag.type_name, "char[4]");

        let blob = FieldSchema::array("data", "uint8");
        assert!(!blob.is_simple_fixed());
        assert!(blob.is_byte_blob());

        let name = FieldSchema::scalar("name", "string");
        assert!(name.is_string());
        assert!(!name.is_simple_fixed());

        let items = FieldSchema::array("items", "pkg/Point").with_count("count");
        assert!(!items.is_simple_fixed());
        assert!(!items.is_byte_blob());
        assert_eq!(items.count_field.as_deref(), Some("count"));
    }

    #[test]
    fn test_lookup() {
        let schema = MessageSchema::new(
            "pkg/Points",
            vec![
                FieldSchema::scalar("count", "uint16"),
                FieldSchema::array("items", "pkg/Point").with_count("count"),
            ],
        );
        assert_eq!(schema.position("items"), Some(1));
        assert_eq!(schema.field("count").unwrap().base_type, "uint16");
        assert!(schema.field("missing").is_none());
        assert_eq!(schema.package(), Some("pkg"));
    }
}
