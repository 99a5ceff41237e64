//! Describe and reflect over hierarchically-typed messages.
//!
//! # Overview
//!
//! A message type is an ordered list of [FieldSchema]s. Each field is a primitive scalar, a
//! `string`, a nested message, or an array of any of these (fixed-length or variable-length).
//! Schemas are either built directly or parsed from the line-oriented definition language
//! (see [parse]). A [Source] resolves type names to schemas; [Catalog] is an in-memory one.
//!
//! Message instances are dynamic: a [Message] is an ordered list of named [Value]s.
//!
//! # Example
//!
//! ```
//! use reflex_schema::{Catalog, Message, Source, Value};
//!
//! let mut catalog = Catalog::new();
//! catalog.parse("geometry/Point", "float32 x\nfloat32 y").unwrap();
//! let schema = catalog.schema("geometry/Point").unwrap();
//! assert_eq!(schema.fields.len(), 2);
//!
//! let point = Message::new("geometry/Point").with("x", 1.0f32).with("y", 2.0f32);
//! assert_eq!(point.get("y"), Some(&Value::F32(2.0)));
//! ```

pub mod error;
pub mod field;
pub mod parse;
pub mod primitive;
pub mod source;
pub mod value;

pub use error::Error;
pub use field::{Constant, FieldSchema, MessageSchema};
pub use primitive::Primitive;
pub use source::{Catalog, Source};
pub use value::{Message, Value};
