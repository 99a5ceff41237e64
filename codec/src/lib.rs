//! Encode and decode messages from their schema.
//!
//! # Overview
//!
//! A schema-driven binary codec for hierarchically-typed messages. Instead of hand-written
//! encoders, each message type gets a [TypeCodec] built once from its field schema: an ordered
//! list of [Handler]s that together write an instance to bytes and read it back.
//!
//! # Format
//!
//! All values are little-endian, with no padding or field tags:
//!
//! - Runs of consecutive primitive fields (and fixed-length `uint8`/`char` arrays) are packed
//!   into a single fixed-size block.
//! - `string` and `uint8[]` fields are a `u16` length followed by that many bytes.
//! - Nested messages are encoded inline.
//! - Arrays of nested messages are the concatenated element encodings. If the array is paired
//!   with a count field (declared earlier in the same message), the count bounds decoding.
//!   Otherwise elements are decoded until the buffer is exhausted.
//!
//! # Example
//!
//! ```
//! use reflex_codec::{Config, Registry};
//! use reflex_schema::{Catalog, Message, Value};
//!
//! let mut catalog = Catalog::new();
//! catalog.parse("geometry/Point", "float32 x\nfloat32 y").unwrap();
//! catalog
//!     .parse("geometry/Polygon", "uint16 points_count\nPoint[] points")
//!     .unwrap();
//! let registry = Registry::new(catalog, Config::default());
//!
//! // Build an instance from the codec's template
//! let polygon = registry.get_or_build("geometry/Polygon").unwrap();
//! let point = registry.get_or_build("geometry/Point").unwrap();
//! let mut msg = polygon.instantiate();
//! let mut corner = point.instantiate();
//! corner.set("x", 1.0f32).unwrap();
//! msg.set("points", vec![corner]).unwrap();
//!
//! // The count is filled in before encoding
//! let encoded = polygon.bind(&mut msg).encode().unwrap();
//! assert_eq!(encoded.len(), 2 + 8);
//! assert_eq!(msg.get("points_count"), Some(&Value::U16(1)));
//!
//! let decoded = polygon.decode_exact(encoded.freeze()).unwrap();
//! assert_eq!(decoded, msg);
//! ```

pub mod classify;
pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod registry;
mod util;

// Re-export main types
pub use codec::{Instance, TypeCodec};
pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use registry::Registry;
