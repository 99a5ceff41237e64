//! Lookup of message schemas by type name.

use crate::{parse, Error, MessageSchema};
use std::{collections::HashMap, sync::Arc};

/// Definition of `std_msgs/Header`, available through [Catalog::with_std].
pub const HEADER: &str = "
uint32 seq
uint32 stamp_secs
uint32 stamp_nsecs
char[16] frame_id
";

/// Resolves message type names to their schemas.
pub trait Source: Send + Sync {
    /// Returns the schema of `type_name`, if known.
    fn schema(&self, type_name: &str) -> Option<Arc<MessageSchema>>;
}

impl<S: Source + ?Sized> Source for Arc<S> {
    fn schema(&self, type_name: &str) -> Option<Arc<MessageSchema>> {
        (**self).schema(type_name)
    }
}

/// An in-memory [Source].
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    schemas: HashMap<String, Arc<MessageSchema>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog preloaded with `std_msgs/Header`.
    ///
    /// The header is a fixed-size variant (`frame_id` is a 16-byte array) so that it can be
    /// embedded in count-linked arrays.
    pub fn with_std() -> Self {
        let mut catalog = Self::new();
        catalog
            .parse("std_msgs/Header", HEADER)
            .expect("built-in definition is valid");
        catalog
    }

    /// Adds (or replaces) a schema.
    pub fn insert(&mut self, schema: MessageSchema) -> Arc<MessageSchema> {
        let schema = Arc::new(schema);
        self.schemas.insert(schema.name.clone(), schema.clone());
        schema
    }

    /// Parses `text` as the definition of `type_name` and adds it.
    pub fn parse(&mut self, type_name: &str, text: &str) -> Result<Arc<MessageSchema>, Error> {
        let schema = parse::parse(type_name, text)?;
        Ok(self.insert(schema))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl Source for Catalog {
    fn schema(&self, type_name: &str) -> Option<Arc<MessageSchema>> {
        self.schemas.get(type_name).cloned()
    }
}
