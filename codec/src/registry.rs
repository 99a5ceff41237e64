//! Cache of [TypeCodec]s keyed by message type name.
//!
//! # Concurrency
//!
//! Lookups take a shared read lock. On a miss, the codec (and any nested codec it needs) is
//! built without holding the lock and then inserted under the write lock. If another thread
//! inserted the same type first, its codec is kept and the new one is discarded, so every
//! caller observes the same [Arc<TypeCodec>] for a given type.

use crate::{Config, Error, TypeCodec};
use bytes::{Buf, BytesMut};
use reflex_schema::{Message, Source};
use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{Arc, RwLock},
};
use tracing::{debug, trace};

/// Builds [TypeCodec]s on first use and shares them afterwards.
pub struct Registry<S: Source> {
    source: S,
    cfg: Config,
    codecs: RwLock<HashMap<String, Arc<TypeCodec>>>,
}

impl<S: Source> Registry<S> {
    /// Creates an empty registry resolving schemas from `source`.
    pub fn new(source: S, cfg: Config) -> Self {
        Self {
            source,
            cfg,
            codecs: RwLock::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the codec for `type_name`, building (and caching) it and its nested types if
    /// this is the first request.
    pub fn get_or_build(&self, type_name: &str) -> Result<Arc<TypeCodec>, Error> {
        self.resolve(type_name, &mut Vec::new())
    }

    /// Number of cached codecs.
    pub fn len(&self) -> usize {
        self.codecs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached codec. Codecs already handed out remain usable.
    pub fn clear(&self) {
        self.codecs.write().unwrap().clear();
    }

    /// Encodes `msg` with the codec of its own type, syncing derived fields first.
    pub fn encode(&self, msg: &mut Message) -> Result<BytesMut, Error> {
        let codec = self.get_or_build(msg.type_name())?;
        codec.bind(msg).encode()
    }

    /// Decodes an instance of `type_name` from `buf`, leaving any trailing bytes unread.
    pub fn decode(&self, type_name: &str, buf: &mut impl Buf) -> Result<Message, Error> {
        self.get_or_build(type_name)?.decode(buf)
    }

    /// Decodes an instance of `type_name`, ensuring `buf` is fully consumed.
    pub fn decode_exact(&self, type_name: &str, buf: impl Buf) -> Result<Message, Error> {
        self.get_or_build(type_name)?.decode_exact(buf)
    }

    /// Returns the cached codec for `type_name` or builds it. `building` holds the chain of
    /// types currently under construction (outermost first) and is used to reject cycles.
    fn resolve(
        &self,
        type_name: &str,
        building: &mut Vec<String>,
    ) -> Result<Arc<TypeCodec>, Error> {
        if let Some(codec) = self.codecs.read().unwrap().get(type_name) {
            return Ok(codec.clone());
        }
        if building.iter().any(|t| t == type_name) {
            let chain = building.join(" -> ");
            return Err(Error::Schema(
                type_name.to_string(),
                format!("recursive type: {chain} -> {type_name}"),
            ));
        }
        let schema = self.source.schema(type_name).ok_or_else(|| {
            Error::Schema(type_name.to_string(), "unknown message type".into())
        })?;

        trace!(type_name, depth = building.len(), "building type codec");
        building.push(type_name.to_string());
        let built = TypeCodec::build(&schema, &self.cfg, |nested| {
            self.resolve(nested, building)
        });
        building.pop();
        let codec = Arc::new(built?);

        let mut codecs = self.codecs.write().unwrap();
        match codecs.entry(type_name.to_string()) {
            Entry::Occupied(entry) => {
                debug!(type_name, "discarding duplicate type codec");
                Ok(entry.get().clone())
            }
            Entry::Vacant(entry) => {
                debug!(
                    type_name,
                    handlers = codec.handlers().len(),
                    size = ?codec.size(),
                    "cached type codec"
                );
                Ok(entry.insert(codec).clone())
            }
        }
    }
}
