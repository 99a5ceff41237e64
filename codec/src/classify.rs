//! Assign each field of a message type to a handler strategy.
//!
//! Classification runs once per type, when its [crate::TypeCodec] is built. It is split into
//! two pure steps:
//!
//! 1. [batches] folds the ordered fields into contiguous runs of simple fixed fields (which
//!    share one packed layout) separated by single fields that need their own handler.
//! 2. [classify] picks the strategy for each of those single fields.

use reflex_schema::FieldSchema;

/// A group of consecutive fields handled together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Batch<'a> {
    /// A maximal run of simple fixed fields, in declaration order.
    Fixed(Vec<&'a FieldSchema>),
    /// A field that is not simple-fixed.
    Single(&'a FieldSchema),
}

/// Strategy for a field that is not part of a fixed batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Length-prefixed `string` (`text`) or byte blob.
    VariableString { text: bool },
    /// A single nested message.
    SubMessage,
    /// An array of nested messages.
    SubMessageArray,
}

/// Groups `fields` into batches without reordering them.
pub fn batches(fields: &[FieldSchema]) -> Vec<Batch<'_>> {
    fields.iter().fold(Vec::new(), |mut batches, field| {
        if !field.is_simple_fixed() {
            batches.push(Batch::Single(field));
            return batches;
        }
        match batches.last_mut() {
            Some(Batch::Fixed(run)) => run.push(field),
            _ => batches.push(Batch::Fixed(vec![field])),
        }
        batches
    })
}

/// Picks the strategy for a field that is not simple-fixed.
///
/// Returns an error message for variable-length arrays of non-byte primitives, which have no
/// wire representation.
pub fn classify(field: &FieldSchema) -> Result<Strategy, String> {
    if field.is_string() {
        return Ok(Strategy::VariableString { text: true });
    }
    if field.is_byte_blob() {
        return Ok(Strategy::VariableString { text: false });
    }
    if let Some(primitive) = field.primitive() {
        return Err(format!(
            "{}: variable-length arrays of {primitive} are not supported",
            field.name
        ));
    }
    if field.is_array {
        return Ok(Strategy::SubMessageArray);
    }
    Ok(Strategy::SubMessage)
}
