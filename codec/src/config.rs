//! Configuration for building type codecs.

/// Configuration for a [crate::Registry] and the type codecs it builds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of elements decoded into a single sub-message array.
    ///
    /// Bounds the allocation a malformed (or adversarial) count or unbounded array can cause.
    pub max_array_len: usize,

    /// Reject schemas where an array's count field is declared after the array.
    ///
    /// The count is encoded where its field is declared, so a count that follows its array
    /// cannot be known when the array is decoded.
    pub check_count_order: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_array_len: u16::MAX as usize,
            check_count_order: true,
        }
    }
}
