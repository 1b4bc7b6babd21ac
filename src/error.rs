use thiserror::Error;

/// Errors surfaced by fallible table operations.
///
/// Absence of a key is never an error; lookups and removals report it through
/// `Option` or `bool` results instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The key is the reserved empty-slot sentinel of the table's strategy
    /// (for example a null pointer under the identity strategy).
    #[error("key is reserved as the empty-slot sentinel")]
    InvalidKey,
    /// The required capacity does not fit in a power-of-two slot array.
    #[error("capacity overflow")]
    CapacityOverflow,
    /// The requested load factor (in percent) is outside the supported range.
    #[error("load factor of {0}% is outside the supported range")]
    InvalidLoadFactor(u8),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
