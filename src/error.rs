use thiserror::Error;

/// Errors returned by fallible map constructors.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    /// A balanced build was requested for pairs that are not strictly
    /// ascending by key.
    #[error("pairs are not strictly ascending by key at index {index}")]
    Unsorted { index: usize },
}
