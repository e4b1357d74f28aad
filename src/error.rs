use alloc::string::String;

use thiserror::Error;

/// Errors reported by the trees in this crate.
///
/// Every error is raised before the tree is touched, so a failed call leaves
/// the tree exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A point did not have the number of coordinates the K-D tree was built for.
    #[error("point has {found} coordinates, tree expects {expected}")]
    DimensionMismatch {
        /// Dimensionality of the tree.
        expected: usize,
        /// Dimensionality of the rejected point.
        found: usize,
    },
    /// A K-D tree was requested with zero dimensions.
    #[error("a k-d tree needs at least one dimension")]
    ZeroDimensions,
    /// An engine name did not match any known engine.
    #[error("unknown engine `{0}`")]
    UnknownEngine(String),
}

/// Shorthand for results carrying this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
