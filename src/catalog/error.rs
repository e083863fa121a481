use std::io;

use thiserror::Error;

/// Failure taxonomy for the catalog core. The UI wraps these in `anyhow` at
/// the boundary; keeping them typed here lets callers distinguish a corrupt
/// store from a merely missing one.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A block in the backing store could not be decoded: either the
    /// identifier line is not a valid integer or the block is truncated.
    /// Bulk load stops at the first malformed block; records decoded before
    /// it stay in the catalog.
    #[error("malformed record in catalog store: {0}")]
    MalformedRecord(String),

    /// The backing store could not be opened or read/written. On load the
    /// caller degrades this to an empty catalog; on save it is reported and
    /// shutdown proceeds anyway.
    #[error("catalog store unavailable")]
    StoreUnavailable(#[source] io::Error),

    /// A delete targeted an identifier with no matching node. Never fatal.
    #[error("no book with id {0}")]
    NotFound(i64),
}
