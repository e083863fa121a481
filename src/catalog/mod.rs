//! Catalog core split across logical submodules: the record codec, the
//! ordered tree, the flat-file store plumbing, and the error taxonomy.

mod codec;
mod error;
mod store;
mod tree;

pub use codec::{encode, BlockReader};
pub use error::CatalogError;
pub use store::{default_store_path, load_into, save_catalog};
pub use tree::{Catalog, InOrder};
