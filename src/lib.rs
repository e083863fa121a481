//! Core library surface for the book catalog manager.
//!
//! The public modules exposed here provide an intentionally small API so the
//! `bin` target as well as potential external tooling can reuse the same
//! pieces. Keeping the glue logic documented makes it easy to recall why each
//! re-export exists when revisiting the project.
pub mod catalog;
pub mod models;
pub mod ui;

/// Convenience re-exports for the catalog core. These are typically used by
/// `main.rs` to locate the flat-file store and move records in and out of it.
pub use catalog::{default_store_path, load_into, save_catalog, Catalog, CatalogError};

/// The primary domain type that all layers manipulate.
pub use models::Book;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
