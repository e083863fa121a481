use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

use crate::catalog::error::CatalogError;
use crate::catalog::tree::Catalog;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".book-catalog-manager";
/// Flat-file store name inside the application data directory.
const STORE_FILE_NAME: &str = "catalog.txt";

/// Resolve the absolute path to the catalog store inside the user's home.
/// Persistence location stays a configuration concern of the callers; the
/// catalog core only ever sees readers and writers.
pub fn default_store_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs
        .home_dir()
        .join(DATA_DIR_NAME)
        .join(STORE_FILE_NAME))
}

/// Open the store and bulk-load every block into the catalog, returning how
/// many records were read. A store that cannot be opened surfaces as
/// `StoreUnavailable`, which startup degrades to an empty catalog; a
/// malformed block aborts the rest of the load but leaves the records decoded
/// before it in place.
pub fn load_into(catalog: &mut Catalog, path: &Path) -> Result<usize, CatalogError> {
    let file = File::open(path).map_err(CatalogError::StoreUnavailable)?;
    catalog.bulk_load(BufReader::new(file))
}

/// Rewrite the whole store from the in-memory catalog in ascending identifier
/// order. There is no append mode or incremental update; every save truncates
/// and replaces the file.
pub fn save_catalog(catalog: &Catalog, path: &Path) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(CatalogError::StoreUnavailable)?;
    }
    let file = File::create(path).map_err(CatalogError::StoreUnavailable)?;
    let mut writer = BufWriter::new(file);
    catalog
        .bulk_save(&mut writer)
        .map_err(CatalogError::StoreUnavailable)?;
    writer.flush().map_err(CatalogError::StoreUnavailable)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::models::Book;

    use super::*;

    #[test]
    fn save_then_load_round_trips_through_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.txt");

        let mut catalog = Catalog::new();
        catalog.insert(Book::new(3, "A", "x"));
        catalog.insert(Book::new(1, "B", "y"));
        catalog.insert(Book::new(2, "C", "z"));
        save_catalog(&catalog, &path).unwrap();

        let mut reloaded = Catalog::new();
        let loaded = load_into(&mut reloaded, &path).unwrap();
        assert_eq!(loaded, 3);
        let books: Vec<_> = reloaded.iter().cloned().collect();
        assert_eq!(
            books,
            vec![
                Book::new(1, "B", "y"),
                Book::new(2, "C", "z"),
                Book::new(3, "A", "x"),
            ]
        );
    }

    #[test]
    fn missing_store_reports_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does-not-exist.txt");

        let mut catalog = Catalog::new();
        let err = load_into(&mut catalog, &path).unwrap_err();
        assert!(matches!(err, CatalogError::StoreUnavailable(_)));
        assert!(catalog.is_empty());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("catalog.txt");

        let mut catalog = Catalog::new();
        catalog.insert(Book::new(7, "Dune", "Frank Herbert"));
        save_catalog(&catalog, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "7\nDune\nFrank Herbert\n");
    }

    #[test]
    fn save_rewrites_rather_than_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.txt");

        let mut catalog = Catalog::new();
        catalog.insert(Book::new(1, "keep", "a"));
        catalog.insert(Book::new(2, "drop", "b"));
        save_catalog(&catalog, &path).unwrap();

        catalog.remove(2).unwrap();
        save_catalog(&catalog, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "1\nkeep\na\n");
    }
}
