//! Binary entry point that glues the flat-file-backed catalog to the TUI.
//! Summarizing the bootstrapping pipeline here keeps the intent obvious when
//! revisiting the code: we locate the store, bulk-load the tree, drive the
//! Ratatui event loop until the user exits, then save everything back.
use book_catalog_manager::{
    default_store_path, load_into, run_app, save_catalog, App, Catalog, CatalogError,
};

/// Locate the store, load the catalog, run the event loop, and persist on the
/// way out.
///
/// A store that cannot be opened for reading starts an empty catalog; a
/// malformed block keeps whatever loaded before it. Both degrade to a footer
/// notice instead of aborting. A failed save at shutdown is reported on
/// stderr but never blocks the exit.
fn main() -> anyhow::Result<()> {
    let store_path = default_store_path()?;

    let mut catalog = Catalog::new();
    let startup_notice = match load_into(&mut catalog, &store_path) {
        Ok(_) => None,
        Err(CatalogError::StoreUnavailable(_)) => {
            Some("No catalog store found; starting empty.".to_string())
        }
        Err(err) => Some(format!("Catalog store partially loaded: {err}")),
    };

    let mut app = App::new(catalog, startup_notice);
    let result = run_app(&mut app);

    if let Err(err) = save_catalog(app.catalog(), &store_path) {
        eprintln!("failed to save catalog to {}: {err}", store_path.display());
    }

    result
}
