//! Interactive terminal front end, split across logical submodules: the app
//! state machine, modal form state, terminal bring-up, and layout helpers.
//! This layer is thin glue over the catalog core; it collects raw field
//! input, issues single operations, and renders their results.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
