//! Binary entry point that glues the SQLite-backed catalog to the TUI: resolve
//! paths, start logging, open the database, run the form until the user
//! quits, then close the database.
use anyhow::Context;
use library_catalog::config::AppPaths;
use library_catalog::{logging, open_catalog, run_app, App, CatalogView};
use tracing::{error, info};

/// Returning a `Result` bubbles fatal problems (an unwritable data directory,
/// a failed write) up to the terminal after the TUI has been torn down.
fn main() -> anyhow::Result<()> {
    let paths = AppPaths::resolve()?;
    logging::init(&paths)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting library catalog");

    let conn = open_catalog(&paths.db_path)?;
    let view = CatalogView::load(&conn)?;

    let mut app = App::new(conn, view);
    let result = run_app(&mut app);
    if let Err(err) = &result {
        let message = format!("{err:#}");
        error!(error = %message, "event loop failed");
    }

    app.into_connection()
        .close()
        .map_err(|(_, err)| err)
        .context("failed to close SQLite database")?;
    info!("library catalog closed");

    result
}
