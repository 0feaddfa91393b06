#![forbid(unsafe_code)]
//! Downloads a CSV blob through a pre-signed URL and loads it into a typed, in-memory [`Table`].
mod access;
pub mod csv;
mod error;
pub mod fetch;
pub mod fetch_http;
mod logging;
pub mod report;
mod table;

pub use access::{AccessUrl, ENV_VAR};
pub use crate::csv::{load, load_maybe, serialize, Dialect};
pub use error::Error;
pub use fetch::{fetch, BlobFetcher, ByteBuffer};
pub use fetch_http::HttpFetcher;
pub use logging::Logger;
pub use table::*;

/// The result of [`fetch_and_load`]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A table with at least one row
    Table(Table),
    /// There was nothing to load: either no input, no columns, or a header without rows.
    /// The table holds whatever columns were found.
    Empty(Table),
    /// No usable result; the error was already logged
    Failed(Error),
}

/// Turns the result of a step into an [`Outcome`]. Every error except
/// [`Error::Unexpected`] becomes an outcome; unexpected ones are logged and returned.
pub(crate) fn resolve(result: Result<Table, Error>, logger: &Logger<'_>) -> Result<Outcome, Error> {
    match result {
        Ok(table) if table.is_empty() => {
            logger.info(format_args!(
                "Data loaded but the table is empty ({} columns)",
                table.columns().len()
            ));
            Ok(Outcome::Empty(table))
        }
        Ok(table) => {
            logger.info(format_args!(
                "Loaded {} rows x {} columns",
                table.len(),
                table.columns().len()
            ));
            Ok(Outcome::Table(table))
        }
        Err(Error::EmptyData(e)) => {
            logger.info(format_args!("No data to parse: {e}"));
            Ok(Outcome::Empty(Table::default()))
        }
        Err(e) if e.is_unexpected() => {
            logger.error(format_args!("{e}"));
            Err(e)
        }
        Err(e) => {
            logger.error(format_args!("Failed to load data ({}): {e}", e.kind()));
            Ok(Outcome::Failed(e))
        }
    }
}

/// An error that was already logged, as an [`Outcome`]
fn settle(error: Error) -> Result<Outcome, Error> {
    if error.is_unexpected() {
        Err(error)
    } else {
        Ok(Outcome::Failed(error))
    }
}

/// Downloads the CSV at `url` with `fetcher` and loads it into a [`Table`].
///
/// A missing or invalid `url` fails before `fetcher` is called.
/// # Error
/// Only [`Error::Unexpected`] is returned as an error; every other failure is
/// logged and returned as [`Outcome::Failed`]
pub async fn fetch_and_load(
    url: Option<&str>,
    fetcher: &dyn BlobFetcher,
    dialect: &Dialect,
    logger: &Logger<'_>,
) -> Result<Outcome, Error> {
    let url = match AccessUrl::from_option(url) {
        Ok(url) => url,
        Err(e) => return resolve(Err(e), logger),
    };
    fetch_and_load_url(&url, fetcher, dialect, logger).await
}

/// Same as [`fetch_and_load`], with the URL read from [`ENV_VAR`]
pub async fn fetch_and_load_env(
    fetcher: &dyn BlobFetcher,
    dialect: &Dialect,
    logger: &Logger<'_>,
) -> Result<Outcome, Error> {
    let url = match AccessUrl::from_env() {
        Ok(url) => url,
        Err(e) => return resolve(Err(e), logger),
    };
    fetch_and_load_url(&url, fetcher, dialect, logger).await
}

/// Same as [`fetch_and_load`], for an already validated [`AccessUrl`]
pub async fn fetch_and_load_url(
    url: &AccessUrl,
    fetcher: &dyn BlobFetcher,
    dialect: &Dialect,
    logger: &Logger<'_>,
) -> Result<Outcome, Error> {
    // `fetch` logs its failures, but an empty download only as a warning
    let mut buffer = match fetch(url, fetcher, logger).await {
        Ok(buffer) => buffer,
        Err(e @ Error::EmptyFetch { .. }) => return resolve(Err(e), logger),
        Err(e) => return settle(e),
    };
    resolve(load(&mut buffer, dialect), logger)
}
