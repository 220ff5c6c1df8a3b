//! Inventory row sources.
//!
//! A source yields the working snapshot of (location, item) rows. Sources are
//! blocking; retries and timeouts are the source's own business.

pub mod connection;
pub mod csv_file;
pub mod demo;

use std::sync::Arc;

use thiserror::Error;

use carestock_inventory::InventoryRow;

pub use connection::{Connection, ConnectionStrategy, DataLoad, load_rows, resolve};
pub use csv_file::CsvRowSource;
pub use demo::{DemoRowSource, demo_alert_subjects};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid row {line}: {message}")]
    InvalidRow { line: u64, message: String },

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Anything that can produce the current inventory snapshot.
pub trait RowSource: Send + Sync {
    fn load(&self) -> Result<Vec<InventoryRow>, SourceError>;
}

impl<S> RowSource for Arc<S>
where
    S: RowSource + ?Sized,
{
    fn load(&self) -> Result<Vec<InventoryRow>, SourceError> {
        (**self).load()
    }
}

/// Fixed rows held in memory, for tests and embedding hosts.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRowSource {
    rows: Vec<InventoryRow>,
}

impl InMemoryRowSource {
    pub fn new(rows: Vec<InventoryRow>) -> Self {
        Self { rows }
    }
}

impl RowSource for InMemoryRowSource {
    fn load(&self) -> Result<Vec<InventoryRow>, SourceError> {
        Ok(self.rows.clone())
    }
}
