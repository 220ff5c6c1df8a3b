use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use carestock_inventory::{InventoryRow, StockStatus};

use super::{RowSource, SourceError};

/// One record of the stock-health table, with its upstream column names.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct StockHealthRecord {
    location: String,
    item: String,
    closing_stock: f64,
    avg_daily_demand: f64,
    days_to_stockout: f64,
    stock_status: String,
    lead_time_days: u32,
}

/// Parse stock-health rows from CSV with uppercase headers
/// (`LOCATION, ITEM, CLOSING_STOCK, ...`). Column order does not matter.
pub fn read_rows<R: Read>(input: R) -> Result<Vec<InventoryRow>, SourceError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for raw in reader.records() {
        let raw = raw?;
        // Line where the record starts; quoted fields may span several.
        let line = raw.position().map_or(0, |pos| pos.line());
        let record: StockHealthRecord = raw.deserialize(Some(&headers))?;

        let stock_status: StockStatus = record
            .stock_status
            .parse()
            .map_err(|e: carestock_core::DomainError| SourceError::InvalidRow {
                line,
                message: e.to_string(),
            })?;

        let row = InventoryRow {
            location: record.location,
            item: record.item,
            closing_stock: record.closing_stock,
            avg_daily_demand: record.avg_daily_demand,
            lead_time_days: record.lead_time_days,
            days_to_stockout: record.days_to_stockout,
            stock_status,
        };
        row.validate().map_err(|e| SourceError::InvalidRow {
            line,
            message: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// Reads the stock-health table from a CSV file on every `load`.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSource for CsvRowSource {
    fn load(&self) -> Result<Vec<InventoryRow>, SourceError> {
        let file = File::open(&self.path)?;
        let rows = read_rows(file)?;
        tracing::debug!(path = %self.path.display(), rows = rows.len(), "loaded stock-health CSV");
        Ok(rows)
    }
}
