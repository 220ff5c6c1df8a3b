//! Priority-action CSV export.

use serde::Serialize;
use thiserror::Error;

use carestock_inventory::{DerivedRow, at_risk};

pub const PRIORITY_EXPORT_FILE_NAME: &str = "carestock_priority_actions.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct PriorityRecord<'a> {
    location: &'a str,
    item: &'a str,
    item_priority: &'static str,
    status_badge: &'static str,
    closing_stock: f64,
    days_to_stockout: f64,
}

/// Critical and Warning rows as CSV, in table order, header included.
pub fn priority_actions_csv(rows: &[DerivedRow]) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let selected = at_risk(rows);
    if selected.is_empty() {
        // serde-driven headers are only emitted with the first record.
        wtr.write_record([
            "LOCATION",
            "ITEM",
            "ITEM_PRIORITY",
            "STATUS_BADGE",
            "CLOSING_STOCK",
            "DAYS_TO_STOCKOUT",
        ])?;
    }
    for d in selected {
        wtr.serialize(PriorityRecord {
            location: &d.row.location,
            item: &d.row.item,
            item_priority: d.item_priority.badge(),
            status_badge: d.status_badge,
            closing_stock: d.row.closing_stock,
            days_to_stockout: d.row.days_to_stockout,
        })?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
