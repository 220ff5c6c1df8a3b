//! Deterministic demo data used when no live source is reachable.

use chrono::{Days, NaiveDate};

use carestock_inventory::{AlertSubject, InventoryRow, classify_days_to_stockout, days_to_stockout};

use super::{RowSource, SourceError};

pub const DEMO_LOCATIONS: [&str; 4] = [
    "Central Referral Hospital",
    "District Hospital North",
    "Rural Health Clinic East",
    "Regional Medical Warehouse",
];

pub const DEMO_ITEMS: [&str; 8] = [
    "Insulin",
    "Oxygen",
    "Blood",
    "Ventilator",
    "Saline",
    "Gauze",
    "Syringes",
    "Paracetamol",
];

/// Synthetic demand never drops below this, so derived ratios stay meaningful.
pub const MIN_SYNTHETIC_DEMAND: f64 = 0.1;

/// Every demo location stocks every demo item; the same call always yields
/// the same table.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoRowSource;

impl DemoRowSource {
    pub fn new() -> Self {
        Self
    }

    pub fn rows(&self) -> Vec<InventoryRow> {
        let mut rows = Vec::with_capacity(DEMO_LOCATIONS.len() * DEMO_ITEMS.len());
        for (l, location) in DEMO_LOCATIONS.iter().enumerate() {
            for (i, item) in DEMO_ITEMS.iter().enumerate() {
                let avg_daily_demand =
                    (((l * 7 + i * 11) % 25) as f64 * 0.8).max(MIN_SYNTHETIC_DEMAND);
                let closing_stock = ((l * 53 + i * 37) % 400) as f64;
                let lead_time_days = 1 + ((l * 3 + i) % 14) as u32;
                let days = days_to_stockout(closing_stock, avg_daily_demand);

                rows.push(InventoryRow {
                    location: (*location).to_string(),
                    item: (*item).to_string(),
                    closing_stock,
                    avg_daily_demand,
                    lead_time_days,
                    days_to_stockout: days,
                    stock_status: classify_days_to_stockout(days),
                });
            }
        }
        rows
    }
}

impl RowSource for DemoRowSource {
    fn load(&self) -> Result<Vec<InventoryRow>, SourceError> {
        Ok(self.rows())
    }
}

/// Sample alert inputs with max-stock and expiry data, which the live
/// stock-health table does not carry. Expiry dates are relative to `today`.
pub fn demo_alert_subjects(today: NaiveDate) -> Vec<AlertSubject> {
    // (item, current, reorder point, max stock, days until expiry)
    let samples: [(&str, f64, f64, f64, u64); 5] = [
        ("Insulin", 150.0, 100.0, 300.0, 20),
        ("Bandages", 500.0, 300.0, 1000.0, 440),
        ("Syringes", 1200.0, 800.0, 2000.0, 160),
        ("Oxygen", 45.0, 50.0, 100.0, 5),
        ("Saline", 200.0, 150.0, 400.0, 45),
    ];

    samples
        .into_iter()
        .map(|(item, current_stock, reorder_point, max_stock, expires_in)| AlertSubject {
            item: item.to_string(),
            current_stock,
            reorder_point,
            max_stock: Some(max_stock),
            expiry_date: today.checked_add_days(Days::new(expires_in)),
        })
        .collect()
}
