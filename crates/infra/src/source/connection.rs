//! Data-source selection.
//!
//! Strategies are tried in order and the first one that connects wins. The
//! demo dataset is always last, so a session always has rows to show, but
//! anything it serves is labeled [`DataLoad::Fallback`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use carestock_inventory::InventoryRow;

use super::csv_file::CsvRowSource;
use super::demo::DemoRowSource;
use super::RowSource;

/// One way of reaching the stock-health table.
#[derive(Clone)]
pub enum ConnectionStrategy {
    /// A source the host already holds open (for example an embedding process).
    ActiveSession(Option<Arc<dyn RowSource>>),
    /// A CSV file named in the environment configuration.
    ConfiguredFile(Option<PathBuf>),
    /// The built-in demo dataset.
    Demo,
}

impl fmt::Debug for ConnectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStrategy::ActiveSession(source) => f
                .debug_tuple("ActiveSession")
                .field(&source.as_ref().map(|_| "<source>"))
                .finish(),
            ConnectionStrategy::ConfiguredFile(path) => {
                f.debug_tuple("ConfiguredFile").field(path).finish()
            }
            ConnectionStrategy::Demo => f.write_str("Demo"),
        }
    }
}

/// Outcome of one connection attempt.
pub enum Connection {
    Connected(Arc<dyn RowSource>),
    NotConfigured,
    Failed(String),
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connection::Connected(_) => f.write_str("Connected"),
            Connection::NotConfigured => f.write_str("NotConfigured"),
            Connection::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
        }
    }
}

impl ConnectionStrategy {
    /// The usual order: active session, then configured file, then demo data.
    pub fn standard(session: Option<Arc<dyn RowSource>>, data_path: Option<PathBuf>) -> Vec<Self> {
        vec![
            ConnectionStrategy::ActiveSession(session),
            ConnectionStrategy::ConfiguredFile(data_path),
            ConnectionStrategy::Demo,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConnectionStrategy::ActiveSession(_) => "active-session",
            ConnectionStrategy::ConfiguredFile(_) => "configured-file",
            ConnectionStrategy::Demo => "demo",
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, ConnectionStrategy::Demo)
    }

    pub fn connect(&self) -> Connection {
        match self {
            ConnectionStrategy::ActiveSession(Some(source)) => {
                Connection::Connected(Arc::clone(source))
            }
            ConnectionStrategy::ActiveSession(None) => Connection::NotConfigured,
            ConnectionStrategy::ConfiguredFile(None) => Connection::NotConfigured,
            ConnectionStrategy::ConfiguredFile(Some(path)) => {
                if path.is_file() {
                    Connection::Connected(Arc::new(CsvRowSource::new(path.clone())))
                } else {
                    Connection::Failed(format!("data file {} does not exist", path.display()))
                }
            }
            ConnectionStrategy::Demo => Connection::Connected(Arc::new(DemoRowSource::new())),
        }
    }
}

/// First strategy that connects, with its source.
pub fn resolve(
    strategies: &[ConnectionStrategy],
) -> Option<(&ConnectionStrategy, Arc<dyn RowSource>)> {
    for strategy in strategies {
        match strategy.connect() {
            Connection::Connected(source) => {
                tracing::info!(strategy = strategy.name(), "data source connected");
                return Some((strategy, source));
            }
            Connection::NotConfigured => {
                tracing::debug!(strategy = strategy.name(), "data source not configured");
            }
            Connection::Failed(reason) => {
                tracing::warn!(
                    strategy = strategy.name(),
                    %reason,
                    "data source connection failed"
                );
            }
        }
    }
    None
}

/// Rows plus where they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataLoad {
    Live {
        source: String,
        rows: Vec<InventoryRow>,
    },
    Fallback {
        reason: String,
        rows: Vec<InventoryRow>,
    },
}

impl DataLoad {
    pub fn rows(&self) -> &[InventoryRow] {
        match self {
            DataLoad::Live { rows, .. } | DataLoad::Fallback { rows, .. } => rows,
        }
    }

    pub fn into_rows(self) -> Vec<InventoryRow> {
        match self {
            DataLoad::Live { rows, .. } | DataLoad::Fallback { rows, .. } => rows,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DataLoad::Fallback { .. })
    }

    pub fn demo(reason: impl Into<String>) -> Self {
        DataLoad::Fallback {
            reason: reason.into(),
            rows: DemoRowSource::new().rows(),
        }
    }
}

/// Load the working snapshot. Never fails: when no live source delivers,
/// the demo dataset is returned as a labeled fallback.
pub fn load_rows(strategies: &[ConnectionStrategy]) -> DataLoad {
    let Some((strategy, source)) = resolve(strategies) else {
        tracing::warn!("no data source connected; using demo data");
        return DataLoad::demo("no data source connected");
    };

    match source.load() {
        Ok(rows) if strategy.is_demo() => DataLoad::Fallback {
            reason: "no live data source configured".to_string(),
            rows,
        },
        Ok(rows) => {
            tracing::info!(
                strategy = strategy.name(),
                rows = rows.len(),
                "loaded live inventory rows"
            );
            DataLoad::Live {
                source: strategy.name().to_string(),
                rows,
            }
        }
        Err(e) => {
            tracing::warn!(
                strategy = strategy.name(),
                error = %e,
                "live data load failed; using demo data"
            );
            DataLoad::demo(format!("{} failed to load: {e}", strategy.name()))
        }
    }
}
