//! Infrastructure layer: where inventory rows come from and where recorded
//! actions and exports go.

pub mod export;
pub mod sink;
pub mod source;

pub use export::{ExportError, PRIORITY_EXPORT_FILE_NAME, priority_actions_csv};
pub use sink::{ActionSink, InMemoryActionSink, JsonLinesActionSink, SinkError};
pub use source::{
    Connection, ConnectionStrategy, CsvRowSource, DataLoad, DemoRowSource, InMemoryRowSource,
    RowSource, SourceError, demo_alert_subjects, load_rows, resolve,
};
