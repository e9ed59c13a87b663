/// Data layer: core types, loading, and aggregate queries.
///
/// Architecture:
/// ```text
///  tempanomaly_4x4grid.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → AnomalyDataset (+ LoadReport)
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ AnomalyDataset  │  year → TemperatureMap (GeoCoordinate → Anomaly)
///   └────────────────┘
/// ```
pub mod error;
pub mod loader;
pub mod model;

pub use error::LoadError;
pub use loader::{AnomalyLoader, LoadReport, LoaderOptions, load_file};
pub use model::{Anomaly, AnomalyDataset, DatasetSummary, GeoCoordinate, TemperatureMap};
