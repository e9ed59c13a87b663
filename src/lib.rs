//! Gridded temperature anomalies: loading, aggregate queries, and the
//! projection that places grid cells on a globe.

pub mod color;
pub mod data;
pub mod projection;

pub use data::{Anomaly, AnomalyDataset, AnomalyLoader, GeoCoordinate, LoadError};
pub use projection::{Point3, geo_to_point, point_to_geo};
