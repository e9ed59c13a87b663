use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

// ---------------------------------------------------------------------------
// GeoCoordinate – one grid cell centre
// ---------------------------------------------------------------------------

/// A geographic position in whole degrees.
///
/// Immutable once built; equality and hashing are structural so it can key
/// the per-year maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GeoCoordinate {
    latitude: i32,
    longitude: i32,
}

impl GeoCoordinate {
    pub const fn new(latitude: i32, longitude: i32) -> Self {
        GeoCoordinate {
            latitude,
            longitude,
        }
    }

    pub const fn latitude(&self) -> i32 {
        self.latitude
    }

    pub const fn longitude(&self) -> i32 {
        self.longitude
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}°, {}°)", self.latitude, self.longitude)
    }
}

// ---------------------------------------------------------------------------
// Anomaly – a single cell value
// ---------------------------------------------------------------------------

/// A temperature anomaly in °C, or the marker for an absent reading.
///
/// `Missing` serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Anomaly {
    Measured(f64),
    Missing,
}

impl Anomaly {
    /// Wrap a raw value; non-finite values are not readings.
    pub fn from_value(value: f64) -> Self {
        if value.is_finite() {
            Anomaly::Measured(value)
        } else {
            Anomaly::Missing
        }
    }

    /// Parse a CSV cell. Blank or non-numeric text yields `Missing`.
    pub fn parse(cell: &str) -> Self {
        cell.trim()
            .parse::<f64>()
            .map(Anomaly::from_value)
            .unwrap_or(Anomaly::Missing)
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Anomaly::Measured(v) => Some(v),
            Anomaly::Missing => None,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Anomaly::Missing)
    }
}

impl From<Option<f64>> for Anomaly {
    fn from(value: Option<f64>) -> Self {
        value.map(Anomaly::from_value).unwrap_or(Anomaly::Missing)
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::Measured(v) => write!(f, "{v:+.2}"),
            Anomaly::Missing => write!(f, "<missing>"),
        }
    }
}

/// Smallest measured value; missing readings never take part.
fn min_measured(values: impl IntoIterator<Item = Anomaly>) -> Option<f64> {
    values.into_iter().filter_map(Anomaly::value).reduce(f64::min)
}

/// Largest measured value; missing readings never take part.
fn max_measured(values: impl IntoIterator<Item = Anomaly>) -> Option<f64> {
    values.into_iter().filter_map(Anomaly::value).reduce(f64::max)
}

// ---------------------------------------------------------------------------
// TemperatureMap – every cell of one year
// ---------------------------------------------------------------------------

/// Read-only view of one year's anomalies, in first-seen coordinate order.
#[derive(Debug, Clone, Default)]
pub struct TemperatureMap {
    cells: IndexMap<GeoCoordinate, Anomaly>,
}

impl TemperatureMap {
    /// Re-inserting a known coordinate keeps its original position.
    pub(crate) fn insert(&mut self, coordinate: GeoCoordinate, anomaly: Anomaly) {
        self.cells.insert(coordinate, anomaly);
    }

    pub fn get(&self, coordinate: &GeoCoordinate) -> Option<Anomaly> {
        self.cells.get(coordinate).copied()
    }

    /// Lookup without building a [`GeoCoordinate`] first.
    pub fn get_at(&self, latitude: i32, longitude: i32) -> Option<Anomaly> {
        self.get(&GeoCoordinate::new(latitude, longitude))
    }

    pub fn contains(&self, coordinate: &GeoCoordinate) -> bool {
        self.cells.contains_key(coordinate)
    }

    pub fn coordinates(&self) -> impl Iterator<Item = &GeoCoordinate> + '_ {
        self.cells.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = Anomaly> + '_ {
        self.cells.values().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GeoCoordinate, Anomaly)> + '_ {
        self.cells.iter().map(|(c, a)| (c, *a))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.values().filter(|a| a.is_missing()).count()
    }

    pub fn min_anomaly(&self) -> Option<f64> {
        min_measured(self.values())
    }

    pub fn max_anomaly(&self) -> Option<f64> {
        max_measured(self.values())
    }
}

// ---------------------------------------------------------------------------
// AnomalyDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All yearly maps of a loaded file.
///
/// Built once by the loader and never mutated afterwards. Every yearly map
/// holds the same coordinates in the same order.
#[derive(Debug, Clone, Default)]
pub struct AnomalyDataset {
    maps: BTreeMap<i32, TemperatureMap>,
}

impl AnomalyDataset {
    pub(crate) fn from_maps(maps: BTreeMap<i32, TemperatureMap>) -> Self {
        AnomalyDataset { maps }
    }

    /// Declared years, ascending.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.maps.keys().copied()
    }

    pub fn contains_year(&self, year: i32) -> bool {
        self.maps.contains_key(&year)
    }

    /// Number of years.
    pub fn sample_count(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// The coordinate grid, read off the earliest year.
    pub fn areas(&self) -> impl Iterator<Item = &GeoCoordinate> + '_ {
        self.reference_map()
            .into_iter()
            .flat_map(|map| map.coordinates())
    }

    pub fn area_count(&self) -> usize {
        self.reference_map().map_or(0, TemperatureMap::len)
    }

    fn reference_map(&self) -> Option<&TemperatureMap> {
        self.maps.values().next()
    }

    pub fn map_for_year(&self, year: i32) -> Option<&TemperatureMap> {
        self.maps.get(&year)
    }

    /// `None` when the year or the coordinate is unknown.
    pub fn anomaly_at(&self, year: i32, coordinate: &GeoCoordinate) -> Option<Anomaly> {
        self.map_for_year(year)?.get(coordinate)
    }

    /// One year's values in file order.
    pub fn anomalies_for_year(&self, year: i32) -> Option<Vec<Anomaly>> {
        self.map_for_year(year).map(|map| map.values().collect())
    }

    /// One value per year, ascending; `None` for a coordinate off the grid.
    pub fn anomalies_for_area(&self, coordinate: &GeoCoordinate) -> Option<Vec<Anomaly>> {
        if !self.reference_map()?.contains(coordinate) {
            return None;
        }
        Some(
            self.maps
                .values()
                .map(|map| map.get(coordinate).unwrap_or(Anomaly::Missing))
                .collect(),
        )
    }

    pub fn global_min_anomaly(&self) -> Option<f64> {
        self.maps
            .values()
            .filter_map(TemperatureMap::min_anomaly)
            .reduce(f64::min)
    }

    pub fn global_max_anomaly(&self) -> Option<f64> {
        self.maps
            .values()
            .filter_map(TemperatureMap::max_anomaly)
            .reduce(f64::max)
    }

    /// Missing cells across all years.
    pub fn missing_count(&self) -> usize {
        self.maps.values().map(TemperatureMap::missing_count).sum()
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            first_year: self.maps.keys().next().copied(),
            last_year: self.maps.keys().next_back().copied(),
            year_count: self.sample_count(),
            area_count: self.area_count(),
            missing_cells: self.missing_count(),
            min_anomaly: self.global_min_anomaly(),
            max_anomaly: self.global_max_anomaly(),
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetSummary
// ---------------------------------------------------------------------------

/// Headline numbers of a dataset, for logs and the console tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub year_count: usize,
    pub area_count: usize,
    pub missing_cells: usize,
    pub min_anomaly: Option<f64>,
    pub max_anomaly: Option<f64>,
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.first_year, self.last_year) {
            (Some(first), Some(last)) => write!(
                f,
                "{} years ({first}..{last}), {} areas, {} missing cells",
                self.year_count, self.area_count, self.missing_cells
            )?,
            _ => write!(f, "no years")?,
        }
        if let (Some(min), Some(max)) = (self.min_anomaly, self.max_anomaly) {
            write!(f, ", anomalies {min:+.2} .. {max:+.2} °C")?;
        }
        Ok(())
    }
}
