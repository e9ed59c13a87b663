use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;

use super::error::LoadError;
use super::model::{Anomaly, AnomalyDataset, GeoCoordinate, TemperatureMap};

// ---------------------------------------------------------------------------
// Options and report
// ---------------------------------------------------------------------------

/// Knobs for the CSV reader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Expected label of the first header column. Matched trimmed and
    /// case-insensitively.
    pub header_prefix: String,
    /// Quote character around header labels and cells.
    pub quote: u8,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        LoaderOptions {
            header_prefix: "lat".to_string(),
            quote: b'"',
        }
    }
}

/// A header column that did not become a year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedColumn {
    /// Zero-based column index in the file.
    pub index: usize,
    pub label: String,
}

/// Everything the loader recovered from instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub header_recognized: bool,
    /// Non-numeric or duplicate year labels.
    pub dropped_columns: Vec<DroppedColumn>,
    /// Data rows that reached the grid.
    pub rows_read: usize,
    /// File line numbers of rows whose coordinate could not be parsed.
    pub skipped_rows: Vec<u64>,
    pub missing_cells: usize,
}

impl LoadReport {
    /// True when nothing was dropped or substituted.
    pub fn is_clean(&self) -> bool {
        self.header_recognized
            && self.dropped_columns.is_empty()
            && self.skipped_rows.is_empty()
            && self.missing_cells == 0
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an anomaly grid with default options, discarding the report.
pub fn load_file(path: &Path) -> Result<AnomalyDataset, LoadError> {
    AnomalyLoader::default().load(path)
}

/// Parses the gridded anomaly CSV:
///
/// ```text
/// lat,lon,1880,1881,...
/// -88,-178,0.12,,...
/// ```
///
/// Fields 0 and 1 of each row are the integer coordinate, the rest line up
/// with the year columns of the header by their original column index.
#[derive(Debug, Clone, Default)]
pub struct AnomalyLoader {
    options: LoaderOptions,
}

impl AnomalyLoader {
    pub fn new(options: LoaderOptions) -> Self {
        AnomalyLoader { options }
    }

    pub fn load(&self, path: &Path) -> Result<AnomalyDataset, LoadError> {
        self.load_with_report(path).map(|(dataset, _)| dataset)
    }

    pub fn load_with_report(&self, path: &Path) -> Result<(AnomalyDataset, LoadReport), LoadError> {
        info!("Reading anomaly file {}", path.display());
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (dataset, report) = self.load_reader(file)?;
        info!(
            "Finished {}: {} years, {} areas, {} missing cells",
            path.display(),
            dataset.sample_count(),
            dataset.area_count(),
            report.missing_cells
        );
        Ok((dataset, report))
    }

    /// Parse from any byte source. Nothing is exposed until the whole input
    /// has been read.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<(AnomalyDataset, LoadReport), LoadError> {
        let mut reader = BufReader::new(reader);
        let mut report = LoadReport::default();

        // The header is split by hand after stripping every quote, so a
        // line quoted as a whole still yields its columns.
        let mut header = Vec::new();
        if reader.read_until(b'\n', &mut header).map_err(LoadError::Read)? == 0 {
            warn!("Anomaly input is empty");
            return Ok((AnomalyDataset::default(), report));
        }
        header.retain(|&b| b != self.options.quote);
        let header = String::from_utf8_lossy(&header);
        let labels: Vec<&str> = header.split(',').map(str::trim).collect();

        let columns = self.year_columns(&labels, &mut report);
        let mut maps: BTreeMap<i32, TemperatureMap> = columns
            .iter()
            .map(|&(_, year)| (year, TemperatureMap::default()))
            .collect();

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quote(self.options.quote)
            .trim(csv::Trim::All)
            .from_reader(reader);

        for result in csv_reader.byte_records() {
            let record = result?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            // csv counts from the line after the header
            let line = record.position().map_or(0, |p| p.line() + 1);

            let Some(coordinate) = parse_coordinate(&record) else {
                warn!(
                    "Line {line}: skipping row with unreadable coordinate ({:?}, {:?})",
                    String::from_utf8_lossy(record.get(0).unwrap_or_default()),
                    String::from_utf8_lossy(record.get(1).unwrap_or_default())
                );
                report.skipped_rows.push(line);
                continue;
            };

            for &(index, year) in &columns {
                let anomaly = record
                    .get(index)
                    .and_then(|cell| std::str::from_utf8(cell).ok())
                    .map_or(Anomaly::Missing, Anomaly::parse);
                if anomaly.is_missing() {
                    debug!("Line {line}: no reading for {year} at {coordinate}");
                    report.missing_cells += 1;
                }
                if let Some(map) = maps.get_mut(&year) {
                    map.insert(coordinate, anomaly);
                }
            }
            report.rows_read += 1;
        }

        Ok((AnomalyDataset::from_maps(maps), report))
    }

    /// Map each usable header column to its year, keeping the column index.
    fn year_columns(&self, labels: &[&str], report: &mut LoadReport) -> Vec<(usize, i32)> {
        let recognized = labels
            .first()
            .is_some_and(|first| first.eq_ignore_ascii_case(&self.options.header_prefix));
        report.header_recognized = recognized;
        if !recognized {
            warn!(
                "Header does not start with '{}' (found {:?}); no years declared",
                self.options.header_prefix,
                labels.first().copied().unwrap_or("")
            );
            return Vec::new();
        }

        let mut columns: Vec<(usize, i32)> = Vec::new();
        for (index, &label) in labels.iter().enumerate().skip(2) {
            match label.parse::<i32>() {
                Ok(year) if columns.iter().any(|&(_, y)| y == year) => {
                    warn!("Header column {index}: year {year} already declared, ignoring");
                    report.dropped_columns.push(DroppedColumn {
                        index,
                        label: label.to_string(),
                    });
                }
                Ok(year) => columns.push((index, year)),
                Err(_) => {
                    warn!("Header column {index}: '{label}' is not a year, ignoring");
                    report.dropped_columns.push(DroppedColumn {
                        index,
                        label: label.to_string(),
                    });
                }
            }
        }
        columns
    }
}

fn parse_coordinate(record: &csv::ByteRecord) -> Option<GeoCoordinate> {
    let field = |i: usize| std::str::from_utf8(record.get(i)?).ok()?.parse::<i32>().ok();
    Some(GeoCoordinate::new(field(0)?, field(1)?))
}
