use std::path::PathBuf;

use thiserror::Error;

/// Hard failures of a load attempt.
///
/// Header, row and cell problems are recovered in place and show up in the
/// [`LoadReport`](super::loader::LoadReport) instead.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source could not be opened or read.
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A reader handed to the loader failed mid-stream.
    #[error("could not read anomaly input: {0}")]
    Read(#[source] std::io::Error),

    /// The underlying CSV reader failed mid-stream.
    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),
}
