//! CSV export of the filtered table.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name offered for the download.
pub const EXPORT_FILE_NAME: &str = "datos_filtrados.csv";
/// Media type of the exported bytes.
pub const EXPORT_MEDIA_TYPE: &str = "text/csv";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to encode CSV: {0}")]
    Encode(#[from] PolarsError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Serialize `df` as UTF-8 CSV: header row, comma delimiter, no index column.
pub fn export_csv(df: &DataFrame) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    let mut df = df.clone();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut df)?;
    Ok(buf)
}

/// Write the CSV export of `df` to `path`.
pub fn write_export(df: &DataFrame, path: &Path) -> Result<(), ExportError> {
    let bytes = export_csv(df)?;
    std::fs::write(path, &bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "Exported {} rows ({} bytes) to {}",
        df.height(),
        bytes.len(),
        path.display()
    );
    Ok(())
}
