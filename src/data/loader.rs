//! CSV Data Loader Module
//! Handles CSV file loading, column introspection and the process-wide table cache.

use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;

/// Rows scanned to infer column types.
const INFER_SCHEMA_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}

/// Read a comma-delimited file with a header row into a DataFrame.
pub fn load_table(path: &Path) -> Result<DataFrame, LoaderError> {
    if !path.is_file() {
        return Err(LoaderError::NotFound(path.to_path_buf()));
    }

    let csv_err = |source| LoaderError::Csv {
        path: path.to_path_buf(),
        source,
    };

    LazyCsvReader::new(path)
        .with_has_header(true)
        .with_separator(b',')
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .finish()
        .map_err(csv_err)?
        .collect()
        .map_err(csv_err)
}

struct CacheEntry {
    modified: Option<SystemTime>,
    table: Arc<DataFrame>,
}

/// Loaded tables keyed by path and modification time.
///
/// Built once at startup. A lookup for an unchanged file hands back the same
/// shared table; a newer modification time triggers a reload.
#[derive(Default)]
pub struct TableCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `path`, loading it on first access or when
    /// the file changed on disk.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<DataFrame>, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let key = path.canonicalize().map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let modified = std::fs::metadata(&key)
            .and_then(|meta| meta.modified())
            .ok();

        if let Some(entry) = self.entries.get(&key) {
            if entry.modified == modified {
                log::debug!("Table cache hit for {}", key.display());
                return Ok(Arc::clone(&entry.table));
            }
            log::debug!("{} changed on disk, reloading", key.display());
        }

        let table = Arc::new(load_table(&key)?);
        log::info!(
            "Loaded {} rows x {} columns from {}",
            table.height(),
            table.width(),
            key.display()
        );

        self.entries.insert(
            key,
            CacheEntry {
                modified,
                table: Arc::clone(&table),
            },
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// True for integer and floating point dtypes.
pub fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Column names in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Names of the numeric columns, in table order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Distinct non-null values of a column rendered as text, in first-seen order.
pub fn unique_values(df: &DataFrame, column: &str) -> PolarsResult<Vec<String>> {
    let text = df.column(column)?.cast(&DataType::String)?;
    let mut seen = std::collections::HashSet::new();
    let values = text
        .str()?
        .into_iter()
        .flatten()
        .filter(|v| seen.insert(*v))
        .map(|v| v.to_string())
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn load_infers_text_and_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "casas.csv",
            "Barrio,Precio,Area\nCentro,100,50.5\nCentro,200,60.0\nNorte,300,70.25\n",
        );

        let df = load_table(&path).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(column_names(&df), vec!["Barrio", "Precio", "Area"]);
        assert_eq!(numeric_columns(&df), vec!["Precio", "Area"]);
        assert_eq!(df.column("Barrio").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn empty_file_fails_to_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "empty.csv", "");
        assert!(load_table(&path).is_err());
    }

    #[test]
    fn unique_values_skip_nulls_and_keep_first_seen_order() {
        let df = df! {
            "Barrio" => [Some("Norte"), None, Some("Centro"), Some("Norte")],
        }
        .unwrap();
        assert_eq!(unique_values(&df, "Barrio").unwrap(), vec!["Norte", "Centro"]);
    }

    #[test]
    fn cache_returns_shared_table_until_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "casas.csv", "Barrio,Precio\nA,1\n");

        let mut cache = TableCache::new();
        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        write_csv(dir.path(), "casas.csv", "Barrio,Precio\nA,1\nB,2\n");
        let later = SystemTime::now() + std::time::Duration::from_secs(60);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();

        let reloaded = cache.get_or_load(&path).unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(reloaded.height(), 2);
        assert_eq!(cache.len(), 1);
    }
}
