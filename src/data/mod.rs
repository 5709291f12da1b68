//! Data module - CSV loading, column selection, filtering and export

mod export;
mod filter;
mod loader;
mod processor;

pub use export::{export_csv, write_export, ExportError, EXPORT_FILE_NAME, EXPORT_MEDIA_TYPE};
pub use filter::{apply_filters, default_filters, ColumnFilter, FilterSet};
pub use loader::{
    column_names, is_numeric, load_table, numeric_columns, unique_values, LoaderError, TableCache,
};
pub use processor::{select_columns, ProcessorError};
