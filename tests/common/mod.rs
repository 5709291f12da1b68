//! Shared test utilities and fixture generators

use polars::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A small sales table shaped like the real-estate dataset.
///
/// - `Barrio`: neighbourhood, one missing value
/// - `Tipo`: property type
/// - `Precio`: sale price, one missing value
/// - `Area`: floor area (float)
/// - `Estrato`: socioeconomic stratum 1-6
pub fn create_sales_dataframe() -> DataFrame {
    df! {
        "Barrio" => [Some("Centro"), Some("Caobos"), Some("Centro"), None, Some("Prados"), Some("Caobos"), Some("Centro"), Some("Prados")],
        "Tipo" => ["Casa", "Apartamento", "Casa", "Casa", "Apartamento", "Casa", "Apartamento", "Casa"],
        "Precio" => [Some(180_000_000i64), Some(350_000_000), Some(220_000_000), Some(95_000_000), None, Some(410_000_000), Some(150_000_000), Some(260_000_000)],
        "Area" => [90.5f64, 120.0, 110.25, 60.0, 75.0, 160.0, 70.0, 130.5],
        "Estrato" => [3i64, 5, 3, 2, 4, 6, 3, 4],
    }
    .unwrap()
}

/// Write `body` to `dir/name` and return the path.
pub fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

/// CSV text of [`create_sales_dataframe`].
pub fn sales_csv() -> &'static str {
    "Barrio,Tipo,Precio,Area,Estrato\n\
     Centro,Casa,180000000,90.5,3\n\
     Caobos,Apartamento,350000000,120.0,5\n\
     Centro,Casa,220000000,110.25,3\n\
     ,Casa,95000000,60.0,2\n\
     Prados,Apartamento,,75.0,4\n\
     Caobos,Casa,410000000,160.0,6\n\
     Centro,Apartamento,150000000,70.0,3\n\
     Prados,Casa,260000000,130.5,4\n"
}

pub fn all_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}
