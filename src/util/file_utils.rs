// External crates
use log::{debug, info};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

// Local modules
use crate::error::{ForecastError, Result};
use crate::minute::lstm::step_1_tensor_preparation::FeatureMatrix;

/// Names the preprocessing step may give the row index it writes first
const INDEX_COLUMN_NAMES: [&str; 4] = ["", "column_1", "index", "Unnamed: 0"];

/// Read a preprocessed feature CSV into a DataFrame.
///
/// The leading row-index column written alongside the features is dropped.
pub fn read_feature_csv<P: AsRef<Path>>(file_path: P) -> Result<DataFrame> {
    let path = file_path.as_ref();
    info!("Loading feature data from: {}", path.display());
    if !path.exists() {
        return Err(ForecastError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let file = File::open(path)?;
    let mut df = CsvReader::new(file).finish()?;

    let first = df
        .get_column_names()
        .first()
        .map(|name| name.to_string());
    if let Some(name) = first {
        if INDEX_COLUMN_NAMES.contains(&name.as_str()) {
            debug!("Dropping index column '{}'", name);
            df = df.drop(&name)?;
        }
    }

    debug!(
        "Read {} rows, columns: {:?}",
        df.height(),
        df.get_column_names()
    );
    Ok(df)
}

/// Load the feature matrix produced by the preprocessing step
pub fn load_feature_matrix<P: AsRef<Path>>(file_path: P, target: &str) -> Result<FeatureMatrix> {
    let df = read_feature_csv(file_path)?;
    FeatureMatrix::from_dataframe(&df, target)
}
