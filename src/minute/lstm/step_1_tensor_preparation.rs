// External crates
use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};
use log::debug;
use ndarray::{s, Array2, Array3, ArrayView2};
use polars::prelude::*;

// Internal modules
use crate::error::{ForecastError, Result};
use crate::util::scaler::RobustScaler;

/// Columns treated as the time index when present in a source frame
pub const TIME_COLUMNS: [&str; 2] = ["time", "timestamp"];

/// Time-ordered numeric feature matrix with one designated target column
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: Array2<f64>,
    columns: Vec<String>,
    target_column: usize,
}

impl FeatureMatrix {
    /// Wrap a `[rows, width]` array, checking width, target index and finiteness
    pub fn new(values: Array2<f64>, columns: Vec<String>, target_column: usize) -> Result<Self> {
        let (rows, width) = values.dim();
        if width == 0 {
            return Err(ForecastError::InvalidMatrix("matrix has no columns".into()));
        }
        if columns.len() != width {
            return Err(ForecastError::InvalidMatrix(format!(
                "{} column names for {} columns",
                columns.len(),
                width
            )));
        }
        if target_column >= width {
            return Err(ForecastError::InvalidMatrix(format!(
                "target column index {} outside matrix width {}",
                target_column, width
            )));
        }
        if let Some(((row, col), value)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ForecastError::InvalidMatrix(format!(
                "non-finite value {} at row {} in column '{}'",
                value, row, columns[col]
            )));
        }
        debug!("Feature matrix: {} rows x {} columns", rows, width);
        Ok(Self {
            values,
            columns,
            target_column,
        })
    }

    /// Build a matrix from a preprocessed DataFrame.
    ///
    /// A `time`/`timestamp` column, if present, must be strictly ascending and
    /// is dropped; every other column must be numeric and free of nulls.
    pub fn from_dataframe(df: &DataFrame, target: &str) -> Result<Self> {
        let mut frame = df.clone();
        for name in TIME_COLUMNS {
            if let Ok(column) = df.column(name) {
                check_strictly_ascending(column.as_materialized_series())?;
                frame = frame.drop(name)?;
            }
        }

        let columns: Vec<String> = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let target_column = columns.iter().position(|c| c == target).ok_or_else(|| {
            ForecastError::InvalidMatrix(format!(
                "target column '{}' not found in {:?}",
                target, columns
            ))
        })?;

        let rows = frame.height();
        let mut values = Array2::<f64>::zeros((rows, columns.len()));
        for (col_idx, column) in frame.get_columns().iter().enumerate() {
            let series = column.as_materialized_series();
            if !is_numeric(series.dtype()) {
                return Err(ForecastError::InvalidMatrix(format!(
                    "column '{}' has non-numeric type {}",
                    series.name(),
                    series.dtype()
                )));
            }
            let as_f64 = series.cast(&DataType::Float64)?;
            for (row, value) in as_f64.f64()?.into_iter().enumerate() {
                match value {
                    Some(v) => values[[row, col_idx]] = v,
                    None => {
                        return Err(ForecastError::InvalidMatrix(format!(
                            "missing value at row {} in column '{}'",
                            row,
                            series.name()
                        )))
                    }
                }
            }
        }

        Self::new(values, columns, target_column)
    }

    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn target_column(&self) -> usize {
        self.target_column
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Target column as a flat series, in time order
    pub fn target_values(&self) -> Vec<f64> {
        self.values.column(self.target_column).to_vec()
    }

    /// Robust-scale every column on its own median and interquartile range.
    ///
    /// Returns the scaled matrix together with the target column's scaler,
    /// which maps predictions back to price units.
    pub fn robust_scaled(&self) -> Result<(Self, RobustScaler)> {
        let mut values = self.values.clone();
        let mut target_scaler = None;
        for (col_idx, mut column) in values.columns_mut().into_iter().enumerate() {
            let raw = column.to_vec();
            let scaler = RobustScaler::fit(&raw)?;
            for (value, scaled) in column.iter_mut().zip(scaler.transform(&raw)) {
                *value = scaled;
            }
            if col_idx == self.target_column {
                target_scaler = Some(scaler);
            }
        }
        let target_scaler = target_scaler.ok_or_else(|| {
            ForecastError::InvalidMatrix(format!(
                "target column index {} outside matrix width {}",
                self.target_column,
                self.width()
            ))
        })?;
        let scaled = Self::new(values, self.columns.clone(), self.target_column)?;
        Ok((scaled, target_scaler))
    }

    /// Split into a leading training region and a trailing test region.
    ///
    /// The training region holds `floor(rows * train_ratio)` rows. The split
    /// happens on the raw rows so that windows never straddle the boundary.
    pub fn split_chronological(&self, train_ratio: f64) -> Result<(Self, Self)> {
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            return Err(ForecastError::InvalidConfig(format!(
                "train ratio must lie in (0, 1), got {}",
                train_ratio
            )));
        }
        let rows = self.rows();
        let train_rows = (rows as f64 * train_ratio) as usize;
        if train_rows == 0 || train_rows == rows {
            return Err(ForecastError::InvalidMatrix(format!(
                "train ratio {} leaves an empty region out of {} rows",
                train_ratio, rows
            )));
        }
        let region = |range: std::ops::Range<usize>| Self {
            values: self.values.slice(s![range, ..]).to_owned(),
            columns: self.columns.clone(),
            target_column: self.target_column,
        };
        Ok((region(0..train_rows), region(train_rows..rows)))
    }

    /// Window this matrix on its own target column
    pub fn windows(&self, input_length: usize, horizon: usize) -> Result<WindowSet> {
        build_windows(self.values(), input_length, horizon, self.target_column)
    }
}

/// Supervised windows: inputs `[n, input_length, width]`, labels `[n, horizon]`
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSet {
    pub inputs: Array3<f64>,
    pub labels: Array2<f64>,
}

impl WindowSet {
    pub fn len(&self) -> usize {
        self.inputs.dim().0
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn input_length(&self) -> usize {
        self.inputs.dim().1
    }

    pub fn feature_width(&self) -> usize {
        self.inputs.dim().2
    }

    pub fn horizon(&self) -> usize {
        self.labels.ncols()
    }

    /// Convert to `f32` Burn tensors of the same shapes
    pub fn to_tensors<B: Backend>(&self, device: &B::Device) -> (Tensor<B, 3>, Tensor<B, 2>) {
        let (n, steps, width) = self.inputs.dim();
        let inputs: Vec<f32> = self.inputs.iter().map(|&v| v as f32).collect();
        let labels: Vec<f32> = self.labels.iter().map(|&v| v as f32).collect();

        let features = Tensor::<B, 3>::from_data(TensorData::new(inputs, [n, steps, width]), device);
        let targets =
            Tensor::<B, 2>::from_data(TensorData::new(labels, [n, self.horizon()]), device);
        (features, targets)
    }
}

/// Slide a window of `input_length` rows over the matrix one row at a time.
///
/// Window `i` covers rows `i .. i + input_length`; its label holds the target
/// column of rows `i + input_length .. i + input_length + horizon`. The last
/// `horizon` rows are reserved, giving `rows - input_length - horizon` windows.
pub fn build_windows(
    matrix: ArrayView2<f64>,
    input_length: usize,
    horizon: usize,
    target_column: usize,
) -> Result<WindowSet> {
    if input_length == 0 || horizon == 0 {
        return Err(ForecastError::InvalidConfig(format!(
            "input length ({}) and horizon ({}) must be positive",
            input_length, horizon
        )));
    }
    let (rows, width) = matrix.dim();
    if target_column >= width {
        return Err(ForecastError::InvalidMatrix(format!(
            "target column index {} outside matrix width {}",
            target_column, width
        )));
    }
    if rows <= input_length + horizon {
        return Err(ForecastError::InvalidShape {
            rows,
            input_length,
            horizon,
        });
    }

    let count = rows - input_length - horizon;
    let mut inputs = Array3::<f64>::zeros((count, input_length, width));
    let mut labels = Array2::<f64>::zeros((count, horizon));
    for i in 0..count {
        let label_start = i + input_length;
        inputs
            .slice_mut(s![i, .., ..])
            .assign(&matrix.slice(s![i..label_start, ..]));
        labels
            .row_mut(i)
            .assign(&matrix.slice(s![label_start..label_start + horizon, target_column]));
    }

    debug!(
        "Built {} windows of {} steps x {} features, horizon {}",
        count, input_length, width, horizon
    );
    Ok(WindowSet { inputs, labels })
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
    )
}

fn check_strictly_ascending(series: &Series) -> Result<()> {
    let physical = series.to_physical_repr().cast(&DataType::Int64)?;
    let mut previous: Option<i64> = None;
    for (row, value) in physical.i64()?.into_iter().enumerate() {
        let current = value.ok_or_else(|| {
            ForecastError::InvalidMatrix(format!(
                "time column '{}' has a missing or unparseable value at row {}",
                series.name(),
                row
            ))
        })?;
        if let Some(prev) = previous {
            if current <= prev {
                return Err(ForecastError::InvalidMatrix(format!(
                    "time column '{}' is not strictly ascending at row {}",
                    series.name(),
                    row
                )));
            }
        }
        previous = Some(current);
    }
    Ok(())
}
