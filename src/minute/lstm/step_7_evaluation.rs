// External imports
use serde::{Deserialize, Serialize};

// Internal imports
use crate::error::{ForecastError, Result};

/// Direction of the move between the last values of two consecutive blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn between(from: f64, to: f64) -> Self {
        if from < to {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

/// Outcome of scoring predicted against real block-to-block directions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionReport {
    pub errors: usize,
    pub transitions: usize,
    /// Percentage of transitions whose predicted direction matched
    pub accuracy: f64,
}

/// RMSE and direction accuracy over the same rescaled streams
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub rmse: f64,
    pub direction: DirectionReport,
}

/// Ground truth aligned with a prediction run over a region.
///
/// The first prediction targets the row right after the first input window,
/// so the slice starts `input_length` rows into the region's target column.
pub fn ground_truth_slice(target: &[f64], input_length: usize, len: usize) -> Result<&[f64]> {
    let end = input_length + len;
    if end > target.len() {
        return Err(ForecastError::IndexOutOfRange {
            requested: end,
            available: target.len(),
        });
    }
    Ok(&target[input_length..end])
}

fn check_lengths(predictions: &[f64], truth: &[f64]) -> Result<()> {
    if predictions.len() != truth.len() {
        return Err(ForecastError::LengthMismatch {
            predictions: predictions.len(),
            ground_truth: truth.len(),
        });
    }
    Ok(())
}

/// Root mean squared error between two equally long streams
pub fn rmse(predictions: &[f64], truth: &[f64]) -> Result<f64> {
    check_lengths(predictions, truth)?;
    if predictions.is_empty() {
        return Err(ForecastError::InsufficientData {
            values: 0,
            horizon: 1,
        });
    }
    let squared: f64 = predictions
        .iter()
        .zip(truth)
        .map(|(p, t)| (p - t).powi(2))
        .sum();
    Ok((squared / predictions.len() as f64).sqrt())
}

/// Directions between the last values of consecutive `horizon`-sized blocks
pub fn block_directions(values: &[f64], horizon: usize) -> Vec<Direction> {
    values
        .chunks_exact(horizon)
        .map(|block| block[horizon - 1])
        .collect::<Vec<_>>()
        .windows(2)
        .map(|pair| Direction::between(pair[0], pair[1]))
        .collect()
}

/// Score how often the predicted direction matches the real one.
///
/// Both streams are cut into blocks of `horizon` values. For each pair of
/// consecutive blocks the move from the last value of one to the last value
/// of the next is labelled up or down, separately for predictions and truth;
/// each transition where the labels disagree counts as an error. Magnitude
/// errors between the two streams never enter the score.
pub fn direction_accuracy(
    predictions: &[f64],
    truth: &[f64],
    horizon: usize,
) -> Result<DirectionReport> {
    if horizon == 0 {
        return Err(ForecastError::InvalidConfig(
            "horizon must be greater than zero".into(),
        ));
    }
    check_lengths(predictions, truth)?;
    if predictions.len() < 2 * horizon {
        return Err(ForecastError::InsufficientData {
            values: predictions.len(),
            horizon,
        });
    }
    if predictions.len() % horizon != 0 {
        return Err(ForecastError::PartialBlock {
            values: predictions.len(),
            horizon,
        });
    }

    let predicted = block_directions(predictions, horizon);
    let real = block_directions(truth, horizon);
    let transitions = predicted.len();
    let errors = predicted
        .iter()
        .zip(&real)
        .filter(|(p, r)| p != r)
        .count();

    Ok(DirectionReport {
        errors,
        transitions,
        accuracy: (transitions - errors) as f64 * 100.0 / transitions as f64,
    })
}

/// Compute both metrics on already rescaled streams
pub fn evaluate(predictions: &[f64], truth: &[f64], horizon: usize) -> Result<Evaluation> {
    let direction = direction_accuracy(predictions, truth, horizon)?;
    let rmse = rmse(predictions, truth)?;
    Ok(Evaluation { rmse, direction })
}
