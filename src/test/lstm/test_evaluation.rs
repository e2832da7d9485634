use crate::error::ForecastError;
use crate::minute::lstm::step_7_evaluation::{direction_accuracy, evaluate, ground_truth_slice, rmse};
use crate::test::test_utils::random_walk_matrix;
use crate::util::scaler::{InverseTransform, RobustScaler};

#[test]
fn test_monotone_streams_score_full_accuracy() {
    let truth: Vec<f64> = (0..50).map(|v| v as f64).collect();
    let predictions: Vec<f64> = (0..50).map(|v| v as f64 * 1.5).collect();
    let report = direction_accuracy(&predictions, &truth, 1).unwrap();
    assert_eq!(report.errors, 0);
    assert_eq!(report.transitions, 49);
    assert_eq!(report.accuracy, 100.0);
}

#[test]
fn test_inverted_directions_score_zero() {
    let truth = [1.0, 3.0, 2.0, 5.0, 4.0, 6.0];
    let predictions = [6.0, 4.0, 5.0, 2.0, 3.0, 1.0];
    let report = direction_accuracy(&predictions, &truth, 1).unwrap();
    assert_eq!(report.errors, report.transitions);
    assert_eq!(report.accuracy, 0.0);
}

#[test]
fn test_fewer_than_two_blocks_is_insufficient() {
    let values = [1.0, 2.0, 3.0];
    match direction_accuracy(&values, &values, 2) {
        Err(ForecastError::InsufficientData { values, horizon }) => {
            assert_eq!((values, horizon), (3, 2));
        }
        other => panic!("expected InsufficientData, got {:?}", other),
    }
    assert!(direction_accuracy(&[1.0], &[1.0], 1).is_err());
    assert!(direction_accuracy(&[1.0, 2.0], &[1.0, 2.0], 1).is_ok());
}

#[test]
fn test_rmse_of_identical_streams_is_zero() {
    let matrix = random_walk_matrix(200, 1, 3);
    let truth = matrix.target_values();
    assert_eq!(rmse(&truth, &truth).unwrap(), 0.0);
}

#[test]
fn test_mismatched_lengths_are_rejected() {
    assert!(matches!(
        rmse(&[1.0, 2.0], &[1.0]),
        Err(ForecastError::LengthMismatch {
            predictions: 2,
            ground_truth: 1
        })
    ));
    assert!(matches!(
        direction_accuracy(&[1.0, 2.0, 3.0], &[1.0, 2.0], 1),
        Err(ForecastError::LengthMismatch { .. })
    ));
}

#[test]
fn test_direction_ignores_scale_and_offset_errors() {
    let truth = random_walk_matrix(300, 1, 21).target_values();
    let predictions: Vec<f64> = truth.iter().map(|v| v * 0.25 - 40.0).collect();

    let evaluation = evaluate(&predictions, &truth, 1).unwrap();
    assert_eq!(evaluation.direction.accuracy, 100.0);
    assert!(evaluation.rmse > 1.0);
}

#[test]
fn test_one_flipped_transition_counts_one_error() {
    let truth = [1.0, 2.0, 3.0, 4.0, 5.0];
    let predictions = [1.0, 2.0, 1.5, 4.0, 5.0];
    let report = direction_accuracy(&predictions, &truth, 1).unwrap();
    // 2.0 -> 1.5 is down where truth goes up; 1.5 -> 4.0 still agrees
    assert_eq!(report.errors, 1);
    assert_eq!(report.transitions, 4);
    assert_eq!(report.accuracy, 75.0);
}

#[test]
fn test_rescaled_streams_keep_direction() {
    let scaler = RobustScaler {
        center: 120.0,
        scale: 4.0,
    };
    let target: Vec<f64> = (0..20).map(|v| v as f64 / 10.0).collect();
    let raw_predictions: Vec<f64> = (0..10).map(|v| v as f64 / 20.0).collect();

    let truth = scaler.inverse_transform(ground_truth_slice(&target, 10, raw_predictions.len()).unwrap());
    let predictions = scaler.inverse_transform(&raw_predictions);
    assert_eq!(truth[0], 1.0 * 4.0 + 120.0);

    let evaluation = evaluate(&predictions, &truth, 1).unwrap();
    assert_eq!(evaluation.direction.accuracy, 100.0);
    assert_eq!(evaluation.direction.transitions, 9);
}
