use crate::error::ForecastError;
use crate::minute::lstm::step_1_tensor_preparation::build_windows;
use crate::test::test_utils::{monotone_matrix, random_walk_matrix};
use burn_ndarray::{NdArray, NdArrayDevice};

#[test]
fn test_window_count_is_rows_minus_input_minus_horizon() {
    for (input_length, horizon) in [(5, 1), (10, 3), (100, 1)] {
        for k in 1..=4 {
            let matrix = monotone_matrix(input_length + horizon + k, 2);
            let windows = matrix.windows(input_length, horizon).unwrap();
            assert_eq!(windows.len(), k);
            assert_eq!(windows.input_length(), input_length);
            assert_eq!(windows.horizon(), horizon);
            assert_eq!(windows.feature_width(), 2);
        }
    }
}

#[test]
fn test_labels_follow_input_span_without_overlap() {
    let (input_length, horizon) = (4, 3);
    let matrix = monotone_matrix(20, 2);
    let windows = matrix.windows(input_length, horizon).unwrap();

    // Target column holds the row index, so values identify rows
    for i in 0..windows.len() {
        let last_input_row = windows.inputs[[i, input_length - 1, 0]];
        assert_eq!(windows.inputs[[i, 0, 0]], i as f64);
        assert_eq!(last_input_row, (i + input_length - 1) as f64);
        for j in 0..horizon {
            let label_row = windows.labels[[i, j]];
            assert_eq!(label_row, (i + input_length + j) as f64);
            assert!(label_row > last_input_row);
        }
    }
}

#[test]
fn test_all_feature_columns_are_copied() {
    let matrix = monotone_matrix(12, 3);
    let windows = matrix.windows(4, 1).unwrap();
    assert_eq!(windows.inputs[[2, 1, 2]], 3.0 * 3.0);
    assert_eq!(windows.inputs[[5, 3, 1]], 8.0 * 2.0);
}

#[test]
fn test_windowing_is_deterministic() {
    let matrix = random_walk_matrix(60, 4, 7);
    let first = matrix.windows(10, 2).unwrap();
    let second = matrix.windows(10, 2).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_too_few_rows_is_invalid_shape() {
    let matrix = monotone_matrix(11, 1);
    match matrix.windows(10, 1) {
        Err(ForecastError::InvalidShape {
            rows,
            input_length,
            horizon,
        }) => {
            assert_eq!((rows, input_length, horizon), (11, 10, 1));
        }
        other => panic!("expected InvalidShape, got {:?}", other),
    }
    assert!(matrix.windows(9, 1).is_ok());
}

#[test]
fn test_target_column_out_of_range() {
    let matrix = monotone_matrix(20, 2);
    assert!(matches!(
        build_windows(matrix.values(), 5, 1, 2),
        Err(ForecastError::InvalidMatrix(_))
    ));
}

#[test]
fn test_zero_horizon_is_rejected() {
    let matrix = monotone_matrix(20, 2);
    assert!(matches!(
        matrix.windows(5, 0),
        Err(ForecastError::InvalidConfig(_))
    ));
}

#[test]
fn test_windows_per_region_after_split() {
    let matrix = monotone_matrix(1000, 1);
    let (train, test) = matrix.split_chronological(0.8).unwrap();
    let train_windows = train.windows(100, 1).unwrap();
    let test_windows = test.windows(100, 1).unwrap();
    assert_eq!(train_windows.len(), 800 - 101);
    assert_eq!(test_windows.len(), 200 - 101);
    // First test window starts at the first test row
    assert_eq!(test_windows.inputs[[0, 0, 0]], 800.0);
    assert_eq!(test_windows.labels[[0, 0]], 900.0);
}

#[test]
fn test_to_tensors_preserves_layout() {
    let matrix = monotone_matrix(10, 2);
    let windows = matrix.windows(3, 2).unwrap();
    let (features, targets) = windows.to_tensors::<NdArray<f32>>(&NdArrayDevice::Cpu);
    assert_eq!(features.dims(), [5, 3, 2]);
    assert_eq!(targets.dims(), [5, 2]);

    let values = features.into_data().to_vec::<f32>().unwrap();
    // Window 1, step 2, feature 1 -> row 3, doubled
    assert_eq!(values[(1 * 3 + 2) * 2 + 1], 6.0);
    let labels = targets.into_data().to_vec::<f32>().unwrap();
    assert_eq!(labels, vec![3.0, 4.0, 4.0, 5.0, 5.0, 6.0, 6.0, 7.0, 7.0, 8.0]);
}
