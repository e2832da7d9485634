use burn::tensor::{Distribution, Tensor};
use burn_ndarray::{NdArray, NdArrayDevice};

use crate::error::ForecastError;
use crate::minute::lstm::step_3_lstm_model_arch::{SequenceModel, StackedLstm};
use crate::minute::lstm::step_5_prediction::predict_sequence;
use crate::test::test_utils::monotone_matrix;

type TestBackend = NdArray<f32>;

#[test]
fn test_length_is_rounded_up_to_whole_blocks() {
    let device = NdArrayDevice::Cpu;
    let model = StackedLstm::<TestBackend>::new(2, 4, 3, 1, &device);
    let windows = Tensor::<TestBackend, 3>::random([10, 5, 2], Distribution::Default, &device);

    assert_eq!(predict_sequence(&model, &windows, 7, 3).unwrap().len(), 9);
    assert_eq!(predict_sequence(&model, &windows, 6, 3).unwrap().len(), 6);
    assert!(predict_sequence(&model, &windows, 0, 3).unwrap().is_empty());
}

#[test]
fn test_batch_of_one_matches_full_batch() {
    let device = NdArrayDevice::Cpu;
    let model = StackedLstm::<TestBackend>::new(2, 4, 2, 2, &device);
    let windows = Tensor::<TestBackend, 3>::random([6, 5, 2], Distribution::Default, &device);

    let sequence = predict_sequence(&model, &windows, 6, 2).unwrap();
    let full = model.forward(windows).into_data().to_vec::<f32>().unwrap();

    // Windows 0, 2 and 4 each contribute both of their outputs
    let expected: Vec<f32> = [0usize, 2, 4]
        .iter()
        .flat_map(|&w| [full[w * 2], full[w * 2 + 1]])
        .collect();
    assert_eq!(sequence.len(), expected.len());
    for (got, want) in sequence.iter().zip(&expected) {
        assert!((got - f64::from(*want)).abs() < 1e-5);
    }
}

#[test]
fn test_extension_bounded_by_available_windows() {
    let device = NdArrayDevice::Cpu;
    // 601 rows, T = 100, P = 1 -> 500 windows
    let matrix = monotone_matrix(601, 1);
    let windows = matrix.windows(100, 1).unwrap();
    assert_eq!(windows.len(), 500);
    let (features, _) = windows.to_tensors::<TestBackend>(&device);
    let model = StackedLstm::<TestBackend>::new(1, 2, 1, 1, &device);

    assert_eq!(predict_sequence(&model, &features, 500, 1).unwrap().len(), 500);
    match predict_sequence(&model, &features, 600, 1) {
        Err(ForecastError::IndexOutOfRange {
            requested,
            available,
        }) => assert_eq!((requested, available), (600, 500)),
        other => panic!("expected IndexOutOfRange, got {:?}", other),
    }
    assert!(predict_sequence(&model, &features, 501, 1).is_err());
}

#[test]
fn test_last_block_only_needs_its_start_window() {
    let device = NdArrayDevice::Cpu;
    let model = StackedLstm::<TestBackend>::new(2, 3, 3, 1, &device);
    let windows = Tensor::<TestBackend, 3>::random([7, 4, 2], Distribution::Default, &device);

    // Indices 0, 3, 6 are all valid
    assert_eq!(predict_sequence(&model, &windows, 9, 3).unwrap().len(), 9);
    // Index 9 is not
    assert!(matches!(
        predict_sequence(&model, &windows, 10, 3),
        Err(ForecastError::IndexOutOfRange { .. })
    ));
}

#[test]
fn test_horizon_must_match_model() {
    let device = NdArrayDevice::Cpu;
    let model = StackedLstm::<TestBackend>::new(2, 3, 1, 1, &device);
    let windows = Tensor::<TestBackend, 3>::zeros([4, 3, 2], &device);
    assert!(matches!(
        predict_sequence(&model, &windows, 2, 2),
        Err(ForecastError::InvalidConfig(_))
    ));
}
