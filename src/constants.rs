// Default feature layout of the preprocessed minute data
pub const TARGET_COLUMN: &str = "close_sma";
pub const FEATURE_WIDTH: usize = 7;

// Window parameters
pub const INPUT_LENGTH: usize = 100; // Number of minutes fed to the model
pub const NUMBER_PREDICTIONS: usize = 1; // Forecast horizon in minutes

// Model parameters
pub const HIDDEN_SIZE: usize = 100;
pub const NUM_LAYERS: usize = 3;

// Training parameters
pub const EPOCHS: usize = 250;
pub const LEARNING_RATE: f64 = 0.001;
pub const REPORT_EVERY: usize = 5;
pub const SEED: u64 = 42;
pub const ADAM_EPSILON: f32 = 1e-8;

// Data preprocessing
pub const TRAIN_SPLIT_RATIO: f64 = 0.8; // Leading 80% of the rows train the model

// Evaluation
pub const PLOT_EXTENSION: usize = 500;

// Model paths
pub const MODEL_DIR: &str = "models";
pub const MODEL_VARIANT: &str = "sept_oct";
pub const MODEL_FILE_NAME: &str = "model";
pub const LOSS_FILE_NAME: &str = "loss_history.csv";
pub const SCALER_FILE_NAME: &str = "close_scaler.json";
