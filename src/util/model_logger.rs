use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::ForecastConfig;
use crate::minute::lstm::step_7_evaluation::Evaluation;

/// Record of one training/evaluation run
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunReport {
    pub timestamp: String,
    pub config: ForecastConfig,
    pub train_windows: usize,
    pub test_windows: usize,
    pub final_train_loss: Option<f64>,
    pub final_val_loss: Option<f64>,
    pub rmse: Option<f64>,
    pub direction_errors: Option<usize>,
    pub direction_transitions: Option<usize>,
    pub direction_accuracy: Option<f64>,
    pub training_time_seconds: Option<f64>,
    pub notes: String,
}

impl RunReport {
    pub fn new(config: &ForecastConfig, train_windows: usize, test_windows: usize) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            config: config.clone(),
            train_windows,
            test_windows,
            final_train_loss: None,
            final_val_loss: None,
            rmse: None,
            direction_errors: None,
            direction_transitions: None,
            direction_accuracy: None,
            training_time_seconds: None,
            notes: String::new(),
        }
    }

    pub fn set_final_losses(&mut self, train_loss: f64, val_loss: f64) {
        self.final_train_loss = Some(train_loss);
        self.final_val_loss = Some(val_loss);
    }

    pub fn set_evaluation(&mut self, evaluation: &Evaluation) {
        self.rmse = Some(evaluation.rmse);
        self.direction_errors = Some(evaluation.direction.errors);
        self.direction_transitions = Some(evaluation.direction.transitions);
        self.direction_accuracy = Some(evaluation.direction.accuracy);
    }

    pub fn set_training_time(&mut self, seconds: f64) {
        self.training_time_seconds = Some(seconds);
    }

    pub fn add_note(&mut self, note: &str) {
        if !self.notes.is_empty() {
            self.notes.push('\n');
        }
        self.notes.push_str(note);
    }

    pub fn save(&self, report_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(report_dir)?;

        let filename = format!(
            "{}_T{}_P{}_h{}_l{}_report.json",
            self.config.model_variant,
            self.config.input_length,
            self.config.horizon,
            self.config.hidden_size,
            self.config.num_layers,
        );
        let file_path = report_dir.join(filename);

        let json = serde_json::to_string_pretty(&self)?;
        let mut file = fs::File::create(&file_path)?;
        file.write_all(json.as_bytes())?;

        Ok(file_path)
    }
}

/// Timestamped directory for the reports of one invocation
pub fn create_report_dir(root: &Path) -> Result<PathBuf> {
    let dir = root
        .join("reports")
        .join(Local::now().format("%Y%m%d_%H%M%S").to_string());
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
