//! Comprehensive tests for configuration parsing
//!
//! This file tests the config module including:
//! - Loading the bundled JSON config files
//! - Parsing different scheduler types and layer stacks
//! - Handling invalid JSON, unknown fields and missing files
//! - Handling missing optional fields with defaults

use char_rnn::architecture::LayerConfig;
use char_rnn::config::{load_config, validate_config, TrainingConfig};
use char_rnn::Error;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp config");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    file
}

fn load_temp(contents: &str) -> char_rnn::Result<TrainingConfig> {
    let temp = write_temp_config(contents);
    load_config(temp.path().to_str().unwrap())
}

// ============================================================================
// Bundled Config Tests
// ============================================================================

mod bundled_config_tests {
    use super::*;

    #[test]
    fn test_load_default_config() {
        let config = load_config("config/aesop.json").expect("Failed to load aesop config");

        assert_eq!(config.window, 24);
        assert_eq!(config.epochs, 25);
        assert_eq!(config.scheduler_type, "inverse_time");
        assert_eq!(config.layers, vec![LayerConfig::lstm(160)]);
        assert_eq!(config.log_path.as_deref(), Some("log.txt"));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_load_rnn_step_config() {
        let config =
            load_config("config/aesop_rnn_step.json").expect("Failed to load rnn step config");

        assert_eq!(config.scheduler_type, "step_decay");
        assert_eq!(config.step_size, Some(3));
        assert!((config.gamma.unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(
            config.layers,
            vec![LayerConfig::rnn(128), LayerConfig::rnn(96)]
        );
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.log_path, None);
    }

    #[test]
    fn test_load_exponential_config_fills_defaults() {
        let config = load_config("config/aesop_exponential.json")
            .expect("Failed to load exponential config");

        assert_eq!(config.scheduler_type, "exponential");
        assert!((config.decay_rate.unwrap() - 0.95).abs() < 1e-12);
        assert_eq!(config.layers.len(), 2);
        assert_eq!(config.window, 24);
        assert_eq!(config.sample_length, 80);
    }
}

// ============================================================================
// Temporary Config Tests
// ============================================================================

mod temp_config_tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config = load_temp("{}").unwrap();
        let default = TrainingConfig::default();

        assert_eq!(config.window, default.window);
        assert_eq!(config.learning_rate, default.learning_rate);
        assert_eq!(config.layers, default.layers);
    }

    #[test]
    fn test_inverse_time_explicit_decay() {
        let config = load_temp(
            r#"{
  "scheduler_type": "inverse_time",
  "learning_rate": 0.01,
  "decay": 0.001
}"#,
        )
        .unwrap();

        let mut scheduler = config.scheduler().unwrap();
        assert_eq!(scheduler.get_lr(), 0.01);
        scheduler.step();
        assert!((scheduler.get_lr() - 0.01 / 1.001).abs() < 1e-12);
    }

    #[test]
    fn test_constant_scheduler() {
        let config = load_temp(r#"{ "scheduler_type": "constant", "learning_rate": 0.05 }"#).unwrap();
        let mut scheduler = config.scheduler().unwrap();
        scheduler.step();
        assert_eq!(scheduler.get_lr(), 0.05);
    }
}

// ============================================================================
// Error Handling Tests
// ============================================================================

mod error_tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let result = load_config("config/does_not_exist.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(load_temp("{ window: 8 "), Err(Error::Json(_))));
    }

    #[test]
    fn test_unknown_field() {
        assert!(matches!(
            load_temp(r#"{ "hidden_size": 128 }"#),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_unknown_scheduler() {
        assert!(matches!(
            load_temp(r#"{ "scheduler_type": "cosine_annealing" }"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_exponential_without_rate() {
        assert!(matches!(
            load_temp(r#"{ "scheduler_type": "exponential" }"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_invalid_layer_type() {
        let result = load_temp(r#"{ "layers": [{ "layer_type": "gru", "size": 32 }] }"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_layer_stack() {
        assert!(matches!(load_temp(r#"{ "layers": [] }"#), Err(Error::Config(_))));
    }

    #[test]
    fn test_value_ranges() {
        assert!(load_temp(r#"{ "window": 1 }"#).is_err());
        assert!(load_temp(r#"{ "epochs": 0 }"#).is_err());
        assert!(load_temp(r#"{ "learning_rate": 0.0 }"#).is_err());
        assert!(load_temp(r#"{ "learning_rate": -0.1 }"#).is_err());
        assert!(load_temp(r#"{ "window": -3 }"#).is_err());
    }

    #[test]
    fn test_validate_config_direct() {
        let config = TrainingConfig {
            decay: Some(-1.0),
            ..TrainingConfig::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
