//! Control loop configuration

use std::time::Duration;

use crate::camera_control::common::error::{ControlError, Result};
use crate::camera_control::metrics::ColorTemperatureModel;
use crate::camera_control::mode::Mode;
use crate::camera_control::smoothing::DEFAULT_STEP;

/// Configuration for the camera control loop
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Fraction of the white-balance gap closed per frame, in (0, 1]
    pub smoothing_step: f64,
    /// Kelvin change per manual white-balance nudge
    pub white_balance_step: i32,
    /// Estimator used for color temperature
    pub color_temperature_model: ColorTemperatureModel,
    /// Mode the loop starts in
    pub initial_mode: Mode,
    /// Upper bound on the per-frame command poll
    pub poll_timeout: Duration,
    /// Stop after this many processed frames; `None` runs until quit
    pub max_frames: Option<u64>,
    /// Consecutive capture errors tolerated before giving up
    pub capture_retry_limit: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            smoothing_step: DEFAULT_STEP,
            white_balance_step: 100,
            color_temperature_model: ColorTemperatureModel::PowerLaw,
            initial_mode: Mode::Auto,
            poll_timeout: Duration::from_millis(1),
            max_frames: None,
            capture_retry_limit: 50,
        }
    }
}

impl ControlConfig {
    pub fn builder() -> ControlConfigBuilder {
        ControlConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.smoothing_step > 0.0 && self.smoothing_step <= 1.0) {
            return Err(ControlError::InvalidConfig(format!(
                "smoothing step must be in (0, 1], got {}",
                self.smoothing_step
            )));
        }
        if self.white_balance_step <= 0 {
            return Err(ControlError::InvalidConfig(format!(
                "white balance step must be positive, got {}",
                self.white_balance_step
            )));
        }
        if self.max_frames == Some(0) {
            return Err(ControlError::InvalidConfig(
                "frame limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for ControlConfig
#[derive(Default)]
pub struct ControlConfigBuilder {
    smoothing_step: Option<f64>,
    white_balance_step: Option<i32>,
    color_temperature_model: Option<ColorTemperatureModel>,
    initial_mode: Option<Mode>,
    poll_timeout: Option<Duration>,
    max_frames: Option<Option<u64>>,
    capture_retry_limit: Option<u32>,
}

impl ControlConfigBuilder {
    pub fn smoothing_step(mut self, step: f64) -> Self {
        self.smoothing_step = Some(step);
        self
    }

    pub fn white_balance_step(mut self, kelvin: i32) -> Self {
        self.white_balance_step = Some(kelvin);
        self
    }

    pub fn color_temperature_model(mut self, model: ColorTemperatureModel) -> Self {
        self.color_temperature_model = Some(model);
        self
    }

    pub fn initial_mode(mut self, mode: Mode) -> Self {
        self.initial_mode = Some(mode);
        self
    }

    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }

    pub fn max_frames(mut self, max: Option<u64>) -> Self {
        self.max_frames = Some(max);
        self
    }

    pub fn capture_retry_limit(mut self, limit: u32) -> Self {
        self.capture_retry_limit = Some(limit);
        self
    }

    pub fn build(self) -> ControlConfig {
        let default = ControlConfig::default();
        ControlConfig {
            smoothing_step: self.smoothing_step.unwrap_or(default.smoothing_step),
            white_balance_step: self.white_balance_step.unwrap_or(default.white_balance_step),
            color_temperature_model: self.color_temperature_model.unwrap_or(default.color_temperature_model),
            initial_mode: self.initial_mode.unwrap_or(default.initial_mode),
            poll_timeout: self.poll_timeout.unwrap_or(default.poll_timeout),
            max_frames: self.max_frames.unwrap_or(default.max_frames),
            capture_retry_limit: self.capture_retry_limit.unwrap_or(default.capture_retry_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ControlConfig::builder()
            .smoothing_step(0.2)
            .white_balance_step(250)
            .color_temperature_model(ColorTemperatureModel::Linear)
            .initial_mode(Mode::Manual)
            .max_frames(Some(10))
            .build();

        assert_eq!(config.smoothing_step, 0.2);
        assert_eq!(config.white_balance_step, 250);
        assert_eq!(config.color_temperature_model, ColorTemperatureModel::Linear);
        assert_eq!(config.initial_mode, Mode::Manual);
        assert_eq!(config.max_frames, Some(10));
        assert_eq!(config.capture_retry_limit, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_step() {
        for step in [0.0, -0.1, 1.5, f64::NAN] {
            let config = ControlConfig::builder().smoothing_step(step).build();
            assert!(matches!(config.validate(), Err(ControlError::InvalidConfig(_))), "step {}", step);
        }
        assert!(ControlConfig::builder().smoothing_step(1.0).build().validate().is_ok());
        assert!(ControlConfig::builder().white_balance_step(0).build().validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_frame_limit() {
        let config = ControlConfig::builder().max_frames(Some(0)).build();
        assert!(matches!(config.validate(), Err(ControlError::InvalidConfig(_))));
        assert!(ControlConfig::builder().max_frames(Some(1)).build().validate().is_ok());
        assert!(ControlConfig::builder().max_frames(None).build().validate().is_ok());
    }
}
