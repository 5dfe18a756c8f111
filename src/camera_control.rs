//! Adaptive camera-parameter control
//!
//! This module estimates white balance from live frames, smooths it, and
//! writes it together with operator-tuned brightness, contrast and saturation
//! back to the camera, skipping writes that would change nothing.

pub mod common;
pub mod config;
pub mod frame;
pub mod metrics;
pub mod settings;
pub mod smoothing;
pub mod mode;
pub mod state;
pub mod device;
pub mod operator;
pub mod controller;
pub mod timing;
pub mod capture;
pub mod preview;

pub use common::{
    ControlError,
    Result,
};

pub use config::{ControlConfig, ControlConfigBuilder};
pub use frame::{Frame, FrameSource};
pub use metrics::{ColorTemperatureModel, MetricReading, estimate};
pub use settings::{DeviceSettings, SettingField, translate};
pub use smoothing::smooth;
pub use mode::{Command, Flow, Mode};
pub use state::ControllerState;

pub use device::{
    DebouncedWriter,
    DryRunSink,
    SettingsSink,
    SettingsSource,
    V4l2Ctl,
    V4lControls,
    read_initial_settings,
};

pub use operator::{CommandSource, DisplaySink, HeadlessDisplay, NoCommands};
pub use controller::ControlLoop;
pub use timing::{LoopStats, LoopTimings, Timer};
pub use capture::V4lCapture;
pub use preview::{KeyboardCommands, PreviewDisplay, open_preview};
