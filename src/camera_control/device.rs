//! Device settings I/O
//!
//! The control loop only talks to the camera through [`SettingsSink`] and, at
//! startup, [`SettingsSource`]. Two backends are provided: shelling out to
//! `v4l2-ctl`, and setting V4L2 controls directly on the device node.

mod sink;
mod debounce;
mod v4l2_ctl;
mod v4l_controls;

pub use sink::{DryRunSink, SettingsSink, SettingsSource, read_initial_settings};
pub use debounce::DebouncedWriter;
pub use v4l2_ctl::{V4l2Ctl, parse_control_value};
pub use v4l_controls::V4lControls;
