use tracing::{info, warn};

use crate::camera_control::common::error::Result;
use crate::camera_control::settings::{DeviceSettings, SettingField};

/// Pushes a full settings tuple to the camera.
pub trait SettingsSink {
    fn apply(&mut self, settings: &DeviceSettings) -> Result<()>;
}

/// Reads the camera's current value for one control.
pub trait SettingsSource {
    fn read_setting(&mut self, field: SettingField) -> Result<i64>;
}

impl<S: SettingsSink + ?Sized> SettingsSink for Box<S> {
    fn apply(&mut self, settings: &DeviceSettings) -> Result<()> {
        (**self).apply(settings)
    }
}

impl<S: SettingsSource + ?Sized> SettingsSource for Box<S> {
    fn read_setting(&mut self, field: SettingField) -> Result<i64> {
        (**self).read_setting(field)
    }
}

/// Sink that only logs what it would have written.
#[derive(Debug, Default)]
pub struct DryRunSink;

impl SettingsSink for DryRunSink {
    fn apply(&mut self, settings: &DeviceSettings) -> Result<()> {
        info!("Dry run, not writing: {}", settings);
        Ok(())
    }
}

/// Seeds the controller from the hardware. Controls that cannot be read fall
/// back to [`SettingField::default_value`]; everything is clamped.
pub fn read_initial_settings<S: SettingsSource + ?Sized>(source: &mut S) -> DeviceSettings {
    SettingField::ALL
        .iter()
        .fold(DeviceSettings::default(), |settings, &field| {
            match source.read_setting(field) {
                Ok(value) => settings.with(field, value),
                Err(e) => {
                    warn!(
                        "Could not read {}, using default {}: {}",
                        field.control_name(),
                        field.default_value(),
                        e
                    );
                    settings
                }
            }
        })
}
