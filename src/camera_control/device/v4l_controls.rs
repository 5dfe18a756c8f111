use tracing::debug;
use v4l::Device;
use v4l::control::{Control, Value};

use crate::camera_control::common::error::{ControlError, Result};
use crate::camera_control::device::sink::{SettingsSink, SettingsSource};
use crate::camera_control::settings::{DeviceSettings, SettingField};

/// First user-class control ID (`V4L2_CID_BASE`).
const V4L2_CID_BASE: u32 = 0x0098_0900;

fn control_id(field: SettingField) -> u32 {
    match field {
        SettingField::Brightness => V4L2_CID_BASE,
        SettingField::Contrast => V4L2_CID_BASE + 1,
        SettingField::Saturation => V4L2_CID_BASE + 2,
        SettingField::WhiteBalance => V4L2_CID_BASE + 26,
    }
}

/// Sets controls with `VIDIOC_S_CTRL` on the device node, without spawning a
/// process per write.
pub struct V4lControls {
    device: Device,
}

impl V4lControls {
    pub fn open(path: &str) -> Result<Self> {
        let device = Device::with_path(path)?;
        Ok(Self { device })
    }
}

impl SettingsSink for V4lControls {
    fn apply(&mut self, settings: &DeviceSettings) -> Result<()> {
        for field in SettingField::ALL {
            let control = Control {
                id: control_id(field),
                value: Value::Integer(settings.get(field).into()),
            };
            self.device.set_control(control).map_err(|e| {
                ControlError::DeviceWrite(format!("{}: {}", field.control_name(), e))
            })?;
        }
        debug!("Wrote controls directly: {}", settings);
        Ok(())
    }
}

impl SettingsSource for V4lControls {
    fn read_setting(&mut self, field: SettingField) -> Result<i64> {
        let name = field.control_name();
        let control = self
            .device
            .control(control_id(field))
            .map_err(|e| ControlError::DeviceRead { name, reason: e.to_string() })?;

        match control.value {
            Value::Integer(value) => Ok(value),
            Value::Boolean(value) => Ok(i64::from(value)),
            other => Err(ControlError::DeviceRead {
                name,
                reason: format!("unexpected control value {:?}", other),
            }),
        }
    }
}
