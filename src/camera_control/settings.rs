//! Device settings and the translation from readings to targets

use std::fmt;
use std::ops::RangeInclusive;

use crate::camera_control::metrics::MetricReading;
use crate::camera_control::mode::Mode;

/// One tunable camera control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingField {
    Brightness,
    Contrast,
    Saturation,
    WhiteBalance,
}

impl SettingField {
    pub const ALL: [SettingField; 4] = [
        SettingField::Brightness,
        SettingField::Contrast,
        SettingField::Saturation,
        SettingField::WhiteBalance,
    ];

    /// Closed range the hardware accepts.
    pub fn range(self) -> RangeInclusive<i32> {
        match self {
            SettingField::Brightness => 0..=15,
            SettingField::Contrast => 0..=30,
            SettingField::Saturation => 0..=60,
            SettingField::WhiteBalance => 1000..=10000,
        }
    }

    /// Value used when the device cannot be queried at startup.
    pub fn default_value(self) -> i32 {
        match self {
            SettingField::Brightness => 0,
            SettingField::Contrast => 13,
            SettingField::Saturation => 9,
            SettingField::WhiteBalance => 4500,
        }
    }

    /// V4L2 control name as understood by `v4l2-ctl`.
    pub fn control_name(self) -> &'static str {
        match self {
            SettingField::Brightness => "brightness",
            SettingField::Contrast => "contrast",
            SettingField::Saturation => "saturation",
            SettingField::WhiteBalance => "white_balance_temperature",
        }
    }

    pub fn clamp(self, value: i64) -> i32 {
        let range = self.range();
        value.clamp(i64::from(*range.start()), i64::from(*range.end())) as i32
    }
}

/// A full tuple of camera settings. Every field is always inside
/// [`SettingField::range`]; the constructors clamp instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceSettings {
    brightness: i32,
    contrast: i32,
    saturation: i32,
    white_balance_kelvin: i32,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self::clamped(
            SettingField::Brightness.default_value().into(),
            SettingField::Contrast.default_value().into(),
            SettingField::Saturation.default_value().into(),
            SettingField::WhiteBalance.default_value().into(),
        )
    }
}

impl DeviceSettings {
    pub fn clamped(brightness: i64, contrast: i64, saturation: i64, white_balance_kelvin: i64) -> Self {
        Self {
            brightness: SettingField::Brightness.clamp(brightness),
            contrast: SettingField::Contrast.clamp(contrast),
            saturation: SettingField::Saturation.clamp(saturation),
            white_balance_kelvin: SettingField::WhiteBalance.clamp(white_balance_kelvin),
        }
    }

    pub fn brightness(&self) -> i32 {
        self.brightness
    }

    pub fn contrast(&self) -> i32 {
        self.contrast
    }

    pub fn saturation(&self) -> i32 {
        self.saturation
    }

    pub fn white_balance_kelvin(&self) -> i32 {
        self.white_balance_kelvin
    }

    pub fn get(&self, field: SettingField) -> i32 {
        match field {
            SettingField::Brightness => self.brightness,
            SettingField::Contrast => self.contrast,
            SettingField::Saturation => self.saturation,
            SettingField::WhiteBalance => self.white_balance_kelvin,
        }
    }

    /// Returns a copy with `field` replaced, clamped to its range.
    pub fn with(mut self, field: SettingField, value: i64) -> Self {
        let value = field.clamp(value);
        match field {
            SettingField::Brightness => self.brightness = value,
            SettingField::Contrast => self.contrast = value,
            SettingField::Saturation => self.saturation = value,
            SettingField::WhiteBalance => self.white_balance_kelvin = value,
        }
        self
    }

    /// Returns a copy with `field` moved by `delta`, clamped to its range.
    pub fn nudged(self, field: SettingField, delta: i64) -> Self {
        self.with(field, i64::from(self.get(field)) + delta)
    }

    pub fn with_white_balance(self, kelvin: i64) -> Self {
        self.with(SettingField::WhiteBalance, kelvin)
    }
}

impl fmt::Display for DeviceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Brightness: {} | Contrast: {} | Saturation: {} | WB: {}K",
            self.brightness, self.contrast, self.saturation, self.white_balance_kelvin
        )
    }
}

/// Maps a kelvin reading onto the device's white-balance control. NaN lands
/// on the bottom of the range.
pub fn kelvin_to_setting(kelvin: f64) -> i32 {
    // `as` saturates and sends NaN to zero, so this never panics.
    SettingField::WhiteBalance.clamp(kelvin.round() as i64)
}

/// Target settings for this frame, before smoothing.
///
/// Only white balance is derived from the frame, and only in [`Mode::Auto`].
/// Brightness, contrast and saturation are operator controls and pass through
/// from `current`. In [`Mode::Manual`] `current` already carries the
/// operator's white balance.
pub fn translate(reading: &MetricReading, mode: Mode, current: &DeviceSettings) -> DeviceSettings {
    match mode {
        Mode::Auto => current.with_white_balance(kelvin_to_setting(reading.color_temperature_kelvin).into()),
        Mode::Manual => *current,
    }
}
