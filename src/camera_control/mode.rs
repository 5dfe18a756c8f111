//! Control modes and operator commands

use std::fmt;

use crate::camera_control::settings::SettingField;

/// Who drives white balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// White balance tracks the frame through the smoothing filter.
    #[default]
    Auto,
    /// White balance is frozen at the operator's value.
    Manual,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Auto => Mode::Manual,
            Mode::Manual => Mode::Auto,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Auto => f.write_str("AWB: ON"),
            Mode::Manual => f.write_str("AWB: OFF"),
        }
    }
}

/// A single operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ToggleMode,
    Increment(SettingField),
    Decrement(SettingField),
}

impl Command {
    /// Default single-key bindings.
    pub fn from_key(key: char) -> Option<Self> {
        let command = match key.to_ascii_lowercase() {
            'q' => Command::Quit,
            't' => Command::ToggleMode,
            'w' => Command::Increment(SettingField::Brightness),
            's' => Command::Decrement(SettingField::Brightness),
            'e' => Command::Increment(SettingField::Contrast),
            'd' => Command::Decrement(SettingField::Contrast),
            'r' => Command::Increment(SettingField::Saturation),
            'f' => Command::Decrement(SettingField::Saturation),
            'y' => Command::Increment(SettingField::WhiteBalance),
            'h' => Command::Decrement(SettingField::WhiteBalance),
            _ => return None,
        };
        Some(command)
    }
}

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}
