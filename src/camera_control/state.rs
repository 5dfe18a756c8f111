//! Mutable controller state and the command state machine.

use tracing::{debug, info};

use crate::camera_control::mode::{Command, Flow, Mode};
use crate::camera_control::settings::{DeviceSettings, SettingField};

/// Per-process control state, owned by the loop driver and touched once per
/// frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    settings: DeviceSettings,
    mode: Mode,
    /// Last white balance held while in manual mode. `None` until the
    /// operator has taken manual control at least once.
    manual_white_balance: Option<i32>,
}

impl ControllerState {
    pub fn new(settings: DeviceSettings, mode: Mode) -> Self {
        let manual_white_balance = match mode {
            Mode::Manual => Some(settings.white_balance_kelvin()),
            Mode::Auto => None,
        };
        Self {
            settings,
            mode,
            manual_white_balance,
        }
    }

    /// Working settings: operator values plus the current smoothed white balance.
    pub fn settings(&self) -> &DeviceSettings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn manual_white_balance(&self) -> Option<i32> {
        self.manual_white_balance
    }

    /// Stores the settings produced by this frame's smoothing step.
    pub fn update_settings(&mut self, settings: DeviceSettings) {
        self.settings = settings;
        if self.mode == Mode::Manual {
            self.manual_white_balance = Some(settings.white_balance_kelvin());
        }
    }

    /// Status line shown next to the preview.
    pub fn overlay_text(&self) -> String {
        format!("{} | {}", self.settings, self.mode)
    }

    /// Applies one operator command. `white_balance_step` is the kelvin change
    /// for a white-balance nudge.
    pub fn apply(&mut self, command: Command, white_balance_step: i32) -> Flow {
        match command {
            Command::Quit => return Flow::Quit,
            Command::ToggleMode => self.toggle_mode(),
            Command::Increment(field) => self.nudge(field, 1, white_balance_step),
            Command::Decrement(field) => self.nudge(field, -1, white_balance_step),
        }
        Flow::Continue
    }

    fn toggle_mode(&mut self) {
        match self.mode {
            Mode::Auto => {
                let kelvin = self
                    .manual_white_balance
                    .unwrap_or(self.settings.white_balance_kelvin());
                self.settings = self.settings.with_white_balance(kelvin.into());
                self.manual_white_balance = Some(self.settings.white_balance_kelvin());
                self.mode = Mode::Manual;
            }
            Mode::Manual => {
                // Resume tracking from the operator's value, not from a fixed default.
                if let Some(kelvin) = self.manual_white_balance {
                    self.settings = self.settings.with_white_balance(kelvin.into());
                }
                self.mode = Mode::Auto;
            }
        }
        info!(
            mode = %self.mode,
            white_balance = self.settings.white_balance_kelvin(),
            "Mode toggled"
        );
    }

    fn nudge(&mut self, field: SettingField, direction: i64, white_balance_step: i32) {
        match field {
            SettingField::WhiteBalance if self.mode == Mode::Auto => {
                debug!("White balance nudge ignored while AWB is on");
            }
            SettingField::WhiteBalance => {
                self.settings = self
                    .settings
                    .nudged(field, direction * i64::from(white_balance_step));
                self.manual_white_balance = Some(self.settings.white_balance_kelvin());
            }
            _ => {
                self.settings = self.settings.nudged(field, direction);
            }
        }
        debug!(?field, value = self.settings.get(field), "Setting nudged");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WB_STEP: i32 = 100;

    fn auto_state(kelvin: i64) -> ControllerState {
        ControllerState::new(DeviceSettings::clamped(0, 13, 9, kelvin), Mode::Auto)
    }

    #[test]
    fn test_quit_is_terminal() {
        let mut state = auto_state(4500);
        assert_eq!(state.apply(Command::Quit, WB_STEP), Flow::Quit);
        assert_eq!(state.apply(Command::ToggleMode, WB_STEP), Flow::Continue);
    }

    #[test]
    fn test_first_manual_entry_anchors_on_current_value() {
        let mut state = auto_state(5321);
        state.apply(Command::ToggleMode, WB_STEP);

        assert_eq!(state.mode(), Mode::Manual);
        assert_eq!(state.manual_white_balance(), Some(5321));
        assert_eq!(state.settings().white_balance_kelvin(), 5321);
    }

    #[test]
    fn test_manual_value_survives_auto_excursion() {
        let mut state = auto_state(4500);
        state.apply(Command::ToggleMode, WB_STEP);
        state.apply(Command::Increment(SettingField::WhiteBalance), WB_STEP);
        state.apply(Command::Increment(SettingField::WhiteBalance), WB_STEP);
        assert_eq!(state.settings().white_balance_kelvin(), 4700);

        state.apply(Command::ToggleMode, WB_STEP);
        assert_eq!(state.mode(), Mode::Auto);
        assert_eq!(state.settings().white_balance_kelvin(), 4700);

        // AUTO drifts toward a warm scene
        let drifted = state.settings().with_white_balance(7000);
        state.update_settings(drifted);

        state.apply(Command::ToggleMode, WB_STEP);
        assert_eq!(state.mode(), Mode::Manual);
        assert_eq!(state.settings().white_balance_kelvin(), 4700);
    }

    #[test]
    fn test_white_balance_nudge_ignored_in_auto() {
        let mut state = auto_state(4500);
        state.apply(Command::Decrement(SettingField::WhiteBalance), WB_STEP);
        assert_eq!(state.settings().white_balance_kelvin(), 4500);
        assert_eq!(state.manual_white_balance(), None);
    }

    #[test]
    fn test_operator_nudges_work_in_both_modes() {
        let mut state = auto_state(4500);
        state.apply(Command::Increment(SettingField::Brightness), WB_STEP);
        state.apply(Command::ToggleMode, WB_STEP);
        state.apply(Command::Increment(SettingField::Contrast), WB_STEP);
        state.apply(Command::Decrement(SettingField::Saturation), WB_STEP);

        assert_eq!(state.settings().brightness(), 1);
        assert_eq!(state.settings().contrast(), 14);
        assert_eq!(state.settings().saturation(), 8);
    }

    #[test]
    fn test_nudges_clamp() {
        let mut state = ControllerState::new(DeviceSettings::clamped(15, 30, 0, 10000), Mode::Manual);
        state.apply(Command::Increment(SettingField::Brightness), WB_STEP);
        state.apply(Command::Increment(SettingField::Contrast), WB_STEP);
        state.apply(Command::Decrement(SettingField::Saturation), WB_STEP);
        state.apply(Command::Increment(SettingField::WhiteBalance), WB_STEP);

        assert_eq!(*state.settings(), DeviceSettings::clamped(15, 30, 0, 10000));
    }

    #[test]
    fn test_overlay_text() {
        let state = auto_state(4500);
        assert_eq!(
            state.overlay_text(),
            "Brightness: 0 | Contrast: 13 | Saturation: 9 | WB: 4500K | AWB: ON"
        );
    }
}
