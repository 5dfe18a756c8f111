//! Settings backend that shells out to `v4l2-ctl`.
//!
//! Every write spawns a process, which is slow enough that the debounce in
//! front of this sink matters.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use crate::camera_control::common::error::{ControlError, Result};
use crate::camera_control::device::sink::{SettingsSink, SettingsSource};
use crate::camera_control::settings::{DeviceSettings, SettingField};

const DEFAULT_PROGRAM: &str = "v4l2-ctl";

#[derive(Debug, Clone)]
pub struct V4l2Ctl {
    program: PathBuf,
    device: String,
}

impl V4l2Ctl {
    /// Uses `v4l2-ctl` from `PATH`.
    pub fn new(device: impl Into<String>) -> Self {
        Self::with_program(DEFAULT_PROGRAM, device)
    }

    pub fn with_program(program: impl AsRef<Path>, device: impl Into<String>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            device: device.into(),
        }
    }

    pub fn set_args(&self, settings: &DeviceSettings) -> Vec<String> {
        let mut args = vec!["-d".to_string(), self.device.clone()];
        args.extend(SettingField::ALL.iter().map(|&field| {
            format!("--set-ctrl={}={}", field.control_name(), settings.get(field))
        }));
        args
    }

    fn run(&self, args: &[String]) -> std::io::Result<Output> {
        debug!(program = %self.program.display(), ?args, "Running device control utility");
        Command::new(&self.program).args(args).output()
    }
}

impl SettingsSink for V4l2Ctl {
    fn apply(&mut self, settings: &DeviceSettings) -> Result<()> {
        let output = self.run(&self.set_args(settings)).map_err(|e| {
            ControlError::DeviceWrite(format!("{}: {}", self.program.display(), e))
        })?;

        if !output.status.success() {
            return Err(ControlError::DeviceWrite(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

impl SettingsSource for V4l2Ctl {
    fn read_setting(&mut self, field: SettingField) -> Result<i64> {
        let name = field.control_name();
        let args = [
            "-d".to_string(),
            self.device.clone(),
            format!("--get-ctrl={}", name),
        ];
        let output = self.run(&args).map_err(|e| ControlError::DeviceRead {
            name,
            reason: format!("{}: {}", self.program.display(), e),
        })?;

        if !output.status.success() {
            return Err(ControlError::DeviceRead {
                name,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_control_value(&stdout).ok_or_else(|| ControlError::DeviceRead {
            name,
            reason: format!("no numeric value in {:?}", stdout.trim()),
        })
    }
}

/// Extracts the value from `v4l2-ctl --get-ctrl` output such as
/// `brightness: 8`. Falls back to the first bare integer on the line.
pub fn parse_control_value(output: &str) -> Option<i64> {
    output.lines().find_map(|line| {
        line.rsplit_once(':')
            .and_then(|(_, value)| value.trim().parse().ok())
            .or_else(|| line.split_whitespace().find_map(|token| token.parse().ok()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_control_value() {
        assert_eq!(parse_control_value("brightness: 8\n"), Some(8));
        assert_eq!(parse_control_value("white_balance_temperature: 4600"), Some(4600));
        assert_eq!(parse_control_value("brightness: -3"), Some(-3));
        assert_eq!(parse_control_value("42"), Some(42));
        assert_eq!(parse_control_value("VIDIOC_G_EXT_CTRLS: failed"), None);
        assert_eq!(parse_control_value(""), None);
    }

    #[test]
    fn test_set_args_cover_every_control() {
        let ctl = V4l2Ctl::new("/dev/video2");
        let args = ctl.set_args(&DeviceSettings::clamped(4, 13, 9, 5100));
        assert_eq!(
            args,
            vec![
                "-d",
                "/dev/video2",
                "--set-ctrl=brightness=4",
                "--set-ctrl=contrast=13",
                "--set-ctrl=saturation=9",
                "--set-ctrl=white_balance_temperature=5100",
            ]
        );
    }

    #[test]
    fn test_missing_program_is_write_error() {
        let mut ctl = V4l2Ctl::with_program("/nonexistent/v4l2-ctl", "/dev/video0");
        let result = ctl.apply(&DeviceSettings::default());
        assert!(matches!(result.unwrap_err(), ControlError::DeviceWrite(_)));
    }

    // Both directions share one test so only one fake executable is spawned at a time.
    #[cfg(unix)]
    #[test]
    fn test_fake_v4l2_ctl() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("calls.log");
        let script = dir.path().join("v4l2-ctl");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\n\
                 case \"$*\" in\n\
                   *--get-ctrl=brightness*) echo \"brightness: 7\" ;;\n\
                   *--get-ctrl=*) echo \"unknown control\" >&2; exit 1 ;;\n\
                   *) echo \"$*\" >> '{}' ;;\n\
                 esac\n",
                log.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut ctl = V4l2Ctl::with_program(&script, "/dev/video0");

        assert_eq!(ctl.read_setting(SettingField::Brightness).unwrap(), 7);
        assert!(matches!(
            ctl.read_setting(SettingField::Contrast).unwrap_err(),
            ControlError::DeviceRead { name: "contrast", .. }
        ));

        ctl.apply(&DeviceSettings::clamped(2, 3, 4, 6000)).unwrap();
        let calls = std::fs::read_to_string(&log).unwrap();
        assert_eq!(
            calls.trim(),
            "-d /dev/video0 --set-ctrl=brightness=2 --set-ctrl=contrast=3 \
             --set-ctrl=saturation=4 --set-ctrl=white_balance_temperature=6000"
        );
    }
}
