use tracing::{debug, info, warn};

use crate::camera_control::device::sink::SettingsSink;
use crate::camera_control::settings::DeviceSettings;

/// Wraps a [`SettingsSink`] and drops writes that would not change anything.
///
/// Writes are fire-and-forget: a failing sink is logged and counted, and the
/// tuple is still recorded as committed so a broken device is not hammered
/// at frame rate.
pub struct DebouncedWriter<S: SettingsSink> {
    sink: S,
    committed: Option<DeviceSettings>,
    writes: u64,
    failed_writes: u64,
}

impl<S: SettingsSink> DebouncedWriter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            committed: None,
            writes: 0,
            failed_writes: 0,
        }
    }

    /// Writes `next` unless it equals the committed tuple. Returns whether the
    /// sink was called.
    pub fn maybe_apply(&mut self, next: &DeviceSettings) -> bool {
        if self.committed.as_ref() == Some(next) {
            return false;
        }

        self.writes += 1;
        match self.sink.apply(next) {
            Ok(()) => info!("Updated settings -> {}", next),
            Err(e) => {
                self.failed_writes += 1;
                warn!("Device write failed for {}: {}", next, e);
            }
        }
        self.committed = Some(*next);
        debug!(writes = self.writes, failed = self.failed_writes, "Committed settings");
        true
    }

    /// Last tuple handed to the sink.
    pub fn committed(&self) -> Option<&DeviceSettings> {
        self.committed.as_ref()
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn failed_writes(&self) -> u64 {
        self.failed_writes
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
