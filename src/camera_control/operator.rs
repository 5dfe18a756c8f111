//! Operator-facing seams: where the preview goes and where commands come from.

use std::time::Duration;

use crate::camera_control::common::error::Result;
use crate::camera_control::frame::Frame;
use crate::camera_control::mode::Command;

pub trait DisplaySink {
    /// Presents the frame with a one-line status overlay. Must not block the
    /// loop beyond the time it takes to hand the pixels over.
    fn show(&mut self, frame: &Frame<'_>, overlay: &str) -> Result<()>;
}

pub trait CommandSource {
    /// Returns at most one pending command, waiting no longer than `timeout`.
    fn poll_command(&mut self, timeout: Duration) -> Option<Command>;
}

impl<D: DisplaySink + ?Sized> DisplaySink for Box<D> {
    fn show(&mut self, frame: &Frame<'_>, overlay: &str) -> Result<()> {
        (**self).show(frame, overlay)
    }
}

impl<C: CommandSource + ?Sized> CommandSource for Box<C> {
    fn poll_command(&mut self, timeout: Duration) -> Option<Command> {
        (**self).poll_command(timeout)
    }
}

/// Display for runs without a window. The overlay is already logged by the
/// control loop at debug level.
#[derive(Debug, Default)]
pub struct HeadlessDisplay;

impl DisplaySink for HeadlessDisplay {
    fn show(&mut self, _frame: &Frame<'_>, _overlay: &str) -> Result<()> {
        Ok(())
    }
}

/// Command source that never produces anything.
#[derive(Debug, Default)]
pub struct NoCommands;

impl CommandSource for NoCommands {
    fn poll_command(&mut self, _timeout: Duration) -> Option<Command> {
        None
    }
}
