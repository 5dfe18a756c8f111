//! The per-frame control loop.

use tracing::{debug, info, instrument, warn};

use crate::camera_control::{
    common::error::{ControlError, Result},
    config::ControlConfig,
    device::{DebouncedWriter, SettingsSink},
    frame::FrameSource,
    metrics::{self, MetricReading},
    mode::Flow,
    operator::{CommandSource, DisplaySink},
    settings::{DeviceSettings, translate},
    smoothing::smooth,
    state::ControllerState,
    timing::{LoopStats, Timer},
};


/// Drives capture, estimation, smoothing, debounced writes, display and
/// command handling, one frame at a time on the calling thread.
pub struct ControlLoop<F, D, C, S>
where
    F: FrameSource,
    D: DisplaySink,
    C: CommandSource,
    S: SettingsSink,
{
    frames: F,
    display: D,
    commands: C,
    writer: DebouncedWriter<S>,
    state: ControllerState,
    config: ControlConfig,
    stats: LoopStats,
    consecutive_capture_errors: u32,
    last_reading: Option<MetricReading>,
}

impl<F, D, C, S> ControlLoop<F, D, C, S>
where
    F: FrameSource,
    D: DisplaySink,
    C: CommandSource,
    S: SettingsSink,
{
    pub fn new(
        frames: F,
        display: D,
        commands: C,
        sink: S,
        initial: DeviceSettings,
        config: ControlConfig,
    ) -> Result<Self> {
        config.validate()?;
        info!(settings = %initial, mode = %config.initial_mode, "Control loop initialized");
        Ok(Self {
            frames,
            display,
            commands,
            writer: DebouncedWriter::new(sink),
            state: ControllerState::new(initial, config.initial_mode),
            config,
            stats: LoopStats::default(),
            consecutive_capture_errors: 0,
            last_reading: None,
        })
    }

    /// Runs one iteration. Empty captures and capture errors below the retry
    /// limit skip the frame without touching the controller state.
    pub fn step(&mut self) -> Result<Flow> {
        let frame = match self.frames.next_frame() {
            Ok(Some(frame)) if !frame.is_empty() => frame,
            Ok(_) => {
                self.stats.frames_skipped += 1;
                return Ok(Flow::Continue);
            }
            Err(e) => {
                self.stats.capture_errors += 1;
                self.consecutive_capture_errors += 1;
                if self.consecutive_capture_errors >= self.config.capture_retry_limit {
                    return Err(ControlError::Capture(format!(
                        "giving up after {} consecutive failures: {}",
                        self.consecutive_capture_errors, e
                    )));
                }
                warn!("Skipping frame: {}", e);
                return Ok(Flow::Continue);
            }
        };
        self.consecutive_capture_errors = 0;

        let _span = tracing::debug_span!("frame", n = self.stats.frames_processed).entered();

        let timer = Timer::start("estimate");
        let reading = metrics::estimate(&frame, self.config.color_temperature_model);
        self.stats.timings.record(timer);

        let timer = Timer::start("control");
        let current = *self.state.settings();
        let target = translate(&reading, self.state.mode(), &current);
        let white_balance = smooth(
            current.white_balance_kelvin(),
            target.white_balance_kelvin(),
            self.config.smoothing_step,
        );
        let next = target.with_white_balance(white_balance.into());
        self.state.update_settings(next);
        self.stats.timings.record(timer);

        let timer = Timer::start("write");
        self.writer.maybe_apply(&next);
        self.stats.writes_applied = self.writer.writes();
        self.stats.writes_failed = self.writer.failed_writes();
        self.stats.timings.record(timer);

        let timer = Timer::start("display");
        let overlay = format!("{} | {}", self.state.overlay_text(), reading);
        debug!("{}", overlay);
        if let Err(e) = self.display.show(&frame, &overlay) {
            warn!("Display failed: {}", e);
        }
        self.stats.timings.record(timer);

        self.last_reading = Some(reading);
        self.stats.frames_processed += 1;

        let timer = Timer::start("poll");
        let command = self.commands.poll_command(self.config.poll_timeout);
        self.stats.timings.record(timer);

        if let Some(command) = command {
            debug!(?command, "Command received");
            if self.state.apply(command, self.config.white_balance_step) == Flow::Quit {
                info!("Quit requested");
                return Ok(Flow::Quit);
            }
        }

        if let Some(max) = self.config.max_frames {
            if self.stats.frames_processed >= max {
                info!(frames = max, "Frame limit reached");
                return Ok(Flow::Quit);
            }
        }

        Ok(Flow::Continue)
    }

    /// Loops until quit, the frame limit, or too many capture failures.
    #[instrument(skip(self))]
    pub fn run(&mut self) -> Result<()> {
        info!("Starting control loop");
        let result = loop {
            match self.step() {
                Ok(Flow::Continue) => continue,
                Ok(Flow::Quit) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.stats.log_summary();
        result
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn writer(&self) -> &DebouncedWriter<S> {
        &self.writer
    }

    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    pub fn last_reading(&self) -> Option<&MetricReading> {
        self.last_reading.as_ref()
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }
}
