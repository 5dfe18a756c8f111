use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use camtune::camera_control::{
    ColorTemperatureModel, CommandSource, ControlConfig, ControlLoop, DeviceSettings, DisplaySink,
    DryRunSink, HeadlessDisplay, Mode, NoCommands, SettingsSink, V4l2Ctl, V4lCapture, V4lControls,
    open_preview, read_initial_settings,
};
use camtune::logger;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// Shell out to v4l2-ctl for every write
    V4l2Ctl,
    /// Set V4L2 controls directly on the device node
    V4l,
}

/// Live white-balance tracking with manual brightness/contrast/saturation control.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Video device to capture from and control
    #[arg(short, long, default_value = "/dev/video0")]
    device: String,

    /// Requested capture width
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Requested capture height
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Fraction of the white-balance gap closed per frame, in (0, 1]
    #[arg(long, default_value_t = 0.05)]
    step: f64,

    /// Kelvin change per manual white-balance key press
    #[arg(long, default_value_t = 100)]
    wb_step: i32,

    /// How settings are written to the camera
    #[arg(long, value_enum, default_value_t = Backend::V4l2Ctl)]
    backend: Backend,

    /// Path to the v4l2-ctl executable
    #[arg(long, default_value = "v4l2-ctl")]
    v4l2_ctl: PathBuf,

    /// Use the linear 10000·R/B color temperature estimate
    #[arg(long)]
    linear_cct: bool,

    /// Start with white balance under manual control
    #[arg(long)]
    manual: bool,

    /// Log settings instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Run without a preview window (no keyboard control)
    #[arg(long)]
    headless: bool,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Consecutive capture failures tolerated before exiting
    #[arg(long, default_value_t = 50)]
    capture_retries: u32,
}

fn open_controls(args: &Args) -> anyhow::Result<(DeviceSettings, Box<dyn SettingsSink>)> {
    let (initial, sink): (DeviceSettings, Box<dyn SettingsSink>) = match args.backend {
        Backend::V4l2Ctl => {
            let mut ctl = V4l2Ctl::with_program(&args.v4l2_ctl, args.device.as_str());
            (read_initial_settings(&mut ctl), Box::new(ctl))
        }
        Backend::V4l => {
            let mut controls = V4lControls::open(&args.device)
                .with_context(|| format!("opening {} for control", args.device))?;
            (read_initial_settings(&mut controls), Box::new(controls))
        }
    };

    if args.dry_run {
        warn!("Dry run: settings will not be written to {}", args.device);
        return Ok((initial, Box::new(DryRunSink)));
    }
    Ok((initial, sink))
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    info!("Starting camtune on {}", args.device);

    let config = ControlConfig::builder()
        .smoothing_step(args.step)
        .white_balance_step(args.wb_step)
        .color_temperature_model(if args.linear_cct {
            ColorTemperatureModel::Linear
        } else {
            ColorTemperatureModel::PowerLaw
        })
        .initial_mode(if args.manual { Mode::Manual } else { Mode::Auto })
        .max_frames(args.frames)
        .capture_retry_limit(args.capture_retries)
        .build();

    let capture = V4lCapture::open(&args.device, args.width, args.height)
        .with_context(|| format!("opening {} for capture", args.device))?;
    let (width, height) = capture.dimensions();

    let (initial, sink) = open_controls(&args)?;
    info!("Initial settings: {}", initial);

    let (display, commands): (Box<dyn DisplaySink>, Box<dyn CommandSource>) = if args.headless {
        (Box::new(HeadlessDisplay), Box::new(NoCommands))
    } else {
        let (display, commands) = open_preview("camtune", width, height)
            .context("opening preview window")?;
        info!("Keys: [t] toggle AWB  [w/s] brightness  [e/d] contrast  [r/f] saturation  [y/h] white balance  [q] quit");
        (Box::new(display), Box::new(commands))
    };

    let mut control = ControlLoop::new(capture, display, commands, sink, initial, config)?;
    control.run().context("control loop failed")?;

    Ok(())
}
