//! Command-line surface. Each stimulus is a subcommand carrying the
//! shared display flags plus its own geometry; defaults follow the
//! classic per-stimulus values.

use clap::{Args, Parser, Subcommand};
use vistim_core::{PatternSpec, StimulusConfig, SurfaceHints};

#[derive(Debug, Parser)]
#[command(
    name = "vistim",
    version,
    about = "Periodic visual stimulus presenter for physiological recording"
)]
pub struct Cli {
    #[command(subcommand)]
    pub stimulus: Stimulus,
}

/// Flags shared by every stimulus. Canvas size and frequency default
/// per-stimulus, so they stay optional here.
#[derive(Debug, Args)]
pub struct DisplayArgs {
    /// Canvas width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Requested pixel depth. The surface is always RGBA8; this is
    /// logged for parity with older rigs.
    #[arg(long, default_value_t = 32)]
    pub bpp: u32,

    /// Temporal frequency in Hz.
    #[arg(long)]
    pub freq: Option<f64>,

    /// Refresh timer interval in ms (overrides the stimulus default).
    #[arg(long)]
    pub refresh: Option<u64>,

    /// Swap foreground and background intensities.
    #[arg(long)]
    pub invert: bool,

    /// Run in a window instead of fullscreen.
    #[arg(long)]
    pub window: bool,

    /// Prefer a software surface (hint only).
    #[arg(long)]
    pub sw: bool,

    /// Prefer a hardware surface (hint only).
    #[arg(long)]
    pub hw: bool,

    /// Request a hardware palette (hint only).
    #[arg(long)]
    pub hwpalette: bool,
}

#[derive(Debug, Subcommand)]
pub enum Stimulus {
    /// Full-field checkerboard flashing at the given frequency.
    Checkerboard {
        #[command(flatten)]
        display: DisplayArgs,
        /// Checker square edge in pixels.
        #[arg(long, default_value_t = 20)]
        sqsize: u32,
    },

    /// Flashing Herman grid of gapped squares.
    Grid {
        #[command(flatten)]
        display: DisplayArgs,
        /// Square edge in pixels.
        #[arg(long, default_value_t = 30)]
        sqsize: u32,
        /// Gap between squares in pixels.
        #[arg(long, default_value_t = 10)]
        gapsize: u32,
    },

    /// Horizontally drifting sine (or bar) grating.
    Grating {
        #[command(flatten)]
        display: DisplayArgs,
        /// Spatial period of the grating in pixels.
        #[arg(long, default_value_t = 50.0)]
        swidth: f64,
        /// Single-pixel bar grating instead of a sine profile.
        #[arg(long)]
        bar: bool,
    },

    /// Bar sweeping across the canvas at a fixed angle.
    Bar {
        #[command(flatten)]
        display: DisplayArgs,
        /// Bar half-length in pixels.
        #[arg(long, default_value_t = 20)]
        length: u32,
        /// Motion direction in degrees.
        #[arg(long, default_value_t = 0.0)]
        angle: f64,
    },

    /// Drifting Mach-band luminance staircase.
    Machbands {
        #[command(flatten)]
        display: DisplayArgs,
        /// Number of intensity plateaus.
        #[arg(long, default_value_t = 3)]
        num: u32,
    },

    /// Pointer-tracking receptive-field probe.
    Probe {
        #[command(flatten)]
        display: DisplayArgs,
        /// Probe diameter: sets both spot dimensions at once.
        #[arg(long, default_value_t = 20)]
        diam: u32,
        /// Probe rectangle width in pixels (overrides --diam).
        #[arg(long = "spot-width")]
        spot_width: Option<u32>,
        /// Probe rectangle height in pixels (overrides --diam).
        #[arg(long = "spot-height")]
        spot_height: Option<u32>,
    },
}

struct Defaults {
    width: u32,
    height: u32,
    freq: f64,
    /// None: derive the timer interval from the flash period.
    refresh_ms: Option<u64>,
}

impl Cli {
    pub fn into_config(self) -> StimulusConfig {
        let (display, pattern, defaults) = match self.stimulus {
            Stimulus::Checkerboard { display, sqsize } => (
                display,
                PatternSpec::Checkerboard { square: sqsize },
                Defaults { width: 640, height: 480, freq: 1.0, refresh_ms: None },
            ),
            Stimulus::Grid { display, sqsize, gapsize } => (
                display,
                PatternSpec::HermanGrid { square: sqsize, gap: gapsize },
                Defaults { width: 640, height: 480, freq: 1.0, refresh_ms: None },
            ),
            Stimulus::Grating { display, swidth, bar } => (
                display,
                PatternSpec::Grating { sine_width: swidth, bar },
                Defaults { width: 200, height: 200, freq: 1.0, refresh_ms: Some(100) },
            ),
            Stimulus::Bar { display, length, angle } => (
                display,
                PatternSpec::MovingBar { length, angle_deg: angle },
                Defaults { width: 200, height: 200, freq: 1.0, refresh_ms: Some(50) },
            ),
            Stimulus::Machbands { display, num } => (
                display,
                PatternSpec::MachBands { bands: num },
                Defaults { width: 300, height: 200, freq: 0.5, refresh_ms: Some(50) },
            ),
            Stimulus::Probe { display, diam, spot_width, spot_height } => (
                display,
                PatternSpec::RfProbe {
                    width: spot_width.unwrap_or(diam),
                    height: spot_height.unwrap_or(diam),
                },
                Defaults { width: 640, height: 480, freq: 0.0, refresh_ms: Some(30) },
            ),
        };

        let frequency_hz = display.freq.unwrap_or(defaults.freq);
        // Flash-only stimuli tick once per half flash period; the timer
        // interval is tied to the frequency unless overridden.
        let refresh_ms = display
            .refresh
            .or(defaults.refresh_ms)
            .unwrap_or_else(|| derived_refresh_ms(frequency_hz));

        let mut config = StimulusConfig {
            width: display.width.unwrap_or(defaults.width),
            height: display.height.unwrap_or(defaults.height),
            bpp: display.bpp,
            refresh_ms,
            frequency_hz,
            foreground: 255,
            background: 0,
            fullscreen: !display.window,
            hints: SurfaceHints {
                software: display.sw,
                hardware: display.hw,
                hw_palette: display.hwpalette,
            },
            pattern,
        };
        if display.invert {
            config.invert_colors();
        }
        config
    }
}

fn derived_refresh_ms(frequency_hz: f64) -> u64 {
    let ms = 1000.0 / frequency_hz;
    if ms.is_finite() && ms >= 1.0 {
        ms as u64
    } else {
        1
    }
}
