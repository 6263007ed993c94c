//! The stimulus generators. Precomputed patterns build their frame
//! buffers once at construction; the moving bar and the RF probe draw
//! into a persistent scratch frame each tick.

use std::f64::consts::TAU;

use vistim_core::{
    BarSweep, FlashPhase, PatternSpec, ProbeState, ScrollPhase, StimulusConfig, StimulusError,
    Tick,
};

use crate::frame::{FrameBuffer, PatternRow};

/// One stimulus: render the frame for a tick and hand back the buffer
/// to present.
pub trait Pattern {
    fn frame_for(&mut self, tick: &Tick) -> &FrameBuffer;

    /// Pointer motion should trigger an extra redraw for this stimulus.
    fn tracks_pointer(&self) -> bool {
        false
    }

    /// Print the mean display interval at shutdown (diagnostic
    /// stimuli: grating, moving bar, Mach bands).
    fn reports_interval(&self) -> bool {
        false
    }
}

/// Build the pattern named by the configuration.
pub fn build_pattern(config: &StimulusConfig) -> Result<Box<dyn Pattern>, StimulusError> {
    Ok(match config.pattern {
        PatternSpec::Checkerboard { square } => Box::new(Checkerboard::new(config, square)?),
        PatternSpec::HermanGrid { square, gap } => {
            Box::new(HermanGrid::new(config, square, gap)?)
        }
        PatternSpec::Grating { sine_width, bar } => {
            Box::new(Grating::new(config, sine_width, bar)?)
        }
        PatternSpec::MovingBar { length, angle_deg } => {
            Box::new(MovingBar::new(config, length, angle_deg)?)
        }
        PatternSpec::MachBands { bands } => Box::new(MachBands::new(config, bands)?),
        PatternSpec::RfProbe { width, height } => Box::new(RfProbe::new(config, width, height)?),
    })
}

/// Flashing checkerboard: two precomputed frames of opposite cell
/// parity, selected by wall-clock flash phase.
pub struct Checkerboard {
    frames: [FrameBuffer; 2],
    flash: FlashPhase,
}

impl Checkerboard {
    pub fn new(config: &StimulusConfig, square: u32) -> Result<Self, StimulusError> {
        let frames = [
            Self::tiles(config, square, 0)?,
            Self::tiles(config, square, 1)?,
        ];
        Ok(Self {
            frames,
            flash: FlashPhase::new(config.frequency_hz),
        })
    }

    /// Cell (i, j) is foreground when (i + j + parity) is even. Cells
    /// tile the whole canvas, partial edge cells included, so the two
    /// parities are exact cell-by-cell inverses.
    fn tiles(config: &StimulusConfig, square: u32, parity: u32) -> Result<FrameBuffer, StimulusError> {
        let mut frame = FrameBuffer::new(config.width, config.height, config.background)?;
        let cells_x = config.width.div_ceil(square);
        let cells_y = config.height.div_ceil(square);
        for i in 0..cells_y {
            for j in 0..cells_x {
                if (i + j + parity) % 2 == 0 {
                    frame.fill_rect(
                        (j * square) as i32,
                        (i * square) as i32,
                        square,
                        square,
                        config.foreground,
                    );
                }
            }
        }
        Ok(frame)
    }
}

impl Pattern for Checkerboard {
    fn frame_for(&mut self, tick: &Tick) -> &FrameBuffer {
        &self.frames[self.flash.index(tick.elapsed_ms)]
    }
}

/// Flashing Herman grid: a grid of gapped foreground squares stamped
/// once, alternated with a background-only frame.
pub struct HermanGrid {
    lit: FrameBuffer,
    blank: FrameBuffer,
    flash: FlashPhase,
}

impl HermanGrid {
    pub fn new(config: &StimulusConfig, square: u32, gap: u32) -> Result<Self, StimulusError> {
        let mut lit = FrameBuffer::new(config.width, config.height, config.background)?;
        let pitch = square + gap;
        for i in 0..config.height / pitch {
            for j in 0..config.width / pitch {
                lit.fill_rect(
                    (j * pitch + gap / 2) as i32,
                    (i * pitch + gap / 2) as i32,
                    square,
                    square,
                    config.foreground,
                );
            }
        }
        Ok(Self {
            lit,
            blank: FrameBuffer::new(config.width, config.height, config.background)?,
            flash: FlashPhase::new(config.frequency_hz),
        })
    }
}

impl Pattern for HermanGrid {
    fn frame_for(&mut self, tick: &Tick) -> &FrameBuffer {
        if self.flash.index(tick.elapsed_ms) == 0 {
            &self.lit
        } else {
            &self.blank
        }
    }
}

/// Moving sine or bar grating: one precomputed spatial period scrolled
/// by a fixed pixel shift per tick.
pub struct Grating {
    row: PatternRow,
    scroll: ScrollPhase,
    scratch: FrameBuffer,
}

impl Grating {
    pub fn new(config: &StimulusConfig, sine_width: f64, bar: bool) -> Result<Self, StimulusError> {
        let period = (sine_width as usize).max(1);
        let width = config.width as usize;
        let row = if bar {
            // One foreground line per period.
            PatternRow::from_fn(period, width, |i| if i % period == 0 { 255 } else { 0 })
        } else {
            PatternRow::from_fn(period, width, |i| {
                (255.0 * ((i as f64 / sine_width * TAU).sin() + 1.0) / 2.0).round() as u8
            })
        };
        Ok(Self {
            row,
            scroll: ScrollPhase::grating(sine_width, config.frequency_hz, config.refresh_ms),
            scratch: FrameBuffer::new(config.width, config.height, 0)?,
        })
    }

    pub fn row(&self) -> &PatternRow {
        &self.row
    }
}

impl Pattern for Grating {
    fn frame_for(&mut self, _tick: &Tick) -> &FrameBuffer {
        self.scratch.fill_rows(&self.row, self.scroll.offset());
        self.scroll.advance();
        &self.scratch
    }

    fn reports_interval(&self) -> bool {
        true
    }
}

/// Moving Mach bands: a stepped luminance ramp across the canvas
/// width, scrolled by the band shift derivation.
pub struct MachBands {
    row: PatternRow,
    scroll: ScrollPhase,
    scratch: FrameBuffer,
}

impl MachBands {
    pub fn new(config: &StimulusConfig, bands: u32) -> Result<Self, StimulusError> {
        let width = config.width as usize;
        let band_width = (width / bands as usize).max(1);
        let top = bands as usize - 1;
        let row = PatternRow::from_fn(width, width, move |i| {
            // Clamp the band index so widths not divisible by the band
            // count cannot push the intensity past full scale.
            let k = (i / band_width).min(top);
            (k * 255 / top) as u8
        });
        Ok(Self {
            row,
            scroll: ScrollPhase::bands(config.width, config.frequency_hz, config.refresh_ms),
            scratch: FrameBuffer::new(config.width, config.height, 0)?,
        })
    }

    pub fn row(&self) -> &PatternRow {
        &self.row
    }
}

impl Pattern for MachBands {
    fn frame_for(&mut self, _tick: &Tick) -> &FrameBuffer {
        self.scratch.fill_rows(&self.row, self.scroll.offset());
        self.scroll.advance();
        &self.scratch
    }

    fn reports_interval(&self) -> bool {
        true
    }
}

/// Moving rotatable bar: recomputed per tick because the bar is a
/// rotated line segment, not a translated column.
pub struct MovingBar {
    sweep: BarSweep,
    angle_rad: f64,
    length: i64,
    foreground: u8,
    background: u8,
    scratch: FrameBuffer,
}

impl MovingBar {
    pub fn new(config: &StimulusConfig, length: u32, angle_deg: f64) -> Result<Self, StimulusError> {
        Ok(Self {
            sweep: BarSweep::new(config.width, config.frequency_hz, config.refresh_ms),
            angle_rad: angle_deg / 180.0 * std::f64::consts::PI,
            length: i64::from(length),
            foreground: config.foreground,
            background: config.background,
            scratch: FrameBuffer::new(config.width, config.height, config.background)?,
        })
    }
}

impl Pattern for MovingBar {
    fn frame_for(&mut self, _tick: &Tick) -> &FrameBuffer {
        let d = self.sweep.advance() as f64;
        let w = self.scratch.width();
        let h = self.scratch.height();
        self.scratch.fill(self.background);

        let (sin, cos) = self.angle_rad.sin_cos();
        let xt = cos * d + f64::from(w) / 2.0;
        let yt = sin * d + f64::from(h) / 2.0;
        // A line of 2*length+1 pixels perpendicular to the motion axis.
        for p in -self.length..=self.length {
            let x = (xt - sin * p as f64) as i64;
            let y = (yt + cos * p as f64) as i64;
            if x > 0 && x < i64::from(w) - 1 && y > 0 && y < i64::from(h) - 1 {
                self.scratch.set_pixel(x as u32, y as u32, self.foreground);
            }
        }
        &self.scratch
    }

    fn reports_interval(&self) -> bool {
        true
    }
}

/// Receptive-field probe: a pointer-tracking rectangle drawn directly
/// onto a persistent frame, flashed at half the usual period (or held
/// steady at frequency 0).
pub struct RfProbe {
    scratch: FrameBuffer,
    flash: FlashPhase,
    state: ProbeState,
    foreground: u8,
    background: u8,
}

impl RfProbe {
    pub fn new(config: &StimulusConfig, width: u32, height: u32) -> Result<Self, StimulusError> {
        Ok(Self {
            scratch: FrameBuffer::new(config.width, config.height, config.background)?,
            flash: FlashPhase::with_period_ms(500.0 / config.frequency_hz),
            state: ProbeState::new(width, height),
            foreground: config.foreground,
            background: config.background,
        })
    }

    fn erase(&mut self) {
        self.scratch.fill_rect(
            self.state.x as i32,
            self.state.y as i32,
            self.state.width,
            self.state.height,
            self.background,
        );
    }
}

impl Pattern for RfProbe {
    fn frame_for(&mut self, tick: &Tick) -> &FrameBuffer {
        if let Some(probe) = tick.probe {
            if probe != self.state {
                self.erase();
                self.state = probe;
            }
        }
        let v = if self.flash.index(tick.elapsed_ms) == 0 {
            self.foreground
        } else {
            self.background
        };
        self.scratch.fill_rect(
            self.state.x as i32,
            self.state.y as i32,
            self.state.width,
            self.state.height,
            v,
        );
        &self.scratch
    }

    fn tracks_pointer(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistim_core::SurfaceHints;

    fn config(pattern: PatternSpec, width: u32, height: u32, refresh_ms: u64) -> StimulusConfig {
        StimulusConfig {
            width,
            height,
            bpp: 32,
            refresh_ms,
            frequency_hz: 1.0,
            foreground: 255,
            background: 0,
            fullscreen: true,
            hints: SurfaceHints::default(),
            pattern,
        }
    }

    fn tick(index: u64, elapsed_ms: u64) -> Tick {
        Tick { index, elapsed_ms, probe: None }
    }

    #[test]
    fn checkerboard_buffers_are_inverses() {
        // Both an evenly dividing square and one that leaves partial
        // edge cells.
        for square in [20u32, 23u32] {
            let cfg = config(PatternSpec::Checkerboard { square }, 100, 60, 80);
            let a = Checkerboard::tiles(&cfg, square, 0).unwrap();
            let b = Checkerboard::tiles(&cfg, square, 1).unwrap();
            for y in 0..60 {
                for x in 0..100 {
                    let pa = a.pixel(x, y).unwrap();
                    let pb = b.pixel(x, y).unwrap();
                    assert_eq!(pa, 255 - pb, "square {square} at ({x},{y})");
                }
            }
        }
    }

    #[test]
    fn checkerboard_origin_differs_between_phases() {
        let cfg = config(PatternSpec::Checkerboard { square: 20 }, 640, 480, 80);
        let mut board = Checkerboard::new(&cfg, 20).unwrap();
        let on = board.frame_for(&tick(0, 0)).pixel(0, 0).unwrap();
        // Half a flash period later the other buffer is shown.
        let off = board.frame_for(&tick(1, 1500)).pixel(0, 0).unwrap();
        assert_eq!(on, 255);
        assert_eq!(off, 0);
    }

    #[test]
    fn herman_grid_squares_sit_inside_gaps() {
        let cfg = config(PatternSpec::HermanGrid { square: 30, gap: 10 }, 640, 480, 80);
        let mut grid = HermanGrid::new(&cfg, 30, 10).unwrap();
        let lit = grid.frame_for(&tick(0, 0));
        // First square spans [gap/2, gap/2 + square).
        assert_eq!(lit.pixel(5, 5), Some(255));
        assert_eq!(lit.pixel(34, 34), Some(255));
        assert_eq!(lit.pixel(35, 35), Some(0));
        assert_eq!(lit.pixel(0, 0), Some(0));
        // Off phase is background only.
        let blank = grid.frame_for(&tick(1, 1500));
        assert_eq!(blank.pixel(5, 5), Some(0));
    }

    #[test]
    fn grating_row_is_periodic() {
        let cfg = config(
            PatternSpec::Grating { sine_width: 50.0, bar: false },
            200,
            200,
            100,
        );
        let grating = Grating::new(&cfg, 50.0, false).unwrap();
        assert_eq!(grating.row().intensity_at(0), grating.row().intensity_at(50));
        assert_eq!(grating.row().intensity_at(13), grating.row().intensity_at(63));
        // Zero crossing is mid-gray, the quarter-period peak is near
        // full white.
        assert_eq!(grating.row().intensity_at(0), 128);
        assert!(grating.row().intensity_at(12) >= 250);
    }

    #[test]
    fn bar_grating_has_one_line_per_period() {
        let cfg = config(
            PatternSpec::Grating { sine_width: 50.0, bar: true },
            200,
            200,
            100,
        );
        let grating = Grating::new(&cfg, 50.0, true).unwrap();
        for i in 0..200 {
            let want = if i % 50 == 0 { 255 } else { 0 };
            assert_eq!(grating.row().intensity_at(i), want, "column {i}");
        }
    }

    #[test]
    fn grating_scrolls_by_shift_per_tick() {
        let cfg = config(
            PatternSpec::Grating { sine_width: 50.0, bar: false },
            200,
            200,
            100,
        );
        let mut grating = Grating::new(&cfg, 50.0, false).unwrap();
        // shift = ceil(50 * 1 / 10) = 5 px per tick.
        let before = grating.frame_for(&tick(0, 0)).pixel(5, 0).unwrap();
        let after = grating.frame_for(&tick(1, 100)).pixel(0, 0).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn mach_row_has_monotone_plateaus_starting_at_zero() {
        let cfg = config(PatternSpec::MachBands { bands: 5 }, 300, 200, 50);
        let bands = MachBands::new(&cfg, 5).unwrap();
        let mut plateaus = vec![bands.row().intensity_at(0)];
        for i in 1..300 {
            let v = bands.row().intensity_at(i);
            let last = *plateaus.last().unwrap();
            assert!(v >= last, "intensity dipped at column {i}");
            if v != last {
                plateaus.push(v);
            }
        }
        assert_eq!(plateaus.len(), 5);
        assert_eq!(plateaus[0], 0);
        assert_eq!(*plateaus.last().unwrap(), 255);
    }

    #[test]
    fn mach_row_clamps_uneven_widths() {
        // 301 / 3 = 100, so column 300 would index band 3 of 3 without
        // the clamp.
        let cfg = config(PatternSpec::MachBands { bands: 3 }, 301, 200, 50);
        let bands = MachBands::new(&cfg, 3).unwrap();
        assert_eq!(bands.row().intensity_at(300), 255);
    }

    #[test]
    fn moving_bar_stamps_stay_in_bounds() {
        for angle in [0.0, 30.0, 45.0, 90.0, 135.0] {
            let cfg = config(
                PatternSpec::MovingBar { length: 60, angle_deg: angle },
                100,
                80,
                50,
            );
            let mut bar = MovingBar::new(&cfg, 60, angle).unwrap();
            for i in 0..50 {
                // set_pixel is bounds-checked; this asserts the stamped
                // pixels land where expected and nothing panics.
                let frame = bar.frame_for(&tick(i, i * 50));
                assert_eq!(frame.width(), 100);
            }
        }
    }

    #[test]
    fn moving_bar_is_perpendicular_to_motion() {
        // Horizontal motion (angle 0) draws a vertical line through
        // (xt, h/2).
        let cfg = config(PatternSpec::MovingBar { length: 10, angle_deg: 0.0 }, 200, 200, 50);
        let mut bar = MovingBar::new(&cfg, 10, 0.0).unwrap();
        let frame = bar.frame_for(&tick(0, 0));
        // t=1: d = 10 - 100 = -90, xt = 10, yt = 100.
        for y in 90..=110 {
            assert_eq!(frame.pixel(10, y), Some(255), "y={y}");
        }
        assert_eq!(frame.pixel(11, 100), Some(0));
    }

    #[test]
    fn probe_tracks_pointer_and_flashes() {
        let mut cfg = config(PatternSpec::RfProbe { width: 20, height: 20 }, 640, 480, 30);
        cfg.frequency_hz = 1.0;
        let mut probe = RfProbe::new(&cfg, 20, 20).unwrap();

        let mut state = ProbeState::new(20, 20);
        state.move_to(100.0, 100.0, 640, 480);
        let t = Tick { index: 0, elapsed_ms: 0, probe: Some(state) };
        assert_eq!(probe.frame_for(&t).pixel(100, 100), Some(255));

        // Half a (500/f) period later the spot blanks.
        let t = Tick { index: 1, elapsed_ms: 600, probe: Some(state) };
        assert_eq!(probe.frame_for(&t).pixel(100, 100), Some(0));

        // Moving the pointer erases the old position.
        state.move_to(300.0, 200.0, 640, 480);
        let t = Tick { index: 2, elapsed_ms: 1000, probe: Some(state) };
        let frame = probe.frame_for(&t);
        assert_eq!(frame.pixel(300, 200), Some(255));
        assert_eq!(frame.pixel(100, 100), Some(0));
    }

    #[test]
    fn steady_probe_at_zero_frequency() {
        let mut cfg = config(PatternSpec::RfProbe { width: 20, height: 20 }, 640, 480, 30);
        cfg.frequency_hz = 0.0;
        let mut probe = RfProbe::new(&cfg, 20, 20).unwrap();
        for ms in [0u64, 123, 4567, 1_000_000] {
            let t = Tick { index: ms, elapsed_ms: ms, probe: None };
            assert_eq!(probe.frame_for(&t).pixel(0, 0), Some(255), "at {ms} ms");
        }
    }

    #[test]
    fn build_dispatches_every_stimulus() {
        let specs = [
            PatternSpec::Checkerboard { square: 20 },
            PatternSpec::HermanGrid { square: 30, gap: 10 },
            PatternSpec::Grating { sine_width: 50.0, bar: false },
            PatternSpec::Grating { sine_width: 50.0, bar: true },
            PatternSpec::MovingBar { length: 20, angle_deg: 0.0 },
            PatternSpec::MachBands { bands: 3 },
            PatternSpec::RfProbe { width: 20, height: 20 },
        ];
        for spec in specs {
            let cfg = config(spec, 64, 48, 50);
            let pattern = build_pattern(&cfg).unwrap();
            assert_eq!(
                pattern.tracks_pointer(),
                matches!(spec, PatternSpec::RfProbe { .. })
            );
        }
    }
}
