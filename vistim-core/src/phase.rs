//! Phase accumulators: the integer counters that decide which
//! precomputed frame (or pixel offset) a tick shows.

/// Parity of a wall-clock-driven flashing stimulus.
///
/// Derived from elapsed time rather than the tick count so a missed
/// timer tick self-corrects instead of drifting.
#[derive(Debug, Clone, Copy)]
pub struct FlashPhase {
    period_ms: f64,
}

impl FlashPhase {
    /// Buffer swap every `1000 / frequency` ms.
    pub fn new(frequency_hz: f64) -> Self {
        Self::with_period_ms(1000.0 / frequency_hz)
    }

    /// Explicit period. The RF probe toggles every `500 / frequency` ms,
    /// twice the rate of the other flashing stimuli.
    pub fn with_period_ms(period_ms: f64) -> Self {
        Self { period_ms }
    }

    /// 0 or 1 for the given elapsed wall-clock time. A non-finite or
    /// non-positive period (frequency 0) pins the phase to 0.
    pub fn index(&self, elapsed_ms: u64) -> usize {
        if !self.period_ms.is_finite() || self.period_ms <= 0.0 {
            return 0;
        }
        ((elapsed_ms as f64 / self.period_ms) as u64 % 2) as usize
    }
}

/// Continuous scroll offset: a cycle counter advanced by a fixed shift
/// per tick, reduced modulo the pattern period in pixels.
///
/// The two shift derivations below are not numerically identical and
/// are kept per-stimulus on purpose; unifying them would change the
/// observed motion speed.
#[derive(Debug, Clone)]
pub struct ScrollPhase {
    cycle: usize,
    shift: usize,
    period: usize,
}

impl ScrollPhase {
    /// Grating derivation: `ceil(sine_width * f / (1000 / refresh))`.
    pub fn grating(sine_width: f64, frequency_hz: f64, refresh_ms: u64) -> Self {
        let shift = (sine_width * frequency_hz / (1000.0 / refresh_ms as f64)).ceil();
        let period = (sine_width as usize).max(1);
        Self::with(shift, period)
    }

    /// Mach-band derivation: `floor(f * refresh * width / 1000)`.
    pub fn bands(width: u32, frequency_hz: f64, refresh_ms: u64) -> Self {
        let shift = (frequency_hz * refresh_ms as f64 * width as f64 / 1000.0).floor();
        Self::with(shift, (width as usize).max(1))
    }

    fn with(shift: f64, period: usize) -> Self {
        // Clamp so extreme frequencies never stall the motion.
        let shift = if shift.is_finite() && shift >= 1.0 {
            shift as usize
        } else {
            1
        };
        Self { cycle: 0, shift, period }
    }

    /// Current source offset in pixels, always `< period`.
    pub fn offset(&self) -> usize {
        self.cycle
    }

    pub fn shift_per_tick(&self) -> usize {
        self.shift
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn advance(&mut self) {
        self.cycle = (self.cycle + self.shift) % self.period;
    }
}

/// Sweep position of the moving bar: `nsteps` positions per cycle,
/// centered so the bar crosses the canvas midpoint.
#[derive(Debug, Clone)]
pub struct BarSweep {
    nsteps: u64,
    step: i64,
    t: u64,
}

impl BarSweep {
    pub fn new(width: u32, frequency_hz: f64, refresh_ms: u64) -> Self {
        let nsteps = 1000.0 / (refresh_ms as f64 * frequency_hz);
        let nsteps = if nsteps.is_finite() && nsteps >= 1.0 {
            nsteps.ceil() as u64
        } else {
            1
        };
        let step = (u64::from(width) / nsteps).max(1) as i64;
        Self { nsteps, step, t: 0 }
    }

    pub fn steps_per_cycle(&self) -> u64 {
        self.nsteps
    }

    pub fn step(&self) -> i64 {
        self.step
    }

    /// Advance one tick and return the signed offset from the canvas
    /// center along the motion axis. The counter increments before the
    /// position is evaluated, so the first visible position is one
    /// step past the sweep's left edge.
    pub fn advance(&mut self) -> i64 {
        self.t = self.t.wrapping_add(1);
        (self.t % self.nsteps) as i64 * self.step - self.step * self.nsteps as i64 / 2
    }
}
