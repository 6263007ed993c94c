/// Pointer-driven probe rectangle (RF-mapping stimulus only). Owned by
/// the input gate, snapshotted into every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeState {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ProbeState {
    pub fn new(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    /// Move the probe, clamped so the rectangle stays on the canvas.
    /// Motion events should already be in bounds; clamp anyway.
    pub fn move_to(&mut self, x: f64, y: f64, canvas_w: u32, canvas_h: u32) {
        let max_x = canvas_w.saturating_sub(self.width);
        let max_y = canvas_h.saturating_sub(self.height);
        self.x = (x.max(0.0) as u32).min(max_x);
        self.y = (y.max(0.0) as u32).min(max_y);
    }
}

/// One firing of the refresh timer, as seen by a pattern.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Monotonically increasing tick counter, never reset mid-run.
    pub index: u64,
    /// Wall-clock ms since the scheduler started.
    pub elapsed_ms: u64,
    /// Probe snapshot, present for the pointer-tracking stimulus.
    pub probe: Option<ProbeState>,
}
