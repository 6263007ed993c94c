use crate::error::StimulusError;

/// Backend hints accepted on the command line. The wgpu-backed surface
/// negotiates its own backend, so these only get logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceHints {
    pub software: bool,
    pub hardware: bool,
    pub hw_palette: bool,
}

/// Per-stimulus geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatternSpec {
    Checkerboard { square: u32 },
    HermanGrid { square: u32, gap: u32 },
    Grating { sine_width: f64, bar: bool },
    MovingBar { length: u32, angle_deg: f64 },
    MachBands { bands: u32 },
    RfProbe { width: u32, height: u32 },
}

impl PatternSpec {
    pub fn name(&self) -> &'static str {
        match self {
            PatternSpec::Checkerboard { .. } => "checkerboard",
            PatternSpec::HermanGrid { .. } => "grid",
            PatternSpec::Grating { bar: false, .. } => "grating",
            PatternSpec::Grating { bar: true, .. } => "grating-bar",
            PatternSpec::MovingBar { .. } => "bar",
            PatternSpec::MachBands { .. } => "machbands",
            PatternSpec::RfProbe { .. } => "probe",
        }
    }
}

/// Immutable run configuration. Built once from the CLI, validated,
/// then shared read-only with every component.
#[derive(Debug, Clone)]
pub struct StimulusConfig {
    pub width: u32,
    pub height: u32,
    /// Pixel depth hint from the CLI; the surface is always RGBA8.
    pub bpp: u32,
    pub refresh_ms: u64,
    pub frequency_hz: f64,
    pub foreground: u8,
    pub background: u8,
    pub fullscreen: bool,
    pub hints: SurfaceHints,
    pub pattern: PatternSpec,
}

impl StimulusConfig {
    pub fn validate(&self) -> Result<(), StimulusError> {
        if self.width == 0 || self.height == 0 {
            return Err(StimulusError::Config(format!(
                "canvas must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.bpp == 0 {
            return Err(StimulusError::Config("pixel depth must be > 0".into()));
        }
        if self.refresh_ms == 0 {
            return Err(StimulusError::Config("refresh interval must be > 0 ms".into()));
        }
        if !self.frequency_hz.is_finite() || self.frequency_hz < 0.0 {
            return Err(StimulusError::Config(format!(
                "frequency must be finite and non-negative, got {}",
                self.frequency_hz
            )));
        }
        // Frequency 0 means a steady, never-blanked probe; every other
        // stimulus needs a positive temporal frequency.
        if self.frequency_hz == 0.0 && !matches!(self.pattern, PatternSpec::RfProbe { .. }) {
            return Err(StimulusError::Config(
                "frequency must be > 0 Hz for this stimulus".into(),
            ));
        }
        self.validate_geometry()
    }

    fn validate_geometry(&self) -> Result<(), StimulusError> {
        let bad = |what: &str| Err(StimulusError::Config(format!("{what} must be > 0")));
        match self.pattern {
            PatternSpec::Checkerboard { square } if square == 0 => bad("square size"),
            PatternSpec::HermanGrid { square, .. } if square == 0 => bad("square size"),
            PatternSpec::HermanGrid { gap, .. } if gap == 0 => bad("gap size"),
            PatternSpec::Grating { sine_width, .. } if !(sine_width > 0.0) => {
                bad("sine width")
            }
            PatternSpec::MovingBar { length, angle_deg } => {
                if length == 0 {
                    return bad("stimulus length");
                }
                if !angle_deg.is_finite() {
                    return Err(StimulusError::Config("angle must be finite".into()));
                }
                Ok(())
            }
            PatternSpec::MachBands { bands } if bands < 2 => Err(StimulusError::Config(
                "band count must be >= 2 (the intensity step divides by bands - 1)".into(),
            )),
            PatternSpec::RfProbe { width, height } if width == 0 || height == 0 => {
                bad("probe size")
            }
            _ => Ok(()),
        }
    }

    /// Flip foreground/background intensities (the `--invert` flag).
    pub fn invert_colors(&mut self) {
        std::mem::swap(&mut self.foreground, &mut self.background);
    }
}
