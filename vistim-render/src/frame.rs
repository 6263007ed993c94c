use bytemuck::cast_slice_mut;
use tiny_skia::{Color, Paint, Pixmap, PremultipliedColorU8, Rect, Transform};
use vistim_core::StimulusError;

fn gray(v: u8) -> Color {
    Color::from_rgba8(v, v, v, 255)
}

/// Packed opaque gray pixel in the pixmap's RGBA byte order.
#[inline]
fn pack_gray(v: u8) -> u32 {
    u32::from_le_bytes([v, v, v, 255])
}

/// A full-resolution pixel buffer owned by a stimulus pattern.
///
/// All pixels are opaque grayscale, so the premultiplied pixmap data
/// can be copied byte-for-byte into the display surface's RGBA8 frame.
pub struct FrameBuffer {
    pixmap: Pixmap,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, fill: u8) -> Result<Self, StimulusError> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            StimulusError::Resource(format!("cannot allocate a {width}x{height} frame buffer"))
        })?;
        pixmap.fill(gray(fill));
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn fill(&mut self, v: u8) {
        self.pixmap.fill(gray(v));
    }

    /// Fill a rectangle, clipped to the canvas. Degenerate rectangles
    /// are ignored.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, v: u8) {
        let Some(rect) = Rect::from_xywh(x as f32, y as f32, w as f32, h as f32) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(gray(v));
        paint.anti_alias = false;
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Bounds-checked single-pixel write.
    pub fn set_pixel(&mut self, x: u32, y: u32, v: u8) {
        if x >= self.width() || y >= self.height() {
            return;
        }
        let idx = (y * self.width() + x) as usize;
        self.pixmap.pixels_mut()[idx] = PremultipliedColorU8::from_rgba(v, v, v, 255).unwrap();
    }

    /// Gray intensity at (x, y), None when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        self.pixmap.pixel(x, y).map(|p| p.red())
    }

    /// Copy one precomputed scanline into every row, starting at a
    /// wrapped source offset. This is the scrolling patterns' whole
    /// per-tick workload.
    pub fn fill_rows(&mut self, row: &PatternRow, offset_px: usize) {
        let w = self.width() as usize;
        let offset = offset_px % row.period_px();
        let src = row.window(offset, w);
        let dst: &mut [u32] = cast_slice_mut(self.pixmap.data_mut());
        for chunk in dst.chunks_exact_mut(w) {
            chunk.copy_from_slice(src);
        }
    }

    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Blit into the display surface's locked pixel view.
    pub fn copy_to(&self, frame: &mut [u8]) -> Result<(), StimulusError> {
        let data = self.pixmap.data();
        if frame.len() != data.len() {
            return Err(StimulusError::Resource(format!(
                "surface frame is {} bytes, expected {}",
                frame.len(),
                data.len()
            )));
        }
        frame.copy_from_slice(data);
        Ok(())
    }
}

/// One spatial period of a scrolling pattern, pre-expanded to packed
/// RGBA pixels and replicated to `period + width` entries so a
/// modulo-indexed row copy never reads past the end.
pub struct PatternRow {
    period_px: usize,
    pixels: Vec<u32>,
}

impl PatternRow {
    /// Build from an intensity function over one period.
    pub fn from_fn<F>(period_px: usize, width: usize, intensity: F) -> Self
    where
        F: Fn(usize) -> u8,
    {
        let period_px = period_px.max(1);
        let pixels = (0..period_px + width)
            .map(|i| pack_gray(intensity(i % period_px)))
            .collect();
        Self { period_px, pixels }
    }

    pub fn period_px(&self) -> usize {
        self.period_px
    }

    /// Intensity at a (wrapping) pixel index.
    pub fn intensity_at(&self, i: usize) -> u8 {
        (self.pixels[i % self.period_px] & 0xff) as u8
    }

    fn window(&self, offset: usize, width: usize) -> &[u32] {
        &self.pixels[offset..offset + width]
    }
}
