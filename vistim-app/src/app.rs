//! Windowed scheduler: a refresh timer arms a coalesced redraw gate
//! and wakes the event loop; the loop consumes the gate, asks the
//! pattern for a frame and presents it. Pixel data is only ever
//! touched on the event-loop thread.

use anyhow::Result;
use pixels::{Pixels, SurfaceTexture};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use vistim_core::{PatternSpec, ProbeState, StimulusConfig, StimulusError, Tick};
use vistim_render::{build_pattern, Pattern};
use vistim_timing::{IntervalStats, RedrawGate, RefreshDriver};

/// Wake-up sent by the timer thread through the event-loop proxy.
#[derive(Debug)]
pub struct RedrawDue;

/// Run one stimulus until a key press or window close.
pub fn run(config: StimulusConfig) -> Result<(), StimulusError> {
    let pattern = build_pattern(&config)?;

    let event_loop = EventLoop::<RedrawDue>::with_user_event()
        .build()
        .map_err(|e| StimulusError::Resource(format!("event loop: {e}")))?;
    let proxy = event_loop.create_proxy();

    let gate = RedrawGate::new();
    let driver = RefreshDriver::spawn(
        Duration::from_millis(config.refresh_ms),
        gate.clone(),
        move || {
            let _ = proxy.send_event(RedrawDue);
        },
    );

    let probe = match config.pattern {
        PatternSpec::RfProbe { width, height } => Some(ProbeState::new(width, height)),
        _ => None,
    };

    let mut app = App {
        config,
        pattern,
        gate,
        driver: Some(driver),
        window: None,
        pixels: None,
        stats: IntervalStats::new(),
        started: Instant::now(),
        last_present: None,
        probe,
        tick_index: 0,
        failure: None,
    };

    event_loop
        .run_app(&mut app)
        .map_err(|e| StimulusError::Resource(format!("event loop: {e}")))?;
    app.finish()
}

struct App {
    config: StimulusConfig,
    pattern: Box<dyn Pattern>,
    gate: RedrawGate,
    driver: Option<RefreshDriver>,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    stats: IntervalStats,
    started: Instant,
    last_present: Option<Instant>,
    probe: Option<ProbeState>,
    tick_index: u64,
    failure: Option<StimulusError>,
}

impl App {
    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let mut attributes = Window::default_attributes()
            .with_title(format!("vistim {}", self.config.pattern.name()))
            .with_resizable(false);
        attributes = if self.config.fullscreen {
            let monitor = event_loop
                .primary_monitor()
                .or_else(|| event_loop.available_monitors().next());
            attributes.with_fullscreen(Some(Fullscreen::Borderless(monitor)))
        } else {
            attributes.with_inner_size(LogicalSize::new(self.config.width, self.config.height))
        };

        let window = Arc::new(event_loop.create_window(attributes)?);
        let surface_size = window.inner_size();

        log::info!(
            "{}: {}x{} canvas on {}x{} surface, {} ms refresh, {} Hz",
            self.config.pattern.name(),
            self.config.width,
            self.config.height,
            surface_size.width,
            surface_size.height,
            self.config.refresh_ms,
            self.config.frequency_hz,
        );
        if self.config.hints.software || self.config.hints.hardware || self.config.hints.hw_palette
        {
            log::info!("surface hints are accepted but the backend negotiates its own mode");
        }
        if self.config.bpp != 32 {
            log::info!("requested {} bpp, rendering at 32 bpp RGBA", self.config.bpp);
        }

        let surface = SurfaceTexture::new(surface_size.width, surface_size.height, window.clone());
        self.pixels = Some(Pixels::new(self.config.width, self.config.height, surface)?);

        window.set_cursor_visible(false);
        self.window = Some(window);

        // Present the first frame without waiting a full refresh.
        self.started = Instant::now();
        if self.gate.arm() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        Ok(())
    }

    /// One tick: consume the gate, render, present. A wake-up with
    /// nothing pending (already handled via another path) is a no-op.
    fn present(&mut self, event_loop: &ActiveEventLoop) {
        if !self.gate.consume() {
            return;
        }
        let Some(pixels) = self.pixels.as_mut() else {
            return;
        };

        let now = Instant::now();
        if let Some(last) = self.last_present.replace(now) {
            self.stats.record(now - last);
        }

        let tick = Tick {
            index: self.tick_index,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            probe: self.probe,
        };
        self.tick_index += 1;

        let frame = self.pattern.frame_for(&tick);
        let outcome = frame.copy_to(pixels.frame_mut()).and_then(|()| {
            pixels
                .render()
                .map_err(|e| StimulusError::Resource(format!("present: {e}")))
        });
        if let Err(err) = outcome {
            self.failure = Some(err);
            self.quit(event_loop);
        }
    }

    fn pointer_moved(&mut self, position: PhysicalPosition<f64>) {
        if !self.pattern.tracks_pointer() {
            return;
        }
        let (Some(pixels), Some(probe)) = (self.pixels.as_ref(), self.probe.as_mut()) else {
            return;
        };
        if let Ok((x, y)) = pixels.window_pos_to_pixel((position.x as f32, position.y as f32)) {
            probe.move_to(x as f64, y as f64, self.config.width, self.config.height);
            // One extra redraw, coalesced through the same gate as the
            // timer so motion can never queue a backlog.
            if self.gate.arm() {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
        }
    }

    fn key_pressed(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        // Alt and Tab pass through for window-manager chords; any
        // other key ends the run.
        if let PhysicalKey::Code(KeyCode::AltLeft | KeyCode::AltRight | KeyCode::Tab) = key {
            return;
        }
        self.quit(event_loop);
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        if let Some(mut driver) = self.driver.take() {
            driver.stop();
        }
        event_loop.exit();
    }

    /// Tear down and report, after the event loop has returned.
    fn finish(mut self) -> Result<(), StimulusError> {
        if let Some(mut driver) = self.driver.take() {
            driver.stop();
        }
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        if self.pattern.reports_interval() && !self.stats.is_empty() {
            let report = self.stats.report();
            println!(
                "mean display interval: {:.3} ms ({:.1} Hz effective over {} frames)",
                report.mean_ms, report.effective_hz, report.samples
            );
            log::debug!(
                "interval spread: min {:.3} ms, max {:.3} ms, jitter {:.3} ms",
                report.min_ms,
                report.max_ms,
                report.jitter_ms
            );
        }
        Ok(())
    }
}

impl ApplicationHandler<RedrawDue> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.failure = Some(StimulusError::Resource(format!("{e:#}")));
                self.quit(event_loop);
            }
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, _due: RedrawDue) {
        self.present(event_loop);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.quit(event_loop),
            WindowEvent::RedrawRequested => self.present(event_loop),
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.key_pressed(event.physical_key, event_loop);
            }
            WindowEvent::CursorMoved { position, .. } => self.pointer_moved(position),
            WindowEvent::Resized(size) => {
                if let Some(pixels) = &mut self.pixels {
                    if let Err(e) = pixels.resize_surface(size.width, size.height) {
                        log::warn!("surface resize failed: {e}");
                    }
                }
            }
            _ => {}
        }
    }
}
