use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vistim_core::{PatternSpec, StimulusConfig, SurfaceHints, Tick};
use vistim_render::build_pattern;

fn config(pattern: PatternSpec, width: u32, height: u32) -> StimulusConfig {
    StimulusConfig {
        width,
        height,
        bpp: 32,
        refresh_ms: 50,
        frequency_hz: 1.0,
        foreground: 255,
        background: 0,
        fullscreen: true,
        hints: SurfaceHints::default(),
        pattern,
    }
}

/// Per-tick frame cost of the patterns that redraw every refresh. This
/// is the number that has to stay well under the refresh interval.
pub fn bench_tick(c: &mut Criterion) {
    let mut g = c.benchmark_group("tick");
    g.sample_size(60);

    g.bench_function("grating_1080p", |b| {
        let cfg = config(PatternSpec::Grating { sine_width: 50.0, bar: false }, 1920, 1080);
        let mut pattern = build_pattern(&cfg).unwrap();
        let mut tick = Tick { index: 0, elapsed_ms: 0, probe: None };
        b.iter(|| {
            tick.index += 1;
            tick.elapsed_ms += 50;
            black_box(pattern.frame_for(black_box(&tick)).data().len());
        });
    });

    g.bench_function("machbands_1080p", |b| {
        let cfg = config(PatternSpec::MachBands { bands: 5 }, 1920, 1080);
        let mut pattern = build_pattern(&cfg).unwrap();
        let mut tick = Tick { index: 0, elapsed_ms: 0, probe: None };
        b.iter(|| {
            tick.index += 1;
            tick.elapsed_ms += 50;
            black_box(pattern.frame_for(black_box(&tick)).data().len());
        });
    });

    g.bench_function("moving_bar_1080p", |b| {
        let cfg = config(PatternSpec::MovingBar { length: 60, angle_deg: 30.0 }, 1920, 1080);
        let mut pattern = build_pattern(&cfg).unwrap();
        let mut tick = Tick { index: 0, elapsed_ms: 0, probe: None };
        b.iter(|| {
            tick.index += 1;
            tick.elapsed_ms += 50;
            black_box(pattern.frame_for(black_box(&tick)).data().len());
        });
    });

    // Flash selection is a lookup; keep it honest anyway.
    g.bench_function("checkerboard_1080p", |b| {
        let cfg = config(PatternSpec::Checkerboard { square: 20 }, 1920, 1080);
        let mut pattern = build_pattern(&cfg).unwrap();
        let mut tick = Tick { index: 0, elapsed_ms: 0, probe: None };
        b.iter(|| {
            tick.index += 1;
            tick.elapsed_ms += 50;
            black_box(pattern.frame_for(black_box(&tick)).data().len());
        });
    });

    g.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
