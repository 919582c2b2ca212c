//! Benchmarks for GPU rendering operations.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wavy_text::text::DEFAULT_TEXT;
use wavy_text::SceneRenderer;

#[path = "../tests/common/mod.rs"]
mod common;

fn bench_render_resolutions(c: &mut Criterion) {
    let mut group = c.benchmark_group("Resolution Scaling");

    let resolutions = [(640, 360, "360p"), (1280, 720, "720p"), (1920, 1080, "1080p")];

    for (width, height, name) in resolutions {
        let mut renderer = match pollster::block_on(SceneRenderer::new(width, height)) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Skipping GPU benchmarks: {}", e);
                return;
            }
        };

        let mut app = common::app_with_text(DEFAULT_TEXT, 80, width, height);
        let mut timestamp = 0.0;

        group.bench_function(name, |b| {
            b.iter(|| {
                timestamp += 16.0;
                app.update(timestamp);
                black_box(renderer.render(&app).ok());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render_resolutions);
criterion_main!(benches);
