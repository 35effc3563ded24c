//! Benchmarks for link discovery and a full frame render.
//!
//! Run with: `cargo bench --bench links`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use bhud_fx::{Bounds, DrawList, FieldConfig, LinkScope, LinkStyle, ParticleStore, Renderer, Surface};

fn store(count: usize) -> ParticleStore {
    let mut rng = StdRng::seed_from_u64(42);
    ParticleStore::initialize(count, Bounds::new(1920.0, 1080.0), &FieldConfig::particle_background(), &mut rng)
}

fn bench_find_links(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_links");
    let style = LinkStyle::new(150.0).with_alpha(0.1);

    // 256 and below take the all-pairs path, above it the grid.
    for count in [100, 256, 257, 1000, 4000] {
        let store = store(count);
        let mut renderer = Renderer::new();
        group.bench_with_input(BenchmarkId::new("all", count), &count, |b, _| {
            b.iter(|| black_box(renderer.find_links(store.particles(), &style).len()))
        });
    }

    let windowed = style.with_scope(LinkScope::Next(4));
    let store = store(4000);
    let mut renderer = Renderer::new();
    group.bench_function("next_4/4000", |b| {
        b.iter(|| black_box(renderer.find_links(store.particles(), &windowed).len()))
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let config = FieldConfig::particle_background();
    let store = store(config.count);
    let frame = bhud_fx::FrameInfo { elapsed: 1.0, frame: 60 };

    group.bench_function("draw_list", |b| {
        let mut renderer = Renderer::new();
        let mut list = DrawList::new(1920, 1080);
        b.iter(|| {
            list.clear();
            black_box(renderer.render(&store, &config, frame, &mut list))
        })
    });

    group.bench_function("surface_640x360", |b| {
        let small = {
            let mut rng = StdRng::seed_from_u64(7);
            ParticleStore::initialize(config.count, Bounds::new(640.0, 360.0), &config, &mut rng)
        };
        let mut renderer = Renderer::new();
        let mut surface = Surface::new(640, 360);
        b.iter(|| black_box(renderer.render(&small, &config, frame, &mut surface)))
    });

    group.finish();
}

criterion_group!(benches, bench_find_links, bench_render);
criterion_main!(benches);
