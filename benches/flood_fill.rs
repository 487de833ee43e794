use criterion::{criterion_group, criterion_main, Criterion, black_box};

use volsense::scene::BoxScene;
use volsense::sensor::{FloodFill, SensorConfig, VolumeSampler};

use glam::Vec3;

fn open_space(_: Vec3, _: Vec3) -> bool {
    false
}

fn config(resolution: f32, max_distance: f32) -> SensorConfig {
    SensorConfig {
        resolution,
        max_distance,
        min_spawn_dist: 2.0,
        dead_zone: 1.0,
        refresh_delay: 0.0,
    }
}

fn bench_open_space_r8(c: &mut Criterion) {
    let cfg = config(1.0, 8.0);

    c.bench_function("flood_fill_open_space_r8", |b| {
        b.iter(|| {
            FloodFill::new(&cfg, &open_space, black_box(Vec3::ZERO)).run()
        });
    });
}

fn bench_demo_room_r10(c: &mut Criterion) {
    let sampler = VolumeSampler::new(config(1.0, 10.0), BoxScene::demo(), || Some(Vec3::new(0.5, 1.6, 0.5)))
        .expect("valid config");

    c.bench_function("flood_fill_demo_room_r10", |b| {
        b.iter(|| sampler.regenerate_field().expect("position available"));
    });
}

fn bench_demo_room_fine(c: &mut Criterion) {
    let sampler = VolumeSampler::new(config(0.5, 6.0), BoxScene::demo(), || Some(Vec3::new(-3.2, 1.6, 2.7)))
        .expect("valid config");

    c.bench_function("flood_fill_demo_room_half_step_r6", |b| {
        b.iter(|| sampler.regenerate_field().expect("position available"));
    });
}

criterion_group!(
    benches,
    bench_open_space_r8,
    bench_demo_room_r10,
    bench_demo_room_fine,
);
criterion_main!(benches);
