//! Benchmarks for spawning, query iteration and whole simulation ticks
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tank_ecs::game::templates::spawn_tank;
use tank_ecs::prelude::*;

fn spawn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    group.bench_function("projectiles_10k", |b| {
        b.iter_batched(
            World::new,
            |mut world| {
                for i in 0..10_000 {
                    let _ = world.spawn((
                        Transform::from_xyz(i as f32, 10.0, 0.0),
                        Projectile::new(Vec3::Y),
                    ));
                }
                world
            },
            BatchSize::LargeInput,
        )
    });

    group.bench_function("tanks_1k", |b| {
        b.iter_batched(
            World::new,
            |mut world| {
                for _ in 0..1_000 {
                    let _ = spawn_tank(&mut world);
                }
                world
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

fn query_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");

    let mut world = World::new();
    for i in 0..10_000 {
        let _ = world.spawn((Transform::from_xyz(i as f32, 1.0, 0.0), Projectile::new(Vec3::X)));
    }
    for _ in 0..500 {
        let _ = spawn_tank(&mut world);
    }

    group.bench_function("read_transforms", |b| {
        b.iter(|| {
            let sum: f32 = world.query::<&Transform>().iter().map(|t| t.translation.x).sum();
            black_box(sum)
        })
    });

    group.bench_function("integrate_projectiles", |b| {
        b.iter(|| {
            for (transform, projectile) in world.query_mut::<(&mut Transform, &Projectile)>() {
                transform.translation += projectile.velocity * 0.001;
            }
        })
    });

    group.finish();
}

fn tick_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for tanks in [20u32, 200, 2_000] {
        let settings = SimulationSettings {
            tank_count: tanks,
            ..SimulationSettings::default()
        };
        let Ok(mut sim) = Simulation::from_settings(&settings) else {
            continue;
        };
        if sim.spawn_initial_population().is_err() {
            continue;
        }

        group.bench_with_input(BenchmarkId::new("default_schedule", tanks), &tanks, |b, _| {
            b.iter(|| {
                let report = sim.tick(FrameInput::new(1.0 / 60.0).with_axes(InputAxes::new(0.0, 1.0)));
                black_box(report.is_ok())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, spawn_benchmark, query_benchmark, tick_benchmark);
criterion_main!(benches);
