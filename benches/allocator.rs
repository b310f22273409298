use borelog_renderer::config::{Config, LayoutConfig};
use borelog_renderer::ir::{Borehole, NsptColumn};
use borelog_renderer::layout::compute_track_layout;
use borelog_renderer::render::render_dxf;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Alternating thin/thick layers where every thin layer carries a long
/// description: the worst case for the allocator, since every other layer
/// seeds a cluster.
fn contested_borehole(layers: usize) -> Borehole {
    let mut depths = vec![0.0];
    let mut geology = Vec::with_capacity(layers);
    let mut depth = 0.0;
    for i in 0..layers {
        if i % 2 == 0 {
            depth += 0.3;
            geology.push(
                "Argila organica muito mole cinza escura com turfa e materia vegetal".to_string(),
            );
        } else {
            depth += 2.0;
            geology.push("Areia fina".to_string());
        }
        depths.push(depth);
    }
    Borehole {
        hole_id: format!("SP-{layers}"),
        max_depth: None,
        z: Some(100.0),
        water_level: Some(depth / 2.0),
        depths,
        geology,
        interp: None,
        nspt: NsptColumn {
            start_depth: 1.0,
            interval: 1.0,
            values: (0..layers).map(|i| format!("{}", i % 40 + 1)).collect(),
        },
    }
}

fn quiet_borehole(layers: usize) -> Borehole {
    let mut hole = contested_borehole(layers);
    for entry in &mut hole.geology {
        *entry = "Silte arenoso".to_string();
    }
    hole
}

fn bench_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocation");
    let config = LayoutConfig::default();
    for layers in [8usize, 64, 512] {
        let contested = contested_borehole(layers);
        group.bench_with_input(
            BenchmarkId::new("contested", layers),
            &contested,
            |b, hole| {
                b.iter(|| {
                    let track = compute_track_layout(black_box(hole), &config).unwrap();
                    black_box(track.clusters.len());
                });
            },
        );
        let quiet = quiet_borehole(layers);
        group.bench_with_input(BenchmarkId::new("quiet", layers), &quiet, |b, hole| {
            b.iter(|| {
                let track = compute_track_layout(black_box(hole), &config).unwrap();
                black_box(track.clusters.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_dxf");
    let config = Config::default();
    for batch_size in [1usize, 8, 32] {
        let batch: Vec<Borehole> = (0..batch_size).map(|_| contested_borehole(24)).collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch,
            |b, holes| {
                b.iter(|| {
                    let (dxf, report) = render_dxf(black_box(holes), &config);
                    black_box((dxf.len(), report.rendered));
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_allocation, bench_render
);
criterion_main!(benches);
