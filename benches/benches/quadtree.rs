// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Point;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sylva_index::{Bounds2D, QuadTree};

fn grid_items(n: usize, cell: f64) -> Vec<(u32, Bounds2D)> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let centre = Point::new(x as f64 * cell, y as f64 * cell);
            out.push((out.len() as u32, Bounds2D::from_centre_radius(centre, cell * 0.5)));
        }
    }
    out
}

fn random_items(count: usize, extent: f64, radius: f64) -> Vec<(u32, Bounds2D)> {
    let mut rng = SmallRng::seed_from_u64(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|i| {
            let centre = Point::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent));
            (i as u32, Bounds2D::from_centre_radius(centre, radius))
        })
        .collect()
}

fn clustered_items(clusters: usize, per_cluster: usize, spread: f64) -> Vec<(u32, Bounds2D)> {
    let mut rng = SmallRng::seed_from_u64(0xC1A5_7E55_9999_ABCD);
    let mut out = Vec::with_capacity(clusters * per_cluster);
    for _ in 0..clusters {
        let cx = rng.gen_range(0.0..2000.0);
        let cy = rng.gen_range(0.0..2000.0);
        for _ in 0..per_cluster {
            let dx = rng.gen_range(-0.5..0.5) * spread;
            let dy = rng.gen_range(-0.5..0.5) * spread;
            let centre = Point::new(cx + dx, cy + dy);
            out.push((out.len() as u32, Bounds2D::from_centre_radius(centre, 6.0)));
        }
    }
    out
}

fn extent_of(items: &[(u32, Bounds2D)]) -> Bounds2D {
    let mut extent = Bounds2D::new();
    for (_, b) in items {
        extent.update(b.centre());
    }
    extent.expand(1.0);
    extent
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_build");
    for &n in &[32_usize, 64, 128] {
        let items = grid_items(n, 10.0);
        let extent = extent_of(&items);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_n{n}"), |b| {
            b.iter(|| {
                let tree = QuadTree::from_items(extent, 6, 1, items.iter().copied());
                black_box(tree.item_count());
            });
        });
    }
    let items = clustered_items(16, 256, 200.0);
    let extent = extent_of(&items);
    group.throughput(Throughput::Elements(items.len() as u64));
    group.bench_function("clustered", |b| {
        b.iter(|| {
            let tree = QuadTree::from_items(extent, 6, 1, items.iter().copied());
            black_box(tree.item_count());
        });
    });
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_query");
    for &depth in &[1_usize, 4, 6, 8] {
        let items = random_items(4096, 2000.0, 6.0);
        let extent = extent_of(&items);
        let tree = QuadTree::from_items(extent, depth, 1, items.iter().copied());
        group.throughput(Throughput::Elements(items.len() as u64));
        group.bench_function(format!("neighbors_depth{depth}"), |b| {
            b.iter(|| {
                let mut hits = 0_usize;
                for (_, bounds) in &items {
                    tree.visit_items_in_bounds(bounds, |_| hits += 1);
                }
                black_box(hits);
            });
        });
    }
    let items = random_items(4096, 2000.0, 6.0);
    let tree = QuadTree::from_items(extent_of(&items), 6, 1, items.iter().copied());
    let viewport = Bounds2D::from_points(Point::new(800.0, 800.0), Point::new(1200.0, 1200.0));
    group.bench_function("visible_viewport", |b| {
        b.iter_batched(
            || viewport,
            |v| black_box(tree.items_visible(|n| v.overlaps(n)).len()),
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_query);
criterion_main!(benches);
