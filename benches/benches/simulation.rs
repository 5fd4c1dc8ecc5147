// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sylva_sim::{Settings, Simulation};
use sylva_tree::{EntryMeta, PathEvent, PathTree, apply_forces, build_partition};

const DT: f64 = 1.0 / 60.0;

/// A synthetic source tree: `dirs` directories up to four levels deep, `files` files.
fn paths(dirs: usize, files: usize) -> Vec<String> {
    let mut rng = SmallRng::seed_from_u64(0xBADC_F00D_1234_5678);
    let mut dir_paths = vec![String::from("/")];
    for i in 0..dirs {
        let parent = &dir_paths[rng.gen_range(0..dir_paths.len())];
        let depth = parent.matches('/').count();
        let parent = if depth > 4 { "/" } else { parent.as_str() };
        let dir = format!("{parent}d{i}/");
        dir_paths.push(dir);
    }
    (0..files)
        .map(|i| {
            let dir = &dir_paths[rng.gen_range(0..dir_paths.len())];
            format!("{dir}f{i}.rs")
        })
        .collect()
}

/// A simulation with every path added and a second of layout already run.
fn settled(files: &[String], users: usize) -> Simulation {
    let mut sim = Simulation::new(Settings {
        seed: 7,
        ..Settings::default()
    });
    for (i, path) in files.iter().enumerate() {
        let meta = if users > 0 {
            EntryMeta::by(format!("user{}", i % users))
        } else {
            EntryMeta::default()
        };
        sim.push_event(PathEvent::Add {
            path: path.clone(),
            meta,
        });
    }
    for _ in 0..60 {
        sim.tick(DT);
    }
    sim
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_tick");
    group.sample_size(20);
    for &(dirs, files) in &[(100_usize, 1000_usize), (400, 4000)] {
        let files = paths(dirs, files);
        group.throughput(Throughput::Elements(files.len() as u64));
        group.bench_function(format!("files{}", files.len()), |b| {
            b.iter_batched(
                || settled(&files, 0),
                |mut sim| black_box(sim.tick(DT)),
                BatchSize::LargeInput,
            );
        });
        group.bench_function(format!("files{}_users8", files.len()), |b| {
            b.iter_batched(
                || settled(&files, 8),
                |mut sim| black_box(sim.tick(DT)),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_forces(c: &mut Criterion) {
    let mut group = c.benchmark_group("forces");
    let files = paths(400, 4000);
    let mut tree = PathTree::default();
    for path in &files {
        let _ = tree.add_entry(path, &EntryMeta::default());
    }
    let mut rng = SmallRng::seed_from_u64(3);
    for _ in 0..60 {
        let partition = build_partition(&mut tree);
        apply_forces(&mut tree, &partition, &mut rng);
        tree.logic(DT);
    }
    group.throughput(Throughput::Elements(tree.total_dir_count() as u64));
    group.bench_function("build_partition", |b| {
        b.iter(|| black_box(build_partition(&mut tree).item_count()));
    });
    let partition = build_partition(&mut tree);
    group.bench_function("apply_forces", |b| {
        b.iter_batched(
            || tree.clone(),
            |mut t| black_box(apply_forces(&mut t, &partition, &mut rng)),
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn bench_events(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_events");
    let files = paths(400, 4000);
    group.throughput(Throughput::Elements(files.len() as u64));
    group.bench_function("add_all", |b| {
        b.iter(|| {
            let mut tree = PathTree::default();
            for path in &files {
                let _ = tree.apply(&PathEvent::add(path.as_str()));
            }
            black_box(tree.total_dir_count())
        });
    });
    group.bench_function("add_then_remove_all", |b| {
        b.iter(|| {
            let mut tree = PathTree::default();
            for path in &files {
                let _ = tree.apply(&PathEvent::add(path.as_str()));
            }
            for path in &files {
                let _ = tree.apply(&PathEvent::remove(path.as_str()));
            }
            black_box(tree.total_dir_count())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_tick, bench_forces, bench_events);
criterion_main!(benches);
