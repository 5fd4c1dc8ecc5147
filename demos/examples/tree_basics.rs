// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path tree basics.
//!
//! Add a few files, watch the tree restructure, run the force layout, then remove files.
//!
//! Run:
//! - `cargo run -p sylva_demos --example tree_basics`

use rand::SeedableRng;
use rand::rngs::SmallRng;
use sylva_tree::{NodeId, PathEvent, PathTree, apply_forces, build_partition};

fn print_tree(tree: &PathTree, id: NodeId, indent: usize) {
    let node = tree.node(id).unwrap();
    println!(
        "{:indent$}{} entries={} radius={:.1} pos=({:.1}, {:.1})",
        "",
        node.path(),
        node.entries().len(),
        node.radius(),
        node.pos().x,
        node.pos().y,
    );
    for child in node.children() {
        print_tree(tree, *child, indent + 2);
    }
}

fn main() {
    let mut tree = PathTree::default();

    for path in [
        "/src/main.c",
        "/src/lib.c",
        "/src/net/socket.c",
        "/src/net/http/client.c",
        "/docs/readme.md",
    ] {
        tree.apply(&PathEvent::add(path)).unwrap();
        println!("after add {path}: root={}", tree.node(tree.root()).unwrap().path());
    }

    // Run two seconds of layout.
    let mut rng = SmallRng::seed_from_u64(1);
    for _ in 0..120 {
        let partition = build_partition(&mut tree);
        apply_forces(&mut tree, &partition, &mut rng);
        tree.logic(1.0 / 60.0);
    }
    print_tree(&tree, tree.root(), 0);

    // Removing the only file under /docs/ prunes the node.
    tree.apply(&PathEvent::remove("/docs/readme.md")).unwrap();
    assert!(tree.node_for_path("/docs/").is_none());
    println!("dirs left: {}", tree.total_dir_count());

    let found: Vec<_> = tree
        .find_dirs("/src/net")
        .into_iter()
        .map(|id| tree.node(id).unwrap().path().to_owned())
        .collect();
    println!("dirs under /src/net: {found:?}");
}
