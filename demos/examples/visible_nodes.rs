// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport culling through the directory partition.
//!
//! Lay out a few hundred directories, then pan a viewport across the layout and list the
//! nodes it keeps.
//!
//! Run:
//! - `cargo run -p sylva_demos --example visible_nodes`

use kurbo::Point;
use sylva_index::Bounds2D;
use sylva_sim::Simulation;
use sylva_tree::PathEvent;

fn main() {
    let mut sim = Simulation::default();
    for d in 0..200 {
        let group = d % 12;
        for f in 0..5 {
            sim.push_event(PathEvent::add(format!("/g{group}/d{d}/f{f}.txt")));
        }
    }
    for _ in 0..600 {
        sim.tick(1.0 / 60.0);
    }

    let extent = sim.dir_bounds();
    println!(
        "layout extent: ({:.0}, {:.0}) .. ({:.0}, {:.0}), partition nodes: {}",
        extent.min.x,
        extent.min.y,
        extent.max.x,
        extent.max.y,
        sim.partition().node_count()
    );

    let total = sim.partition().unique_item_count();
    let step = extent.width() / 4.0;
    for i in 0..5 {
        let x = extent.min.x + step * f64::from(i);
        let centre = Point::new(x, extent.centre().y);
        sim.set_viewport(Bounds2D::from_centre_radius(centre, 150.0));
        sim.tick(1.0 / 60.0);
        let names: Vec<_> = sim
            .visible_nodes()
            .iter()
            .take(5)
            .map(|id| sim.tree().node(*id).unwrap().name().to_owned())
            .collect();
        println!(
            "viewport at x={x:.0}: {} of {total} nodes visible, e.g. {names:?}",
            sim.visible_nodes().len()
        );
    }
}
