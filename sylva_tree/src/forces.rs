// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Force accumulation for directory nodes.
//!
//! Each pass reads positions and radii and only writes pending accelerations, so the
//! result does not depend on visiting order. [`PathTree::logic`] integrates afterwards.

use core::f64::consts::PI;

use hashbrown::HashSet;
use kurbo::Vec2;
use rand::Rng;
use sylva_index::{Bounds2D, QuadTree};

use crate::node::DirNode;
use crate::tree::PathTree;
use crate::types::NodeId;
use crate::util::{normalize_or_zero, random_unit};

/// Counters from one force pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ForceStats {
    /// Nodes that received forces (every node but the root).
    pub nodes: usize,
    /// Distinct neighbor candidates examined across all nodes.
    pub inner_loops: usize,
}

/// Rebuild the neighbor partition over every non-empty node.
///
/// Node bounds are refreshed first. The partition covers the extent of visible node
/// positions plus a unit margin, and stays a single leaf until that extent's area exceeds
/// [`LayoutParams::deep_partition_area`](crate::LayoutParams::deep_partition_area).
pub fn build_partition(tree: &mut PathTree) -> QuadTree<NodeId> {
    tree.update_bounds();
    let extent = tree.visible_extent();
    let params = tree.params();
    let depth = params.partition_depth(extent.area());
    let leaf_items = params.partition_leaf_items;

    let mut bounds = extent;
    bounds.expand(1.0);
    if !bounds.is_initialized() {
        let centre = tree.node(tree.root()).map(DirNode::pos).unwrap_or_default();
        bounds = Bounds2D::from_centre_radius(centre, 1.0);
    }

    QuadTree::from_items(
        bounds,
        depth,
        leaf_items,
        tree.nodes()
            .filter(|(_, n)| !n.is_empty())
            .map(|(id, n)| (id, n.bounds())),
    )
}

/// Accumulate forces on every non-root node.
///
/// Per node: repulsion from overlapping unrelated neighbors found through `partition`,
/// overlap correction against the parent, gravity toward the parent's rim, alignment
/// along the grandparent edge, and spacing from visible siblings. Coincident nodes are
/// pushed apart along a random direction drawn from `rng`.
pub fn apply_forces<R: Rng + ?Sized>(
    tree: &mut PathTree,
    partition: &QuadTree<NodeId>,
    rng: &mut R,
) -> ForceStats {
    let ids: Vec<NodeId> = tree
        .nodes()
        .filter(|(_, n)| n.parent().is_some())
        .map(|(id, _)| id)
        .collect();

    let mut stats = ForceStats::default();
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for id in ids {
        // Straddling nodes show up once per leaf; count each neighbor once per node.
        seen.clear();
        candidates.clear();
        partition.visit_items_in_bounds(&tree.live(id).bounds(), |other| {
            if other != id && seen.insert(other) {
                candidates.push(other);
            }
        });
        stats.nodes += 1;
        stats.inner_loops += candidates.len();
        let accel = node_accel(tree, id, &candidates, rng);
        tree.push_accel(id, accel);
    }
    stats
}

fn node_accel<R: Rng + ?Sized>(
    tree: &PathTree,
    id: NodeId,
    neighbors: &[NodeId],
    rng: &mut R,
) -> Vec2 {
    let node = tree.live(id);
    let Some(parent_id) = node.parent() else {
        return Vec2::ZERO;
    };
    let parent = tree.live(parent_id);
    let gravity = tree.params().gravity;
    let mut accel = Vec2::ZERO;

    for other in neighbors {
        if tree.is_ancestor_of(*other, id) || tree.is_ancestor_of(id, *other) {
            continue;
        }
        accel += overlap_push(node, tree.live(*other), rng);
    }

    // The parent always counts, however far away.
    accel += overlap_push(node, parent, rng);

    let to_parent = parent.pos() - node.pos();
    let rim_distance = to_parent.hypot() - (node.radius() + parent.parent_radius());
    accel += normalize_or_zero(to_parent) * (gravity * rim_distance);

    if let Some(grandparent) = parent.parent() {
        let edge = normalize_or_zero(parent.pos() - tree.live(grandparent).pos());
        let dest = parent.pos() + edge * (parent.radius() + node.radius());
        accel += dest - node.pos();
    }

    accel + sibling_spacing(tree, id)
}

/// Correction that resolves overlap between `a` and `b`, applied to `a`.
///
/// Zero when the discs are apart. Negative along `b - a` (away from `b`) while they overlap.
fn overlap_push<R: Rng + ?Sized>(a: &DirNode, b: &DirNode, rng: &mut R) -> Vec2 {
    let dir = b.pos() - a.pos();
    let sum = a.radius() + b.radius();
    if dir.hypot2() > sum * sum {
        return Vec2::ZERO;
    }
    let distance = dir.hypot();
    if distance < 1e-5 {
        return random_unit(rng);
    }
    dir / distance * (distance - sum)
}

/// Push away from visible siblings, scaled by an equal share of the parent's half rim.
///
/// Zero for the root, for stale ids, and for nodes without visible siblings.
pub fn sibling_spacing(tree: &PathTree, id: NodeId) -> Vec2 {
    let Some(node) = tree.node(id) else {
        return Vec2::ZERO;
    };
    let Some(parent) = node.parent().and_then(|p| tree.node(p)) else {
        return Vec2::ZERO;
    };

    let mut visible = 1_u32;
    let mut push = Vec2::ZERO;
    for sibling in parent.children() {
        if *sibling == id {
            continue;
        }
        let sibling = tree.live(*sibling);
        if !sibling.is_visible() {
            continue;
        }
        visible += 1;
        push -= normalize_or_zero(sibling.pos() - node.pos());
    }
    if visible <= 1 {
        return Vec2::ZERO;
    }
    let slice = parent.radius() * PI / f64::from(visible + 1);
    push * slice
}
