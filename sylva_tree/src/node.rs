// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Directory nodes.

use kurbo::{Point, Vec2};
use sylva_index::Bounds2D;

use crate::types::{Color, EntryId, NodeFlags, NodeId};

/// A directory in the [`PathTree`](crate::PathTree).
///
/// Owns its direct entries and child directories. The parent link is a non-owning id.
#[derive(Clone, Debug)]
pub struct DirNode {
    pub(crate) path: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) entries: Vec<EntryId>,
    pub(crate) depth: u32,
    pub(crate) pos: Point,
    pub(crate) accel: Vec2,
    pub(crate) prev_accel: Vec2,
    pub(crate) area: f64,
    pub(crate) radius: f64,
    pub(crate) parent_radius: f64,
    pub(crate) bounds: Bounds2D,
    pub(crate) visible_count: usize,
    pub(crate) color: Color,
    pub(crate) alpha: f64,
    pub(crate) node_normal: Vec2,
    pub(crate) flags: NodeFlags,
    pub(crate) since_last_node_change: f64,
    pub(crate) since_last_entry_change: f64,
}

impl DirNode {
    pub(crate) fn new(path: String, pos: Point) -> Self {
        Self {
            path,
            parent: None,
            children: Vec::new(),
            entries: Vec::new(),
            depth: 1,
            pos,
            accel: Vec2::ZERO,
            prev_accel: Vec2::ZERO,
            area: 0.0,
            radius: 0.0,
            parent_radius: 0.0,
            bounds: Bounds2D::new(),
            visible_count: 0,
            color: Color::WHITE,
            alpha: 1.0,
            node_normal: Vec2::ZERO,
            flags: NodeFlags::empty(),
            since_last_node_change: 0.0,
            since_last_entry_change: 0.0,
        }
    }

    /// Directory path, always ending in `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last path segment, e.g. `bar` for `/foo/bar/`. Empty for `/`.
    pub fn name(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child directories in insertion order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Direct entries in insertion order.
    pub fn entries(&self) -> &[EntryId] {
        &self.entries
    }

    /// Depth in the tree; the root is `1`.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Position in layout space.
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Acceleration accumulated since the last integration step.
    pub fn accel(&self) -> Vec2 {
        self.accel
    }

    /// Total area of visible entries here and below.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Radius covering the whole subtree.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Radius covering only the direct entries; children settle on this rim.
    pub fn parent_radius(&self) -> f64 {
        self.parent_radius
    }

    /// Bounds used for the neighbor partition and frustum checks.
    pub fn bounds(&self) -> Bounds2D {
        self.bounds
    }

    /// Number of non-hidden direct entries.
    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    /// Current color, brightened after recent changes and tinted by entries.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Current opacity.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Unit direction from the parent to this node.
    pub fn node_normal(&self) -> Vec2 {
        self.node_normal
    }

    /// State bits.
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Whether this node or a descendant holds a visible entry.
    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    /// Whether the node intersected the viewport at the last check.
    pub fn is_in_frustum(&self) -> bool {
        self.flags.contains(NodeFlags::IN_FRUSTUM)
    }

    /// No visible entries and no children. Empty nodes take no part in neighbor forces.
    pub fn is_empty(&self) -> bool {
        self.visible_count == 0 && self.children.is_empty()
    }

    /// Seconds since the subtree last changed.
    pub fn since_last_node_change(&self) -> f64 {
        self.since_last_node_change
    }

    /// Seconds since a direct entry last changed.
    pub fn since_last_entry_change(&self) -> f64 {
        self.since_last_entry_change
    }

    pub(crate) fn is_unused(&self) -> bool {
        self.entries.is_empty() && self.children.is_empty()
    }

    pub(crate) fn update_bounds(&mut self) {
        self.bounds = Bounds2D::from_centre_radius(self.pos, self.radius);
    }
}
