// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena-backed quad-tree over items with bounding regions.

use std::fmt::Debug;

use kurbo::Point;

use crate::bounds::Bounds2D;

/// A quad-tree built by insertion and queried by region, point, or visibility predicate.
///
/// Items carry their own [`Bounds2D`]. An item whose bounds straddle a split line is
/// stored in every child it overlaps, so queries may report the same item more than
/// once. Callers that accumulate per-item effects must deduplicate.
///
/// There is no removal: the tree is meant to be rebuilt from the live item set.
pub struct QuadTree<I: Copy> {
    max_depth: usize,
    max_items: usize,
    arena: Vec<Node<I>>,
    item_count: usize,
    unique_item_count: usize,
}

enum Kind<I> {
    Leaf(Vec<(I, Bounds2D)>),
    Internal([NodeIdx; 4]),
}

struct Node<I> {
    bounds: Bounds2D,
    depth: usize,
    parent: Option<NodeIdx>,
    kind: Kind<I>,
}

impl<I> Node<I> {
    fn is_empty(&self) -> bool {
        matches!(&self.kind, Kind::Leaf(items) if items.is_empty())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl NodeIdx {
    const ROOT: Self = Self(0);

    const fn get(self) -> usize {
        self.0
    }
}

/// Counters describing a built [`QuadTree`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QuadTreeStats {
    /// Stored item references, counting straddling items once per leaf.
    pub item_count: usize,
    /// Number of `insert` calls.
    pub unique_item_count: usize,
    /// Number of nodes, internal and leaf.
    pub node_count: usize,
    /// Deepest node depth; the root has depth 1.
    pub depth: usize,
}

impl<I: Copy> QuadTree<I> {
    /// Create an empty tree covering `bounds`.
    ///
    /// `max_depth` bounds subdivision (the root has depth 1, so `1` never splits).
    /// `max_items` is the leaf capacity before a split is attempted.
    pub fn new(bounds: Bounds2D, max_depth: usize, max_items: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
            max_items: max_items.max(1),
            arena: vec![Node {
                bounds,
                depth: 1,
                parent: None,
                kind: Kind::Leaf(Vec::new()),
            }],
            item_count: 0,
            unique_item_count: 0,
        }
    }

    /// Build a tree and insert every `(item, bounds)` pair.
    pub fn from_items(
        bounds: Bounds2D,
        max_depth: usize,
        max_items: usize,
        items: impl IntoIterator<Item = (I, Bounds2D)>,
    ) -> Self {
        let mut tree = Self::new(bounds, max_depth, max_items);
        for (item, item_bounds) in items {
            tree.insert(item, item_bounds);
        }
        tree
    }

    /// The region covered by the root.
    pub fn bounds(&self) -> Bounds2D {
        self.arena[NodeIdx::ROOT.get()].bounds
    }

    /// Maximum configured depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Leaf capacity before a split is attempted.
    pub fn max_items_per_leaf(&self) -> usize {
        self.max_items
    }

    /// Insert an item with its bounds.
    pub fn insert(&mut self, item: I, bounds: Bounds2D) {
        self.insert_node(NodeIdx::ROOT, item, bounds);
        self.unique_item_count += 1;
    }

    /// Visit every item stored in leaves whose bounds overlap `region`.
    ///
    /// The visitor sees candidates: items in a matching leaf are reported even if their
    /// own bounds miss `region`, and straddling items are reported once per leaf.
    pub fn visit_items_in_bounds(&self, region: &Bounds2D, mut visitor: impl FnMut(I)) {
        self.visit_node(NodeIdx::ROOT, &mut |b| region.overlaps(b), &mut visitor);
    }

    /// Collect the candidates of [`QuadTree::visit_items_in_bounds`].
    pub fn items_in_bounds(&self, region: &Bounds2D) -> impl Iterator<Item = I> + '_ {
        let mut out = Vec::new();
        self.visit_items_in_bounds(region, |item| out.push(item));
        out.into_iter()
    }

    /// Items of the leaf containing `point`.
    pub fn items_at(&self, point: Point) -> impl Iterator<Item = I> + '_ {
        let mut idx = NodeIdx::ROOT;
        let items: &[(I, Bounds2D)] = loop {
            match &self.arena[idx.get()].kind {
                Kind::Leaf(items) => break items,
                Kind::Internal(children) => {
                    match children
                        .iter()
                        .find(|c| self.arena[c.get()].bounds.contains(point))
                    {
                        Some(child) => idx = *child,
                        None => break &[],
                    }
                }
            }
        };
        items.iter().map(|(item, _)| *item)
    }

    /// Items in leaves reached by descending into children accepted by `is_visible`.
    ///
    /// Typically `is_visible` tests a camera frustum against node bounds.
    pub fn items_visible(&self, mut is_visible: impl FnMut(&Bounds2D) -> bool) -> Vec<I> {
        let mut out = Vec::new();
        self.visit_node(NodeIdx::ROOT, &mut is_visible, &mut |item| out.push(item));
        out
    }

    /// Bounds of populated leaves reached by descending into children accepted by `is_visible`.
    pub fn leaves_visible(&self, mut is_visible: impl FnMut(&Bounds2D) -> bool) -> Vec<Bounds2D> {
        let mut out = Vec::new();
        self.collect_leaves(NodeIdx::ROOT, &mut is_visible, &mut out);
        out
    }

    /// Bounds of every node, parents before children. Useful for debug outlines.
    pub fn node_bounds(&self) -> impl Iterator<Item = Bounds2D> + '_ {
        self.arena.iter().map(|n| n.bounds)
    }

    /// Stored item references (straddling items count once per leaf).
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Number of inserted items.
    pub fn unique_item_count(&self) -> usize {
        self.unique_item_count
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Whether nothing has been inserted.
    pub fn is_empty(&self) -> bool {
        self.unique_item_count == 0
    }

    /// Summary counters.
    pub fn stats(&self) -> QuadTreeStats {
        QuadTreeStats {
            item_count: self.item_count,
            unique_item_count: self.unique_item_count,
            node_count: self.arena.len(),
            depth: self.arena.iter().map(|n| n.depth).max().unwrap_or(1),
        }
    }

    /// `(depth, item count)` for every leaf.
    ///
    /// Exposed for tests and diagnostics of the split policy.
    pub fn leaf_occupancy(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.arena.iter().filter_map(|n| match &n.kind {
            Kind::Leaf(items) => Some((n.depth, items.len())),
            Kind::Internal(_) => None,
        })
    }

    /// Depth of the path from `idx` to the root, walking parent links.
    #[cfg(test)]
    fn depth_by_parents(&self, mut idx: NodeIdx) -> usize {
        let mut depth = 1;
        while let Some(parent) = self.arena[idx.get()].parent {
            depth += 1;
            idx = parent;
        }
        depth
    }

    // --- internals ---

    fn allows_more_items(&self, depth: usize, len: usize) -> bool {
        depth >= self.max_depth || len < self.max_items
    }

    fn insert_node(&mut self, idx: NodeIdx, item: I, bounds: Bounds2D) {
        let depth = self.arena[idx.get()].depth;
        let kind = core::mem::replace(&mut self.arena[idx.get()].kind, Kind::Leaf(Vec::new()));
        match kind {
            Kind::Leaf(mut items) if self.allows_more_items(depth, items.len()) => {
                items.push((item, bounds));
                self.item_count += 1;
                self.arena[idx.get()].kind = Kind::Leaf(items);
            }
            Kind::Leaf(items) => {
                let quadrants = self.arena[idx.get()].bounds.quadrants();
                let children = quadrants.map(|q| {
                    self.arena.push(Node {
                        bounds: q,
                        depth: depth + 1,
                        parent: Some(idx),
                        kind: Kind::Leaf(Vec::new()),
                    });
                    NodeIdx(self.arena.len() - 1)
                });
                self.arena[idx.get()].kind = Kind::Internal(children);
                self.item_count -= items.len();
                for (old, old_bounds) in items {
                    self.insert_into_children(idx, children, old, old_bounds);
                }
                self.insert_into_children(idx, children, item, bounds);
            }
            Kind::Internal(children) => {
                self.arena[idx.get()].kind = Kind::Internal(children);
                self.insert_into_children(idx, children, item, bounds);
            }
        }
    }

    fn insert_into_children(
        &mut self,
        parent: NodeIdx,
        children: [NodeIdx; 4],
        item: I,
        bounds: Bounds2D,
    ) {
        let mut placed = false;
        for child in children {
            if self.arena[child.get()].bounds.overlaps(&bounds) {
                self.insert_node(child, item, bounds);
                placed = true;
            }
        }
        if !placed {
            // Outside the partition: keep it in the quadrant facing its centre.
            let mid = self.arena[parent.get()].bounds.centre();
            let centre = bounds.centre();
            let quadrant = usize::from(centre.x >= mid.x) + 2 * usize::from(centre.y >= mid.y);
            self.insert_node(children[quadrant], item, bounds);
        }
    }

    fn visit_node(
        &self,
        idx: NodeIdx,
        accept: &mut dyn FnMut(&Bounds2D) -> bool,
        visitor: &mut dyn FnMut(I),
    ) {
        match &self.arena[idx.get()].kind {
            Kind::Leaf(items) => {
                for (item, _) in items {
                    visitor(*item);
                }
            }
            Kind::Internal(children) => {
                for child in children {
                    let node = &self.arena[child.get()];
                    if !node.is_empty() && accept(&node.bounds) {
                        self.visit_node(*child, accept, visitor);
                    }
                }
            }
        }
    }

    fn collect_leaves(
        &self,
        idx: NodeIdx,
        accept: &mut dyn FnMut(&Bounds2D) -> bool,
        out: &mut Vec<Bounds2D>,
    ) {
        let node = &self.arena[idx.get()];
        match &node.kind {
            Kind::Leaf(items) => {
                if !items.is_empty() {
                    out.push(node.bounds);
                }
            }
            Kind::Internal(children) => {
                for child in children {
                    let c = &self.arena[child.get()];
                    if !c.is_empty() && accept(&c.bounds) {
                        self.collect_leaves(*child, accept, out);
                    }
                }
            }
        }
    }
}

impl<I: Copy> Debug for QuadTree<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QuadTree")
            .field("bounds", &self.bounds())
            .field("max_depth", &self.max_depth)
            .field("max_items", &self.max_items)
            .field("nodes", &self.arena.len())
            .field("items", &self.item_count)
            .field("unique_items", &self.unique_item_count)
            .finish_non_exhaustive()
    }
}
