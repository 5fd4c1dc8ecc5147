// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: restructuring, derived layout data, integration.

use core::f64::consts::{PI, TAU};

use hashbrown::HashMap;
use kurbo::{Point, Vec2};
use log::{debug, warn};
use sylva_index::Bounds2D;

use crate::arena::Arena;
use crate::entry::{Entry, EntryMeta, MODIFY_COLOR};
use crate::events::{EventError, normalize_entry_path};
use crate::node::DirNode;
use crate::params::LayoutParams;
use crate::path::{common_path_prefix, dir_path, hash_unit_vec, is_prefixed_by};
use crate::types::{Color, EntryId, NodeFlags, NodeId};
use crate::util::{normalize_or_zero, rotate_about};

/// A trie over directory paths that restructures itself as entries come and go.
///
/// The tree starts as a single empty root `/`. Adding entries renames, forks, and
/// re-parents directories so that every node's path is a strict prefix of its
/// children's paths and no two siblings prefix one another. Removing the last entry of
/// a directory prunes it and any ancestors left empty.
///
/// Nodes and entries live in generational arenas; see [`NodeId`] and [`EntryId`].
#[derive(Clone)]
pub struct PathTree {
    nodes: Arena<DirNode>,
    entries: Arena<Entry>,
    root: NodeId,
    dirs: HashMap<String, NodeId>,
    entry_paths: HashMap<String, EntryId>,
    params: LayoutParams,
}

impl Default for PathTree {
    fn default() -> Self {
        Self::new(LayoutParams::default())
    }
}

impl core::fmt::Debug for PathTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PathTree")
            .field("root", &self.live(self.root).path)
            .field("nodes", &self.nodes)
            .field("entries", &self.entries)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl PathTree {
    /// Create a tree holding only an empty `/` root at the origin.
    pub fn new(params: LayoutParams) -> Self {
        let mut tree = Self {
            nodes: Arena::default(),
            entries: Arena::default(),
            root: NodeId::new(0, 0),
            dirs: HashMap::new(),
            entry_paths: HashMap::new(),
            params,
        };
        tree.root = tree.alloc_node(String::from("/"), Point::ZERO);
        tree
    }

    /// Current root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Layout parameters.
    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    /// Returns `true` if `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.is_alive(id.idx(), id.1)
    }

    /// Returns `true` if `id` refers to a live entry.
    pub fn is_entry_alive(&self, id: EntryId) -> bool {
        self.entries.is_alive(id.idx(), id.1)
    }

    /// Look up a live node.
    pub fn node(&self, id: NodeId) -> Option<&DirNode> {
        self.nodes.get(id.idx(), id.1)
    }

    /// Look up a live entry.
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.idx(), id.1)
    }

    /// All live nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &DirNode)> + '_ {
        self.nodes
            .iter()
            .map(|(idx, generation, n)| (NodeId::new(idx, generation), n))
    }

    /// All live entries.
    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &Entry)> + '_ {
        self.entries
            .iter()
            .map(|(idx, generation, e)| (EntryId::new(idx, generation), e))
    }

    /// The node for a directory path. A missing trailing `/` is tolerated.
    pub fn node_for_path(&self, path: &str) -> Option<NodeId> {
        match self.dirs.get(path) {
            Some(id) => Some(*id),
            None if !path.ends_with('/') => self.dirs.get(&dir_path(path)).copied(),
            None => None,
        }
    }

    /// The entry for a file path. A missing leading `/` is tolerated.
    pub fn entry_for_path(&self, path: &str) -> Option<EntryId> {
        let path = normalize_entry_path(path).ok()?;
        self.entry_paths.get(&path).copied()
    }

    /// Whether `path` names a directory at or above some node.
    ///
    /// `/a` is a directory if `/a/` or anything below it is a node.
    pub fn is_dir(&self, path: &str) -> bool {
        self.is_dir_at(self.root, path)
    }

    fn is_dir_at(&self, at: NodeId, path: &str) -> bool {
        let node = self.live(at);
        if is_prefixed_by(&node.path, path) {
            return true;
        }
        if !path.starts_with(node.path.as_str()) {
            return false;
        }
        node.children.iter().any(|c| self.is_dir_at(*c, path))
    }

    /// The directories closest to the root that lie at or below `prefix`.
    ///
    /// `/foo/` matches just `/foo/` if it is a node, otherwise every topmost node below it
    /// such as `/foo/bar/` and `/foo/baz/`.
    pub fn find_dirs(&self, prefix: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = self.live(id);
            if is_prefixed_by(&node.path, prefix) {
                out.push(id);
                continue;
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Every entry in the subtree rooted at `id`.
    pub fn entries_recursive(&self, id: NodeId) -> Vec<EntryId> {
        let mut out = Vec::new();
        if !self.is_alive(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = self.live(id);
            out.extend_from_slice(&node.entries);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Whether `ancestor` lies strictly above `id`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = self.node(id).and_then(|n| n.parent);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.live(p).parent;
        }
        false
    }

    /// Number of live directory nodes, root included.
    pub fn total_dir_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live entries, hidden ones included.
    pub fn total_entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Add an entry at `path`, restructuring the tree as needed.
    ///
    /// If the path already exists the entry is touched instead and its id returned.
    pub fn add_entry(&mut self, path: &str, meta: &EntryMeta) -> Result<EntryId, EventError> {
        let path = normalize_entry_path(path)?;
        if let Some(&id) = self.entry_paths.get(&path) {
            self.touch_entry(id, meta.action_color.unwrap_or(MODIFY_COLOR));
            if let Some(color) = meta.color {
                self.set_entry_color(id, color);
            }
            return Ok(id);
        }

        let entry = Entry::new(path.clone(), meta).ok_or(EventError::EmptyPath)?;
        let (idx, generation) = self.entries.alloc(entry);
        let id = EntryId::new(idx, generation);
        self.entry_paths.insert(path, id);

        let root = self.root;
        let inserted = self.insert_entry(root, id);
        debug_assert!(inserted, "the root accepts every entry");
        Ok(id)
    }

    /// Remove an entry, pruning directories it leaves empty.
    ///
    /// Returns `false` if `id` is stale.
    pub fn remove_entry(&mut self, id: EntryId) -> bool {
        let Some(entry) = self.entry(id) else {
            return false;
        };
        let dir = entry.dir().to_owned();
        let root = self.root;
        if !self.remove_from(root, id, &dir) {
            // Not reachable by descent; fall back to the back-reference.
            warn!("entry {} was not found under {}", self.live_entry(id).path(), dir);
            if let Some(node) = self.live_entry(id).node
                && self.is_alive(node)
            {
                self.detach_entry(node, id);
            }
        }
        self.free_entry(id);
        true
    }

    /// Remove the entry at `path`.
    pub fn remove_path(&mut self, path: &str) -> Result<EntryId, EventError> {
        let normalized = normalize_entry_path(path)?;
        let id = self
            .entry_paths
            .get(&normalized)
            .copied()
            .ok_or(EventError::UnknownPath(normalized))?;
        self.remove_entry(id);
        Ok(id)
    }

    /// Mark an entry as just changed: flash `color`, reveal it, and cancel any fade.
    ///
    /// Returns `false` if `id` is stale.
    pub fn touch_entry(&mut self, id: EntryId, color: Color) -> bool {
        let Some(entry) = self.entries.get_mut(id.idx(), id.1) else {
            return false;
        };
        let revealed = entry.touch(color);
        let Some(node) = entry.node else {
            return true;
        };
        if revealed {
            self.live_mut(node).visible_count += 1;
        }
        self.entry_updated(node, true);
        true
    }

    /// Fade an entry out. It expires a second later and goes with the next
    /// [`PathTree::remove_expired`]; a touch before then cancels the fade.
    ///
    /// Hidden entries do not fade until revealed. Returns `false` if `id` is stale.
    pub fn fade_entry(&mut self, id: EntryId) -> bool {
        match self.entries.get_mut(id.idx(), id.1) {
            Some(entry) => {
                entry.start_fade();
                true
            }
            None => false,
        }
    }

    /// Change an entry's resting color. Returns `false` if `id` is stale.
    pub fn set_entry_color(&mut self, id: EntryId, color: Color) -> bool {
        match self.entries.get_mut(id.idx(), id.1) {
            Some(entry) => {
                entry.color = color;
                true
            }
            None => false,
        }
    }

    /// Remove every entry that has faded out, returning their ids.
    pub fn remove_expired(&mut self) -> Vec<EntryId> {
        let expired: Vec<EntryId> = self
            .entries()
            .filter(|(_, e)| e.is_expired())
            .map(|(id, _)| id)
            .collect();
        for id in &expired {
            self.remove_entry(*id);
        }
        expired
    }

    /// Rotate every node position by `angle` radians about `centre`.
    pub fn rotate(&mut self, angle: f64, centre: Point) {
        for node in self.nodes.values_mut() {
            node.pos = rotate_about(node.pos, centre, angle);
        }
    }

    /// Recompute every node's bounds from its position and radius.
    pub fn update_bounds(&mut self) {
        for node in self.nodes.values_mut() {
            node.update_bounds();
        }
    }

    /// Extent of the positions of all visible nodes.
    pub fn visible_extent(&self) -> Bounds2D {
        let mut extent = Bounds2D::new();
        for (_, node) in self.nodes() {
            if node.is_visible() {
                extent.update(node.pos);
            }
        }
        extent
    }

    /// Flag nodes whose bounds intersect `viewport`.
    pub fn check_frustum(&mut self, viewport: &Bounds2D) {
        for node in self.nodes.values_mut() {
            let inside = viewport.overlaps(&node.bounds);
            node.flags.set(NodeFlags::IN_FRUSTUM, inside);
        }
    }

    /// Add to a node's pending acceleration.
    pub(crate) fn push_accel(&mut self, id: NodeId, accel: Vec2) {
        if let Some(node) = self.nodes.get_mut(id.idx(), id.1) {
            node.accel += accel;
        }
    }

    /// Advance the layout by `dt`: integrate nodes, move entries, recolor.
    ///
    /// Returns the number of entries that expired during this step. Call
    /// [`PathTree::remove_expired`] to drop them.
    pub fn logic(&mut self, dt: f64) -> usize {
        let mut expired = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            self.move_node(id, dt);

            if let Some(parent) = self.live(id).parent {
                let parent_pos = self.live(parent).pos;
                let node = self.live_mut(id);
                node.node_normal = normalize_or_zero(node.pos - parent_pos);
            }

            let params = &self.params;
            let node = self.nodes.get(id.idx(), id.1).expect("dangling NodeId");
            for e in &node.entries {
                if let Some(entry) = self.entries.get_mut(e.idx(), e.1)
                    && entry.logic(dt, params)
                {
                    expired += 1;
                }
            }

            self.calc_color(id);

            let node = self.live_mut(id);
            node.since_last_node_change += dt;
            node.since_last_entry_change += dt;
            stack.extend(node.children.iter().rev());
        }
        expired
    }

    /// Blend of the colors of visible entries here, averaged with each child's blend.
    pub fn average_entry_color(&self, id: NodeId) -> Color {
        let Some(node) = self.node(id) else {
            return Color::BLACK;
        };
        let mut av = Color::BLACK;
        let mut count = 0_u32;
        for e in &node.entries {
            let entry = self.live_entry(*e);
            if entry.is_hidden() {
                continue;
            }
            av = av.add(entry.color());
            count += 1;
        }
        if count > 0 {
            av = av.scale(1.0 / f64::from(count));
        }
        count = 0;
        for c in &node.children {
            av = av.add(self.average_entry_color(*c));
            count += 1;
        }
        if count > 0 {
            av = av.scale(1.0 / f64::from(count));
        }
        av
    }

    // --- restructuring ---

    fn alloc_node(&mut self, path: String, pos: Point) -> NodeId {
        let (idx, generation) = self.nodes.alloc(DirNode::new(path.clone(), pos));
        let id = NodeId::new(idx, generation);
        self.dirs.insert(path, id);
        self.calc_radius(id);
        id
    }

    fn free_node(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.free(id.idx(), id.1) {
            self.dirs.remove(&node.path);
        }
    }

    fn free_entry(&mut self, id: EntryId) {
        if let Some(entry) = self.entries.free(id.idx(), id.1) {
            self.entry_paths.remove(entry.path());
        }
    }

    fn rename_node(&mut self, id: NodeId, path: String) {
        let node = self.live_mut(id);
        let old = core::mem::replace(&mut node.path, path.clone());
        self.dirs.remove(&old);
        self.dirs.insert(path, id);
    }

    /// Try to place `entry` at or below `at`. Only the root never declines.
    fn insert_entry(&mut self, at: NodeId, entry: EntryId) -> bool {
        let dir = self.live_entry(entry).dir().to_owned();
        let (mut at_path, at_parent) = {
            let node = self.live(at);
            (node.path.clone(), node.parent)
        };

        // An empty root moves to wherever the next entry lives rather than lingering as a
        // childless fork.
        if at_parent.is_none() && dir != at_path && self.live(at).is_unused() {
            debug!("moving root {at_path} to {dir}");
            self.rename_node(at, dir.clone());
            at_path.clone_from(&dir);
        }

        if !dir.starts_with(at_path.as_str()) {
            if at_parent.is_some() {
                return false;
            }
            // Fork the root at the longest shared prefix.
            let mut common = common_path_prefix(&at_path, &dir).to_owned();
            if common.is_empty() {
                common.push('/');
            }
            debug!("forking root {at_path} under {common}");
            let pos = self.live(at).pos;
            let new_root = self.alloc_node(common, pos);
            self.add_node(new_root, at);
            self.root = new_root;
            return self.insert_entry(new_root, entry);
        }

        if dir == at_path {
            self.attach_entry(at, entry);
            return true;
        }

        let children = self.live(at).children.clone();
        let added = children.into_iter().any(|c| self.insert_entry(c, entry));
        if added && at_parent.is_some() {
            return true;
        }

        self.remove_stale_entry(at, &dir, entry);
        if added {
            return true;
        }

        let pos = self.live(at).pos;
        let child = self.alloc_node(dir.clone(), pos);
        let attached = self.insert_entry(child, entry);
        debug_assert!(attached, "a fresh node accepts entries for its own path");
        self.add_node(at, child);

        // Group siblings that share a longer prefix under a new intermediate node.
        let fork = self.live(at).children.iter().find_map(|c| {
            let node = self.live(*c);
            let common = common_path_prefix(&node.path, &dir);
            (common.len() > at_path.len() && common != dir).then(|| (common.to_owned(), node.pos))
        });
        if let Some((common, pos)) = fork {
            debug!("forking {common} under {at_path}");
            let fork_node = self.alloc_node(common.clone(), pos);
            self.live_mut(fork_node).flags.insert(NodeFlags::POSITIONED);
            let children = self.live(at).children.clone();
            for c in children {
                if is_prefixed_by(&self.live(c).path, &common) {
                    self.unlink(at, c);
                    self.add_node(fork_node, c);
                }
            }
            self.add_node(at, fork_node);
        }
        true
    }

    /// Drop a direct entry of `at` whose full path is a directory of `dir`.
    fn remove_stale_entry(&mut self, at: NodeId, dir: &str, incoming: EntryId) {
        let stale = self.live(at).entries.iter().copied().find(|e| {
            if *e == incoming {
                return false;
            }
            let path = self.live_entry(*e).path();
            dir.strip_prefix(path).is_some_and(|rest| rest.starts_with('/'))
        });
        if let Some(stale) = stale {
            warn!(
                "removing {} which is now the directory of {dir}",
                self.live_entry(stale).path()
            );
            self.detach_entry(at, stale);
            self.free_entry(stale);
        }
    }

    fn attach_entry(&mut self, at: NodeId, entry: EntryId) {
        let e = self.live_entry_mut(entry);
        e.node = Some(at);
        let hidden = e.is_hidden();
        let node = self.live_mut(at);
        node.entries.push(entry);
        if !hidden {
            node.visible_count += 1;
        }
        self.entry_updated(at, false);
    }

    fn detach_entry(&mut self, at: NodeId, entry: EntryId) {
        let e = self.live_entry_mut(entry);
        e.node = None;
        let hidden = e.is_hidden();
        let node = self.live_mut(at);
        node.entries.retain(|x| *x != entry);
        if !hidden {
            node.visible_count = node.visible_count.saturating_sub(1);
        }
        self.entry_updated(at, false);
    }

    /// Adopt `node` under `parent`, first moving any children of `parent` that it prefixes.
    fn add_node(&mut self, parent: NodeId, node: NodeId) {
        let path = self.live(node).path.clone();
        let children = self.live(parent).children.clone();
        for c in children {
            if c != node && is_prefixed_by(&self.live(c).path, &path) {
                self.unlink(parent, c);
                self.add_node(node, c);
            }
        }
        self.live_mut(parent).children.push(node);
        self.live_mut(node).parent = Some(parent);
        self.adjust_depth(node);
        self.node_updated(parent, false);
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        self.live_mut(parent).children.retain(|c| *c != child);
        self.live_mut(child).parent = None;
    }

    fn adjust_depth(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let depth = match self.live(id).parent {
                Some(p) => self.live(p).depth + 1,
                None => 1,
            };
            let node = self.live_mut(id);
            node.depth = depth;
            stack.extend_from_slice(&node.children);
        }
    }

    /// Remove `entry` from the subtree at `at` by path descent, pruning emptied children.
    fn remove_from(&mut self, at: NodeId, entry: EntryId, dir: &str) -> bool {
        let (below, here) = {
            let path = self.live(at).path.as_str();
            (dir.starts_with(path), dir == path)
        };
        if !below {
            return false;
        }
        if here {
            if self.live(at).entries.contains(&entry) {
                self.detach_entry(at, entry);
                return true;
            }
            return false;
        }
        let children = self.live(at).children.clone();
        for c in children {
            if self.remove_from(c, entry, dir) {
                if self.live(c).is_unused() {
                    debug!("pruning {}", self.live(c).path);
                    self.unlink(at, c);
                    self.free_node(c);
                    self.node_updated(at, false);
                }
                return true;
            }
        }
        false
    }

    // --- derived data ---

    fn entry_updated(&mut self, id: NodeId, user_initiated: bool) {
        self.live_mut(id).since_last_entry_change = 0.0;
        self.node_updated(id, user_initiated);
    }

    /// Refresh size, entry slots, and visibility, bubbling up to the root.
    fn node_updated(&mut self, id: NodeId, user_initiated: bool) {
        let mut cur = Some(id);
        let mut user_initiated = user_initiated;
        while let Some(id) = cur {
            self.calc_radius(id);
            self.update_entry_positions(id);
            let visible = {
                let node = self.live(id);
                node.visible_count > 0 || node.children.iter().any(|c| self.live(*c).is_visible())
            };
            let node = self.live_mut(id);
            if user_initiated {
                node.since_last_node_change = 0.0;
            }
            node.flags.set(NodeFlags::VISIBLE, visible);
            cur = node.parent;
            user_initiated = true;
        }
    }

    fn calc_radius(&mut self, id: NodeId) {
        let entry_area = self.params.entry_area();
        let node = self.live(id);
        let own_area = entry_area * node.visible_count as f64;
        let child_area: f64 = node.children.iter().map(|c| self.live(*c).area).sum();
        let min = self.params.min_radius;
        let padding = self.params.dir_padding;
        let node = self.live_mut(id);
        node.area = own_area + child_area;
        node.radius = node.area.sqrt().max(min) * padding;
        node.parent_radius = own_area.sqrt().max(min) * padding;
    }

    /// Lay visible entries out on concentric rings, one entry diameter apart.
    fn update_entry_positions(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get(id.idx(), id.1) else {
            return;
        };
        let spacing = self.params.entry_diameter;
        let mut ring = 1_u32;
        let mut ring_slots = 1_usize;
        let mut slot = 0_usize;
        let mut distance = 0.0;
        let mut left = node.visible_count;
        for e in &node.entries {
            let Some(entry) = self.entries.get_mut(e.idx(), e.1) else {
                continue;
            };
            if entry.is_hidden() {
                entry.dest = Vec2::ZERO;
                entry.distance = 0.0;
                continue;
            }
            entry.dest = ring_slot_direction(ring_slots, slot);
            entry.distance = distance;
            left = left.saturating_sub(1);
            slot += 1;
            if slot >= ring_slots {
                ring += 1;
                distance += spacing;
                ring_slots = slots_on_ring(ring).min(left);
                slot = 0;
            }
        }
    }

    fn calc_color(&mut self, id: NodeId) {
        let node = self.live(id);
        let brightness = (1.0 - (node.since_last_node_change / 3.0).min(1.0)).max(0.6);
        let mut color = Color::new(brightness, brightness, brightness);
        let mut alpha = 1.0;
        let mut count = 1.0;
        for e in &node.entries {
            let entry = self.live_entry(*e);
            if entry.is_hidden() {
                continue;
            }
            color = color.add(entry.color().scale(brightness));
            alpha += entry.alpha();
            count += 1.0;
        }
        let node = self.live_mut(id);
        node.color = color.scale(1.0 / count);
        node.alpha = alpha / count;
    }

    // --- integration ---

    fn move_node(&mut self, id: NodeId, dt: f64) {
        let node = self.live(id);
        // The root anchors the layout.
        if node.parent.is_none() {
            self.live_mut(id).accel = Vec2::ZERO;
            return;
        }
        if !node.is_empty() && !node.flags.contains(NodeFlags::POSITIONED) {
            self.set_initial_position(id);
        }
        let elasticity = self.params.elasticity;
        let node = self.live_mut(id);
        node.pos += node.accel * dt;
        if elasticity > 0.0 {
            let m = dt * elasticity;
            let smoothed = node.prev_accel * (1.0 - m) + (node.accel - node.prev_accel) * m;
            node.pos += smoothed;
            node.prev_accel = smoothed;
        }
        node.accel = Vec2::ZERO;
    }

    /// Place a node that just gained content beside its parent.
    fn set_initial_position(&mut self, id: NodeId) {
        let node = self.live(id);
        let Some(parent) = node.parent else {
            return;
        };
        let jitter = hash_unit_vec(&node.path);
        let parent = self.live(parent);
        let offset = match parent.parent {
            Some(grandparent) => {
                let edge = normalize_or_zero(parent.pos - self.live(grandparent).pos);
                normalize_or_zero(edge * 2.0 + jitter)
            }
            None => jitter,
        };
        let pos = parent.pos + offset;
        let node = self.live_mut(id);
        node.pos = pos;
        node.flags.insert(NodeFlags::POSITIONED);
    }

    // --- accessors ---

    /// Access a node; panics if `id` is stale.
    pub(crate) fn live(&self, id: NodeId) -> &DirNode {
        self.nodes.get(id.idx(), id.1).expect("dangling NodeId")
    }

    pub(crate) fn live_mut(&mut self, id: NodeId) -> &mut DirNode {
        self.nodes.get_mut(id.idx(), id.1).expect("dangling NodeId")
    }

    fn live_entry(&self, id: EntryId) -> &Entry {
        self.entries.get(id.idx(), id.1).expect("dangling EntryId")
    }

    fn live_entry_mut(&mut self, id: EntryId) -> &mut Entry {
        self.entries.get_mut(id.idx(), id.1).expect("dangling EntryId")
    }
}

/// Unit direction of `slot` on a ring divided into `slots` equal arcs.
///
/// Slots sit at the middle of their arc, starting at the top and running clockwise.
pub fn ring_slot_direction(slots: usize, slot: usize) -> Vec2 {
    let (slots, slot) = (slots.max(1) as f64, slot as f64);
    let arc = 1.0 / slots;
    let frac = arc * 0.5 + arc * slot;
    let (s, c) = (frac * TAU).sin_cos();
    Vec2::new(s, c)
}

/// How many entries fit on the `ring`th ring (the centre is ring 1).
fn slots_on_ring(ring: u32) -> usize {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Small and positive: the ring index times pi."
    )]
    let slots = (f64::from(ring) * PI) as usize;
    slots.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(tree: &mut PathTree, path: &str) -> EntryId {
        tree.add_entry(path, &EntryMeta::default()).unwrap()
    }

    fn path_of(tree: &PathTree, id: NodeId) -> &str {
        tree.node(id).unwrap().path()
    }

    fn child_paths(tree: &PathTree, id: NodeId) -> Vec<&str> {
        tree.node(id)
            .unwrap()
            .children()
            .iter()
            .map(|c| path_of(tree, *c))
            .collect()
    }

    /// Structural invariants that must hold after every public mutation.
    fn assert_invariants(tree: &PathTree) {
        let root = tree.node(tree.root()).unwrap();
        assert!(root.parent().is_none(), "root has no parent");
        for (id, node) in tree.nodes() {
            assert!(node.path().ends_with('/'), "{} must end with /", node.path());
            assert_eq!(tree.node_for_path(node.path()), Some(id), "path map is in sync");
            if id != tree.root() {
                let parent = node.parent().expect("non-root nodes have parents");
                assert!(
                    tree.node(parent).unwrap().children().contains(&id),
                    "{} missing from its parent's children",
                    node.path()
                );
                assert!(
                    !node.entries().is_empty() || !node.children().is_empty(),
                    "{} is empty but still linked",
                    node.path()
                );
                assert_eq!(node.depth(), tree.node(parent).unwrap().depth() + 1);
            }
            for c in node.children() {
                let child = tree.node(*c).unwrap();
                assert_eq!(child.parent(), Some(id));
                assert!(
                    child.path().starts_with(node.path()) && child.path() != node.path(),
                    "{} must strictly extend {}",
                    child.path(),
                    node.path()
                );
            }
            for a in node.children() {
                for b in node.children() {
                    if a != b {
                        assert!(
                            !path_of(tree, *b).starts_with(path_of(tree, *a)),
                            "sibling {} prefixes {}",
                            path_of(tree, *a),
                            path_of(tree, *b)
                        );
                    }
                }
            }
            for e in node.entries() {
                let entry = tree.entry(*e).unwrap();
                assert_eq!(entry.dir(), node.path());
                assert_eq!(entry.node(), Some(id));
            }
        }
        assert_eq!(tree.total_dir_count(), tree.dirs.len());
        assert_eq!(tree.total_entry_count(), tree.entry_paths.len());
    }

    #[test]
    fn first_entry_moves_the_root() {
        let mut tree = PathTree::default();
        assert_eq!(path_of(&tree, tree.root()), "/");
        add(&mut tree, "/src/main.c");
        assert_eq!(path_of(&tree, tree.root()), "/src/");
        assert_eq!(tree.total_dir_count(), 1);
        assert_invariants(&tree);
    }

    #[test]
    fn three_files_two_directories() {
        let mut tree = PathTree::default();
        add(&mut tree, "/src/main.c");
        add(&mut tree, "/src/lib.c");
        add(&mut tree, "/docs/readme.md");
        assert_invariants(&tree);

        let root = tree.root();
        assert_eq!(path_of(&tree, root), "/");
        assert_eq!(child_paths(&tree, root), vec!["/src/", "/docs/"]);
        let src = tree.node_for_path("/src/").unwrap();
        let docs = tree.node_for_path("/docs").unwrap();
        assert_eq!(tree.node(src).unwrap().entries().len(), 2);
        assert_eq!(tree.node(docs).unwrap().entries().len(), 1);
    }

    #[test]
    fn unrelated_path_forks_the_root() {
        let mut tree = PathTree::default();
        add(&mut tree, "/a/f0");
        let old_root = tree.root();
        assert_eq!(path_of(&tree, old_root), "/a/");

        add(&mut tree, "/b/f1");
        assert_invariants(&tree);
        let root = tree.root();
        assert_ne!(root, old_root);
        assert_eq!(path_of(&tree, root), "/");
        assert_eq!(child_paths(&tree, root), vec!["/a/", "/b/"]);
        assert_eq!(tree.node(old_root).unwrap().depth(), 2);
    }

    #[test]
    fn shared_prefix_gets_an_intermediate_node() {
        let mut tree = PathTree::default();
        add(&mut tree, "/z/f0");
        add(&mut tree, "/a/b/f1");
        assert_eq!(child_paths(&tree, tree.root()), vec!["/z/", "/a/b/"]);

        let ab = tree.node_for_path("/a/b/").unwrap();
        let ab_pos = tree.node(ab).unwrap().pos();
        add(&mut tree, "/a/c/f2");
        assert_invariants(&tree);

        assert_eq!(child_paths(&tree, tree.root()), vec!["/z/", "/a/"]);
        let a = tree.node_for_path("/a/").unwrap();
        assert_eq!(child_paths(&tree, a), vec!["/a/b/", "/a/c/"]);
        assert_eq!(tree.node(a).unwrap().pos(), ab_pos, "fork starts where its child was");
        assert_eq!(tree.node(ab).unwrap().depth(), 3);
    }

    #[test]
    fn new_directory_absorbs_children_it_prefixes() {
        let mut tree = PathTree::default();
        add(&mut tree, "/z/f0");
        add(&mut tree, "/a/b/f1");
        add(&mut tree, "/a/f2");
        assert_invariants(&tree);

        assert_eq!(child_paths(&tree, tree.root()), vec!["/z/", "/a/"]);
        let a = tree.node_for_path("/a/").unwrap();
        assert_eq!(child_paths(&tree, a), vec!["/a/b/"]);
        assert_eq!(tree.node(a).unwrap().entries().len(), 1);
    }

    #[test]
    fn add_then_remove_leaves_only_the_root() {
        let mut tree = PathTree::default();
        let f1 = add(&mut tree, "/a/b/f1");
        let f2 = add(&mut tree, "/a/c/f2");
        let b = tree.node_for_path("/a/b/").unwrap();
        assert_invariants(&tree);

        assert!(tree.remove_entry(f1));
        assert_invariants(&tree);
        assert!(!tree.is_alive(b), "emptied directory is pruned");
        assert!(!tree.is_entry_alive(f1));

        assert_eq!(tree.remove_path("/a/c/f2"), Ok(f2));
        assert_invariants(&tree);
        assert_eq!(tree.total_dir_count(), 1, "only the root survives");
        assert_eq!(tree.total_entry_count(), 0);
        assert!(tree.node(tree.root()).unwrap().is_empty());
    }

    #[test]
    fn emptied_root_moves_instead_of_forking() {
        let mut tree = PathTree::default();
        let f1 = add(&mut tree, "/a/b/f1");
        add(&mut tree, "/a/c/f2");
        tree.remove_entry(f1);
        tree.remove_path("/a/c/f2").unwrap();
        let root = tree.root();
        assert_eq!(path_of(&tree, root), "/a/");

        add(&mut tree, "/x/g");
        assert_invariants(&tree);
        assert_eq!(tree.root(), root, "the root node is reused");
        assert_eq!(path_of(&tree, root), "/x/");
        assert_eq!(tree.total_dir_count(), 1);
        assert!(!tree.is_dir("/a"));
        assert!(tree.node_for_path("/a/").is_none());
    }

    #[test]
    fn pruning_collapses_empty_ancestors() {
        let mut tree = PathTree::default();
        add(&mut tree, "/keep/x");
        let deep = add(&mut tree, "/gone/a/b/c/y");
        add(&mut tree, "/gone/a/q/z");
        assert_invariants(&tree);
        let before = tree.total_dir_count();

        tree.remove_entry(deep);
        assert_invariants(&tree);
        assert!(tree.node_for_path("/gone/a/b/c/").is_none());
        assert!(tree.node_for_path("/gone/a/q/").is_some());
        assert!(tree.total_dir_count() < before);

        let last = tree.entry_for_path("/gone/a/q/z").unwrap();
        tree.remove_entry(last);
        assert_invariants(&tree);
        assert!(tree.node_for_path("/gone/a/").is_none(), "emptied fork is pruned too");
        assert_eq!(child_paths(&tree, tree.root()), vec!["/keep/"]);
        assert_eq!(tree.total_dir_count(), 2);
    }

    #[test]
    fn file_standing_where_a_directory_goes_is_dropped() {
        let mut tree = PathTree::default();
        let stale = add(&mut tree, "/a/b");
        let keep = add(&mut tree, "/a/bc");
        add(&mut tree, "/a/b/c");
        assert_invariants(&tree);

        assert!(!tree.is_entry_alive(stale));
        assert!(tree.entry_for_path("/a/b").is_none());
        assert!(tree.is_entry_alive(keep), "/a/bc is not a parent of /a/b/");
        assert!(tree.is_dir("/a/b"));
    }

    #[test]
    fn adding_an_existing_path_touches_it() {
        let mut tree = PathTree::default();
        let first = add(&mut tree, "/a/x.rs");
        let again = add(&mut tree, "a/x.rs");
        assert_eq!(first, again);
        assert_eq!(tree.total_entry_count(), 1);
    }

    #[test]
    fn bad_paths_are_rejected() {
        let mut tree = PathTree::default();
        assert_eq!(tree.add_entry("", &EntryMeta::default()), Err(EventError::EmptyPath));
        assert_eq!(tree.add_entry("/dir/", &EntryMeta::default()), Err(EventError::EmptyPath));
        assert_eq!(
            tree.remove_path("/nope"),
            Err(EventError::UnknownPath("/nope".into()))
        );
        assert_eq!(tree.total_dir_count(), 1);
    }

    #[test]
    fn radius_follows_visible_area() {
        let mut tree = PathTree::default();
        add(&mut tree, "/r/f");
        let root = tree.node(tree.root()).unwrap();
        let expected = (16.0 * PI).sqrt() * 1.5;
        assert!((root.radius() - expected).abs() < 1e-9);
        assert!((root.parent_radius() - expected).abs() < 1e-9);

        let mut tree = PathTree::default();
        add(&mut tree, "/r/a/f");
        add(&mut tree, "/r/b/g");
        let root = tree.node(tree.root()).unwrap();
        assert_eq!(root.parent_radius(), 1.5, "no own entries: floored at min radius");
        let child = tree.node(root.children()[0]).unwrap();
        assert!(root.radius() > child.radius());
        assert!((root.area() - 32.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn entries_fill_rings_outward() {
        let mut tree = PathTree::default();
        for i in 0..8 {
            add(&mut tree, &format!("/d/f{i}"));
        }
        let node = tree.node(tree.root()).unwrap();
        let distances: Vec<f64> = node
            .entries()
            .iter()
            .map(|e| tree.entry(*e).unwrap().distance())
            .collect();
        // One in the centre, six on the second ring, the last one on the third.
        assert_eq!(distances, vec![0.0, 8.0, 8.0, 8.0, 8.0, 8.0, 8.0, 16.0]);
        let second_ring: Vec<Vec2> = node.entries()[1..7]
            .iter()
            .map(|e| tree.entry(*e).unwrap().dest())
            .collect();
        for (i, d) in second_ring.iter().enumerate() {
            assert!((d.hypot() - 1.0).abs() < 1e-9);
            assert_eq!(*d, ring_slot_direction(6, i));
        }
    }

    #[test]
    fn hidden_entries_take_no_space_until_touched() {
        let mut tree = PathTree::default();
        let id = tree.add_entry("/h/f", &EntryMeta::default().hidden()).unwrap();
        let root = tree.root();
        assert_eq!(tree.node(root).unwrap().visible_count(), 0);
        assert!(!tree.node(root).unwrap().is_visible());
        assert_eq!(tree.node(root).unwrap().radius(), 1.5);

        tree.touch_entry(id, MODIFY_COLOR);
        assert_eq!(tree.node(root).unwrap().visible_count(), 1);
        assert!(tree.node(root).unwrap().is_visible());
    }

    #[test]
    fn visibility_bubbles_to_ancestors() {
        let mut tree = PathTree::default();
        tree.add_entry("/p/q/hidden", &EntryMeta::default().hidden())
            .unwrap();
        let shown = add(&mut tree, "/p/r/shown");
        let r = tree.node_for_path("/p/r/").unwrap();
        assert!(tree.node(r).unwrap().is_visible());
        assert!(tree.node(tree.root()).unwrap().is_visible());
        assert!(!tree.node(tree.node_for_path("/p/q/").unwrap()).unwrap().is_visible());

        tree.remove_entry(shown);
        assert!(!tree.node(tree.root()).unwrap().is_visible());
    }

    #[test]
    fn new_nodes_start_next_to_their_parent() {
        let mut tree = PathTree::default();
        add(&mut tree, "/a/f");
        add(&mut tree, "/b/g");
        tree.logic(0.0);
        let root = tree.node(tree.root()).unwrap();
        for c in root.children() {
            let child = tree.node(*c).unwrap();
            assert!(child.flags().contains(NodeFlags::POSITIONED));
            assert!(((child.pos() - root.pos()).hypot() - 1.0).abs() < 1e-9);
            assert!((child.node_normal().hypot() - 1.0).abs() < 1e-9);
        }
        assert_eq!(root.pos(), Point::ZERO, "the root never moves");
    }

    #[test]
    fn integration_applies_and_clears_accel() {
        let mut tree = PathTree::default();
        add(&mut tree, "/a/f");
        add(&mut tree, "/b/g");
        tree.logic(0.0);
        let a = tree.node_for_path("/a/").unwrap();
        let start = tree.node(a).unwrap().pos();
        tree.push_accel(a, Vec2::new(10.0, 0.0));
        tree.push_accel(tree.root(), Vec2::new(10.0, 0.0));
        tree.logic(0.5);
        assert_eq!(tree.node(a).unwrap().pos(), start + Vec2::new(5.0, 0.0));
        assert_eq!(tree.node(a).unwrap().accel(), Vec2::ZERO);
        assert_eq!(tree.node(tree.root()).unwrap().pos(), Point::ZERO);
    }

    #[test]
    fn elasticity_smooths_motion() {
        let params = LayoutParams {
            elasticity: 1.0,
            ..LayoutParams::default()
        };
        let mut tree = PathTree::new(params);
        tree.add_entry("/a/f", &EntryMeta::default()).unwrap();
        tree.add_entry("/b/g", &EntryMeta::default()).unwrap();
        tree.logic(0.0);
        let a = tree.node_for_path("/a/").unwrap();
        let start = tree.node(a).unwrap().pos();
        tree.push_accel(a, Vec2::new(10.0, 0.0));
        tree.logic(0.5);
        // accel * dt plus the smoothed term (0 * 0.5 + 10 * 0.5).
        assert_eq!(tree.node(a).unwrap().pos(), start + Vec2::new(10.0, 0.0));
    }

    #[test]
    fn idle_entries_expire_and_are_removed() {
        let params = LayoutParams {
            entry_idle_time: 1.0,
            ..LayoutParams::default()
        };
        let mut tree = PathTree::new(params);
        let id = tree.add_entry("/a/f", &EntryMeta::default()).unwrap();
        tree.add_entry("/b/g", &EntryMeta::default()).unwrap();
        assert_eq!(tree.logic(1.5), 0);
        tree.touch_entry(id, MODIFY_COLOR);
        assert_eq!(tree.logic(1.0), 1, "only the untouched entry expires");
        let gone = tree.remove_expired();
        assert_eq!(gone.len(), 1);
        assert_ne!(gone[0], id);
        assert!(tree.is_entry_alive(id));
        assert_invariants(&tree);
        assert!(tree.node_for_path("/b/").is_none());
    }

    #[test]
    fn faded_entries_are_removed_after_a_second() {
        let mut tree = PathTree::default();
        let id = add(&mut tree, "/a/f");
        add(&mut tree, "/b/g");
        assert!(tree.fade_entry(id));
        assert_eq!(tree.logic(0.5), 0);
        assert!(tree.entry(id).unwrap().is_fading());
        assert_eq!(tree.logic(0.5), 1);
        assert_eq!(tree.remove_expired(), vec![id]);
        assert_invariants(&tree);
        assert!(tree.node_for_path("/a/").is_none());
        assert!(!tree.fade_entry(id), "stale ids are refused");
    }

    #[test]
    fn node_color_brightens_after_changes() {
        let mut tree = PathTree::default();
        let id = add(&mut tree, "/a/Makefile");
        add(&mut tree, "/b/Makefile");
        for _ in 0..10 {
            tree.logic(1.0);
        }
        let a = tree.node_for_path("/a/").unwrap();
        let dim = tree.node(a).unwrap().color();
        assert!((dim.r - 0.6).abs() < 1e-9, "brightness floors at 0.6, got {dim:?}");
        assert_eq!(tree.average_entry_color(tree.root()), Color::WHITE);

        // A fresh change with a white flash: (1 + 1) / 2.
        tree.touch_entry(id, Color::WHITE);
        tree.logic(0.0);
        assert_eq!(tree.node(a).unwrap().color(), Color::WHITE);
        assert_eq!(tree.node(a).unwrap().alpha(), 1.0);
    }

    #[test]
    fn queries() {
        let mut tree = PathTree::default();
        add(&mut tree, "/foo/bar1/x");
        add(&mut tree, "/foo/bar2/y");
        add(&mut tree, "/other/z");
        let found: Vec<&str> = tree
            .find_dirs("/foo/")
            .into_iter()
            .map(|id| path_of(&tree, id))
            .collect();
        assert_eq!(found, vec!["/foo/"]);
        assert!(tree.is_dir("/foo"));
        assert!(tree.is_dir("/foo/bar1"));
        assert!(!tree.is_dir("/foo/bar1/x"));
        assert!(!tree.is_dir("/fo"));

        let foo = tree.node_for_path("/foo/").unwrap();
        assert_eq!(tree.entries_recursive(foo).len(), 2);
        assert_eq!(tree.entries_recursive(tree.root()).len(), 3);
        let bar1 = tree.node_for_path("/foo/bar1/").unwrap();
        assert!(tree.is_ancestor_of(tree.root(), bar1));
        assert!(tree.is_ancestor_of(foo, bar1));
        assert!(!tree.is_ancestor_of(bar1, foo));

        let x = tree.entry_for_path("/foo/bar1/x").unwrap();
        let pos = tree.entry(x).unwrap().absolute_pos(&tree);
        assert_eq!(pos, Some(tree.node(bar1).unwrap().pos()));
    }

    #[test]
    fn rotation_about_the_root() {
        let mut tree = PathTree::default();
        add(&mut tree, "/a/f");
        add(&mut tree, "/b/g");
        tree.logic(0.0);
        let a = tree.node_for_path("/a/").unwrap();
        let before = tree.node(a).unwrap().pos();
        tree.rotate(PI, Point::ZERO);
        let after = tree.node(a).unwrap().pos();
        assert!((after.x + before.x).abs() < 1e-9 && (after.y + before.y).abs() < 1e-9);
    }

    #[test]
    fn frustum_flags_follow_bounds() {
        let mut tree = PathTree::default();
        add(&mut tree, "/a/f");
        tree.update_bounds();
        tree.check_frustum(&Bounds2D::from_centre_radius(Point::ZERO, 1.0));
        assert!(tree.node(tree.root()).unwrap().is_in_frustum());
        tree.check_frustum(&Bounds2D::from_centre_radius(Point::new(500.0, 0.0), 1.0));
        assert!(!tree.node(tree.root()).unwrap().is_in_frustum());
    }

    #[test]
    fn stale_node_ids_do_not_alias() {
        let mut tree = PathTree::default();
        add(&mut tree, "/keep/k");
        let x = add(&mut tree, "/x/f");
        let old = tree.node_for_path("/x/").unwrap();
        tree.remove_entry(x);
        add(&mut tree, "/y/f");
        let new = tree.node_for_path("/y/").unwrap();
        assert!(!tree.is_alive(old));
        assert!(tree.node(old).is_none());
        assert_ne!(old, new);
    }
}
