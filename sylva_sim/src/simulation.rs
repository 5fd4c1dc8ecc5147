// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tick orchestration.
//!
//! ## Tick order
//!
//! 1. Apply queued events in arrival order.
//! 2. Remove expired entries and forget user actions on them.
//! 3. Recompute the directory and user extents.
//! 4. Rebuild the user partition; apply user-user and user-target forces.
//! 5. Advance users: start, progress, and finish actions; move; drop inactive users.
//! 6. Rebuild the directory partition and accumulate directory forces.
//! 7. Integrate directories and entries.
//! 8. Rebuild the directory partition from the moved nodes and recompute visibility
//!    against the viewport.

use std::collections::{BTreeMap, VecDeque};

use hashbrown::{HashMap, HashSet};
use kurbo::{Point, Vec2};
use log::{debug, trace, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sylva_index::{Bounds2D, QuadTree, QuadTreeStats};
use sylva_tree::{
    DirNode, EntryMeta, EventError, NodeId, PathEvent, PathTree, apply_forces, build_partition,
};

use crate::settings::Settings;
use crate::users::{Action, ActionKind, User, UserId};

/// Counters from one [`Simulation::tick`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TickStats {
    /// Integrated step, after clamping.
    pub dt: f64,
    /// Events applied this tick.
    pub events_applied: usize,
    /// Events rejected this tick (logged at `warn`).
    pub events_rejected: usize,
    /// Expired entries removed at the start of the tick.
    pub entries_expired: usize,
    /// User actions dropped because their target went away.
    pub actions_dropped: usize,
    /// Users removed for inactivity.
    pub users_removed: usize,
    /// Live directory nodes after the tick.
    pub nodes: usize,
    /// Live entries after the tick.
    pub entries: usize,
    /// Live users after the tick.
    pub users: usize,
    /// Shape of the directory partition.
    pub partition: QuadTreeStats,
    /// Shape of the user partition.
    pub user_partition: QuadTreeStats,
    /// Directory neighbor candidates examined.
    pub dir_inner_loops: usize,
    /// User neighbor candidates examined.
    pub user_inner_loops: usize,
    /// Nodes listed by [`Simulation::visible_nodes`].
    pub visible_nodes: usize,
}

/// A path tree, its users, and the per-tick pipeline that moves them.
///
/// Producers hand events to [`Simulation::push_event`]; nothing changes until the next
/// [`Simulation::tick`].
#[derive(Debug)]
pub struct Simulation {
    settings: Settings,
    tree: PathTree,
    users: BTreeMap<UserId, User>,
    user_names: HashMap<String, UserId>,
    next_user: u32,
    events: VecDeque<PathEvent>,
    partition: QuadTree<NodeId>,
    user_partition: QuadTree<UserId>,
    viewport: Option<Bounds2D>,
    visible: Vec<NodeId>,
    dir_bounds: Bounds2D,
    user_bounds: Bounds2D,
    rng: SmallRng,
    time: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Simulation {
    /// An empty simulation.
    pub fn new(settings: Settings) -> Self {
        let unit = Bounds2D::from_centre_radius(Point::ZERO, 1.0);
        Self {
            tree: PathTree::new(settings.layout.clone()),
            rng: SmallRng::seed_from_u64(settings.seed),
            settings,
            users: BTreeMap::new(),
            user_names: HashMap::new(),
            next_user: 0,
            events: VecDeque::new(),
            partition: QuadTree::new(unit, 1, 1),
            user_partition: QuadTree::new(unit, 1, 1),
            viewport: None,
            visible: Vec::new(),
            dir_bounds: Bounds2D::new(),
            user_bounds: Bounds2D::new(),
            time: 0.0,
        }
    }

    /// Settings in use.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The directory tree.
    pub fn tree(&self) -> &PathTree {
        &self.tree
    }

    /// Mutable access to the tree, e.g. for [`PathTree::rotate`].
    pub fn tree_mut(&mut self) -> &mut PathTree {
        &mut self.tree
    }

    /// Simulated seconds so far.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Queue an event for the next tick.
    pub fn push_event(&mut self, event: PathEvent) {
        self.events.push_back(event);
    }

    /// Events waiting for the next tick.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Live users in creation order.
    pub fn users(&self) -> impl Iterator<Item = (UserId, &User)> + '_ {
        self.users.iter().map(|(id, u)| (*id, u))
    }

    /// A user, if still live.
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// The live user with this name.
    pub fn user_by_name(&self, name: &str) -> Option<UserId> {
        self.user_names.get(name).copied()
    }

    /// Restrict [`Simulation::visible_nodes`] to nodes overlapping `viewport`.
    ///
    /// Takes effect at the next tick.
    pub fn set_viewport(&mut self, viewport: Bounds2D) {
        self.viewport = Some(viewport);
    }

    /// Stop culling; every partitioned node counts as visible.
    pub fn clear_viewport(&mut self) {
        self.viewport = None;
    }

    /// The viewport, if set.
    pub fn viewport(&self) -> Option<Bounds2D> {
        self.viewport
    }

    /// Non-empty nodes in view as of the last tick, each listed once.
    pub fn visible_nodes(&self) -> &[NodeId] {
        &self.visible
    }

    /// Directory partition over node positions at the end of the last tick. See
    /// [`QuadTree::node_bounds`] for outlines.
    pub fn partition(&self) -> &QuadTree<NodeId> {
        &self.partition
    }

    /// User partition from the last tick.
    pub fn user_partition(&self) -> &QuadTree<UserId> {
        &self.user_partition
    }

    /// Extent of visible directory positions, as of the last tick.
    pub fn dir_bounds(&self) -> Bounds2D {
        self.dir_bounds
    }

    /// Extent of busy user positions, as of the last tick.
    pub fn user_bounds(&self) -> Bounds2D {
        self.user_bounds
    }

    /// Advance by `dt` seconds, clamped to [`Settings::max_tick`].
    pub fn tick(&mut self, dt: f64) -> TickStats {
        let dt = self.settings.clamp_dt(dt);
        self.time += dt;
        let mut stats = TickStats {
            dt,
            ..TickStats::default()
        };

        while let Some(event) = self.events.pop_front() {
            match self.apply_event(&event) {
                Ok(()) => stats.events_applied += 1,
                Err(err) => {
                    warn!("rejected {} event: {err}", event_kind(&event));
                    stats.events_rejected += 1;
                }
            }
        }

        stats.entries_expired = self.tree.remove_expired().len();
        for user in self.users.values_mut() {
            stats.actions_dropped += user.drop_stale_actions(&self.tree);
        }

        self.update_bounds();
        stats.user_inner_loops = self.interact_users();
        stats.users_removed = self.update_users(dt);

        self.partition = build_partition(&mut self.tree);
        let forces = apply_forces(&mut self.tree, &self.partition, &mut self.rng);
        stats.dir_inner_loops = forces.inner_loops;
        self.tree.logic(dt);
        self.update_visibility();

        stats.nodes = self.tree.total_dir_count();
        stats.entries = self.tree.total_entry_count();
        stats.users = self.users.len();
        stats.partition = self.partition.stats();
        stats.user_partition = self.user_partition.stats();
        stats.visible_nodes = self.visible.len();
        trace!("{stats:?}");
        stats
    }

    fn apply_event(&mut self, event: &PathEvent) -> Result<(), EventError> {
        let Some(name) = event.meta().user.as_deref() else {
            return self.tree.apply(event).map(drop);
        };

        let (target, kind, meta) = match event {
            PathEvent::Add { path, meta } => match self.tree.entry_for_path(path) {
                Some(id) => (id, ActionKind::Modify, meta),
                None => {
                    // Stays hidden until the user's action reaches it.
                    let hidden = EntryMeta {
                        hidden: true,
                        ..meta.clone()
                    };
                    (self.tree.add_entry(path, &hidden)?, ActionKind::Create, meta)
                }
            },
            PathEvent::Touch { path, meta } => match self.tree.entry_for_path(path) {
                Some(id) => (id, ActionKind::Modify, meta),
                // Let the tree report why.
                None => return self.tree.apply(event).map(drop),
            },
            PathEvent::Remove { path, meta } => match self.tree.entry_for_path(path) {
                Some(id) => (id, ActionKind::Remove, meta),
                None => return self.tree.apply(event).map(drop),
            },
        };

        let entry_color = match kind {
            ActionKind::Modify => meta.color,
            ActionKind::Create | ActionKind::Remove => None,
        };
        let action = Action::new(
            target,
            kind,
            meta.action_color,
            entry_color,
            self.time,
            self.settings.action_rate,
        );
        let user = self.user_for(name);
        if let Some(user) = self.users.get_mut(&user) {
            user.queue(action);
        }
        Ok(())
    }

    fn user_for(&mut self, name: &str) -> UserId {
        if let Some(id) = self.user_names.get(name) {
            return *id;
        }
        let pos = if self.dir_bounds.area() > 0.0 {
            self.dir_bounds.centre()
        } else {
            Point::ZERO
        };
        let id = UserId(self.next_user);
        self.next_user += 1;
        debug!("added user {name} at {pos:?}");
        self.users.insert(id, User::new(name.to_owned(), pos));
        self.user_names.insert(name.to_owned(), id);
        id
    }

    fn update_bounds(&mut self) {
        self.dir_bounds = self.tree.visible_extent();
        self.user_bounds.reset();
        for user in self.users.values() {
            if !user.is_idle() {
                self.user_bounds.update(user.pos());
            }
        }
    }

    /// Rebuild the user partition and accumulate user forces. Returns the candidate count.
    fn interact_users(&mut self) -> usize {
        let mut bounds = self.user_bounds;
        bounds.expand(1.0);
        if !bounds.is_initialized() {
            bounds = Bounds2D::from_centre_radius(self.dir_bounds.centre(), 1.0);
        }
        let layout = &self.settings.layout;
        self.user_partition = QuadTree::from_items(
            bounds,
            layout.partition_depth(self.dir_bounds.area()),
            layout.partition_leaf_items,
            self.users
                .iter()
                .map(|(id, u)| (*id, u.bounds(&self.settings))),
        );

        let ids: Vec<UserId> = self.users.keys().copied().collect();
        let mut loops = 0;
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for id in ids {
            let Some(user) = self.users.get(&id) else {
                continue;
            };
            seen.clear();
            candidates.clear();
            self.user_partition
                .visit_items_in_bounds(&user.bounds(&self.settings), |other| {
                    if other != id && seen.insert(other) {
                        candidates.push(other);
                    }
                });
            loops += candidates.len();

            let mut push = Vec2::ZERO;
            for other in &candidates {
                if let Some(other) = self.users.get(other) {
                    push += user.push_from(other, &self.settings, &mut self.rng);
                }
            }
            if let Some(user) = self.users.get_mut(&id) {
                user.accel += push;
                user.apply_action_forces(&self.tree, &self.settings, &mut self.rng);
            }
        }
        loops
    }

    /// Advance every user and drop inactive ones. Returns how many were dropped.
    fn update_users(&mut self, dt: f64) -> usize {
        let time = self.time;
        for user in self.users.values_mut() {
            user.logic(time, dt, &mut self.tree, &self.settings);
        }
        let inactive: Vec<UserId> = self
            .users
            .iter()
            .filter(|(_, u)| u.is_inactive(&self.settings))
            .map(|(id, _)| *id)
            .collect();
        for id in &inactive {
            if let Some(user) = self.users.remove(id) {
                debug!("removed inactive user {}", user.name());
                self.user_names.remove(user.name());
            }
        }
        inactive.len()
    }

    fn update_visibility(&mut self) {
        // Integration moved the nodes; query against where they are now.
        self.partition = build_partition(&mut self.tree);
        let mut seen = HashSet::new();
        let Some(viewport) = self.viewport else {
            self.visible = self
                .partition
                .items_visible(|_| true)
                .into_iter()
                .filter(|id| seen.insert(*id))
                .collect();
            return;
        };
        self.tree.check_frustum(&viewport);
        let tree = &self.tree;
        self.visible = self
            .partition
            .items_visible(|b| viewport.overlaps(b))
            .into_iter()
            .filter(|id| seen.insert(*id) && tree.node(*id).is_some_and(DirNode::is_in_frustum))
            .collect();
    }
}

fn event_kind(event: &PathEvent) -> &'static str {
    match event {
        PathEvent::Add { .. } => "add",
        PathEvent::Remove { .. } => "remove",
        PathEvent::Touch { .. } => "touch",
    }
}
