// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Users: agents that walk to the entries they change.
//!
//! A user keeps two queues. Pending actions wait until the user is within beam distance of
//! the target (or the action has lagged too long); active actions progress every tick and
//! touch their target the moment they start. Removals fade their target out when they
//! finish. While working, a user is drawn toward its
//! targets and keeps some distance from other users.

use kurbo::{Point, Vec2};
use rand::Rng;
use sylva_index::Bounds2D;
use sylva_tree::{CREATE_COLOR, Color, EntryId, MODIFY_COLOR, PathTree, REMOVE_COLOR, random_unit};

use crate::settings::Settings;

/// Active actions that pull on a user at once.
const MAX_INFLUENCE: usize = 3;
/// Rate of actions started because they lagged behind.
const LAGGED_ACTION_RATE: f64 = 2.0;
/// Seconds before a new user looks for its first nearby target.
const FIRST_ACTION_INTERVAL: f64 = 0.2;

/// Handle of a user. Ids are never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub(crate) u32);

/// What an action does to its target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// Reveal a newly added entry.
    Create,
    /// Flash an existing entry and optionally recolor it.
    Modify,
    /// Flash an entry, then fade it out once the action finishes.
    Remove,
}

impl ActionKind {
    /// Color flashed on the target unless the event names one.
    pub fn default_color(self) -> Color {
        match self {
            Self::Create => CREATE_COLOR,
            Self::Modify => MODIFY_COLOR,
            Self::Remove => REMOVE_COLOR,
        }
    }
}

/// A queued change by a user to one entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    target: EntryId,
    kind: ActionKind,
    color: Color,
    entry_color: Option<Color>,
    added: f64,
    progress: f64,
    rate: f64,
    started: bool,
}

impl Action {
    pub(crate) fn new(
        target: EntryId,
        kind: ActionKind,
        color: Option<Color>,
        entry_color: Option<Color>,
        added: f64,
        rate: f64,
    ) -> Self {
        Self {
            target,
            kind,
            color: color.unwrap_or_else(|| kind.default_color()),
            entry_color,
            added,
            progress: 0.0,
            rate,
            started: false,
        }
    }

    /// The entry acted on.
    pub fn target(&self) -> EntryId {
        self.target
    }

    /// Kind of change.
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Flash color, also used for the beam between user and target.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Simulation time the action was queued.
    pub fn added_time(&self) -> f64 {
        self.added
    }

    /// Completion in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Whether the action is done.
    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }

    fn logic(&mut self, dt: f64, pending: usize, tree: &mut PathTree) {
        if self.is_finished() {
            return;
        }
        if !self.started {
            self.started = true;
            tree.touch_entry(self.target, self.color);
            if let Some(color) = self.entry_color {
                tree.set_entry_color(self.target, color);
            }
        }
        let rate = (self.rate * (pending as f64).max(1.0)).min(10.0);
        self.progress = (self.progress + rate * dt).min(1.0);
        if self.kind == ActionKind::Remove && self.is_finished() {
            tree.fade_entry(self.target);
        }
    }
}

/// An agent making changes to the tree.
#[derive(Clone, Debug)]
pub struct User {
    name: String,
    pub(crate) pos: Point,
    pub(crate) accel: Vec2,
    color: Color,
    pending: Vec<Action>,
    active: Vec<Action>,
    elapsed: f64,
    last_action: f64,
    action_interval: f64,
}

impl User {
    pub(crate) fn new(name: String, pos: Point) -> Self {
        let color = Color::from_hash(&name).lerp(Color::WHITE, 0.4).scale(0.9);
        Self {
            name,
            pos,
            accel: Vec2::ZERO,
            color,
            pending: Vec::new(),
            active: Vec::new(),
            elapsed: 0.0,
            last_action: 0.0,
            action_interval: FIRST_ACTION_INTERVAL,
        }
    }

    /// Display name; also the key events use to find the user.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// World position.
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Current acceleration.
    pub fn accel(&self) -> Vec2 {
        self.accel
    }

    /// Color derived from the name.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Actions waiting for the user to get close.
    pub fn pending_actions(&self) -> &[Action] {
        &self.pending
    }

    /// Actions in progress.
    pub fn active_actions(&self) -> &[Action] {
        &self.active
    }

    /// Pending plus active actions.
    pub fn action_count(&self) -> usize {
        self.pending.len() + self.active.len()
    }

    /// Whether the user has nothing to do.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.active.is_empty()
    }

    /// Whether the user has been idle long enough to fade out.
    pub fn is_fading(&self, settings: &Settings) -> bool {
        self.is_idle() && self.idle_for() > settings.user_idle_time
    }

    /// Whether the user has been idle long enough to be removed.
    pub fn is_inactive(&self, settings: &Settings) -> bool {
        self.is_idle() && self.idle_for() > settings.user_inactive_time
    }

    /// Opacity: fades over one second once idle past `user_idle_time`.
    pub fn alpha(&self, settings: &Settings) -> f64 {
        let over = self.idle_for() - settings.user_idle_time;
        if over > 0.0 { 1.0 - over.min(1.0) } else { 1.0 }
    }

    /// Region the user occupies in the user partition.
    pub fn bounds(&self, settings: &Settings) -> Bounds2D {
        Bounds2D::from_centre_radius(self.pos, settings.user_size * 0.5)
    }

    fn idle_for(&self) -> f64 {
        self.elapsed - self.last_action
    }

    pub(crate) fn queue(&mut self, action: Action) {
        self.pending.push(action);
    }

    /// Forget actions on entries that no longer exist. Returns how many were dropped.
    pub(crate) fn drop_stale_actions(&mut self, tree: &PathTree) -> usize {
        let before = self.action_count();
        self.pending.retain(|a| tree.is_entry_alive(a.target));
        self.active.retain(|a| tree.is_entry_alive(a.target));
        before - self.action_count()
    }

    /// Distance this user wants from others. Shrinks while there is work to walk to.
    pub(crate) fn personal_space(&self, settings: &Settings) -> f64 {
        if self.is_idle() {
            settings.personal_space
        } else if !self.pending.is_empty() && self.active.is_empty() {
            settings.personal_space * 0.1
        } else {
            settings.personal_space * 0.5
        }
    }

    /// Repulsion from `other`, applied to `self`.
    pub(crate) fn push_from<R: Rng + ?Sized>(
        &self,
        other: &Self,
        settings: &Settings,
        rng: &mut R,
    ) -> Vec2 {
        let dir = other.pos - self.pos;
        let distance = dir.hypot();
        if distance < 1e-3 {
            return random_unit(rng);
        }
        let desired = self.personal_space(settings);
        if distance < desired {
            dir / distance * (distance - desired)
        } else {
            Vec2::ZERO
        }
    }

    /// Pull toward the targets being worked on, or the first pending one.
    pub(crate) fn apply_action_forces<R: Rng + ?Sized>(
        &mut self,
        tree: &PathTree,
        settings: &Settings,
        rng: &mut R,
    ) {
        if self.is_idle() {
            return;
        }
        self.last_action = self.elapsed;

        let targets: Vec<EntryId> = if self.active.is_empty() {
            self.pending.iter().take(1).map(Action::target).collect()
        } else {
            self.active
                .iter()
                .take(MAX_INFLUENCE)
                .map(Action::target)
                .collect()
        };
        for target in targets {
            if let Some(at) = target_pos(tree, target) {
                self.accel += action_push(self.pos, at, settings, rng);
            }
        }
    }

    /// Promote and progress actions, then move.
    pub(crate) fn logic(&mut self, time: f64, dt: f64, tree: &mut PathTree, settings: &Settings) {
        self.elapsed += dt;
        self.action_interval -= dt;

        let find_nearby = !self.pending.is_empty() && self.action_interval <= 0.0;
        let mut i = 0;
        while i < self.pending.len() {
            let lag = settings.max_action_lag;
            if lag >= 0.0 && self.pending[i].added < time - lag {
                let mut action = self.pending.remove(i);
                action.rate = LAGGED_ACTION_RATE;
                self.active.push(action);
                continue;
            }
            if !find_nearby {
                break;
            }
            let in_range = target_pos(tree, self.pending[i].target)
                .is_some_and(|at| (at - self.pos).hypot() < settings.beam_distance);
            if in_range {
                let action = self.pending.remove(i);
                self.active.push(action);
                break;
            }
            i += 1;
        }

        if self.action_interval <= 0.0 {
            let total = self.action_count();
            self.action_interval = if total > 0 { 1.0 / total as f64 } else { 1.0 };
        }

        let pending = self.pending.len();
        for action in &mut self.active {
            action.logic(dt, pending, tree);
        }
        self.active.retain(|a| !a.is_finished());

        let speed = settings.user_speed;
        if self.accel.hypot2() > speed * speed {
            self.accel = self.accel.normalize() * speed;
        }
        self.pos += self.accel * dt;
        self.accel *= (1.0 - settings.user_friction * dt).max(0.0);
    }
}

fn target_pos(tree: &PathTree, target: EntryId) -> Option<Point> {
    tree.entry(target)?.absolute_pos(tree)
}

/// Keep between action and beam distance of a target.
fn action_push<R: Rng + ?Sized>(
    pos: Point,
    target: Point,
    settings: &Settings,
    rng: &mut R,
) -> Vec2 {
    let dir = target - pos;
    let distance = dir.hypot();
    if distance < 1e-3 {
        return random_unit(rng);
    }
    let unit = dir / distance;
    if distance < settings.action_distance {
        unit * (distance - settings.action_distance)
    } else if distance > settings.beam_distance {
        unit * (distance - settings.beam_distance)
    } else {
        Vec2::ZERO
    }
}
