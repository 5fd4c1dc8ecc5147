// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Entries: the files attached to directory nodes.

use kurbo::{Point, Vec2};

use crate::params::LayoutParams;
use crate::path::{extension, split_entry_path};
use crate::tree::PathTree;
use crate::types::{Color, EntryFlags, NodeId};

/// Color an entry flashes when it is created.
pub const CREATE_COLOR: Color = Color::new(0.0, 1.0, 0.0);
/// Color an entry flashes when it is modified.
pub const MODIFY_COLOR: Color = Color::new(1.0, 0.7, 0.3);
/// Color an entry flashes when it is removed.
pub const REMOVE_COLOR: Color = Color::new(1.0, 0.0, 0.0);

/// Metadata carried by path events.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryMeta {
    /// Resting color. When `None`, new entries are colored by a hash of their extension.
    pub color: Option<Color>,
    /// Name of the user responsible for the change, if any.
    pub user: Option<String>,
    /// Color to flash on this change. Defaults depend on the event kind.
    pub action_color: Option<Color>,
    /// Create the entry hidden; it takes no space until first touched.
    pub hidden: bool,
}

impl EntryMeta {
    /// Metadata attributing the change to `user`.
    pub fn by(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            ..Self::default()
        }
    }

    /// Set the resting color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the flash color.
    #[must_use]
    pub fn with_action_color(mut self, color: Color) -> Self {
        self.action_color = Some(color);
        self
    }

    /// Create the entry hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// A file in the tree.
///
/// Entries sit on concentric rings around their directory node. Their position is kept
/// relative to that node; see [`Entry::absolute_pos`].
#[derive(Clone, Debug)]
pub struct Entry {
    path: String,
    dir_len: usize,
    extension: Option<String>,
    pub(crate) node: Option<NodeId>,
    pub(crate) pos: Vec2,
    pub(crate) dest: Vec2,
    pub(crate) distance: f64,
    pub(crate) color: Color,
    pub(crate) touch_color: Color,
    pub(crate) flags: EntryFlags,
    elapsed: f64,
    last_touch: f64,
    fade_start: Option<f64>,
}

impl Entry {
    /// Build a detached entry. `path` must name a file (checked by the caller).
    pub(crate) fn new(path: String, meta: &EntryMeta) -> Option<Self> {
        let (dir, name) = split_entry_path(&path)?;
        let dir_len = dir.len();
        let extension = extension(name).map(String::from);
        let color = meta.color.unwrap_or_else(|| match &extension {
            Some(ext) => Color::from_hash(ext),
            None => Color::WHITE,
        });
        let mut flags = EntryFlags::empty();
        if meta.hidden {
            flags |= EntryFlags::HIDDEN;
        }
        Some(Self {
            path,
            dir_len,
            extension,
            node: None,
            pos: Vec2::ZERO,
            dest: Vec2::ZERO,
            distance: 0.0,
            color,
            touch_color: meta.action_color.unwrap_or(CREATE_COLOR),
            flags,
            elapsed: 0.0,
            last_touch: 0.0,
            fade_start: None,
        })
    }

    /// Full path, e.g. `/src/main.rs`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Directory part of the path, with trailing `/`.
    pub fn dir(&self) -> &str {
        &self.path[..self.dir_len]
    }

    /// File name.
    pub fn name(&self) -> &str {
        &self.path[self.dir_len..]
    }

    /// Extension of the file name, if any.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// The directory node holding this entry.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Offset from the owning node's position.
    pub fn local_pos(&self) -> Vec2 {
        self.pos
    }

    /// Unit direction of the ring slot.
    pub fn dest(&self) -> Vec2 {
        self.dest
    }

    /// Ring radius of the slot.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// World position: node position plus local offset.
    pub fn absolute_pos(&self, tree: &PathTree) -> Option<Point> {
        let node = tree.node(self.node?)?;
        Some(node.pos() + self.pos)
    }

    /// State bits.
    pub fn flags(&self) -> EntryFlags {
        self.flags
    }

    /// Whether the entry is hidden.
    pub fn is_hidden(&self) -> bool {
        self.flags.contains(EntryFlags::HIDDEN)
    }

    /// Whether the entry has faded out and awaits removal.
    pub fn is_expired(&self) -> bool {
        self.flags.contains(EntryFlags::EXPIRED)
    }

    /// Resting color.
    pub fn base_color(&self) -> Color {
        self.color
    }

    /// Current color: the touch color decays into the resting color over one second.
    pub fn color(&self) -> Color {
        let since = self.elapsed - self.last_touch;
        if since < 1.0 {
            self.touch_color.lerp(self.color, since.max(0.0))
        } else {
            self.color
        }
    }

    /// Current opacity. Falls from `1.0` to `0.0` over the second after fading starts.
    pub fn alpha(&self) -> f64 {
        match self.fade_start {
            Some(start) => 1.0 - (self.elapsed - start).clamp(0.0, 1.0),
            None => 1.0,
        }
    }

    /// Whether the entry is fading out.
    pub fn is_fading(&self) -> bool {
        self.fade_start.is_some()
    }

    /// Record a touch. Returns `true` if the entry was hidden until now.
    pub(crate) fn touch(&mut self, color: Color) -> bool {
        self.fade_start = None;
        self.last_touch = self.elapsed;
        self.touch_color = color;
        self.flags.remove(EntryFlags::EXPIRED);
        let revealed = self.is_hidden();
        self.flags.remove(EntryFlags::HIDDEN);
        revealed
    }

    /// Start the one-second fade that ends in expiry. A running fade is left alone.
    pub(crate) fn start_fade(&mut self) {
        if self.fade_start.is_none() {
            self.fade_start = Some(self.elapsed);
        }
    }

    /// Advance by `dt`. Returns `true` the frame the entry expires.
    pub(crate) fn logic(&mut self, dt: f64, params: &LayoutParams) -> bool {
        self.elapsed += dt;

        // Ease toward the ring slot without momentum.
        let delta = self.dest * self.distance - self.pos;
        let mut step = delta * (params.entry_speed * dt);
        if step.hypot2() > delta.hypot2() {
            step = delta;
        }
        self.pos += step;

        if self.is_hidden() {
            self.elapsed = 0.0;
            self.last_touch = 0.0;
            return false;
        }

        if self.fade_start.is_none()
            && params.entry_idle_time > 0.0
            && self.elapsed - self.last_touch > params.entry_idle_time
        {
            self.fade_start = Some(self.elapsed);
        }

        if let Some(start) = self.fade_start
            && !self.is_expired()
            && self.elapsed - start >= 1.0
        {
            self.flags.insert(EntryFlags::EXPIRED);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> Entry {
        Entry::new(path.into(), &EntryMeta::default()).unwrap()
    }

    #[test]
    fn path_parts() {
        let e = entry("/src/lib.rs");
        assert_eq!(e.dir(), "/src/");
        assert_eq!(e.name(), "lib.rs");
        assert_eq!(e.extension(), Some("rs"));
        assert!(Entry::new("/src/".into(), &EntryMeta::default()).is_none());
    }

    #[test]
    fn extension_colors_are_shared() {
        assert_eq!(entry("/a/x.rs").base_color(), entry("/b/y.rs").base_color());
        assert_eq!(entry("/a/Makefile").base_color(), Color::WHITE);
    }

    #[test]
    fn touch_color_decays() {
        let mut e = entry("/a/x.rs");
        let params = LayoutParams::default();
        assert_eq!(e.color(), CREATE_COLOR);
        e.logic(0.5, &params);
        assert_eq!(e.color(), CREATE_COLOR.lerp(e.base_color(), 0.5));
        e.logic(0.6, &params);
        assert_eq!(e.color(), e.base_color());
    }

    #[test]
    fn idle_entries_fade_then_expire() {
        let params = LayoutParams {
            entry_idle_time: 2.0,
            ..LayoutParams::default()
        };
        let mut e = entry("/a/x.rs");
        assert!(!e.logic(2.5, &params));
        assert!(e.is_fading());
        assert_eq!(e.alpha(), 1.0);
        assert!(!e.logic(0.5, &params));
        assert!((e.alpha() - 0.5).abs() < 1e-9);
        assert!(e.logic(0.5, &params), "expires one second after fading starts");
        assert!(!e.logic(0.5, &params), "expiry is reported once");

        e.touch(MODIFY_COLOR);
        assert!(!e.is_expired() && !e.is_fading(), "touch revives");
    }

    #[test]
    fn explicit_fade_ignores_idle_time() {
        let params = LayoutParams {
            entry_idle_time: 0.0,
            ..LayoutParams::default()
        };
        let mut e = entry("/a/x.rs");
        e.logic(0.25, &params);
        e.start_fade();
        assert!(e.is_fading());
        assert!(!e.logic(0.5, &params));
        e.start_fade();
        assert!(e.logic(0.5, &params), "a second call does not restart the fade");
        assert!(e.is_expired());
    }

    #[test]
    fn moves_toward_ring_slot_without_overshoot() {
        let params = LayoutParams::default();
        let mut e = entry("/a/x.rs");
        e.dest = Vec2::new(1.0, 0.0);
        e.distance = 8.0;
        e.logic(0.1, &params);
        assert!((e.pos.x - 4.0).abs() < 1e-9, "half way at speed 5, dt 0.1");
        e.logic(1.0, &params);
        assert_eq!(e.pos, Vec2::new(8.0, 0.0));
    }

    #[test]
    fn hidden_entries_never_fade() {
        let params = LayoutParams {
            entry_idle_time: 1.0,
            ..LayoutParams::default()
        };
        let mut e = Entry::new("/a/x".into(), &EntryMeta::default().hidden()).unwrap();
        for _ in 0..10 {
            assert!(!e.logic(1.0, &params));
        }
        assert!(e.touch(MODIFY_COLOR), "first touch reveals");
        assert!(!e.touch(MODIFY_COLOR));
    }
}
