// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the path tree: identifiers, flags, and colors.

/// Identifier for a directory node in a [`PathTree`](crate::PathTree).
///
/// This is a small, copyable handle that stays stable while the node lives but becomes
/// invalid when the node is pruned. It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On creation, a fresh slot is allocated with generation `1`.
/// - On pruning, the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Stale `NodeId`s never alias a different live node because the generation must match.
/// Use [`PathTree::is_alive`](crate::PathTree::is_alive) to check liveness.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Identifier for an entry (file) in a [`PathTree`](crate::PathTree).
///
/// Generational like [`NodeId`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntryId(pub(crate) u32, pub(crate) u32);

impl EntryId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-node state bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// The node has held a visible entry since it last became empty.
        const VISIBLE    = 0b0000_0001;
        /// The node's bounds intersected the viewport at the last frustum check.
        const IN_FRUSTUM = 0b0000_0010;
        /// The node has been given its initial position next to its parent.
        const POSITIONED = 0b0000_0100;
    }
}

bitflags::bitflags! {
    /// Per-entry state bits.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EntryFlags: u8 {
        /// The entry takes no space and is not drawn.
        const HIDDEN  = 0b0000_0001;
        /// The entry has fully faded out and will be removed at the next tick boundary.
        const EXPIRED = 0b0000_0010;
    }
}

/// Linear RGB color with components in `0.0..=1.0`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    /// Black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    /// White.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    /// Create a color from components.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Multiply every component by `s`.
    pub fn scale(self, s: f64) -> Self {
        Self::new(self.r * s, self.g * s, self.b * s)
    }

    /// Linear interpolation: `t == 0` gives `self`, `t == 1` gives `other`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Component-wise sum.
    pub fn add(self, other: Self) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    /// A stable color derived from a string, used for extension coloring.
    pub fn from_hash(s: &str) -> Self {
        let h = crate::path::hash_str(s);
        let channel = |shift: u32| f64::from((h >> shift) & 0xff) / 255.0;
        // Keep colors away from black so entries stay readable.
        Self::new(channel(0), channel(8), channel(16)).lerp(Self::WHITE, 0.25)
    }
}
