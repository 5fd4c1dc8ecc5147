// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=sylva_tree --heading-base-level=0

//! Sylva Tree: a self-restructuring directory tree with a force-directed layout.
//!
//! Files arrive one path at a time. The tree keeps one node per directory that holds files
//! (plus the forks needed to join them), so single-child chains like `/a/b/c/` collapse to
//! the deepest directory that matters. Adding and removing paths restructures the tree:
//!
//! - The root forks when a path outside it arrives, and moves while it is empty.
//! - A new directory that prefixes existing siblings adopts them.
//! - Siblings sharing a longer prefix are grouped under an intermediate node.
//! - Removing the last file of a directory prunes every node left empty.
//!
//! Each node is a disc sized by the area of its visible files and its children. Files sit on
//! concentric rings around their directory. A force pass ([`forces::apply_forces`]) pushes
//! overlapping discs apart, pulls children toward their parent's rim, and spreads siblings;
//! [`PathTree::logic`] integrates the result.
//!
//! - [`PathTree`]: the arena-backed tree and its queries.
//! - [`PathEvent`]: add, remove, and touch events, applied with [`PathTree::apply`].
//! - [`LayoutParams`]: sizing and force tuning.
//! - [`forces`]: partition building and force accumulation.
//!
//! # Example
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//! use sylva_tree::{PathEvent, PathTree, forces};
//!
//! let mut tree = PathTree::default();
//! for path in ["/src/main.c", "/src/util/str.c", "/docs/guide.md"] {
//!     tree.apply(&PathEvent::add(path)).unwrap();
//! }
//! assert_eq!(tree.node(tree.root()).unwrap().path(), "/");
//! assert!(tree.node_for_path("/src/util/").is_some());
//!
//! let mut rng = SmallRng::seed_from_u64(7);
//! for _ in 0..10 {
//!     let partition = forces::build_partition(&mut tree);
//!     forces::apply_forces(&mut tree, &partition, &mut rng);
//!     tree.logic(1.0 / 60.0);
//! }
//!
//! tree.apply(&PathEvent::remove("/docs/guide.md")).unwrap();
//! assert!(tree.node_for_path("/docs/").is_none());
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs in positions or parameters.

mod arena;
mod util;

pub mod entry;
pub mod events;
pub mod forces;
pub mod node;
pub mod params;
pub mod path;
pub mod tree;
pub mod types;

pub use entry::{CREATE_COLOR, Entry, EntryMeta, MODIFY_COLOR, REMOVE_COLOR};
pub use events::{EventError, PathEvent};
pub use forces::{ForceStats, apply_forces, build_partition, sibling_spacing};
pub use node::DirNode;
pub use params::LayoutParams;
pub use tree::{PathTree, ring_slot_direction};
pub use types::{Color, EntryFlags, EntryId, NodeFlags, NodeId};
pub use util::random_unit;
