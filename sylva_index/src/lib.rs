// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=sylva_index --heading-base-level=0

//! Sylva Index: bounding regions and a quad-tree for neighbor queries.
//!
//! Sylva Index is the spatial building block of the Sylva layout engine.
//!
//! - [`Bounds2D`] is an axis-aligned region that grows point by point.
//! - [`QuadTree`] stores items with bounds and answers region, point, and visibility queries.
//!
//! The quad-tree is built for a rebuild-every-frame workflow: insert the live item set,
//! query it while computing forces, then drop it. There is no removal or update.
//!
//! # Example
//!
//! ```rust
//! use sylva_index::{Bounds2D, QuadTree};
//! use kurbo::Point;
//!
//! let world = Bounds2D::from_points(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
//! let mut tree = QuadTree::new(world, 6, 1);
//! tree.insert("a", Bounds2D::from_centre_radius(Point::new(10.0, 10.0), 2.0));
//! tree.insert("b", Bounds2D::from_centre_radius(Point::new(90.0, 90.0), 2.0));
//!
//! let near_a: Vec<_> = tree
//!     .items_in_bounds(&Bounds2D::from_centre_radius(Point::new(12.0, 12.0), 3.0))
//!     .collect();
//! assert_eq!(near_a, vec!["a"]);
//! ```
//!
//! ## Straddling items
//!
//! When a leaf splits, each of its items moves into every quadrant its bounds overlap.
//! An item near a split line therefore lives in several leaves, and a region query can
//! report it more than once. Deduplicate with a visited set when accumulating effects:
//!
//! ```rust
//! use std::collections::HashSet;
//! use sylva_index::{Bounds2D, QuadTree};
//! use kurbo::Point;
//!
//! let world = Bounds2D::from_points(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
//! let mut tree = QuadTree::new(world, 2, 1);
//! tree.insert(1_u32, Bounds2D::from_centre_radius(Point::new(50.0, 50.0), 5.0));
//! tree.insert(2_u32, Bounds2D::from_centre_radius(Point::new(10.0, 10.0), 1.0));
//!
//! let mut seen = HashSet::new();
//! tree.visit_items_in_bounds(&world, |item| {
//!     seen.insert(item);
//! });
//! assert_eq!(seen.len(), 2);
//! assert!(tree.item_count() > 2);
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs in coordinates.

pub mod bounds;
pub mod quadtree;

pub use bounds::Bounds2D;
pub use quadtree::{QuadTree, QuadTreeStats};
