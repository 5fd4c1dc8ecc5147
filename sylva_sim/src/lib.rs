// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=sylva_sim --heading-base-level=0

//! Sylva Sim: the per-tick pipeline around a [`sylva_tree::PathTree`].
//!
//! A [`Simulation`] owns the tree, the users acting on it, and the partitions rebuilt every
//! tick. Producers queue [`PathEvent`](sylva_tree::PathEvent)s; each [`Simulation::tick`]
//! applies them in order, runs user and directory forces, integrates, and refreshes the
//! visible node set.
//!
//! Events that carry a user name are attributed to a [`User`], created on first sight.
//! New files stay hidden until their user walks within beam distance and starts the
//! action; users idle for long enough fade and are removed.
//!
//! # Example
//!
//! ```rust
//! use sylva_sim::{Settings, Simulation};
//! use sylva_tree::{EntryMeta, PathEvent};
//!
//! let mut sim = Simulation::new(Settings { seed: 42, ..Settings::default() });
//! sim.push_event(PathEvent::add("/src/main.c"));
//! sim.push_event(PathEvent::Add {
//!     path: "/src/util.c".into(),
//!     meta: EntryMeta::by("ana"),
//! });
//!
//! let stats = sim.tick(1.0 / 60.0);
//! assert_eq!(stats.events_applied, 2);
//! assert_eq!(stats.users, 1);
//! assert!(sim.user_by_name("ana").is_some());
//! ```
//!
//! With the `serde` feature, [`Settings`] (including its layout parameters) can be loaded
//! from any serde format; missing fields keep their defaults.

mod settings;
mod simulation;
mod users;

pub use settings::Settings;
pub use simulation::{Simulation, TickStats};
pub use users::{Action, ActionKind, User, UserId};
