// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulation settings.

use sylva_tree::LayoutParams;

/// Everything a [`Simulation`](crate::Simulation) can be tuned with.
///
/// Every field has a default, so a settings file only needs the values it changes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Directory sizing, entry motion, and the force model.
    pub layout: LayoutParams,
    /// Longest step a single tick integrates, in seconds.
    pub max_tick: f64,
    /// Cap on a user's acceleration magnitude.
    pub user_speed: f64,
    /// Fraction of a user's acceleration shed per second.
    pub user_friction: f64,
    /// Width of the box a user occupies in the user partition.
    pub user_size: f64,
    /// Distance users keep from each other while idle.
    pub personal_space: f64,
    /// Users back off from a target closer than this.
    pub action_distance: f64,
    /// Users are drawn toward a target farther than this, and start work on targets within it.
    pub beam_distance: f64,
    /// Seconds without work before a user starts to fade.
    pub user_idle_time: f64,
    /// Seconds without work before a user is removed.
    pub user_inactive_time: f64,
    /// Progress per second of a user action.
    pub action_rate: f64,
    /// Pending actions older than this many seconds start immediately, at a faster rate.
    /// Negative disables the catch-up.
    pub max_action_lag: f64,
    /// Seed for the generator that breaks ties between coincident nodes and users.
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layout: LayoutParams::default(),
            max_tick: 1.0 / 60.0,
            user_speed: 500.0,
            user_friction: 1.0,
            user_size: 20.0,
            personal_space: 100.0,
            action_distance: 50.0,
            beam_distance: 100.0,
            user_idle_time: 3.0,
            user_inactive_time: 10.0,
            action_rate: 0.5,
            max_action_lag: 5.0,
            seed: 0,
        }
    }
}

impl Settings {
    /// Clamp a frame delta to `0..=max_tick`.
    pub fn clamp_dt(&self, dt: f64) -> f64 {
        if dt.is_nan() {
            return 0.0;
        }
        dt.clamp(0.0, self.max_tick.max(0.0))
    }
}
