// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout tuning knobs.

use core::f64::consts::PI;

/// Parameters for sizing, placement, and the force model.
///
/// All fields have working defaults; see [`LayoutParams::default`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutParams {
    /// Diameter of one entry. Sets the area an entry contributes and the ring spacing.
    pub entry_diameter: f64,
    /// Multiplier applied to every node radius.
    pub dir_padding: f64,
    /// Floor for the unpadded radius, so no node is ever degenerate.
    pub min_radius: f64,
    /// Strength of the pull toward the parent's rim.
    pub gravity: f64,
    /// Velocity smoothing. `0.0` disables it.
    pub elasticity: f64,
    /// How quickly entries ease toward their ring slot.
    pub entry_speed: f64,
    /// Seconds without a touch before an entry fades out. `0.0` keeps entries forever.
    pub entry_idle_time: f64,
    /// Maximum depth of the neighbor partition once the layout has spread out.
    pub max_partition_depth: usize,
    /// Items per partition leaf before it splits.
    pub partition_leaf_items: usize,
    /// Extent area above which the partition may grow past depth 1.
    pub deep_partition_area: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            entry_diameter: 8.0,
            dir_padding: 1.5,
            min_radius: 1.0,
            gravity: 10.0,
            elasticity: 0.0,
            entry_speed: 5.0,
            entry_idle_time: 60.0,
            max_partition_depth: 6,
            partition_leaf_items: 1,
            deep_partition_area: 10_000.0,
        }
    }
}

impl LayoutParams {
    /// Area one visible entry contributes to its directory.
    pub fn entry_area(&self) -> f64 {
        let r = self.entry_diameter * 0.5;
        r * r * PI
    }

    /// Partition depth to use for a layout spanning `extent_area`.
    ///
    /// While everything is still bunched together a single leaf is cheaper than subdividing.
    pub fn partition_depth(&self, extent_area: f64) -> usize {
        if extent_area > self.deep_partition_area {
            self.max_partition_depth
        } else {
            1
        }
    }
}
