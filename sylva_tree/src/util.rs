// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::TAU;

use kurbo::{Point, Vec2};
use rand::Rng;

/// Unit vector along `v`, or zero for a (near) zero-length input.
pub(crate) fn normalize_or_zero(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len < 1e-12 { Vec2::ZERO } else { v / len }
}

/// A uniformly distributed unit vector.
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    Vec2::from_angle(rng.gen_range(0.0..TAU))
}

/// Rotate `p` about `centre` by `angle` radians.
pub(crate) fn rotate_about(p: Point, centre: Point, angle: f64) -> Point {
    let (s, c) = angle.sin_cos();
    let d = p - centre;
    centre + Vec2::new(d.x * c - d.y * s, d.x * s + d.y * c)
}
