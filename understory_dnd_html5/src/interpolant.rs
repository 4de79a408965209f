// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic cubic interpolation.
//!
//! Used to place the drag preview: an anchor fraction in `[0, 1]` maps
//! smoothly over "dock to the start edge", "align at the center" and "dock to
//! the end edge" offsets without overshooting between them.
//!
//! ```
//! use understory_dnd_html5::interpolant::MonotonicInterpolant;
//!
//! let curve = MonotonicInterpolant::new(&[(0.0, 10.0), (0.5, 20.0), (1.0, 40.0)]);
//! assert_eq!(curve.interpolate(0.5), 20.0);
//! let y = curve.interpolate(0.25);
//! assert!(y > 10.0 && y < 20.0);
//! ```

use alloc::vec::Vec;

/// A piecewise cubic through a set of control points that preserves
/// monotonicity between them (Fritsch–Carlson style slopes).
#[derive(Clone, Debug, PartialEq)]
pub struct MonotonicInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
    c1s: Vec<f64>,
    c2s: Vec<f64>,
    c3s: Vec<f64>,
}

impl MonotonicInterpolant {
    /// Precomputes the spline through `points`.
    ///
    /// Points are sorted by `x` first; their order in the slice does not
    /// matter.
    ///
    /// # Panics
    ///
    /// Panics if fewer than two points are given.
    #[must_use]
    pub fn new(points: &[(f64, f64)]) -> Self {
        assert!(
            points.len() >= 2,
            "an interpolant needs at least two control points"
        );
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        let xs: Vec<f64> = sorted.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = sorted.iter().map(|p| p.1).collect();

        let mut dxs = Vec::with_capacity(xs.len() - 1);
        let mut ms = Vec::with_capacity(xs.len() - 1);
        for i in 0..xs.len() - 1 {
            let dx = xs[i + 1] - xs[i];
            let dy = ys[i + 1] - ys[i];
            dxs.push(dx);
            ms.push(dy / dx);
        }

        // Degree-1 coefficients: zero at local extrema, otherwise a weighted
        // harmonic mean of the neighbouring secants.
        let mut c1s = Vec::with_capacity(xs.len());
        c1s.push(ms[0]);
        for i in 0..dxs.len() - 1 {
            let m = ms[i];
            let m_next = ms[i + 1];
            if m * m_next <= 0.0 {
                c1s.push(0.0);
            } else {
                let dx = dxs[i];
                let dx_next = dxs[i + 1];
                let common = dx + dx_next;
                c1s.push(3.0 * common / ((common + dx_next) / m + (common + dx) / m_next));
            }
        }
        c1s.push(ms[ms.len() - 1]);

        let mut c2s = Vec::with_capacity(dxs.len());
        let mut c3s = Vec::with_capacity(dxs.len());
        for i in 0..c1s.len() - 1 {
            let m = ms[i];
            let c1 = c1s[i];
            let inv_dx = 1.0 / dxs[i];
            let common = c1 + c1s[i + 1] - m - m;
            c2s.push((m - c1 - common) * inv_dx);
            c3s.push(common * inv_dx * inv_dx);
        }

        Self {
            xs,
            ys,
            c1s,
            c2s,
            c3s,
        }
    }

    /// Evaluates the spline at `x`.
    ///
    /// Control points are reproduced exactly. Outside the control range the
    /// outermost cubic segment is extended.
    #[must_use]
    pub fn interpolate(&self, x: f64) -> f64 {
        let last = self.xs.len() - 1;
        if x == self.xs[last] {
            return self.ys[last];
        }

        let mut low: isize = 0;
        let mut high: isize = self.c3s.len() as isize - 1;
        while low <= high {
            let mid = (low + high) / 2;
            let here = self.xs[mid as usize];
            if here < x {
                low = mid + 1;
            } else if here > x {
                high = mid - 1;
            } else {
                return self.ys[mid as usize];
            }
        }
        let i = high.max(0) as usize;

        let diff = x - self.xs[i];
        let diff_sq = diff * diff;
        self.ys[i] + self.c1s[i] * diff + self.c2s[i] * diff_sq + self.c3s[i] * diff * diff_sq
    }
}
