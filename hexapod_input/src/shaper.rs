//! Axis shaping: the pure mapping from a raw normalized pointer offset to a
//! bounded joystick [`Position`].
//!
//! The pipeline is, in order:
//!
//! 1. **Power curve** per axis, `f(v) = sign(v)·|v|^k`, with `k` taken from
//!    [`StickyAxis`].  Larger `k` pulls small deflections toward the axes,
//!    which makes it easy to drive straight.
//! 2. **Disk clamp**: anything outside the unit circle is rescaled onto it.
//! 3. **Deadzone** (optional): a small square around the origin snaps to
//!    exactly `(0, 0)`.

use serde::{Deserialize, Serialize};

/// Half-width of the center deadzone square.
pub const DEADZONE: f64 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// Position
// ════════════════════════════════════════════════════════════════════════════

/// A shaped joystick position.  Always inside the closed unit disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    /// Distance from the origin.
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn is_centered(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StickyAxis — the shaping exponent
// ════════════════════════════════════════════════════════════════════════════

/// How strongly the stick snaps toward its axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StickyAxis {
    /// Linear response, `k = 1`.
    Off,
    /// The stock pull, `k = 1.5`.
    On,
    /// Custom pull; `k = clamp(value + 1, 1, 2)`.
    Pull(f64),
}

impl StickyAxis {
    /// The power-curve exponent `k`, always in `[1, 2]`.
    pub fn exponent(self) -> f64 {
        match self {
            StickyAxis::Off => 1.0,
            StickyAxis::On  => 1.5,
            // NaN.clamp() stays NaN; treat it as "no pull".
            StickyAxis::Pull(v) if v.is_nan() => 1.0,
            StickyAxis::Pull(v) => (v + 1.0).clamp(1.0, 2.0),
        }
    }
}

impl Default for StickyAxis {
    fn default() -> Self {
        StickyAxis::Pull(0.5)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AxisShaper
// ════════════════════════════════════════════════════════════════════════════

/// Shaping parameters for one control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisShaper {
    pub sticky_axis:   StickyAxis,
    /// Snap the small square `|x|,|y| < deadzone` to the origin.
    pub center_return: bool,
    pub deadzone:      f64,
}

impl Default for AxisShaper {
    fn default() -> Self {
        AxisShaper {
            sticky_axis:   StickyAxis::default(),
            center_return: false,
            deadzone:      DEADZONE,
        }
    }
}

impl AxisShaper {
    pub fn new(sticky_axis: StickyAxis, center_return: bool) -> Self {
        AxisShaper { sticky_axis, center_return, deadzone: DEADZONE }
    }

    /// Use a custom deadzone half-width instead of [`DEADZONE`].
    pub fn with_deadzone(mut self, deadzone: f64) -> Self {
        self.deadzone = deadzone.abs();
        self
    }

    /// Shape a raw offset (nominally in `[-1, 1]` per axis) into a position
    /// on the closed unit disk.
    pub fn shape(&self, raw_x: f64, raw_y: f64) -> Position {
        let k = self.sticky_axis.exponent();
        let mut x = pull(sanitize(raw_x), k);
        let mut y = pull(sanitize(raw_y), k);

        let len = x.hypot(y);
        if len > 1.0 {
            x /= len;
            y /= len;
        }

        if self.center_return && x.abs() < self.deadzone && y.abs() < self.deadzone {
            return Position::ORIGIN;
        }

        Position { x, y }
    }
}

/// Shape with the default deadzone.  See [`AxisShaper::shape`].
pub fn shape(raw_x: f64, raw_y: f64, sticky_axis: StickyAxis, center_return: bool) -> Position {
    AxisShaper::new(sticky_axis, center_return).shape(raw_x, raw_y)
}

/// Odd, sign-preserving power curve.
fn pull(v: f64, k: f64) -> f64 {
    if v >= 0.0 { v.powf(k) } else { -(-v).powf(k) }
}

/// NaN reads as "no deflection"; infinities as a full-scale deflection.
fn sanitize(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else if v.is_infinite() {
        v.signum()
    } else {
        v
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const STICKIES: [StickyAxis; 5] = [
        StickyAxis::Off,
        StickyAxis::On,
        StickyAxis::Pull(0.0),
        StickyAxis::Pull(0.5),
        StickyAxis::Pull(3.0),
    ];

    fn grid() -> impl Iterator<Item = (f64, f64)> {
        (-20..=20).flat_map(|i| (-20..=20).map(move |j| (i as f64 / 10.0, j as f64 / 10.0)))
    }

    #[test]
    fn exponent_table() {
        assert_eq!(StickyAxis::Off.exponent(), 1.0);
        assert_eq!(StickyAxis::On.exponent(), 1.5);
        assert_eq!(StickyAxis::Pull(0.5).exponent(), 1.5);
        assert_eq!(StickyAxis::Pull(-4.0).exponent(), 1.0);
        assert_eq!(StickyAxis::Pull(9.0).exponent(), 2.0);
        assert_eq!(StickyAxis::Pull(f64::NAN).exponent(), 1.0);
    }

    #[test]
    fn stays_inside_unit_disk() {
        for sticky in STICKIES {
            for cr in [false, true] {
                for (x, y) in grid() {
                    let p = shape(x, y, sticky, cr);
                    assert!(p.magnitude() <= 1.0 + 1e-12, "{:?} from ({}, {})", p, x, y);
                }
            }
        }
    }

    #[test]
    fn shaping_is_odd() {
        for sticky in STICKIES {
            for (x, y) in grid() {
                let p = shape(x, y, sticky, false);
                let n = shape(-x, -y, sticky, false);
                assert_eq!(n.x, -p.x);
                assert_eq!(n.y, -p.y);
            }
        }
    }

    #[test]
    fn deadzone_snaps_to_exact_origin() {
        for sticky in STICKIES {
            for i in -9..=9 {
                for j in -9..=9 {
                    let p = shape(i as f64 / 100.0, j as f64 / 100.0, sticky, true);
                    assert_eq!(p, Position::ORIGIN);
                }
            }
        }
    }

    #[test]
    fn deadzone_only_when_enabled() {
        let p = shape(0.05, 0.0, StickyAxis::Off, false);
        assert_eq!(p.x, 0.05);
    }

    #[test]
    fn deadzone_needs_both_axes_small() {
        let p = shape(0.05, 0.5, StickyAxis::Off, true);
        assert_eq!(p, Position::new(0.05, 0.5));
    }

    #[test]
    fn sticky_half_example() {
        let p = shape(0.5, 0.5, StickyAxis::Pull(0.5), false);
        assert_abs_diff_eq!(p.x, 0.5_f64.powf(1.5), epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.353_553, epsilon = 1e-6);
        // magnitude ≈ 0.5, so no clamp was applied
        assert_abs_diff_eq!(p.magnitude(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn corner_clamps_onto_circle() {
        let p = shape(1.0, 1.0, StickyAxis::Off, false);
        assert_abs_diff_eq!(p.magnitude(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.x, std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn curve_is_monotonic_per_axis() {
        let mut last = f64::NEG_INFINITY;
        for i in -100..=100 {
            let p = shape(i as f64 / 100.0, 0.0, StickyAxis::On, false);
            assert!(p.x >= last);
            last = p.x;
        }
    }

    #[test]
    fn non_finite_input_is_bounded() {
        let p = shape(f64::NAN, 0.3, StickyAxis::Off, false);
        assert_eq!(p, Position::new(0.0, 0.3));
        let p = shape(f64::INFINITY, f64::NEG_INFINITY, StickyAxis::On, false);
        assert!(p.magnitude() <= 1.0 + 1e-12);
        assert!(p.x > 0.0 && p.y < 0.0);
    }

    #[test]
    fn position_wire_shape() {
        let p = Position::new(0.5, -0.25);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"x":0.5,"y":-0.25}"#);
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn sticky_axis_names() {
        assert_eq!(serde_json::to_string(&StickyAxis::On).unwrap(), r#""on""#);
        let pull: StickyAxis = serde_json::from_str(r#"{"pull":0.25}"#).unwrap();
        assert_eq!(pull, StickyAxis::Pull(0.25));
        assert_eq!(pull.exponent(), 1.25);
    }

    #[test]
    fn custom_deadzone() {
        let shaper = AxisShaper::new(StickyAxis::Off, true).with_deadzone(0.3);
        assert_eq!(shaper.shape(0.25, -0.2), Position::ORIGIN);
        assert_eq!(shaper.shape(0.35, 0.0), Position::new(0.35, 0.0));
    }
}
