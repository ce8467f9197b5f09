//! Pose geometry: per-segment render transforms from a [`PoseFrame`].
//!
//! Every joint-to-joint span becomes a [`Segment`] carrying what a renderer
//! needs to place an up-aligned primitive (a cylinder, say) along it:
//! midpoint, length, and the rotation carrying world up onto the span.
//!
//! # Degenerate spans
//!
//! The rotation axis is `up × span`.  When the span is parallel or
//! antiparallel to up (a vertical tibia) or has zero length, that cross
//! product vanishes.  The axis then falls back to world `+X`, which is
//! orthogonal to up, so the rotation by `0` or `π` is still exact.  Zero
//! length spans get the identity rotation.

use nalgebra::{Unit, UnitQuaternion, Vector3};
use tracing::trace;

use crate::frame::{Joint, PoseFrame};

/// Below this norm the rotation axis is treated as undefined.
const AXIS_EPSILON: f64 = 1e-12;

/// World up; index 1 of every joint is height.
pub fn world_up() -> Unit<Vector3<f64>> {
    Vector3::y_axis()
}

/// Rotation axis used when `up × span` vanishes.
pub fn fallback_axis() -> Unit<Vector3<f64>> {
    Vector3::x_axis()
}

// ════════════════════════════════════════════════════════════════════════════
// Segment
// ════════════════════════════════════════════════════════════════════════════

/// One joint-to-joint span with its derived transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub start:       Joint,
    pub end:         Joint,
    pub midpoint:    Joint,
    pub length:      f64,
    /// Unit rotation axis, `normalize(up × (end − start))` or the fallback.
    pub normal:      Unit<Vector3<f64>>,
    /// Angle between up and the span, in `[0, π]`.
    pub angle:       f64,
    pub orientation: UnitQuaternion<f64>,
    /// Only ever set on the distal-most span of a leg.
    pub is_ground_contact: bool,
}

impl Segment {
    pub fn between(start: Joint, end: Joint) -> Self {
        let span     = end - start;
        let length   = span.norm();
        let midpoint = start + span / 2.0;
        let cross    = world_up().cross(&span);

        // atan2 keeps precision near 0 and π, and is 0 for a zero span.
        let angle  = cross.norm().atan2(span.y);
        let normal = Unit::try_new(cross, AXIS_EPSILON).unwrap_or_else(fallback_axis);
        let orientation = UnitQuaternion::from_axis_angle(&normal, angle);

        Segment {
            start,
            end,
            midpoint,
            length,
            normal,
            angle,
            orientation,
            is_ground_contact: false,
        }
    }

    /// Unit direction recovered from the transform (`orientation · up`).
    pub fn direction(&self) -> Vector3<f64> {
        self.orientation * world_up().into_inner()
    }

    /// Where an up-aligned primitive of this length ends up when placed at
    /// `midpoint` with `orientation`; equals `(start, end)` up to rounding.
    pub fn axis_endpoints(&self) -> (Joint, Joint) {
        let half = self.direction() * (self.length / 2.0);
        (self.midpoint - half, self.midpoint + half)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Geometry output
// ════════════════════════════════════════════════════════════════════════════

/// Chassis outline as pairs of leg indices whose root joints are joined.
pub const CHASSIS_EDGES: [(usize, usize); 8] = [
    (0, 1), (1, 2), (2, 5), (5, 4), (4, 3), (3, 0), (0, 5), (2, 3),
];

/// The chassis edge marking the robot's front.
pub const HEADING_EDGE: (usize, usize) = (3, 0);

#[derive(Clone, Debug, PartialEq)]
pub struct ChassisEdge {
    pub legs:    (usize, usize),
    pub segment: Segment,
    pub heading: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LegGeometry {
    /// Proximal first.
    pub segments: Vec<Segment>,
}

impl LegGeometry {
    pub fn foot_contact(&self) -> bool {
        self.segments.last().is_some_and(|s| s.is_ground_contact)
    }
}

/// Everything the renderer draws for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseGeometry {
    /// Whole-body rotation applied on top of every segment.
    pub body_rotation: UnitQuaternion<f64>,
    pub chassis:       Vec<ChassisEdge>,
    pub legs:          Vec<LegGeometry>,
}

impl PoseGeometry {
    pub fn contact_count(&self) -> usize {
        self.legs.iter().filter(|l| l.foot_contact()).count()
    }

    /// Where a pose point is drawn once the body rotation is applied.
    pub fn place(&self, p: &Joint) -> Joint {
        self.body_rotation.transform_vector(p)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PoseGeometryEngine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryConfig {
    /// A foot touches the ground when `|height| ≤ contact_tolerance`.
    /// `0.0` means exact equality with zero.
    pub contact_tolerance: f64,
    /// Tilt the whole body so the plane through the three lowest feet is
    /// level.  Off means the identity rotation.
    pub level_body: bool,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        GeometryConfig { contact_tolerance: 0.0, level_body: false }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PoseGeometryEngine {
    config: GeometryConfig,
}

impl PoseGeometryEngine {
    pub fn new(config: GeometryConfig) -> Self {
        PoseGeometryEngine { config }
    }

    pub fn config(&self) -> &GeometryConfig { &self.config }

    pub fn set_level_body(&mut self, on: bool) {
        self.config.level_body = on;
    }

    pub fn is_ground_contact(&self, foot: &Joint) -> bool {
        foot.y.abs() <= self.config.contact_tolerance
    }

    /// Build every segment for one frame.
    pub fn compute(&self, frame: &PoseFrame) -> PoseGeometry {
        let legs: Vec<LegGeometry> = frame.legs().iter()
            .map(|leg| {
                let mut segments: Vec<Segment> = leg.spans()
                    .map(|(s, e)| Segment::between(*s, *e))
                    .collect();
                if let Some(distal) = segments.last_mut() {
                    distal.is_ground_contact = self.is_ground_contact(&distal.end);
                }
                LegGeometry { segments }
            })
            .collect();

        let roots = frame.legs();
        let chassis = CHASSIS_EDGES.iter()
            .map(|&(a, b)| ChassisEdge {
                legs:    (a, b),
                segment: Segment::between(*roots[a].root(), *roots[b].root()),
                heading: (a, b) == HEADING_EDGE,
            })
            .collect();

        let body_rotation = if self.config.level_body {
            level_rotation(frame)
        } else {
            UnitQuaternion::identity()
        };

        let geometry = PoseGeometry { body_rotation, chassis, legs };
        trace!(contacts = geometry.contact_count(), "pose geometry computed");
        geometry
    }
}

/// Rotation that levels the plane through the three lowest feet.
///
/// Identity when the feet are collinear or coincide.
pub fn level_rotation(frame: &PoseFrame) -> UnitQuaternion<f64> {
    let mut feet: Vec<Joint> = frame.legs().iter().map(|l| *l.foot()).collect();
    feet.sort_by(|a, b| a.y.total_cmp(&b.y));

    let (p0, p1, p2) = (feet[0], feet[1], feet[2]);
    let Some(normal) = Unit::try_new((p1 - p0).cross(&(p2 - p0)), AXIS_EPSILON) else {
        return UnitQuaternion::identity();
    };
    let normal = if normal.y < 0.0 { -normal } else { normal };

    UnitQuaternion::rotation_between_axis(&normal, &world_up())
        .unwrap_or_else(UnitQuaternion::identity)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
