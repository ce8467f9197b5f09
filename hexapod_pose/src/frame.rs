//! Pose frames: one snapshot of every leg's joint positions.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};

pub const LEG_COUNT:  usize = 6;
pub const MIN_JOINTS: usize = 3;
pub const MAX_JOINTS: usize = 4;

/// A joint position in meters, world frame, Y up.
pub type Joint = Vector3<f64>;

// ════════════════════════════════════════════════════════════════════════════
// Wire shape
// ════════════════════════════════════════════════════════════════════════════

/// The telemetry message exactly as it travels: `{ "legs": [[[x, y, z]]] }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPayload {
    pub legs: Vec<Vec<[f64; 3]>>,
}

// ════════════════════════════════════════════════════════════════════════════
// Leg
// ════════════════════════════════════════════════════════════════════════════

/// An ordered joint chain from body (proximal) to foot (distal).
#[derive(Clone, Debug, PartialEq)]
pub struct Leg {
    joints: Vec<Joint>,
}

impl Leg {
    fn from_wire(index: usize, raw: Vec<[f64; 3]>) -> Result<Self> {
        if !(MIN_JOINTS..=MAX_JOINTS).contains(&raw.len()) {
            return Err(DecodeError::JointCount {
                leg:   index,
                found: raw.len(),
                min:   MIN_JOINTS,
                max:   MAX_JOINTS,
            });
        }
        let joints = raw.into_iter().enumerate()
            .map(|(j, [x, y, z])| {
                if x.is_finite() && y.is_finite() && z.is_finite() {
                    Ok(Joint::new(x, y, z))
                } else {
                    Err(DecodeError::NonFinite { leg: index, joint: j })
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Leg { joints })
    }

    pub fn joints(&self) -> &[Joint] { &self.joints }

    /// The joint where the leg attaches to the body.
    pub fn root(&self) -> &Joint {
        &self.joints[0]
    }

    /// The terminal (distal-most) joint.
    pub fn foot(&self) -> &Joint {
        &self.joints[self.joints.len() - 1]
    }

    /// Consecutive `(start, end)` joint pairs, proximal first.
    pub fn spans(&self) -> impl Iterator<Item = (&Joint, &Joint)> + '_ {
        self.joints.windows(2).map(|w| (&w[0], &w[1]))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PoseFrame
// ════════════════════════════════════════════════════════════════════════════

/// A complete, validated snapshot of all six legs.
///
/// Frames are immutable; a newer frame replaces an older one wholesale.
/// Equality is full structural equality over every coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseFrame {
    legs: [Leg; LEG_COUNT],
}

impl PoseFrame {
    /// Parse and validate one telemetry message.
    pub fn from_json(payload: &str) -> Result<Self> {
        let wire: TelemetryPayload = serde_json::from_str(payload)?;
        Self::try_from(wire)
    }

    pub fn legs(&self) -> &[Leg; LEG_COUNT] { &self.legs }

    pub fn leg(&self, index: usize) -> Option<&Leg> {
        self.legs.get(index)
    }

    /// Back to the wire shape (used for fixtures and logging).
    pub fn to_payload(&self) -> TelemetryPayload {
        TelemetryPayload {
            legs: self.legs.iter()
                .map(|leg| leg.joints.iter().map(|j| [j.x, j.y, j.z]).collect())
                .collect(),
        }
    }
}

impl TryFrom<TelemetryPayload> for PoseFrame {
    type Error = DecodeError;

    fn try_from(wire: TelemetryPayload) -> Result<Self> {
        let found = wire.legs.len();
        let legs = wire.legs.into_iter().enumerate()
            .map(|(i, raw)| Leg::from_wire(i, raw))
            .collect::<Result<Vec<_>>>()?;
        let legs: [Leg; LEG_COUNT] = legs.try_into()
            .map_err(|_| DecodeError::LegCount { expected: LEG_COUNT, found })?;
        Ok(PoseFrame { legs })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
