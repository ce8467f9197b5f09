//! The control command and the profiles that decide what goes on the wire.
//!
//! There is one canonical [`ControlCommand`] holding every field any robot
//! firmware has ever understood.  A [`CommandProfile`] picks the subset a
//! particular deployment expects; fields outside the profile are simply
//! not serialized.

use serde::Serialize;

use crate::error::Result;

/// Version stamped into packets by profiles that carry one.
pub const SCHEMA_VERSION: u32 = 2;

// ════════════════════════════════════════════════════════════════════════════
// Vectors
// ════════════════════════════════════════════════════════════════════════════

/// Planar vector, serialized as `{"x": .., "y": ..}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self { Vec2 { x, y } }
}

/// Spatial vector, serialized as `{"x": .., "y": .., "z": ..}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self { Vec3 { x, y, z } }
}

/// Body tilt as an angle about an (unnormalized) axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyRotation {
    pub angle: f64,
    pub axis:  Vec3,
}

// ════════════════════════════════════════════════════════════════════════════
// ControlCommand
// ════════════════════════════════════════════════════════════════════════════

/// The full motion command.  Mutated field by field by the
/// [`CommandEncoder`](crate::CommandEncoder) and always sent whole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlCommand {
    /// Planar velocity (older `drive` firmware).
    pub speed:              Vec2,
    /// Planar step vector.
    pub step:               Vec2,
    /// Relative step height, `0.0..=2.0`.
    pub step_height_weight: f64,
    pub turn_angle:         f64,
    pub body_offset:        Vec3,
    pub body_rotation:      BodyRotation,
}

impl Default for ControlCommand {
    fn default() -> Self {
        ControlCommand {
            speed:              Vec2::default(),
            step:               Vec2::default(),
            step_height_weight: 0.5,
            turn_angle:         0.0,
            body_offset:        Vec3::default(),
            body_rotation:      BodyRotation::default(),
        }
    }
}

impl ControlCommand {
    /// Serialize the fields active in `profile` as one JSON object.
    pub fn to_json(&self, profile: &CommandProfile) -> Result<String> {
        Ok(serde_json::to_string(&Packet::view(self, profile))?)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Field / CommandProfile
// ════════════════════════════════════════════════════════════════════════════

/// One transmittable field of a [`ControlCommand`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Speed,
    Step,
    StepHeightWeight,
    TurnAngle,
    BodyOffset,
    BodyRotationAngle,
    BodyRotationAxis,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Speed,
        Field::Step,
        Field::StepHeightWeight,
        Field::TurnAngle,
        Field::BodyOffset,
        Field::BodyRotationAngle,
        Field::BodyRotationAxis,
    ];

    /// Key used in the JSON packet.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::Speed             => "speed",
            Field::Step              => "step",
            Field::StepHeightWeight  => "step_height_weight",
            Field::TurnAngle         => "turn_angle",
            Field::BodyOffset        => "body_offset",
            Field::BodyRotationAngle => "body_rotation_angle",
            Field::BodyRotationAxis  => "body_rotation_axis",
        }
    }
}

/// The set of fields a deployment transmits, plus an optional version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandProfile {
    name:    &'static str,
    fields:  Vec<Field>,
    version: Option<u32>,
}

impl CommandProfile {
    /// Current walking-gait firmware (the default).
    pub fn gait() -> Self {
        CommandProfile {
            name:    "gait",
            fields:  vec![
                Field::Step,
                Field::StepHeightWeight,
                Field::TurnAngle,
                Field::BodyOffset,
                Field::BodyRotationAngle,
                Field::BodyRotationAxis,
            ],
            version: None,
        }
    }

    /// Deprecated velocity-only firmware.
    pub fn drive() -> Self {
        CommandProfile {
            name:    "drive",
            fields:  vec![Field::Speed, Field::TurnAngle],
            version: None,
        }
    }

    /// Every field, version stamped.
    pub fn full() -> Self {
        CommandProfile {
            name:    "full",
            fields:  Field::ALL.to_vec(),
            version: Some(SCHEMA_VERSION),
        }
    }

    /// An arbitrary field set.  Duplicates are ignored.
    pub fn custom(fields: &[Field]) -> Self {
        let mut unique = Vec::with_capacity(fields.len());
        for &f in fields {
            if !unique.contains(&f) { unique.push(f); }
        }
        CommandProfile { name: "custom", fields: unique, version: None }
    }

    /// Look up a shipped profile by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "gait"  => Some(Self::gait()),
            "drive" => Some(Self::drive()),
            "full"  => Some(Self::full()),
            _       => None,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn name(&self) -> &'static str { self.name }
    pub fn fields(&self) -> &[Field] { &self.fields }
    pub fn version(&self) -> Option<u32> { self.version }

    pub fn includes(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }
}

impl Default for CommandProfile {
    fn default() -> Self { Self::gait() }
}

// ════════════════════════════════════════════════════════════════════════════
// Packet — the serialized view
// ════════════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct Packet<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    speed:               Option<&'a Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    step:                Option<&'a Vec2>,
    #[serde(skip_serializing_if = "Option::is_none")]
    step_height_weight:  Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    turn_angle:          Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body_offset:         Option<&'a Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body_rotation_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body_rotation_axis:  Option<&'a Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version:             Option<u32>,
}

impl<'a> Packet<'a> {
    fn view(cmd: &'a ControlCommand, profile: &CommandProfile) -> Self {
        let pick = |f: Field| profile.includes(f);
        Packet {
            speed:               pick(Field::Speed).then_some(&cmd.speed),
            step:                pick(Field::Step).then_some(&cmd.step),
            step_height_weight:  pick(Field::StepHeightWeight).then_some(cmd.step_height_weight),
            turn_angle:          pick(Field::TurnAngle).then_some(cmd.turn_angle),
            body_offset:         pick(Field::BodyOffset).then_some(&cmd.body_offset),
            body_rotation_angle: pick(Field::BodyRotationAngle).then_some(cmd.body_rotation.angle),
            body_rotation_axis:  pick(Field::BodyRotationAxis).then_some(&cmd.body_rotation.axis),
            version:             profile.version,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn parsed(cmd: &ControlCommand, profile: &CommandProfile) -> Value {
        serde_json::from_str(&cmd.to_json(profile).unwrap()).unwrap()
    }

    #[test]
    fn default_gait_packet() {
        let v = parsed(&ControlCommand::default(), &CommandProfile::gait());
        assert_eq!(v, json!({
            "step": { "x": 0.0, "y": 0.0 },
            "step_height_weight": 0.5,
            "turn_angle": 0.0,
            "body_offset": { "x": 0.0, "y": 0.0, "z": 0.0 },
            "body_rotation_angle": 0.0,
            "body_rotation_axis": { "x": 0.0, "y": 0.0, "z": 0.0 }
        }));
    }

    #[test]
    fn drive_profile_omits_gait_fields() {
        let mut cmd = ControlCommand::default();
        cmd.speed = Vec2::new(0.25, -0.5);
        cmd.turn_angle = 0.3;
        let v = parsed(&cmd, &CommandProfile::drive());
        assert_eq!(v, json!({ "speed": { "x": 0.25, "y": -0.5 }, "turn_angle": 0.3 }));
    }

    #[test]
    fn full_profile_carries_everything_and_version() {
        let v = parsed(&ControlCommand::default(), &CommandProfile::full());
        let obj = v.as_object().unwrap();
        for f in Field::ALL {
            assert!(obj.contains_key(f.wire_name()), "missing {}", f.wire_name());
        }
        assert_eq!(obj["version"], json!(SCHEMA_VERSION));
        assert_eq!(obj.len(), Field::ALL.len() + 1);
    }

    #[test]
    fn custom_profile_deduplicates() {
        let p = CommandProfile::custom(&[Field::Step, Field::Step, Field::TurnAngle]);
        assert_eq!(p.fields(), &[Field::Step, Field::TurnAngle]);
        let v = parsed(&ControlCommand::default(), &p.with_version(7));
        assert_eq!(v, json!({ "step": { "x": 0.0, "y": 0.0 }, "turn_angle": 0.0, "version": 7 }));
    }

    #[test]
    fn profiles_by_name() {
        assert_eq!(CommandProfile::by_name("drive"), Some(CommandProfile::drive()));
        assert_eq!(CommandProfile::by_name("full").unwrap().version(), Some(SCHEMA_VERSION));
        assert!(CommandProfile::by_name("legacy").is_none());
        assert_eq!(CommandProfile::default().name(), "gait");
    }
}
