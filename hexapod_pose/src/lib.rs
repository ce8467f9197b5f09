//! # hexapod_pose
//!
//! Turn hexapod leg telemetry into something a renderer can draw.
//!
//! * [`frame`] — the validated six-leg [`PoseFrame`] and its wire shape.
//! * [`decoder`] — [`TelemetryDecoder`], which parses inbound JSON and drops
//!   frames that are structurally identical to the last one.
//! * [`geometry`] — [`PoseGeometryEngine`], which turns each joint-to-joint
//!   span into a [`Segment`] (midpoint, length, orientation, ground contact)
//!   and outlines the chassis.
//!
//! ## Quick start
//!
//! ```rust
//! use hexapod_pose::{TelemetryDecoder, PoseGeometryEngine, FrameUpdate};
//!
//! let leg = "[[0,0.03,0],[0,0.08,0.03],[0,0,0.07]]";
//! let msg = format!("{{\"legs\": [{l},{l},{l},{l},{l},{l}]}}", l = leg);
//!
//! let mut decoder = TelemetryDecoder::new();
//! assert_eq!(decoder.ingest(&msg), FrameUpdate::Changed);
//! assert_eq!(decoder.ingest(&msg), FrameUpdate::Unchanged);
//!
//! let geometry = PoseGeometryEngine::default().compute(decoder.current().unwrap());
//! assert_eq!(geometry.contact_count(), 6);
//! ```

pub mod decoder;
pub mod error;
pub mod frame;
pub mod geometry;

pub use decoder::{DecoderStats, FrameUpdate, TelemetryDecoder};
pub use error::{DecodeError, Result};
pub use frame::{Joint, Leg, PoseFrame, TelemetryPayload, LEG_COUNT, MAX_JOINTS, MIN_JOINTS};
pub use geometry::{
    level_rotation, world_up, ChassisEdge, GeometryConfig, LegGeometry, PoseGeometry,
    PoseGeometryEngine, Segment, CHASSIS_EDGES, HEADING_EDGE,
};
