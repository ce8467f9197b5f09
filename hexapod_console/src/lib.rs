//! # hexapod_console
//!
//! Operator console for a six-legged walking robot.  Two WebSocket channels
//! connect it to the robot: telemetry comes in on the monitor channel and is
//! drawn as a live pose, and control packets go out on the control channel
//! whenever a drive-panel widget moves.
//!
//! ## Drive panel → packet mapping
//!
//! | Widget | Field |
//! |---|---|
//! | STEP joystick | `step` (or `speed` under the `drive` profile) |
//! | BODY OFFSET joystick | `body_offset.x/y` |
//! | BODY ROTATION joystick | `body_rotation_angle`, `body_rotation_axis` |
//! | Vertical slider | `step_height_weight` |
//! | Horizontal slider | `turn_angle` (negated) |
//!
//! ## Keys
//!
//! | Key | Action |
//! |---|---|
//! | Click a leg | Toggle its selection |
//! | `Escape` | Deselect every leg |
//! | `L` | Body leveling on/off |
//! | `Q` | Quit |

pub mod selection;
pub mod controls;
pub mod scene;
pub mod visualizer;
pub mod app;
