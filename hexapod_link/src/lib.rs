//! # hexapod_link
//!
//! The console's connection to the robot.
//!
//! * [`command`] — the canonical [`ControlCommand`] and the
//!   [`CommandProfile`]s that decide which of its fields are transmitted.
//! * [`encoder`] — [`CommandEncoder`], which maps widget output onto the
//!   command and sends the whole snapshot on every change.
//! * [`transport`] — the [`Transport`] trait and [`WsChannel`], a WebSocket
//!   running on its own I/O thread.
//!
//! ## Quick start
//!
//! ```rust
//! use hexapod_input::Position;
//! use hexapod_link::{CommandEncoder, CommandProfile, NullTransport, SendOutcome};
//!
//! // No robot attached: updates are applied but never sent.
//! let mut enc = CommandEncoder::new(NullTransport, CommandProfile::gait());
//! assert_eq!(enc.set_step(Position::new(0.0, 1.0)), SendOutcome::Dropped);
//! assert_eq!(enc.command().step.y, 1.0);
//! ```
//!
//! ```rust,no_run
//! use hexapod_link::{CommandEncoder, CommandProfile, WsChannel};
//!
//! let control = WsChannel::open("ws://localhost:8081").unwrap();
//! let mut enc = CommandEncoder::new(control, CommandProfile::gait());
//! enc.set_turn(0.5);
//! ```

pub mod command;
pub mod encoder;
pub mod error;
pub mod transport;

pub use command::{BodyRotation, CommandProfile, ControlCommand, Field, Vec2, Vec3, SCHEMA_VERSION};
pub use encoder::{CommandEncoder, EncoderStats, SendOutcome, GROUND_SPEED_SCALE, YAW_RATE_SCALE};
pub use error::{LinkError, Result};
pub use transport::{ChannelState, NullTransport, Transport, WsChannel};
