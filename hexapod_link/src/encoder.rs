//! Control inputs in, whole-command packets out.
//!
//! Each setter maps one widget's output onto the [`ControlCommand`] and then
//! tries to send the entire snapshot.  If the channel is not open the update
//! is dropped; nothing is queued and nothing is retried.  The command itself
//! still changes, so the next packet that does get through carries it.

use std::f64::consts::PI;

use hexapod_input::Position;
use tracing::{debug, trace, warn};

use crate::command::{CommandProfile, ControlCommand, Vec2};
use crate::transport::Transport;

/// Ground speed (m/s) at full step deflection, for the live preview.
pub const GROUND_SPEED_SCALE: f64 = 0.16;
/// Yaw rate (rad/s) at full turn deflection, for the live preview.
pub const YAW_RATE_SCALE: f64 = PI / 2.4;

/// What happened to one update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// The channel was not open (or refused the message).
    Dropped,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncoderStats {
    pub sent:    u64,
    pub dropped: u64,
}

pub struct CommandEncoder<T: Transport> {
    transport: T,
    profile:   CommandProfile,
    command:   ControlCommand,
    stats:     EncoderStats,
}

impl<T: Transport> CommandEncoder<T> {
    pub fn new(transport: T, profile: CommandProfile) -> Self {
        CommandEncoder {
            transport,
            profile,
            command: ControlCommand::default(),
            stats:   EncoderStats::default(),
        }
    }

    pub fn command(&self) -> &ControlCommand { &self.command }
    pub fn profile(&self) -> &CommandProfile { &self.profile }
    pub fn stats(&self) -> EncoderStats { self.stats }
    pub fn transport(&self) -> &T { &self.transport }
    pub fn transport_mut(&mut self) -> &mut T { &mut self.transport }

    // ── setters ───────────────────────────────────────────────────────────

    /// Step joystick.
    pub fn set_step(&mut self, p: Position) -> SendOutcome {
        self.command.step = Vec2::new(p.x, p.y);
        self.publish()
    }

    /// Velocity joystick of the older `drive` firmware.
    pub fn set_speed(&mut self, p: Position) -> SendOutcome {
        self.command.speed = Vec2::new(p.x, p.y);
        self.publish()
    }

    /// Vertical step-height slider, `0.0..=2.0`.
    pub fn set_step_height_weight(&mut self, w: f64) -> SendOutcome {
        self.command.step_height_weight = w;
        self.publish()
    }

    /// Horizontal turn slider, `-1.0..=1.0`.  Slider right turns clockwise,
    /// which the robot expects as a negative angle.
    pub fn set_turn(&mut self, v: f64) -> SendOutcome {
        self.command.turn_angle = -v;
        self.publish()
    }

    /// Body-offset joystick.  Only x and y are driven; z is left alone.
    pub fn set_body_offset(&mut self, p: Position) -> SendOutcome {
        self.command.body_offset.x = p.x;
        self.command.body_offset.y = p.y;
        self.publish()
    }

    /// Body-rotation joystick: deflection is the tilt angle, and the body
    /// tilts toward the stick, so the axis is the stick rotated a quarter
    /// turn.  `axis.y` is left alone.
    pub fn set_body_rotation(&mut self, p: Position) -> SendOutcome {
        self.command.body_rotation.angle  = p.magnitude();
        self.command.body_rotation.axis.x = p.y;
        self.command.body_rotation.axis.z = -p.x;
        self.publish()
    }

    // ── preview ───────────────────────────────────────────────────────────

    /// Planar ground speed implied by the step vector.
    pub fn preview_ground_speed(&self) -> Vec2 {
        Vec2::new(
            self.command.step.x * GROUND_SPEED_SCALE,
            self.command.step.y * GROUND_SPEED_SCALE,
        )
    }

    /// Yaw rate implied by the turn slider (positive = slider right).
    pub fn preview_yaw_rate(&self) -> f64 {
        -self.command.turn_angle * YAW_RATE_SCALE
    }

    // ── send ──────────────────────────────────────────────────────────────

    /// Send the current snapshot if the channel is open.
    pub fn publish(&mut self) -> SendOutcome {
        if !self.transport.is_open() {
            self.stats.dropped += 1;
            trace!(state = self.transport.state().label(), "channel not open, update dropped");
            return SendOutcome::Dropped;
        }
        let sent = self.command.to_json(&self.profile)
            .and_then(|json| self.transport.send_text(json));
        match sent {
            Ok(()) => {
                self.stats.sent += 1;
                debug!(sent = self.stats.sent, profile = self.profile.name(), "control packet sent");
                SendOutcome::Sent
            }
            Err(e) => {
                self.stats.dropped += 1;
                warn!(error = %e, "control packet dropped");
                SendOutcome::Dropped
            }
        }
    }
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for CommandEncoder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandEncoder")
            .field("transport", &self.transport)
            .field("profile", &self.profile.name())
            .field("command", &self.command)
            .field("stats", &self.stats)
            .finish()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
