//! Inbound telemetry gate.
//!
//! Telemetry can arrive much faster than the robot visibly moves.  The
//! decoder keeps the last accepted [`PoseFrame`] and only reports a change
//! when a new frame differs structurally from it, so the geometry engine and
//! renderer skip redundant work.  Malformed payloads are logged and dropped;
//! the previous frame stays current.

use tracing::{debug, warn};

use crate::error::Result;
use crate::frame::PoseFrame;

/// What one inbound message did to the retained frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameUpdate {
    /// A new frame replaced the old one; downstream should recompute.
    Changed,
    /// Identical to the retained frame; nothing to do.
    Unchanged,
    /// Payload failed to decode; the retained frame is untouched.
    Rejected,
}

impl FrameUpdate {
    pub fn is_changed(self) -> bool {
        self == FrameUpdate::Changed
    }
}

/// Running totals, mostly for the status bar and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderStats {
    pub accepted:   u64,
    pub duplicates: u64,
    pub rejected:   u64,
}

#[derive(Debug, Default)]
pub struct TelemetryDecoder {
    current: Option<PoseFrame>,
    stats:   DecoderStats,
}

impl TelemetryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one payload without touching decoder state.
    pub fn decode(payload: &str) -> Result<PoseFrame> {
        PoseFrame::from_json(payload)
    }

    /// Decode and gate one inbound message.
    pub fn ingest(&mut self, payload: &str) -> FrameUpdate {
        match Self::decode(payload) {
            Ok(frame) => self.offer(frame),
            Err(e) => {
                self.stats.rejected += 1;
                warn!(error = %e, bytes = payload.len(), "dropping telemetry frame");
                FrameUpdate::Rejected
            }
        }
    }

    /// Gate an already-decoded frame.
    pub fn offer(&mut self, frame: PoseFrame) -> FrameUpdate {
        if self.current.as_ref() == Some(&frame) {
            self.stats.duplicates += 1;
            return FrameUpdate::Unchanged;
        }
        self.stats.accepted += 1;
        debug!(accepted = self.stats.accepted, "pose frame changed");
        self.current = Some(frame);
        FrameUpdate::Changed
    }

    /// The last accepted frame, if any has arrived.
    pub fn current(&self) -> Option<&PoseFrame> {
        self.current.as_ref()
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
