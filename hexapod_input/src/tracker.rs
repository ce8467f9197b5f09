//! Drag tracking for one on-screen joystick.
//!
//! A [`GestureTracker`] owns the state of a single control:
//!
//! ```text
//! Idle ──press──▶ Dragging ──move*──▶ Dragging ──release──▶ Idle
//! ```
//!
//! Every accepted press and move re-shapes the pointer offset and notifies
//! the listener.  Release notifies `(0, 0)` once unless the handle is sticky.
//! Trackers share nothing; a surface with three sticks holds three trackers.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{InputError, Result};
use crate::shaper::{AxisShaper, Position, StickyAxis};

/// Bit of [`PointerEvent`] `buttons` for the primary (left) button.
pub const PRIMARY_BUTTON: u32 = 1;

// ════════════════════════════════════════════════════════════════════════════
// PointerEvent
// ════════════════════════════════════════════════════════════════════════════

/// Raw pointer input in page coordinates (pixels, Y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Press { page_x: f64, page_y: f64, buttons: u32 },
    Move  { page_x: f64, page_y: f64, buttons: u32 },
    Release,
}

impl PointerEvent {
    /// Primary-button press.
    pub fn press(page_x: f64, page_y: f64) -> Self {
        PointerEvent::Press { page_x, page_y, buttons: PRIMARY_BUTTON }
    }

    /// Move with the primary button held.
    pub fn drag(page_x: f64, page_y: f64) -> Self {
        PointerEvent::Move { page_x, page_y, buttons: PRIMARY_BUTTON }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// JoystickConfig
// ════════════════════════════════════════════════════════════════════════════

/// Per-control construction parameters.  Missing fields deserialize to
/// their defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoystickConfig {
    /// Diameter of the control, pixels.
    pub size:          f64,
    /// Diameter of the draggable handle, pixels.
    pub handle_size:   f64,
    /// Shadow depth for the renderer; no effect on input.
    pub elevation:     u8,
    /// Keep the last position on release instead of springing to center.
    pub sticky_handle: bool,
    pub sticky_axis:   StickyAxis,
    pub center_return: bool,
}

impl Default for JoystickConfig {
    fn default() -> Self {
        JoystickConfig {
            size:          100.0,
            handle_size:   40.0,
            elevation:     1,
            sticky_handle: false,
            sticky_axis:   StickyAxis::default(),
            center_return: false,
        }
    }
}

impl JoystickConfig {
    /// The layout used on the drive panel: sticky, axis-pulled, centering.
    pub fn panel() -> Self {
        JoystickConfig {
            elevation:     2,
            sticky_handle: true,
            sticky_axis:   StickyAxis::On,
            center_return: true,
            ..JoystickConfig::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(InputError::InvalidSize(self.size));
        }
        if self.handle_size > self.size {
            return Err(InputError::HandleTooLarge { handle: self.handle_size, size: self.size });
        }
        Ok(())
    }

    fn shaper(&self) -> AxisShaper {
        AxisShaper::new(self.sticky_axis, self.center_return)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureTracker
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureState { Idle, Dragging }

type Listener = Box<dyn FnMut(Position)>;

/// Drag state machine for one joystick.
pub struct GestureTracker {
    config:   JoystickConfig,
    shaper:   AxisShaper,
    /// Top-left corner of the control's bounding box, page pixels.
    left:     f64,
    top:      f64,
    state:    GestureState,
    position: Position,
    listener: Option<Listener>,
}

impl std::fmt::Debug for GestureTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureTracker")
            .field("config", &self.config)
            .field("left", &self.left)
            .field("top", &self.top)
            .field("state", &self.state)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl GestureTracker {
    /// Build a tracker for a control whose bounding box starts at
    /// `(left, top)` in page pixels.
    pub fn new(config: JoystickConfig, left: f64, top: f64) -> Result<Self> {
        config.validate()?;
        Ok(GestureTracker {
            config,
            shaper:   config.shaper(),
            left,
            top,
            state:    GestureState::Idle,
            position: Position::ORIGIN,
            listener: None,
        })
    }

    /// Register the position-change listener, replacing any previous one.
    pub fn on_position_change(&mut self, listener: impl FnMut(Position) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn config(&self)   -> &JoystickConfig { &self.config }
    pub fn state(&self)    -> GestureState    { self.state }
    pub fn position(&self) -> Position        { self.position }
    pub fn is_dragging(&self) -> bool         { self.state == GestureState::Dragging }

    /// Move the control's bounding box (e.g. after a window resize).
    pub fn relocate(&mut self, left: f64, top: f64) {
        self.left = left;
        self.top = top;
    }

    /// True when the page point lies on the round control.
    pub fn contains(&self, page_x: f64, page_y: f64) -> bool {
        let r  = self.config.size / 2.0;
        let dx = page_x - (self.left + r);
        let dy = page_y - (self.top + r);
        dx.hypot(dy) <= r
    }

    /// Top-left pixel offset of the handle inside the control box.
    pub fn handle_offset(&self) -> (f64, f64) {
        let half   = self.config.size / 2.0;
        let handle = self.config.handle_size / 2.0;
        (
            (self.position.x + 1.0) * half - handle,
            (self.position.y - 1.0) * -half - handle,
        )
    }

    /// Feed one pointer event.  Returns the position the listener was
    /// notified with, if any.
    pub fn handle(&mut self, event: PointerEvent) -> Option<Position> {
        match (self.state, event) {
            // A press while already dragging means the release was missed;
            // treat it as a fresh grab.
            (_, PointerEvent::Press { page_x, page_y, buttons })
                if buttons & PRIMARY_BUTTON != 0 =>
            {
                self.state = GestureState::Dragging;
                Some(self.track(page_x, page_y))
            }
            (GestureState::Dragging, PointerEvent::Move { page_x, page_y, buttons })
                if buttons & PRIMARY_BUTTON != 0 =>
            {
                Some(self.track(page_x, page_y))
            }
            (GestureState::Dragging, PointerEvent::Release) => {
                self.state = GestureState::Idle;
                if self.config.sticky_handle {
                    trace!(position = ?self.position, "joystick released, holding position");
                    None
                } else {
                    self.position = Position::ORIGIN;
                    self.notify();
                    Some(Position::ORIGIN)
                }
            }
            _ => None,
        }
    }

    fn track(&mut self, page_x: f64, page_y: f64) -> Position {
        let half = self.config.size / 2.0;
        let raw_x = (page_x - self.left) / half - 1.0;
        let raw_y = 1.0 - (page_y - self.top) / half;
        self.position = self.shaper.shape(raw_x, raw_y);
        self.notify();
        self.position
    }

    fn notify(&mut self) {
        let position = self.position;
        if let Some(listener) = self.listener.as_mut() {
            listener(position);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
