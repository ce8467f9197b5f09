//! The drive panel: three joysticks and two sliders.
//!
//! Widgets report through a channel, the same way the rest of the console
//! hands work to the event loop: each joystick's position listener sends a
//! [`ControlInput`], slider changes are sent alongside, and the loop drains
//! them once per frame into the command encoder.
//!
//! Pointer routing follows browser semantics: a press goes to the widget
//! under the pointer, which then owns every move and the release until the
//! button comes up, wherever the pointer wanders.

use std::sync::mpsc::{self, Receiver, Sender};

use hexapod_input::{GestureTracker, JoystickConfig, PointerEvent, Position, Result, PRIMARY_BUTTON};
use tracing::trace;

// ════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════

/// Everything the window feeds the event loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConsoleEvent {
    Pointer(PointerEvent),
    /// Escape: clear every selected leg.
    DeselectAll,
    /// L: body leveling on/off.
    ToggleLeveling,
    Quit,
}

/// A widget value change bound for the encoder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlInput {
    Step(Position),
    BodyOffset(Position),
    BodyRotation(Position),
    StepHeight(f64),
    Turn(f64),
}

// ════════════════════════════════════════════════════════════════════════════
// Layout (relative to the panel origin)
// ════════════════════════════════════════════════════════════════════════════

pub const PANEL_W:     usize = 280;
const STEP_STICK:      (f64, f64) = (20.0, 30.0);
const HEIGHT_SLIDER:   (f64, f64) = (160.0, 30.0);
const TURN_SLIDER:     (f64, f64) = (20.0, 170.0);
const OFFSET_STICK:    (f64, f64) = (20.0, 220.0);
const ROTATION_STICK:  (f64, f64) = (150.0, 220.0);
const SLIDER_LEN:      f64 = 100.0;
const TURN_LEN:        f64 = 160.0;
/// Half-width of a slider's grab zone across its track.
const SLIDER_GRAB:     f64 = 10.0;

// ════════════════════════════════════════════════════════════════════════════
// Slider
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation { Horizontal, Vertical }

/// A stepped slider.  Vertical sliders put `max` at the top.
#[derive(Clone, Debug)]
pub struct Slider {
    pub orientation: Orientation,
    /// Track start, pixels.  For a horizontal slider `top` is the track's
    /// centerline; for a vertical one `left` is.
    pub left:     f64,
    pub top:      f64,
    pub length:   f64,
    min:      f64,
    max:      f64,
    step:     f64,
    value:    f64,
    dragging: bool,
}

impl Slider {
    pub fn new(
        orientation: Orientation,
        left: f64, top: f64, length: f64,
        min: f64, max: f64, step: f64,
        initial: f64,
    ) -> Self {
        let mut s = Slider {
            orientation, left, top, length,
            min, max, step,
            value: min,
            dragging: false,
        };
        s.value = s.snap(initial);
        s
    }

    pub fn value(&self) -> f64 { self.value }
    pub fn range(&self) -> (f64, f64) { (self.min, self.max) }
    pub fn step(&self) -> f64 { self.step }
    pub fn is_dragging(&self) -> bool { self.dragging }

    /// Thumb position along the track, 0 at `min`, 1 at `max`.
    pub fn fraction(&self) -> f64 {
        if self.max > self.min { (self.value - self.min) / (self.max - self.min) } else { 0.0 }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (along, across, start) = match self.orientation {
            Orientation::Horizontal => (x, y - self.top, self.left),
            Orientation::Vertical   => (y, x - self.left, self.top),
        };
        across.abs() <= SLIDER_GRAB
            && along >= start - SLIDER_GRAB
            && along <= start + self.length + SLIDER_GRAB
    }

    /// Feed one pointer event.  Returns the new value when it changed.
    pub fn handle(&mut self, event: PointerEvent) -> Option<f64> {
        match event {
            PointerEvent::Press { page_x, page_y, buttons } if buttons & PRIMARY_BUTTON != 0 => {
                self.dragging = true;
                self.track(page_x, page_y)
            }
            PointerEvent::Move { page_x, page_y, buttons }
                if self.dragging && buttons & PRIMARY_BUTTON != 0 =>
            {
                self.track(page_x, page_y)
            }
            PointerEvent::Release => {
                self.dragging = false;
                None
            }
            _ => None,
        }
    }

    fn track(&mut self, x: f64, y: f64) -> Option<f64> {
        let t = match self.orientation {
            Orientation::Horizontal => (x - self.left) / self.length,
            Orientation::Vertical   => 1.0 - (y - self.top) / self.length,
        };
        let v = self.snap(self.min + t.clamp(0.0, 1.0) * (self.max - self.min));
        if v == self.value { return None; }
        self.value = v;
        Some(v)
    }

    fn snap(&self, v: f64) -> f64 {
        let v = v.clamp(self.min, self.max);
        if self.step <= 0.0 { return v; }
        let k = ((v - self.min) / self.step).round();
        // Trim binary noise so 0.1 steps read back as 0.3, not 0.30000000000000004.
        let decimals = (-self.step.log10()).ceil().max(0.0) as i32;
        let factor = 10f64.powi(decimals);
        ((self.min + k * self.step) * factor).round() / factor
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Joysticks
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StickId { Step, BodyOffset, BodyRotation }

impl StickId {
    pub const ALL: [StickId; 3] = [StickId::Step, StickId::BodyOffset, StickId::BodyRotation];

    pub fn label(self) -> &'static str {
        match self {
            StickId::Step         => "STEP",
            StickId::BodyOffset   => "BODY OFFSET",
            StickId::BodyRotation => "BODY ROTATION",
        }
    }
}

/// A placed joystick.
pub struct Stick {
    pub id:      StickId,
    pub left:    f64,
    pub top:     f64,
    pub tracker: GestureTracker,
}

// ════════════════════════════════════════════════════════════════════════════
// ControlPanel
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Grab { Stick(usize), StepHeight, Turn }

pub struct ControlPanel {
    pub origin:      (f64, f64),
    pub sticks:      Vec<Stick>,
    pub step_height: Slider,
    pub turn:        Slider,
    grab: Option<Grab>,
    tx:   Sender<ControlInput>,
    rx:   Receiver<ControlInput>,
}

impl ControlPanel {
    pub fn new(origin_x: f64, origin_y: f64) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<ControlInput>();
        let at = |(dx, dy): (f64, f64)| (origin_x + dx, origin_y + dy);

        let mut sticks = Vec::with_capacity(3);
        for (id, offset) in [
            (StickId::Step,         STEP_STICK),
            (StickId::BodyOffset,   OFFSET_STICK),
            (StickId::BodyRotation, ROTATION_STICK),
        ] {
            let (left, top) = at(offset);
            let mut tracker = GestureTracker::new(JoystickConfig::panel(), left, top)?;
            let tx = tx.clone();
            tracker.on_position_change(move |p| {
                let input = match id {
                    StickId::Step         => ControlInput::Step(p),
                    StickId::BodyOffset   => ControlInput::BodyOffset(p),
                    StickId::BodyRotation => ControlInput::BodyRotation(p),
                };
                let _ = tx.send(input);
            });
            sticks.push(Stick { id, left, top, tracker });
        }

        let (hx, hy) = at(HEIGHT_SLIDER);
        let (tx0, ty0) = at(TURN_SLIDER);
        Ok(ControlPanel {
            origin:      (origin_x, origin_y),
            sticks,
            step_height: Slider::new(Orientation::Vertical, hx, hy, SLIDER_LEN, 0.0, 2.0, 0.1, 0.5),
            turn:        Slider::new(Orientation::Horizontal, tx0, ty0, TURN_LEN, -1.0, 1.0, 0.1, 0.0),
            grab: None,
            tx,
            rx,
        })
    }

    pub fn stick(&self, id: StickId) -> Option<&Stick> {
        self.sticks.iter().find(|s| s.id == id)
    }

    /// Route one pointer event.  Returns true if a widget took it.
    pub fn handle(&mut self, event: PointerEvent) -> bool {
        if let PointerEvent::Press { page_x, page_y, .. } = event {
            if self.grab.is_none() {
                self.grab = self.hit(page_x, page_y);
            }
        }
        let Some(grab) = self.grab else { return false };

        match grab {
            Grab::Stick(i) => {
                self.sticks[i].tracker.handle(event);
            }
            Grab::StepHeight => {
                if let Some(v) = self.step_height.handle(event) {
                    let _ = self.tx.send(ControlInput::StepHeight(v));
                }
            }
            Grab::Turn => {
                if let Some(v) = self.turn.handle(event) {
                    let _ = self.tx.send(ControlInput::Turn(v));
                }
            }
        }
        if event == PointerEvent::Release {
            trace!(?grab, "panel released");
            self.grab = None;
        }
        true
    }

    /// Pending widget changes, oldest first (non-blocking).
    pub fn drain(&self) -> Vec<ControlInput> {
        let mut out = Vec::new();
        while let Ok(input) = self.rx.try_recv() { out.push(input); }
        out
    }

    fn hit(&self, x: f64, y: f64) -> Option<Grab> {
        if let Some(i) = self.sticks.iter().position(|s| s.tracker.contains(x, y)) {
            return Some(Grab::Stick(i));
        }
        if self.step_height.contains(x, y) { return Some(Grab::StepHeight); }
        if self.turn.contains(x, y) { return Some(Grab::Turn); }
        None
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
