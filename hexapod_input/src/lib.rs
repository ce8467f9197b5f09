//! # hexapod_input
//!
//! Pointer-driven joystick input for the hexapod control surface.
//!
//! * [`shaper`] — the pure axis-shaping curve: power-law per axis, unit-disk
//!   clamp, optional center deadzone.
//! * [`tracker`] — the press / move / release state machine that turns page
//!   coordinates into shaped [`Position`]s and notifies a listener.
//!
//! ## Quick start
//!
//! ```rust
//! use hexapod_input::{GestureTracker, JoystickConfig, PointerEvent, StickyAxis};
//!
//! let cfg = JoystickConfig { sticky_axis: StickyAxis::Off, ..JoystickConfig::default() };
//! let mut stick = GestureTracker::new(cfg, 0.0, 0.0).unwrap();
//!
//! // Press dead center of a 100 px control, then drag to the right edge.
//! stick.handle(PointerEvent::press(50.0, 50.0));
//! stick.handle(PointerEvent::drag(100.0, 50.0));
//! assert_eq!(stick.position().x, 1.0);
//!
//! // Non-sticky handles spring back on release.
//! stick.handle(PointerEvent::Release);
//! assert_eq!(stick.position().x, 0.0);
//! ```

pub mod error;
pub mod shaper;
pub mod tracker;

pub use error::{InputError, Result};
pub use shaper::{shape, AxisShaper, Position, StickyAxis, DEADZONE};
pub use tracker::{GestureState, GestureTracker, JoystickConfig, PointerEvent, PRIMARY_BUTTON};
