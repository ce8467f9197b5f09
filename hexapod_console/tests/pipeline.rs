//! Telemetry in, packets out: the console driven end to end over an
//! in-memory loopback standing in for both WebSockets.

use std::cell::RefCell;
use std::rc::Rc;

use hexapod_console::app::{AppConfig, AppState};
use hexapod_console::controls::{ConsoleEvent, StickId};
use hexapod_console::visualizer::{paint, Canvas, WIN_H, WIN_W};
use hexapod_input::PointerEvent;
use hexapod_link::{ChannelState, Transport};
use serde_json::Value;

#[derive(Default)]
struct Wire {
    state:    Option<ChannelState>,
    outbound: Vec<String>,
    inbound:  Vec<String>,
}

/// One end of a shared wire; the test holds the other.
#[derive(Clone, Default)]
struct Loopback(Rc<RefCell<Wire>>);

impl Loopback {
    fn set_state(&self, state: ChannelState) { self.0.borrow_mut().state = Some(state); }
    fn push(&self, payload: String)          { self.0.borrow_mut().inbound.push(payload); }
    fn sent(&self) -> Vec<Value> {
        self.0.borrow().outbound.iter()
            .map(|s| serde_json::from_str(s).unwrap())
            .collect()
    }
}

impl Transport for Loopback {
    fn state(&self) -> ChannelState {
        self.0.borrow().state.unwrap_or(ChannelState::Open)
    }
    fn send_text(&mut self, text: String) -> hexapod_link::Result<()> {
        self.0.borrow_mut().outbound.push(text);
        Ok(())
    }
    fn drain_inbound(&mut self) -> Vec<String> {
        std::mem::take(&mut self.0.borrow_mut().inbound)
    }
}

fn pose(foot_y: [f64; 6]) -> String {
    let roots: [(f64, f64); 6] = [
        (0.07, -0.04), (0.0, -0.05), (-0.07, -0.04),
        (0.07, 0.04), (0.0, 0.05), (-0.07, 0.04),
    ];
    let legs: Vec<String> = roots.iter().zip(foot_y).map(|(&(x, z), fy)| {
        let s = z.signum();
        format!(
            "[[{x},0.03,{z}],[{x},0.03,{z1}],[{x},0.078,{z2}],[{x},{fy},{z2}]]",
            x = x, z = z, z1 = z + s * 0.03, z2 = z + s * 0.07, fy = fy,
        )
    }).collect();
    format!("{{\"legs\": [{}]}}", legs.join(","))
}

fn console() -> (AppState<Loopback>, Loopback, Loopback) {
    let control = Loopback::default();
    let monitor = Loopback::default();
    let app = AppState::new(&AppConfig::default(), control.clone(), monitor.clone()).unwrap();
    (app, control, monitor)
}

fn press_release(app: &mut AppState<Loopback>, x: f64, y: f64) {
    app.handle_event(ConsoleEvent::Pointer(PointerEvent::press(x, y)));
    app.handle_event(ConsoleEvent::Pointer(PointerEvent::Release));
}

#[test]
fn telemetry_drives_pose_view() {
    let (mut app, _control, monitor) = console();

    monitor.push(pose([0.0; 6]));
    app.tick();
    assert_eq!(app.geometry().unwrap().contact_count(), 6);

    // Tripod gait: legs 1, 3 and 5 in the air.
    monitor.push(pose([0.0, 0.02, 0.0, 0.02, 0.0, 0.02]));
    app.tick();
    let geo = app.geometry().unwrap();
    let contact: Vec<bool> = geo.legs.iter().map(|l| l.foot_contact()).collect();
    assert_eq!(contact, vec![true, false, true, false, true, false]);

    // Only the newest of a burst is kept.
    monitor.push(pose([0.02; 6]));
    monitor.push(pose([0.0; 6]));
    app.tick();
    assert_eq!(app.geometry().unwrap().contact_count(), 6);
    assert_eq!(app.decoder().stats().accepted, 4);
}

#[test]
fn widgets_send_whole_packets() {
    let (mut app, control, _monitor) = console();

    let step = app.panel().stick(StickId::Step).unwrap();
    let (x, y) = (step.left + 50.0, step.top);
    press_release(&mut app, x, y);

    let turn = &app.panel().turn;
    let (tx, ty) = (turn.left + turn.length, turn.top);
    press_release(&mut app, tx, ty);
    app.tick();

    let sent = control.sent();
    assert_eq!(sent.len(), 2);
    // Every packet carries every gait field.
    for p in &sent {
        for key in ["step", "step_height_weight", "turn_angle", "body_offset",
                    "body_rotation_angle", "body_rotation_axis"] {
            assert!(p.get(key).is_some(), "missing {key}");
        }
        assert!(p.get("speed").is_none());
    }
    assert_eq!(sent[0]["step"]["y"], Value::from(1.0));
    assert_eq!(sent[1]["turn_angle"], Value::from(-1.0));
    // The sticky step stick held its place.
    assert_eq!(sent[1]["step"]["y"], Value::from(1.0));
}

#[test]
fn updates_are_dropped_until_the_channel_opens() {
    let (mut app, control, _monitor) = console();
    control.set_state(ChannelState::Connecting);

    let stick = app.panel().stick(StickId::BodyOffset).unwrap();
    let (x, y) = (stick.left + 100.0, stick.top + 50.0);
    press_release(&mut app, x, y);
    app.tick();
    assert!(control.sent().is_empty());
    assert_eq!(app.encoder().stats().dropped, 1);
    assert!(app.status.contains("CTL connecting"));

    control.set_state(ChannelState::Open);
    press_release(&mut app, x, y);
    app.tick();
    let sent = control.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["body_offset"]["x"], Value::from(1.0));
}

#[test]
fn legs_select_and_clear() {
    let (mut app, _control, monitor) = console();
    monitor.push(pose([0.0; 6]));
    app.tick();

    for leg in [2, 4] {
        let mid = app.geometry().unwrap().legs[leg].segments[0].midpoint;
        let (x, y) = app.camera().project(&mid);
        press_release(&mut app, x, y);
    }
    assert_eq!(app.selected_legs(), vec![2, 4]);

    app.handle_event(ConsoleEvent::DeselectAll);
    assert!(app.selected_legs().is_empty());
}

#[test]
fn frame_renders_headless() {
    let (mut app, _control, monitor) = console();
    let mut canvas = Canvas::new(WIN_W, WIN_H);

    paint(&mut canvas, &app.view());
    let empty = canvas.buf.clone();

    monitor.push(pose([0.0; 6]));
    app.tick();
    paint(&mut canvas, &app.view());
    assert_ne!(canvas.buf, empty);
}
