//! Top-level application state machine.
//!
//! `AppState` owns the command encoder, the telemetry decoder and geometry
//! engine, the drive panel, and the selectable legs.  It processes
//! `ConsoleEvent`s, pumps both channels once per frame, and hands the
//! visualizer a `SceneView` to draw.

use std::sync::mpsc::{self, TryRecvError};

use anyhow::Context;
use tracing::{debug, info};

use hexapod_input::{PointerEvent, PRIMARY_BUTTON};
use hexapod_link::{CommandEncoder, CommandProfile, Field, Transport, WsChannel};
use hexapod_pose::{FrameUpdate, GeometryConfig, PoseGeometry, PoseGeometryEngine, TelemetryDecoder, LEG_COUNT};

use crate::controls::{ConsoleEvent, ControlInput, ControlPanel};
use crate::scene::{pick_leg, Camera};
use crate::selection::{SelectionBus, Selectable};
use crate::visualizer::{SceneView, Visualizer, SCENE_W, STATUS_Y};

/// How close (pixels) a click must land to a drawn leg to select it.
pub const PICK_RADIUS: f64 = 8.0;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Inbound telemetry.
    pub monitor_url: String,
    /// Outbound control packets.
    pub control_url: String,
    pub profile:     CommandProfile,
    pub geometry:    GeometryConfig,
    /// Pose view zoom, pixels per meter.
    pub scale:       f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            monitor_url: "ws://localhost:8080".to_string(),
            control_url: "ws://localhost:8081".to_string(),
            profile:     CommandProfile::gait(),
            geometry:    GeometryConfig::default(),
            scale:       1500.0,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState<T: Transport> {
    // ── outbound ─────────────────────────────────────────────────────────
    encoder:  CommandEncoder<T>,
    panel:    ControlPanel,

    // ── inbound ──────────────────────────────────────────────────────────
    monitor:  T,
    decoder:  TelemetryDecoder,
    engine:   PoseGeometryEngine,
    geometry: Option<PoseGeometry>,

    // ── scene ────────────────────────────────────────────────────────────
    camera:   Camera,
    bus:      SelectionBus,
    legs:     Vec<Selectable>,

    pub status: String,
    quit:     bool,
}

impl<T: Transport> AppState<T> {
    pub fn new(cfg: &AppConfig, control: T, monitor: T) -> hexapod_input::Result<Self> {
        let bus = SelectionBus::new();
        let legs = (0..LEG_COUNT).map(|_| Selectable::new(&bus)).collect();
        let center = (SCENE_W as f64 / 2.0, STATUS_Y as f64 / 2.0 + 40.0);

        Ok(AppState {
            encoder:  CommandEncoder::new(control, cfg.profile.clone()),
            panel:    ControlPanel::new(SCENE_W as f64, 0.0)?,
            monitor,
            decoder:  TelemetryDecoder::new(),
            engine:   PoseGeometryEngine::new(cfg.geometry),
            geometry: None,
            camera:   Camera::new(cfg.scale, center),
            bus,
            legs,
            status:   "Waiting for telemetry".to_string(),
            quit:     false,
        })
    }

    // ── process one ConsoleEvent ─────────────────────────────────────────

    pub fn handle_event(&mut self, event: ConsoleEvent) {
        match event {
            ConsoleEvent::Pointer(p) => self.handle_pointer(p),
            ConsoleEvent::DeselectAll => { self.bus.deselect_all(); }
            ConsoleEvent::ToggleLeveling => {
                let on = !self.engine.config().level_body;
                self.engine.set_level_body(on);
                self.recompute();
                info!(level_body = on, "body leveling toggled");
            }
            ConsoleEvent::Quit => self.quit = true,
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if self.panel.handle(event) { return; }

        match event {
            PointerEvent::Press { page_x, page_y, buttons } if buttons & PRIMARY_BUTTON != 0 => {
                if let Some(i) = self.leg_at(page_x, page_y) {
                    let active = self.legs[i].toggle();
                    debug!(leg = i, active, "leg clicked");
                }
            }
            PointerEvent::Move { page_x, page_y, .. } => {
                let hit = self.leg_at(page_x, page_y);
                for (i, leg) in self.legs.iter_mut().enumerate() {
                    leg.set_hovered(hit == Some(i));
                }
            }
            _ => {}
        }
    }

    fn leg_at(&self, x: f64, y: f64) -> Option<usize> {
        if x >= SCENE_W as f64 || y >= STATUS_Y as f64 { return None; }
        let geo = self.geometry.as_ref()?;
        pick_leg(geo, &self.camera, x, y, PICK_RADIUS)
    }

    // ── Per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self) {
        // Telemetry in, in arrival order; only the last change matters for drawing.
        let mut changed = false;
        for payload in self.monitor.drain_inbound() {
            changed |= self.decoder.ingest(&payload) == FrameUpdate::Changed;
        }
        if changed { self.recompute(); }

        // Widget changes out, one packet each.
        for input in self.panel.drain() {
            self.apply(input);
        }

        self.status = self.status_line();
    }

    fn apply(&mut self, input: ControlInput) {
        let profile = self.encoder.profile();
        let drives_speed = profile.includes(Field::Speed) && !profile.includes(Field::Step);
        let outcome = match input {
            ControlInput::Step(p) if drives_speed => self.encoder.set_speed(p),
            ControlInput::Step(p)         => self.encoder.set_step(p),
            ControlInput::BodyOffset(p)   => self.encoder.set_body_offset(p),
            ControlInput::BodyRotation(p) => self.encoder.set_body_rotation(p),
            ControlInput::StepHeight(w)   => self.encoder.set_step_height_weight(w),
            ControlInput::Turn(v)         => self.encoder.set_turn(v),
        };
        debug!(?input, ?outcome, "control input applied");
    }

    fn recompute(&mut self) {
        self.geometry = self.decoder.current().map(|f| self.engine.compute(f));
    }

    fn status_line(&self) -> String {
        let d = self.decoder.stats();
        let e = self.encoder.stats();
        let v = self.encoder.preview_ground_speed();
        let contacts = self.geometry.as_ref()
            .map(|g| format!("{}/{}", g.contact_count(), LEG_COUNT))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "CTL {} MON {} | FRAMES {} DUP {} BAD {} | SENT {} DROP {} | FEET {} | LEVEL {} | V {:.2},{:.2} YAW {:.2}",
            self.encoder.transport().state().label(),
            self.monitor.state().label(),
            d.accepted, d.duplicates, d.rejected,
            e.sent, e.dropped,
            contacts,
            if self.engine.config().level_body { "ON" } else { "OFF" },
            v.x, v.y, self.encoder.preview_yaw_rate(),
        )
    }

    // ── Accessors for the render loop and tests ───────────────────────────

    pub fn view(&self) -> SceneView<'_> {
        SceneView {
            geometry: self.geometry.as_ref(),
            legs:     &self.legs,
            camera:   &self.camera,
            panel:    &self.panel,
            status:   &self.status,
        }
    }

    pub fn encoder(&self)  -> &CommandEncoder<T>        { &self.encoder }
    pub fn decoder(&self)  -> &TelemetryDecoder         { &self.decoder }
    pub fn geometry(&self) -> Option<&PoseGeometry>     { self.geometry.as_ref() }
    pub fn panel(&self)    -> &ControlPanel             { &self.panel }
    pub fn camera(&self)   -> &Camera                   { &self.camera }
    pub fn monitor_mut(&mut self) -> &mut T             { &mut self.monitor }
    pub fn is_leveling(&self) -> bool                   { self.engine.config().level_body }
    pub fn should_quit(&self) -> bool                   { self.quit }

    /// Indices of the currently selected legs.
    pub fn selected_legs(&self) -> Vec<usize> {
        self.legs.iter().enumerate()
            .filter(|(_, s)| s.is_active())
            .map(|(i, _)| i)
            .collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the console.
///
/// Opens both channels (they connect in the background), creates the
/// window, and drives the event/render loop at ~60 fps until the window
/// closes or the user quits.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let control = WsChannel::open(&cfg.control_url)
        .with_context(|| format!("opening control channel {}", cfg.control_url))?;
    let monitor = WsChannel::open(&cfg.monitor_url)
        .with_context(|| format!("opening monitor channel {}", cfg.monitor_url))?;

    let (tx, rx) = mpsc::channel::<ConsoleEvent>();
    let mut vis = Visualizer::new(tx)?;
    let mut app = AppState::new(&cfg, control, monitor).context("building drive panel")?;
    info!(
        control = %cfg.control_url,
        monitor = %cfg.monitor_url,
        profile = cfg.profile.name(),
        "console started"
    );

    while vis.is_open() {
        // 1. Poll window input → ConsoleEvents
        let open = vis.poll_input();

        // 2. Drain events
        loop {
            match rx.try_recv() {
                Ok(event) => app.handle_event(event),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if !open || app.should_quit() { break; }

        // 3. Per-frame logic
        app.tick();

        // 4. Render
        vis.render(&app.view());
    }

    info!("console closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hexapod_link::{ChannelState, NullTransport};
    use crate::controls::StickId;

    /// An always-open in-memory channel.
    #[derive(Default)]
    struct Memory {
        sent:    Vec<String>,
        pending: Vec<String>,
    }

    impl Transport for Memory {
        fn state(&self) -> ChannelState { ChannelState::Open }
        fn send_text(&mut self, text: String) -> hexapod_link::Result<()> {
            self.sent.push(text);
            Ok(())
        }
        fn drain_inbound(&mut self) -> Vec<String> { std::mem::take(&mut self.pending) }
    }

    fn standing_json(foot_y: f64) -> String {
        let leg = |x: f64, z: f64| {
            let s = z.signum();
            format!(
                "[[{x},0.03,{z}],[{x},0.03,{z1}],[{x},0.078,{z2}],[{x},{fy},{z2}]]",
                x = x, z = z, z1 = z + s * 0.03, z2 = z + s * 0.07, fy = foot_y,
            )
        };
        let legs = [
            leg(0.07, -0.04), leg(0.0, -0.05), leg(-0.07, -0.04),
            leg(0.07, 0.04), leg(0.0, 0.05), leg(-0.07, 0.04),
        ];
        format!("{{\"legs\": [{}]}}", legs.join(","))
    }

    fn make_app() -> AppState<Memory> {
        AppState::new(&AppConfig::default(), Memory::default(), Memory::default()).unwrap()
    }

    fn feed(app: &mut AppState<Memory>, payload: String) {
        app.monitor_mut().pending.push(payload);
        app.tick();
    }

    #[test]
    fn telemetry_builds_geometry() {
        let mut app = make_app();
        assert!(app.geometry().is_none());
        feed(&mut app, standing_json(0.0));
        assert_eq!(app.geometry().unwrap().contact_count(), 6);
        assert!(app.status.contains("FEET 6/6"));
    }

    #[test]
    fn duplicate_and_bad_frames_keep_geometry() {
        let mut app = make_app();
        feed(&mut app, standing_json(0.0));
        feed(&mut app, standing_json(0.0));
        feed(&mut app, "{}".to_string());
        let stats = app.decoder().stats();
        assert_eq!((stats.accepted, stats.duplicates, stats.rejected), (1, 1, 1));
        assert_eq!(app.geometry().unwrap().contact_count(), 6);
    }

    #[test]
    fn lifted_feet_lose_contact() {
        let mut app = make_app();
        feed(&mut app, standing_json(0.0));
        feed(&mut app, standing_json(0.01));
        assert_eq!(app.geometry().unwrap().contact_count(), 0);
    }

    #[test]
    fn step_stick_sends_packet() {
        let mut app = make_app();
        let stick = app.panel().stick(StickId::Step).unwrap();
        let (x, y) = (stick.left + 100.0, stick.top + 50.0);
        app.handle_event(ConsoleEvent::Pointer(PointerEvent::press(x, y)));
        app.tick();
        let sent = &app.encoder().transport().sent;
        assert_eq!(sent.len(), 1);
        let v: serde_json::Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(v["step"]["x"], serde_json::json!(1.0));
    }

    #[test]
    fn drive_profile_routes_step_stick_to_speed() {
        let cfg = AppConfig { profile: CommandProfile::drive(), ..AppConfig::default() };
        let mut app = AppState::new(&cfg, Memory::default(), Memory::default()).unwrap();
        let stick = app.panel().stick(StickId::Step).unwrap();
        let (x, y) = (stick.left + 50.0, stick.top);
        app.handle_pointer(PointerEvent::press(x, y));
        app.tick();
        assert_eq!(app.encoder().command().speed.y, 1.0);
        assert_eq!(app.encoder().command().step.y, 0.0);
    }

    #[test]
    fn click_selects_leg_and_escape_clears() {
        let mut app = make_app();
        feed(&mut app, standing_json(0.0));
        let mid = app.geometry().unwrap().legs[2].segments[0].midpoint;
        let (x, y) = app.camera().project(&mid);

        app.handle_pointer(PointerEvent::press(x, y));
        app.handle_pointer(PointerEvent::Release);
        assert_eq!(app.selected_legs(), vec![2]);

        app.handle_event(ConsoleEvent::DeselectAll);
        assert!(app.selected_legs().is_empty());
    }

    #[test]
    fn clicks_without_telemetry_select_nothing() {
        let mut app = make_app();
        app.handle_pointer(PointerEvent::press(100.0, 100.0));
        assert!(app.selected_legs().is_empty());
    }

    #[test]
    fn leveling_toggle_recomputes() {
        let mut app = make_app();
        feed(&mut app, standing_json(0.0));
        assert!(!app.is_leveling());
        app.handle_event(ConsoleEvent::ToggleLeveling);
        assert!(app.is_leveling());
        // Level feet: the leveling rotation stays identity.
        let rot = app.geometry().unwrap().body_rotation;
        assert!(rot.angle() < 1e-9);
    }

    #[test]
    fn quit_event() {
        let mut app = make_app();
        app.handle_event(ConsoleEvent::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn closed_control_channel_drops_updates() {
        let mut app = AppState::new(&AppConfig::default(), NullTransport, NullTransport).unwrap();
        let stick = app.panel().stick(StickId::BodyRotation).unwrap();
        let (x, y) = (stick.left + 50.0, stick.top);
        app.handle_pointer(PointerEvent::press(x, y));
        app.tick();
        assert_eq!(app.encoder().stats().dropped, 1);
        assert!(app.status.contains("CTL closed"));
    }
}
