//! Software-rendered console using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌───────────────────────────────────────────────┬──────────────────────┐
//! │                                               │  STEP     (o)  |     │
//! │        pose view                              │                |     │
//! │        (orthographic, from -x +y -z)          │  TURN  ----o----     │
//! │                                               │                      │
//! │        chassis, legs, joints, contacts        │  OFFSET (o)  ROT (o) │
//! │                                               │                      │
//! ├───────────────────────────────────────────────┴──────────────────────┤
//! │  status bar                                                          │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Painting goes to a [`Canvas`] that knows nothing about the window, so
//! the whole frame can be drawn (and tested) headless.

use std::sync::mpsc::Sender;

use anyhow::anyhow;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use hexapod_input::{PointerEvent, PRIMARY_BUTTON};
use hexapod_pose::{Joint, PoseGeometry, Segment};

use crate::controls::{ConsoleEvent, ControlPanel, Orientation, Slider, Stick, PANEL_W};
use crate::scene::Camera;
use crate::selection::Selectable;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:     usize = 960;
pub const WIN_H:     usize = 540;
pub const SCENE_W:   usize = WIN_W - PANEL_W;
pub const STATUS_H:  usize = 36;
pub const STATUS_Y:  usize = WIN_H - STATUS_H;
/// Half the side of the ground grid, meters.
const GRID_HALF:     f64   = 0.2;
const GRID_CELL:     f64   = 0.05;

const BG_COLOR:        u32 = 0xFF1A1A2E;
const PANEL_BG:        u32 = 0xFF16213E;
const TEXT_BG:         u32 = 0xFF0F3460;
const GRID_CELL_COLOR: u32 = 0xFF3F3F4F;
const GRID_AXIS_COLOR: u32 = 0xFF9D4B4B;
const SEGMENT_COLOR:   u32 = 0xFF03A9F4;  // light blue
const HEADING_COLOR:   u32 = 0xFFFF0000;
const CONTACT_COLOR:   u32 = 0xFFFF1744;
const SELECTED_COLOR:  u32 = 0xFFFFD700;  // gold
const STICK_BG:        u32 = 0xFF24305E;
const SHADOW_COLOR:    u32 = 0xFF0B0F1F;
const LABEL_COLOR:     u32 = 0xFFAADDFF;

// ════════════════════════════════════════════════════════════════════════════
// SceneView — what one frame shows
// ════════════════════════════════════════════════════════════════════════════

/// Borrowed snapshot of everything the renderer needs.
pub struct SceneView<'a> {
    pub geometry: Option<&'a PoseGeometry>,
    pub legs:     &'a [Selectable],
    pub camera:   &'a Camera,
    pub panel:    &'a ControlPanel,
    pub status:   &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    canvas:     Canvas,
    tx:         Sender<ConsoleEvent>,
    mouse_down: bool,
    mouse_pos:  Option<(f64, f64)>,
}

impl Visualizer {
    pub fn new(tx: Sender<ConsoleEvent>) -> anyhow::Result<Self> {
        let mut window = Window::new(
            "Hexapod Console",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| anyhow!("could not open window: {}", e))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(WIN_W, WIN_H),
            tx,
            mouse_down: false,
            mouse_pos:  None,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse, translating them into [`ConsoleEvent`]s.
    /// Returns false once the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) {
            let _ = self.tx.send(ConsoleEvent::Quit);
            return false;
        }
        if one_shot(Key::Escape) {
            let _ = self.tx.send(ConsoleEvent::DeselectAll);
        }
        if one_shot(Key::L) {
            let _ = self.tx.send(ConsoleEvent::ToggleLeveling);
        }

        // The window only reports mouse state; edges become pointer events.
        let pos = self.window.get_mouse_pos(MouseMode::Pass)
            .map(|(x, y)| (x as f64, y as f64));
        let down = self.window.get_mouse_down(MouseButton::Left);
        for event in pointer_edges(self.mouse_down, self.mouse_pos, down, pos) {
            let _ = self.tx.send(ConsoleEvent::Pointer(event));
        }
        self.mouse_down = down;
        if pos.is_some() { self.mouse_pos = pos; }

        true
    }

    /// Render one frame.
    pub fn render(&mut self, view: &SceneView<'_>) {
        paint(&mut self.canvas, view);
        self.window.update_with_buffer(&self.canvas.buf, WIN_W, WIN_H).ok();
    }
}

/// Turn two consecutive mouse samples into pointer events.
pub fn pointer_edges(
    was_down: bool,
    last_pos: Option<(f64, f64)>,
    down:     bool,
    pos:      Option<(f64, f64)>,
) -> Vec<PointerEvent> {
    let mut out = Vec::new();
    let buttons = if down { PRIMARY_BUTTON } else { 0 };
    match (was_down, down, pos) {
        (false, true, Some((x, y))) => {
            out.push(PointerEvent::Press { page_x: x, page_y: y, buttons });
        }
        (true, false, _) => {
            if let Some((x, y)) = pos.filter(|&p| Some(p) != last_pos) {
                out.push(PointerEvent::Move { page_x: x, page_y: y, buttons: PRIMARY_BUTTON });
            }
            out.push(PointerEvent::Release);
        }
        (_, _, Some((x, y))) if Some((x, y)) != last_pos => {
            out.push(PointerEvent::Move { page_x: x, page_y: y, buttons });
        }
        _ => {}
    }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// paint — one full frame
// ════════════════════════════════════════════════════════════════════════════

pub fn paint(canvas: &mut Canvas, view: &SceneView<'_>) {
    canvas.clear(BG_COLOR);

    // ── Pose view ─────────────────────────────────────────────────────────
    draw_grid(canvas, view.camera);
    match view.geometry {
        Some(geo) => draw_pose(canvas, view.camera, geo, view.legs),
        None => {
            let (cx, cy) = view.camera.center;
            canvas.draw_label("WAITING FOR TELEMETRY", (cx as usize).saturating_sub(84), cy as usize + 40, 2, LABEL_COLOR);
        }
    }

    // ── Control panel ─────────────────────────────────────────────────────
    canvas.fill_rect(SCENE_W, 0, PANEL_W, STATUS_Y, PANEL_BG);
    for stick in &view.panel.sticks {
        draw_stick(canvas, stick);
    }
    draw_slider(canvas, &view.panel.step_height, "HEIGHT");
    draw_slider(canvas, &view.panel.turn, "TURN");

    // ── Status bar ────────────────────────────────────────────────────────
    canvas.fill_rect(0, STATUS_Y, WIN_W, STATUS_H, TEXT_BG);
    canvas.draw_label(view.status, 10, STATUS_Y + 6, 2, 0xFFEEEEEE);
    canvas.draw_label(
        "CLICK LEG=SELECT  ESC=DESELECT ALL  L=LEVEL BODY  Q=QUIT",
        10, WIN_H - 9, 1, 0xFF888888,
    );
}

fn draw_grid(canvas: &mut Canvas, camera: &Camera) {
    let cells = (2.0 * GRID_HALF / GRID_CELL).round() as i32;
    for i in 0..=cells {
        let u = -GRID_HALF + i as f64 * GRID_CELL;
        let color = if i == cells / 2 { GRID_AXIS_COLOR } else { GRID_CELL_COLOR };
        let a = camera.project(&Joint::new(u, 0.0, -GRID_HALF));
        let b = camera.project(&Joint::new(u, 0.0,  GRID_HALF));
        canvas.draw_line(a, b, 1, color);
        let a = camera.project(&Joint::new(-GRID_HALF, 0.0, u));
        let b = camera.project(&Joint::new( GRID_HALF, 0.0, u));
        canvas.draw_line(a, b, 1, color);
    }
}

fn draw_pose(canvas: &mut Canvas, camera: &Camera, geo: &PoseGeometry, legs: &[Selectable]) {
    // Every point goes through the body rotation before projection.
    let at = |p: &Joint| camera.project(&geo.place(p));

    for edge in &geo.chassis {
        let color = if edge.heading { HEADING_COLOR } else { SEGMENT_COLOR };
        draw_segment(canvas, &at, &edge.segment, 3, color);
    }

    // Far legs first so near ones overdraw them.
    let mut order: Vec<usize> = (0..geo.legs.len()).collect();
    order.sort_by(|&a, &b| {
        let depth = |i: usize| geo.legs[i].segments.first()
            .map(|s| camera.depth(&geo.place(&s.midpoint)))
            .unwrap_or(0.0);
        depth(a).total_cmp(&depth(b))
    });

    for i in order {
        let leg = &geo.legs[i];
        let selected = legs.get(i).is_some_and(|s| s.is_active());
        let hovered  = legs.get(i).is_some_and(|s| s.is_hovered());
        let mut color = if selected { SELECTED_COLOR } else { SEGMENT_COLOR };
        if hovered { color = blend(color, 0xFFFFFFFF, 0.35); }

        for seg in &leg.segments {
            draw_segment(canvas, &at, seg, 3, color);
            let (x, y) = at(&seg.start);
            canvas.draw_diamond(x, y, 3, color);
        }
        if let Some(last) = leg.segments.last() {
            let (x, y) = at(&last.end);
            let foot = if last.is_ground_contact { CONTACT_COLOR } else { color };
            canvas.draw_diamond(x, y, 4, foot);
        }
    }
}

/// Draw a segment the way a renderer places a cylinder: from its transform,
/// not its raw endpoints.
fn draw_segment(
    canvas: &mut Canvas,
    at: &impl Fn(&Joint) -> (f64, f64),
    seg: &Segment,
    thickness: usize,
    color: u32,
) {
    let (a, b) = seg.axis_endpoints();
    canvas.draw_line(at(&a), at(&b), thickness, color);
}

fn draw_stick(canvas: &mut Canvas, stick: &Stick) {
    let cfg = stick.tracker.config();
    let r = cfg.size / 2.0;
    let (cx, cy) = (stick.left + r, stick.top + r);
    let lift = cfg.elevation as f64;

    canvas.fill_circle(cx + lift, cy + lift, r, SHADOW_COLOR);
    canvas.fill_circle(cx, cy, r, STICK_BG);
    canvas.draw_line((cx - r, cy), (cx + r, cy), 1, GRID_CELL_COLOR);
    canvas.draw_line((cx, cy - r), (cx, cy + r), 1, GRID_CELL_COLOR);

    let (ox, oy) = stick.tracker.handle_offset();
    let h = cfg.handle_size / 2.0;
    let color = if stick.tracker.is_dragging() { blend(SEGMENT_COLOR, 0xFFFFFFFF, 0.35) } else { SEGMENT_COLOR };
    canvas.fill_circle(stick.left + ox + h + lift, stick.top + oy + h + lift, h, SHADOW_COLOR);
    canvas.fill_circle(stick.left + ox + h, stick.top + oy + h, h, color);

    canvas.draw_label(stick.id.label(), stick.left as usize, (stick.top + cfg.size) as usize + 6, 1, LABEL_COLOR);
}

fn draw_slider(canvas: &mut Canvas, slider: &Slider, label: &str) {
    let (min, max) = slider.range();
    let value = format!("{} {:.1}", label, slider.value());
    let f = slider.fraction();
    let (start, end, thumb) = match slider.orientation {
        Orientation::Horizontal => (
            (slider.left, slider.top),
            (slider.left + slider.length, slider.top),
            (slider.left + f * slider.length, slider.top),
        ),
        Orientation::Vertical => (
            (slider.left, slider.top + slider.length),
            (slider.left, slider.top),
            (slider.left, slider.top + (1.0 - f) * slider.length),
        ),
    };
    canvas.draw_line(start, end, 2, GRID_CELL_COLOR);
    canvas.draw_line(start, thumb, 2, SEGMENT_COLOR);

    // Marks at every step.
    let steps = if slider.step() > 0.0 { ((max - min) / slider.step()).round() as usize } else { 1 };
    for k in 0..=steps {
        let t = k as f64 / steps.max(1) as f64;
        let (x, y) = (start.0 + t * (end.0 - start.0), start.1 + t * (end.1 - start.1));
        canvas.set_pixel(x as isize, y as isize, LABEL_COLOR);
    }

    canvas.fill_circle(thumb.0, thumb.1, 6.0, if slider.is_dragging() { SELECTED_COLOR } else { SEGMENT_COLOR });
    let (lx, ly) = match slider.orientation {
        Orientation::Horizontal => (slider.left, slider.top + 12.0),
        Orientation::Vertical   => (slider.left + 12.0, slider.top + slider.length - 5.0),
    };
    canvas.draw_label(&value, lx as usize, ly as usize, 1, LABEL_COLOR);
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas — ARGB framebuffer with primitive drawing
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    pub width:  usize,
    pub height: usize,
    pub buf:    Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buf: vec![BG_COLOR; width * height] }
    }

    pub fn clear(&mut self, color: u32) { self.buf.fill(color); }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.width && y < self.height).then(|| self.buf[y * self.width + x])
    }

    pub fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    /// Thick line by stepping along the major axis.
    pub fn draw_line(&mut self, a: (f64, f64), b: (f64, f64), thickness: usize, color: u32) {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        if !steps.is_finite() || steps > 10_000.0 { return; }
        let half = thickness as isize / 2;
        for i in 0..=steps as usize {
            let t = i as f64 / steps;
            let x = (a.0 + t * dx).round() as isize;
            let y = (a.1 + t * dy).round() as isize;
            for oy in -half..=(thickness as isize - 1 - half) {
                for ox in -half..=(thickness as isize - 1 - half) {
                    self.set_pixel(x + ox, y + oy, color);
                }
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: u32) {
        let ri = r.ceil() as isize;
        let (cxi, cyi) = (cx.round() as isize, cy.round() as isize);
        for dy in -ri..=ri {
            for dx in -ri..=ri {
                if ((dx * dx + dy * dy) as f64) <= r * r {
                    self.set_pixel(cxi + dx, cyi + dy, color);
                }
            }
        }
    }

    pub fn draw_diamond(&mut self, cx: f64, cy: f64, r: usize, color: u32) {
        let (cx, cy, r) = (cx.round() as isize, cy.round() as isize, r as isize);
        for dy in -r..=r {
            let w = r - dy.abs();
            for dx in -w..=w {
                self.set_pixel(cx + dx, cy + dy, color);
            }
        }
    }

    /// Minimal bitmap font: 3×5 glyphs, each pixel drawn `scale`×`scale`.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let s = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            if cx + 4 * s > self.width { break; }
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * s, y + row * s, s, s, color);
                    }
                }
            }
            cx += 4 * s; // 3 wide + 1 gap
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionBus;
    use hexapod_pose::{PoseFrame, PoseGeometryEngine};

    fn standing() -> PoseGeometry {
        let leg = |x: f64, z: f64| {
            let s = z.signum();
            format!(
                "[[{x},0.03,{z}],[{x},0.03,{z1}],[{x},0.078,{z2}],[{x},0,{z2}]]",
                x = x, z = z, z1 = z + s * 0.03, z2 = z + s * 0.07,
            )
        };
        let legs = [
            leg(0.07, -0.04), leg(0.0, -0.05), leg(-0.07, -0.04),
            leg(0.07, 0.04), leg(0.0, 0.05), leg(-0.07, 0.04),
        ];
        let frame = PoseFrame::from_json(&format!("{{\"legs\": [{}]}}", legs.join(","))).unwrap();
        PoseGeometryEngine::default().compute(&frame)
    }

    #[test]
    fn line_covers_both_endpoints() {
        let mut c = Canvas::new(20, 20);
        c.draw_line((2.0, 3.0), (15.0, 9.0), 1, 0xFFFFFFFF);
        assert_eq!(c.pixel(2, 3), Some(0xFFFFFFFF));
        assert_eq!(c.pixel(15, 9), Some(0xFFFFFFFF));
    }

    #[test]
    fn drawing_clips_at_edges() {
        let mut c = Canvas::new(10, 10);
        c.draw_line((-50.0, -50.0), (50.0, 50.0), 3, 1);
        c.fill_circle(9.0, 9.0, 5.0, 2);
        c.fill_rect(8, 8, 10, 10, 3);
        c.draw_label("CLIPPED TEXT", 5, 8, 2, 4);
        assert_eq!(c.pixel(9, 9), Some(3));
        assert_eq!(c.pixel(10, 10), None);
    }

    #[test]
    fn diamond_is_filled() {
        let mut c = Canvas::new(9, 9);
        c.draw_diamond(4.0, 4.0, 2, 7);
        assert_eq!(c.pixel(4, 4), Some(7));
        assert_eq!(c.pixel(4, 2), Some(7));
        assert_eq!(c.pixel(2, 2), Some(BG_COLOR));
    }

    #[test]
    fn press_drag_release_edges() {
        let p = Some((10.0, 20.0));
        assert_eq!(
            pointer_edges(false, None, true, p),
            vec![PointerEvent::press(10.0, 20.0)]
        );
        assert_eq!(
            pointer_edges(true, p, true, Some((12.0, 20.0))),
            vec![PointerEvent::drag(12.0, 20.0)]
        );
        assert!(pointer_edges(true, p, true, p).is_empty());
        assert_eq!(pointer_edges(true, p, false, p), vec![PointerEvent::Release]);
        assert_eq!(
            pointer_edges(false, p, false, Some((1.0, 1.0))),
            vec![PointerEvent::Move { page_x: 1.0, page_y: 1.0, buttons: 0 }]
        );
    }

    #[test]
    fn release_outside_window_still_releases() {
        assert_eq!(pointer_edges(true, Some((5.0, 5.0)), false, None), vec![PointerEvent::Release]);
    }

    #[test]
    fn paints_contacts_and_selection() {
        let geo = standing();
        let bus = SelectionBus::new();
        let mut legs: Vec<Selectable> = (0..6).map(|_| Selectable::new(&bus)).collect();
        legs[1].toggle();
        let camera = Camera::new(1500.0, (SCENE_W as f64 / 2.0, STATUS_Y as f64 / 2.0));
        let panel = ControlPanel::new(SCENE_W as f64, 0.0).unwrap();
        let view = SceneView { geometry: Some(&geo), legs: &legs, camera: &camera, panel: &panel, status: "ok" };

        let mut canvas = Canvas::new(WIN_W, WIN_H);
        paint(&mut canvas, &view);

        // Every foot touches the ground.
        for leg in &geo.legs {
            let (x, y) = camera.project(&leg.segments.last().unwrap().end);
            assert_eq!(canvas.pixel(x.round() as usize, y.round() as usize), Some(CONTACT_COLOR));
        }
        // The selected leg's knee is drawn in gold.
        let (x, y) = camera.project(&geo.legs[1].segments[1].end);
        assert_eq!(canvas.pixel(x.round() as usize, y.round() as usize), Some(SELECTED_COLOR));
        // Panel background.
        assert_eq!(canvas.pixel(WIN_W - 2, STATUS_Y - 2), Some(PANEL_BG));
    }

    #[test]
    fn leveling_moves_the_drawn_pose() {
        // Feet on the tilted plane y = 0.3·x.
        let leg = |x: f64, z: f64| {
            let s = z.signum();
            format!(
                "[[{x},0.05,{z}],[{x},0.05,{z1}],[{x},0.09,{z2}],[{x},{fy},{z2}]]",
                x = x, z = z, z1 = z + s * 0.03, z2 = z + s * 0.07, fy = 0.3 * x,
            )
        };
        let legs = [
            leg(0.07, -0.04), leg(0.0, -0.05), leg(-0.07, -0.04),
            leg(0.07, 0.04), leg(0.0, 0.05), leg(-0.07, 0.04),
        ];
        let frame = PoseFrame::from_json(&format!("{{\"legs\": [{}]}}", legs.join(","))).unwrap();

        let flat = PoseGeometryEngine::default().compute(&frame);
        let mut engine = PoseGeometryEngine::default();
        engine.set_level_body(true);
        let level = engine.compute(&frame);
        assert!(level.body_rotation.angle() > 0.2);

        let bus = SelectionBus::new();
        let selectables: Vec<Selectable> = (0..6).map(|_| Selectable::new(&bus)).collect();
        let camera = Camera::new(1500.0, (SCENE_W as f64 / 2.0, STATUS_Y as f64 / 2.0));
        let panel = ControlPanel::new(SCENE_W as f64, 0.0).unwrap();
        let frame_for = |geo: &PoseGeometry| {
            let view = SceneView { geometry: Some(geo), legs: &selectables, camera: &camera, panel: &panel, status: "" };
            let mut canvas = Canvas::new(WIN_W, WIN_H);
            paint(&mut canvas, &view);
            canvas.buf
        };
        assert_ne!(frame_for(&flat), frame_for(&level));

        // The leveled feet all sit at the same height.
        let heights: Vec<f64> = level.legs.iter()
            .map(|l| level.place(&l.segments.last().unwrap().end).y)
            .collect();
        for h in &heights {
            assert!((h - heights[0]).abs() < 1e-9);
        }
    }

    #[test]
    fn paints_without_telemetry() {
        let bus = SelectionBus::new();
        let camera = Camera::new(1500.0, (SCENE_W as f64 / 2.0, STATUS_Y as f64 / 2.0));
        let panel = ControlPanel::new(SCENE_W as f64, 0.0).unwrap();
        let legs = vec![Selectable::new(&bus)];
        let view = SceneView { geometry: None, legs: &legs, camera: &camera, panel: &panel, status: "" };
        let mut canvas = Canvas::new(WIN_W, WIN_H);
        paint(&mut canvas, &view);
        assert_eq!(canvas.pixel(5, STATUS_Y + 1), Some(TEXT_BG));
    }
}
