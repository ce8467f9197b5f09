//! Camera and picking for the pose view.
//!
//! The view is an orthographic projection looking at the origin from
//! `(-1, 1, -1)`, so the robot is seen from above and behind its left side.
//! Both the renderer and the click handler go through [`Camera::project`],
//! so what you click is what was drawn.

use nalgebra::{Unit, Vector3};

use hexapod_pose::{Joint, PoseGeometry};

/// Direction from the look-at point toward the eye.
pub fn eye_direction() -> Unit<Vector3<f64>> {
    Unit::new_normalize(Vector3::new(-1.0, 1.0, -1.0))
}

/// Orthographic camera mapping world meters to window pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Screen-right in world coordinates.
    right:  Vector3<f64>,
    /// Screen-up in world coordinates.
    up:     Vector3<f64>,
    /// Toward the viewer.
    back:   Vector3<f64>,
    /// Pixels per meter.
    pub scale:  f64,
    /// Pixel the world origin lands on.
    pub center: (f64, f64),
}

impl Camera {
    pub fn new(scale: f64, center: (f64, f64)) -> Self {
        let back  = eye_direction().into_inner();
        let right = Vector3::y().cross(&back).normalize();
        let up    = back.cross(&right);
        Camera { right, up, back, scale, center }
    }

    /// Window pixel for a world point.  Screen Y grows downward.
    pub fn project(&self, p: &Joint) -> (f64, f64) {
        (
            self.center.0 + self.scale * p.dot(&self.right),
            self.center.1 - self.scale * p.dot(&self.up),
        )
    }

    /// Distance toward the viewer; larger is nearer.
    pub fn depth(&self, p: &Joint) -> f64 {
        p.dot(&self.back)
    }
}

/// Distance in pixels from `(px, py)` to the segment `a`–`b`.
pub fn distance_to_segment(px: f64, py: f64, a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((px - a.0) * dx + (py - a.1) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (px - (a.0 + t * dx)).hypot(py - (a.1 + t * dy))
}

/// The leg whose drawn segments pass closest to the pixel, if within
/// `radius` pixels.  Segments are placed by the body rotation first, the
/// same way the renderer places them.
pub fn pick_leg(geometry: &PoseGeometry, camera: &Camera, x: f64, y: f64, radius: f64) -> Option<usize> {
    geometry.legs.iter().enumerate()
        .flat_map(|(i, leg)| {
            leg.segments.iter().map(move |s| (i, s))
        })
        .map(|(i, s)| {
            let (a, b) = s.axis_endpoints();
            let (a, b) = (geometry.place(&a), geometry.place(&b));
            (i, distance_to_segment(x, y, camera.project(&a), camera.project(&b)))
        })
        .filter(|&(_, d)| d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hexapod_pose::{PoseFrame, PoseGeometryEngine};
    use nalgebra::UnitQuaternion;

    fn camera() -> Camera {
        Camera::new(1000.0, (300.0, 200.0))
    }

    #[test]
    fn origin_lands_on_center() {
        let (x, y) = camera().project(&Joint::zeros());
        assert_relative_eq!(x, 300.0);
        assert_relative_eq!(y, 200.0);
    }

    #[test]
    fn world_up_is_screen_up() {
        let (x, y) = camera().project(&Joint::new(0.0, 0.1, 0.0));
        assert_relative_eq!(x, 300.0, epsilon = 1e-9);
        assert!(y < 200.0);
    }

    #[test]
    fn view_axis_collapses_to_a_point() {
        let cam = camera();
        let (x, y) = cam.project(&Joint::new(-0.1, 0.1, -0.1));
        assert_relative_eq!(x, 300.0, epsilon = 1e-9);
        assert_relative_eq!(y, 200.0, epsilon = 1e-9);
        assert!(cam.depth(&Joint::new(-0.1, 0.1, -0.1)) > 0.0);
    }

    #[test]
    fn basis_is_orthonormal() {
        let cam = camera();
        assert_relative_eq!(cam.right.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cam.up.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(cam.right.dot(&cam.up), 0.0, epsilon = 1e-12);
        assert_relative_eq!(cam.right.dot(&cam.back), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn segment_distance() {
        assert_relative_eq!(distance_to_segment(5.0, 3.0, (0.0, 0.0), (10.0, 0.0)), 3.0);
        assert_relative_eq!(distance_to_segment(-4.0, 3.0, (0.0, 0.0), (10.0, 0.0)), 5.0);
        assert_relative_eq!(distance_to_segment(3.0, 4.0, (0.0, 0.0), (0.0, 0.0)), 5.0);
    }

    #[test]
    fn picks_the_leg_under_the_pointer() {
        let leg = |x: f64| format!("[[{x},0.03,0],[{x},0.03,0.05],[{x},0,0.08]]", x = x);
        let legs: Vec<String> = (0..6).map(|i| leg(i as f64 * 0.05)).collect();
        let json = format!("{{\"legs\": [{}]}}", legs.join(","));
        let frame = PoseFrame::from_json(&json).unwrap();
        let geo = PoseGeometryEngine::default().compute(&frame);
        let cam = camera();

        let (x, y) = cam.project(&geo.legs[4].segments[1].midpoint);
        assert_eq!(pick_leg(&geo, &cam, x, y, 6.0), Some(4));
        assert_eq!(pick_leg(&geo, &cam, x + 500.0, y, 6.0), None);
    }

    #[test]
    fn picking_follows_the_body_rotation() {
        let leg = |x: f64| format!("[[{x},0.03,0],[{x},0.03,0.05],[{x},0,0.08]]", x = x);
        let legs: Vec<String> = (0..6).map(|i| leg(i as f64 * 0.05)).collect();
        let json = format!("{{\"legs\": [{}]}}", legs.join(","));
        let frame = PoseFrame::from_json(&json).unwrap();
        let mut geo = PoseGeometryEngine::default().compute(&frame);
        geo.body_rotation = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.3);
        let cam = camera();

        let mid = geo.legs[5].segments[1].midpoint;
        let (x, y) = cam.project(&geo.place(&mid));
        assert_eq!(pick_leg(&geo, &cam, x, y, 2.0), Some(5));

        // The unrotated spot is empty space now.
        let (x, y) = cam.project(&mid);
        assert_eq!(pick_leg(&geo, &cam, x, y, 2.0), None);
    }
}
