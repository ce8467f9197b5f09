//! Read telemetry JSON (one message per line) from stdin and print the
//! segment geometry of every frame that changes.
//!
//! ```text
//! websocat ws://localhost:8080 | pose_inspect --tolerance 0.001 --level
//! ```

use clap::Parser;
use nalgebra::Vector3;
use hexapod_pose::{FrameUpdate, GeometryConfig, PoseGeometry, PoseGeometryEngine, TelemetryDecoder};
use std::io::{self, BufRead};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pose_inspect")]
#[command(version, about = "Print segment geometry for telemetry read from stdin")]
struct Args {
    /// Foot height (meters) still counted as ground contact.
    #[arg(long, default_value_t = 0.0, value_parser = parse_tolerance)]
    tolerance: f64,

    /// Level the body on the three lowest feet.
    #[arg(long)]
    level: bool,
}

impl Args {
    fn geometry(&self) -> GeometryConfig {
        GeometryConfig { contact_tolerance: self.tolerance, level_body: self.level }
    }
}

fn parse_tolerance(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(format!("{v} is not a non-negative distance"))
    }
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let engine = PoseGeometryEngine::new(args.geometry());
    let mut decoder = TelemetryDecoder::new();

    for line in io::stdin().lock().lines() {
        let Ok(line) = line else { break };
        if line.trim().is_empty() { continue; }

        if decoder.ingest(&line) != FrameUpdate::Changed { continue; }
        if let Some(frame) = decoder.current() {
            print_geometry(decoder.stats().accepted, &engine.compute(frame));
        }
    }

    let stats = decoder.stats();
    eprintln!(
        "\n  frames: {} changed, {} duplicate, {} rejected",
        stats.accepted, stats.duplicates, stats.rejected
    );
}

fn print_geometry(index: u64, geo: &PoseGeometry) {
    let (axis, angle) = geo.body_rotation.axis_angle()
        .map(|(a, t)| (a.into_inner(), t))
        .unwrap_or((Vector3::zeros(), 0.0));
    println!("── frame {} ── contacts {}/6  body tilt {:.2}° about ({:.2}, {:.2}, {:.2})",
             index, geo.contact_count(), angle.to_degrees(), axis.x, axis.y, axis.z);

    for (i, leg) in geo.legs.iter().enumerate() {
        for (j, s) in leg.segments.iter().enumerate() {
            println!(
                "  leg {} seg {}  len {:>7.4} m  angle {:>6.1}°  mid ({:>7.4}, {:>7.4}, {:>7.4}){}",
                i, j, s.length, s.angle.to_degrees(),
                s.midpoint.x, s.midpoint.y, s.midpoint.z,
                if s.is_ground_contact { "  ▼ contact" } else { "" },
            );
        }
    }
}
