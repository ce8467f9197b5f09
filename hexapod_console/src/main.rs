//! hexapod_console — operator console entry point.

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use hexapod_console::app::{run, AppConfig};
use hexapod_link::CommandProfile;
use hexapod_pose::GeometryConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Profile {
    /// Walking-gait firmware: step, step height, turn, body pose.
    Gait,
    /// Velocity-only firmware: speed and turn.
    Drive,
    /// Every field, version stamped.
    Full,
}

impl From<Profile> for CommandProfile {
    fn from(p: Profile) -> Self {
        match p {
            Profile::Gait  => CommandProfile::gait(),
            Profile::Drive => CommandProfile::drive(),
            Profile::Full  => CommandProfile::full(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "hexapod_console")]
#[command(version, about = "Drive panel and live pose view for a six-legged robot")]
struct Args {
    /// Telemetry WebSocket.
    #[arg(long, default_value = "ws://localhost:8080")]
    monitor_url: String,

    /// Control WebSocket.
    #[arg(long, default_value = "ws://localhost:8081")]
    control_url: String,

    /// Which packet fields the robot firmware understands.
    #[arg(long, value_enum, default_value_t = Profile::Gait)]
    profile: Profile,

    /// Foot height (meters) still counted as ground contact.
    #[arg(long, default_value_t = 0.0)]
    contact_tolerance: f64,

    /// Start with body leveling on (toggle with L).
    #[arg(long)]
    level_body: bool,

    /// Pose view zoom, pixels per meter.
    #[arg(long, default_value_t = 1500.0)]
    scale: f64,

    /// Log filter, e.g. "debug" or "hexapod_link=trace".  RUST_LOG wins.
    #[arg(long, default_value = "info")]
    log: String,
}

fn init_tracing(default: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║            Hexapod Console — Drive Panel & Pose View         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Control : {}  ({:?} profile)", args.control_url, args.profile);
    println!("  Monitor : {}", args.monitor_url);
    println!("  Keys    : click leg = select   Esc = deselect all   L = level   Q = quit");
    println!();

    let cfg = AppConfig {
        monitor_url: args.monitor_url,
        control_url: args.control_url,
        profile:     args.profile.into(),
        geometry:    GeometryConfig {
            contact_tolerance: args.contact_tolerance.abs(),
            level_body:        args.level_body,
        },
        scale:       args.scale,
    };

    run(cfg)
}
