//! Interactive explorer for the joystick shaping curve.
//! Type raw offsets and see where the handle would land.

use hexapod_input::{AxisShaper, StickyAxis};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║          Hexapod Joystick Shaping Explorer           ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let mut shaper = AxisShaper::default();

    loop {
        print_menu(&shaper);
        let choice = read_line("Command: ");

        match choice.trim() {
            "1" => shaper.sticky_axis = pick_sticky(),
            "2" => {
                shaper.center_return = !shaper.center_return;
                println!("  Center return now {}.\n", on_off(shaper.center_return));
            }
            "3" => shape_one(&shaper),
            "4" => sweep(&shaper),
            c if c.eq_ignore_ascii_case("q") => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => println!("  ⚠  Please enter 1–4 or q.\n"),
        }
    }
}

fn print_menu(shaper: &AxisShaper) {
    println!("  sticky axis: {:?} (k = {:.2})   center return: {}",
             shaper.sticky_axis, shaper.sticky_axis.exponent(), on_off(shaper.center_return));
    println!("  1. Set sticky axis");
    println!("  2. Toggle center return");
    println!("  3. Shape one raw offset");
    println!("  4. Sweep the diagonal");
    println!("  q. Quit");
}

fn pick_sticky() -> StickyAxis {
    println!("    1.Off  2.On  3.Custom pull");
    match read_line("    Choice (default 2): ").trim() {
        "1" => StickyAxis::Off,
        "3" => {
            let v = read_line("    Pull 0.0–1.0 (default 0.5): ")
                .trim().parse().unwrap_or(0.5);
            StickyAxis::Pull(v)
        }
        _ => StickyAxis::On,
    }
}

fn shape_one(shaper: &AxisShaper) {
    let line = read_line("  Raw x y (e.g. 0.5 -0.25): ");
    let mut parts = line.split_whitespace().map(|s| s.parse::<f64>());
    let (x, y) = match (parts.next(), parts.next()) {
        (Some(Ok(x)), Some(Ok(y))) => (x, y),
        _ => { println!("  ⚠  Need two numbers.\n"); return; }
    };
    let p = shaper.shape(x, y);
    println!("  ({:>7.4}, {:>7.4})  →  ({:>7.4}, {:>7.4})   |p| = {:.4}\n",
             x, y, p.x, p.y, p.magnitude());
}

fn sweep(shaper: &AxisShaper) {
    println!("  {:>6}  {:>8}  {:>8}", "raw", "x", "|p|");
    for i in 0..=10 {
        let r = i as f64 / 10.0 * 1.2;
        let p = shaper.shape(r, r);
        println!("  {:>6.2}  {:>8.4}  {:>8.4}", r, p.x, p.magnitude());
    }
    println!();
}

fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
