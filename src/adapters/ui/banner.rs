//! Neon ASCII banner with gradient (INTAKE).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Clinic Teal (#14b8a6).
const CLINIC_TEAL: (u8, u8, u8) = (0x14, 0xb8, 0xa6);
/// Calm Blue (#3b82f6).
const CALM_BLUE: (u8, u8, u8) = (0x3b, 0x82, 0xf6);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints "INTAKE" in the standard figlet font with a teal-to-blue gradient,
/// then the version. Falls back to a plain title if the font cannot render.
pub fn print_welcome() {
    let mut out = stdout();
    let art = FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("INTAKE").map(|figure| figure.to_string()))
        .unwrap_or_else(|| "INTAKE DESK".to_string());
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(CLINIC_TEAL, CALM_BLUE, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: CALM_BLUE.0,
        g: CALM_BLUE.1,
        b: CALM_BLUE.2,
    }));
    let _ = out.execute(Print(format!("v{}  patient intake assistant\r\n", version)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
