use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    Truecolor,
    X256,
    X16,
}

/// Detect terminal color depth from the environment.
/// Priority: PAQUERA_COLOR override, COLORTERM truecolor/24bit, TERM *256color, else 16.
pub fn detect_color_depth() -> ColorDepth {
    if let Ok(force) = std::env::var("PAQUERA_COLOR") {
        match force.trim().to_ascii_lowercase().as_str() {
            "truecolor" | "24bit" => return ColorDepth::Truecolor,
            "256" | "x256" => return ColorDepth::X256,
            "16" | "ansi" => return ColorDepth::X16,
            _ => {}
        }
    }
    let env_contains = |name: &str, needles: &[&str]| {
        std::env::var(name)
            .map(|value| {
                let value = value.to_ascii_lowercase();
                needles.iter().any(|needle| value.contains(needle))
            })
            .unwrap_or(false)
    };
    if env_contains("COLORTERM", &["truecolor", "24bit"]) {
        ColorDepth::Truecolor
    } else if env_contains("TERM", &["256color"]) {
        ColorDepth::X256
    } else {
        ColorDepth::X16
    }
}

/// Nearest representable color for an RGB accent stop.
pub fn rgb_for_depth((r, g, b): (u8, u8, u8), depth: ColorDepth) -> Color {
    match depth {
        ColorDepth::Truecolor => Color::Rgb(r, g, b),
        ColorDepth::X256 => Color::Indexed(xterm_cube_index(r, g, b)),
        ColorDepth::X16 => nearest_ansi16(r, g, b),
    }
}

fn xterm_cube_index(r: u8, g: u8, b: u8) -> u8 {
    let level = |c: u8| match c {
        0..=47 => 0,
        48..=114 => 1,
        _ => ((c - 35) / 40).min(5),
    };
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

fn nearest_ansi16(r: u8, g: u8, b: u8) -> Color {
    const PALETTE: [(u8, u8, u8, Color); 12] = [
        (0, 0, 0, Color::Black),
        (205, 0, 0, Color::Red),
        (0, 205, 0, Color::Green),
        (205, 205, 0, Color::Yellow),
        (0, 0, 205, Color::Blue),
        (205, 0, 205, Color::Magenta),
        (0, 205, 205, Color::Cyan),
        (192, 192, 192, Color::Gray),
        (255, 0, 0, Color::LightRed),
        (255, 255, 0, Color::LightYellow),
        (255, 0, 255, Color::LightMagenta),
        (255, 255, 255, Color::White),
    ];
    let distance = |(pr, pg, pb): (u8, u8, u8)| {
        let dr = pr as i32 - r as i32;
        let dg = pg as i32 - g as i32;
        let db = pb as i32 - b as i32;
        dr * dr + dg * dg + db * db
    };
    PALETTE
        .iter()
        .min_by_key(|(pr, pg, pb, _)| distance((*pr, *pg, *pb)))
        .map(|(_, _, _, color)| *color)
        .unwrap_or(Color::Reset)
}
