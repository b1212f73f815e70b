use crate::error::{Error, Result};

/// Straight-alpha color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub fn from_rgb(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self { r, g, b, a: 1.0 }
    }

    pub fn from_rgba(hex: u32, alpha: f32) -> Self {
        Self::from_rgb(hex).with_alpha(alpha)
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self {
            r: f32::from(rgb[0]) / 255.0,
            g: f32::from(rgb[1]) / 255.0,
            b: f32::from(rgb[2]) / 255.0,
            a: 1.0,
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha.clamp(0.0, 1.0);
        self
    }

    /// Parses `#rrggbb` (the `#` is optional, digits are case-insensitive).
    pub fn parse_hex(value: &str) -> Result<Self> {
        parse_hex_rgb(value)
            .map(Self::from_rgb8)
            .ok_or_else(|| Error::InvalidColorSpec(value.to_string()))
    }
}

/// Exactly six hex digits with an optional leading `#`; anything else is rejected.
pub fn parse_hex_rgb(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Text color picked for legibility over a flat background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Foreground {
    Black,
    White,
}

impl Foreground {
    pub fn color(self) -> Color {
        match self {
            Foreground::Black => Color::BLACK,
            Foreground::White => Color::WHITE,
        }
    }
}

/// BT.601 luma scaled by 1000, so the threshold comparison stays exact.
fn luma_millis(rgb: [u8; 3]) -> u32 {
    299 * u32::from(rgb[0]) + 587 * u32::from(rgb[1]) + 114 * u32::from(rgb[2])
}

pub fn luma(rgb: [u8; 3]) -> f32 {
    luma_millis(rgb) as f32 / 1000.0
}

/// Black text on backgrounds brighter than 128, white otherwise. `None` when
/// the input is not a six-digit hex color; the caller picks the fallback.
pub fn resolve_foreground(background_hex: &str) -> Option<Foreground> {
    let rgb = parse_hex_rgb(background_hex)?;
    if luma_millis(rgb) > 128_000 {
        Some(Foreground::Black)
    } else {
        Some(Foreground::White)
    }
}

/// Every `#rrggbb` occurrence in `spec`, in order of appearance.
pub fn find_hex_colors(spec: &str) -> Vec<[u8; 3]> {
    let bytes = spec.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'#'
            && let Some(digits) = spec.get(i + 1..i + 7)
            && let Some(rgb) = parse_hex_rgb(digits)
        {
            found.push(rgb);
            i += 7;
            continue;
        }
        i += 1;
    }
    found
}

/// First two colors of a gradient spec, or black to white when fewer are present.
pub fn gradient_stops(spec: &str) -> (Color, Color) {
    match find_hex_colors(spec).as_slice() {
        [first, second, ..] => (Color::from_rgb8(*first), Color::from_rgb8(*second)),
        _ => (Color::BLACK, Color::WHITE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        assert_eq!(parse_hex_rgb("#2c3e50"), Some([0x2c, 0x3e, 0x50]));
        assert_eq!(parse_hex_rgb("2C3E50"), Some([0x2c, 0x3e, 0x50]));
        assert_eq!(parse_hex_rgb("#fff"), None);
        assert_eq!(parse_hex_rgb("#12345g"), None);
        assert_eq!(parse_hex_rgb("##123456"), None);
        assert_eq!(parse_hex_rgb(""), None);
    }

    #[test]
    fn invalid_hex_is_a_color_spec_error() {
        match Color::parse_hex("red") {
            Err(Error::InvalidColorSpec(value)) => assert_eq!(value, "red"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn contrast_picks_black_on_white_and_white_on_black() {
        assert_eq!(resolve_foreground("#FFFFFF"), Some(Foreground::Black));
        assert_eq!(resolve_foreground("#000000"), Some(Foreground::White));
        assert_eq!(resolve_foreground("#2c3e50"), Some(Foreground::White));
        assert_eq!(resolve_foreground("#f39c12"), Some(Foreground::Black));
    }

    #[test]
    fn contrast_boundary_is_strict() {
        assert_eq!(luma([0x80, 0x80, 0x80]), 128.0);
        assert_eq!(resolve_foreground("#808080"), Some(Foreground::White));
        assert_eq!(resolve_foreground("#818181"), Some(Foreground::Black));
    }

    #[test]
    fn contrast_has_no_decision_for_malformed_input() {
        assert_eq!(resolve_foreground("rgb(0,0,0)"), None);
        assert_eq!(resolve_foreground("#abc"), None);
    }

    #[test]
    fn gradient_stops_take_first_two_matches() {
        let (start, end) = gradient_stops("linear-gradient(45deg, #08AEEA, #2AF598, #000000)");
        assert_eq!(start, Color::from_rgb8([0x08, 0xae, 0xea]));
        assert_eq!(end, Color::from_rgb8([0x2a, 0xf5, 0x98]));
    }

    #[test]
    fn gradient_stops_default_to_black_and_white() {
        assert_eq!(gradient_stops("linear-gradient(#123456)"), (Color::BLACK, Color::WHITE));
        assert_eq!(gradient_stops("none"), (Color::BLACK, Color::WHITE));
    }

    #[test]
    fn hex_scan_skips_short_runs() {
        assert_eq!(
            find_hex_colors("#abc #1234567 x#00ff00"),
            vec![[0x12, 0x34, 0x56], [0x00, 0xff, 0x00]]
        );
    }
}
