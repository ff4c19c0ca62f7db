//! Canvas-safe color representation.
//!
//! Every color that reaches the element model is reduced to [`Color`], an
//! sRGB triple with a straight alpha channel. The textual form is always
//! `rgba(r, g, b, a)`, which both the interactive canvas and the print
//! serializer accept.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Alpha values below this threshold collapse to fully transparent.
pub const NEAR_ZERO_ALPHA: f32 = 0.01;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha in `[0, 1]`, rounded to three decimals.
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color with alpha.
    ///
    /// Alpha is clamped to `[0, 1]` and rounded to three decimals so that the
    /// textual form round-trips exactly. Non-finite alpha is treated as opaque.
    #[must_use]
    pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        let a = if a.is_finite() { a.clamp(0.0, 1.0) } else { 1.0 };
        Self {
            r,
            g,
            b,
            a: (a * 1000.0).round() / 1000.0,
        }
    }

    /// Create a gray level with alpha.
    #[must_use]
    pub fn gray(level: u8, a: f32) -> Self {
        Self::rgba(level, level, level, a)
    }

    /// Return the same color with a different alpha.
    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Whether the color paints nothing.
    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.a < NEAR_ZERO_ALPHA
    }

    /// Collapse near-zero alpha to [`Color::TRANSPARENT`].
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.is_transparent() {
            Self::TRANSPARENT
        } else {
            self
        }
    }

    /// Opaque `#rrggbb` form, ignoring alpha.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse any supported CSS color syntax.
    ///
    /// Supports hex (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`), `rgb()`/`rgba()`
    /// in comma and space syntax, `hsl()`/`hsla()`, `transparent` and a table of
    /// common named colors. Returns `None` for anything else.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let value = input.trim().to_ascii_lowercase();
        if value.is_empty() {
            return None;
        }
        if value == "transparent" {
            return Some(Self::TRANSPARENT);
        }
        let parsed = if let Some(hex) = value.strip_prefix('#') {
            parse_hex(hex)
        } else if let Some(func) = ColorFunction::parse(&value) {
            match func.name {
                "rgb" | "rgba" => func.to_rgb(),
                "hsl" | "hsla" => func.to_hsl(),
                _ => None,
            }
        } else {
            named_color(&value)
        };
        parsed.map(Self::normalized)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unrecognized color: {s}"))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A parsed CSS color function such as `rgb(1 2 3 / 50%)`.
///
/// Channels are kept as raw tokens so callers can interpret them per color
/// space. Both comma and whitespace separators are accepted, and the alpha
/// channel may follow a `/` or appear as a fourth comma-separated channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorFunction<'a> {
    /// Lowercase function name.
    pub name: &'a str,
    /// Color channel tokens.
    pub channels: Vec<&'a str>,
    /// Alpha token, if present.
    pub alpha: Option<&'a str>,
}

impl<'a> ColorFunction<'a> {
    /// Split `name(args)` into its parts.
    #[must_use]
    pub fn parse(input: &'a str) -> Option<Self> {
        let open = input.find('(')?;
        let close = input.rfind(')')?;
        if close < open {
            return None;
        }
        let name = input[..open].trim();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
            return None;
        }
        let inner = &input[open + 1..close];
        let (main, slash_alpha) = match inner.split_once('/') {
            Some((main, alpha)) => (main, Some(alpha.trim())),
            None => (inner, None),
        };
        let mut channels: Vec<&str> = main
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        let alpha = match slash_alpha {
            Some(a) => Some(a),
            None if channels.len() == 4 => channels.pop(),
            None => None,
        };
        Some(Self {
            name,
            channels,
            alpha,
        })
    }

    /// Resolve the alpha token, defaulting to opaque.
    #[must_use]
    pub fn alpha_value(&self) -> Option<f32> {
        match self.alpha {
            None => Some(1.0),
            Some(token) => parse_unit_interval(token),
        }
    }

    fn to_rgb(&self) -> Option<Color> {
        if self.channels.len() != 3 {
            return None;
        }
        let mut rgb = [0u8; 3];
        for (slot, token) in rgb.iter_mut().zip(&self.channels) {
            *slot = parse_rgb_channel(token)?;
        }
        Some(Color::rgba(rgb[0], rgb[1], rgb[2], self.alpha_value()?))
    }

    fn to_hsl(&self) -> Option<Color> {
        if self.channels.len() != 3 {
            return None;
        }
        let hue = parse_hue(self.channels[0])?;
        let sat = parse_percent(self.channels[1])?;
        let light = parse_percent(self.channels[2])?;
        let (r, g, b) = hsl_to_rgb(hue, sat, light);
        Some(Color::rgba(r, g, b, self.alpha_value()?))
    }
}

/// Convert a `[0, 1]` channel to a byte.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn unit_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::rgba(
            nibble(0)?,
            nibble(1)?,
            nibble(2)?,
            f32::from(nibble(3)?) / 255.0,
        )),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(
            byte(0)?,
            byte(2)?,
            byte(4)?,
            f32::from(byte(6)?) / 255.0,
        )),
        _ => None,
    }
}

fn parse_rgb_channel(token: &str) -> Option<u8> {
    if token == "none" {
        return Some(0);
    }
    if let Some(pct) = token.strip_suffix('%') {
        let v: f32 = pct.parse().ok()?;
        return Some(unit_to_byte(v / 100.0));
    }
    let v: f32 = token.parse().ok()?;
    v.is_finite().then(|| unit_to_byte(v / 255.0))
}

/// Parse a number or percentage into `[0, 1]`.
#[must_use]
pub fn parse_unit_interval(token: &str) -> Option<f32> {
    let token = token.trim();
    if token == "none" {
        return Some(0.0);
    }
    let v = if let Some(pct) = token.strip_suffix('%') {
        pct.parse::<f32>().ok()? / 100.0
    } else {
        token.parse::<f32>().ok()?
    };
    v.is_finite().then(|| v.clamp(0.0, 1.0))
}

fn parse_percent(token: &str) -> Option<f32> {
    let v: f32 = token.strip_suffix('%').unwrap_or(token).parse().ok()?;
    v.is_finite().then(|| (v / 100.0).clamp(0.0, 1.0))
}

fn parse_hue(token: &str) -> Option<f32> {
    let degrees = if let Some(v) = token.strip_suffix("deg") {
        v.parse::<f32>().ok()?
    } else if let Some(v) = token.strip_suffix("turn") {
        v.parse::<f32>().ok()? * 360.0
    } else if let Some(v) = token.strip_suffix("rad") {
        v.parse::<f32>().ok()?.to_degrees()
    } else if token == "none" {
        0.0
    } else {
        token.parse::<f32>().ok()?
    };
    degrees.is_finite().then(|| degrees.rem_euclid(360.0))
}

fn hsl_to_rgb(hue: f32, sat: f32, light: f32) -> (u8, u8, u8) {
    let chroma = (1.0 - (2.0 * light - 1.0).abs()) * sat;
    let h = hue / 60.0;
    let x = chroma * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h {
        h if h < 1.0 => (chroma, x, 0.0),
        h if h < 2.0 => (x, chroma, 0.0),
        h if h < 3.0 => (0.0, chroma, x),
        h if h < 4.0 => (0.0, x, chroma),
        h if h < 5.0 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = light - chroma / 2.0;
    (unit_to_byte(r + m), unit_to_byte(g + m), unit_to_byte(b + m))
}

fn named_color(name: &str) -> Option<Color> {
    let (r, g, b) = match name {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "navy" => (0, 0, 128),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "fuchsia" | "magenta" => (255, 0, 255),
        "aqua" | "cyan" => (0, 255, 255),
        "teal" => (0, 128, 128),
        "olive" => (128, 128, 0),
        "maroon" => (128, 0, 0),
        "silver" => (192, 192, 192),
        "gray" | "grey" => (128, 128, 128),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "whitesmoke" => (245, 245, 245),
        "gainsboro" => (220, 220, 220),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "gold" => (255, 215, 0),
        "beige" => (245, 245, 220),
        "ivory" => (255, 255, 240),
        "coral" => (255, 127, 80),
        "salmon" => (250, 128, 114),
        "tan" => (210, 180, 140),
        "khaki" => (240, 230, 140),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        _ => return None,
    };
    Some(Color::rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#0d9488"), Some(Color::rgb(13, 148, 136)));
        let half = Color::parse("#0d948880").expect("hex8");
        assert_eq!((half.r, half.g, half.b), (13, 148, 136));
        assert!((half.a - 0.502).abs() < 1e-6);
        assert!(Color::parse("#12345").is_none());
        assert!(Color::parse("#ggg").is_none());
    }

    #[test]
    fn test_parse_rgb_functions() {
        assert_eq!(
            Color::parse("rgba(0,0,0,0.6)"),
            Some(Color::rgba(0, 0, 0, 0.6))
        );
        assert_eq!(
            Color::parse("rgb(255 128 0 / 50%)"),
            Some(Color::rgba(255, 128, 0, 0.5))
        );
        assert_eq!(Color::parse("RGB(100%, 0%, 0%)"), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn test_parse_hsl() {
        assert_eq!(Color::parse("hsl(0, 100%, 50%)"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("hsl(120deg 100% 25%)"), Some(Color::rgb(0, 128, 0)));
    }

    #[test]
    fn test_near_zero_alpha_is_transparent() {
        assert_eq!(
            Color::parse("rgba(12, 34, 56, 0.004)"),
            Some(Color::TRANSPARENT)
        );
        assert_eq!(Color::parse("transparent"), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_display_round_trip() {
        let color = Color::rgba(30, 58, 95, 0.7);
        let text = color.to_string();
        assert_eq!(text, "rgba(30, 58, 95, 0.7)");
        assert_eq!(Color::parse(&text), Some(color));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Color::rgb(1, 2, 3)).expect("serialize");
        assert_eq!(json, "\"rgba(1, 2, 3, 1)\"");
        let back: Color = serde_json::from_str("\"#010203\"").expect("deserialize");
        assert_eq!(back, Color::rgb(1, 2, 3));
        assert!(serde_json::from_str::<Color>("\"not-a-color\"").is_err());
    }

    #[test]
    fn test_color_function_split() {
        let func = ColorFunction::parse("oklch(0.7 0.1 200 / 0.5)").expect("function");
        assert_eq!(func.name, "oklch");
        assert_eq!(func.channels, vec!["0.7", "0.1", "200"]);
        assert_eq!(func.alpha, Some("0.5"));
    }
}
