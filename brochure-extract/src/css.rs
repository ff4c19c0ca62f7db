//! Parsing of resolved CSS values.
//!
//! Computed styles arrive as strings in whatever form the browser chose to
//! serialize them. Every parser here returns `None` (or a documented default)
//! for values it does not understand; callers decide how to degrade.

use brochure_core::color::{unit_to_byte, ColorFunction};
use brochure_core::{Color, ColorStop, LinearGradient, TextAlign};
use serde::{Deserialize, Serialize};

/// Gradient angle used when none is given: top to bottom.
pub const DEFAULT_GRADIENT_ANGLE: f32 = 180.0;

/// Line height multiple for `normal` and unparseable values.
pub const DEFAULT_LINE_HEIGHT: f32 = 1.2;

/// How colors in perceptual spaces (`oklch`, `oklab`, `lab`, `lch`) are
/// reduced to sRGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerceptualColorMode {
    /// Map lightness to a gray level, keeping alpha.
    #[default]
    LightnessGray,
    /// Convert through OKLab or CIELAB to sRGB.
    Convert,
}

/// Parse a pixel length such as `12px` or `12`.
#[must_use]
pub fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    let v: f32 = number.parse().ok()?;
    v.is_finite().then_some(v)
}

/// Split on separators that are not nested inside parentheses.
///
/// Pieces are trimmed and empty pieces dropped.
#[must_use]
pub fn split_top_level(input: &str, is_separator: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if depth == 0 && is_separator(c) => {
                pieces.push(&input[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push(&input[start..]);
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// First entry of a `font-family` list, without quotes.
#[must_use]
pub fn first_font_family(value: &str) -> Option<String> {
    let first = split_top_level(value, |c| c == ',').into_iter().next()?;
    let unquoted = first.trim_matches(|c| c == '"' || c == '\'').trim();
    (!unquoted.is_empty()).then(|| unquoted.to_string())
}

/// Map `text-align` to an alignment; unknown values align left.
#[must_use]
pub fn parse_text_align(value: &str) -> TextAlign {
    match value.trim().to_ascii_lowercase().as_str() {
        "center" => TextAlign::Center,
        "right" | "end" => TextAlign::Right,
        _ => TextAlign::Left,
    }
}

/// Resolve `line-height` to a multiple of `font_size`.
///
/// `normal` and anything unparseable become [`DEFAULT_LINE_HEIGHT`].
#[must_use]
pub fn parse_line_height(value: &str, font_size: f32) -> f32 {
    let value = value.trim();
    let resolved = if let Some(px) = value.strip_suffix("px") {
        px.trim()
            .parse::<f32>()
            .ok()
            .filter(|_| font_size > 0.0)
            .map(|px| px / font_size)
    } else if let Some(pct) = value.strip_suffix('%') {
        pct.trim().parse::<f32>().ok().map(|p| p / 100.0)
    } else {
        value.parse::<f32>().ok()
    };
    resolved
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(DEFAULT_LINE_HEIGHT)
}

/// Letter spacing in pixels; `normal` and non-numeric values are zero.
#[must_use]
pub fn parse_letter_spacing(value: &str) -> f32 {
    parse_px(value).unwrap_or(0.0)
}

/// Whether a `font-style` value slants the text.
#[must_use]
pub fn is_italic(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    value.starts_with("italic") || value.starts_with("oblique")
}

/// Whether a `text-decoration-line` value includes an underline.
#[must_use]
pub fn has_underline(value: &str) -> bool {
    value
        .split_whitespace()
        .any(|token| token.eq_ignore_ascii_case("underline"))
}

/// URL inside the first `url(...)` of a value such as `background-image`.
#[must_use]
pub fn parse_css_url(value: &str) -> Option<String> {
    let start = value.find("url(")? + "url(".len();
    let end = start + value[start..].find(')')?;
    let url = value[start..end]
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim();
    (!url.is_empty()).then(|| url.to_string())
}

/// Parse a CSS angle (`deg`, `turn`, `rad`, `grad`, or a bare `0`) into
/// degrees in `[0, 360)`.
#[must_use]
pub fn parse_angle(token: &str) -> Option<f32> {
    let token = token.trim().to_ascii_lowercase();
    let number = |s: &str| s.trim().parse::<f32>().ok();
    let degrees = if let Some(v) = token.strip_suffix("deg") {
        number(v)?
    } else if let Some(v) = token.strip_suffix("grad") {
        number(v)? * 0.9
    } else if let Some(v) = token.strip_suffix("rad") {
        number(v)?.to_degrees()
    } else if let Some(v) = token.strip_suffix("turn") {
        number(v)? * 360.0
    } else if number(&token)?.abs() < f32::EPSILON {
        0.0
    } else {
        return None;
    };
    degrees.is_finite().then(|| degrees.rem_euclid(360.0))
}

/// Angle for a `to <side>` or `to <corner>` direction.
///
/// Returns `None` for segments that are not a direction.
#[must_use]
pub fn direction_angle(segment: &str) -> Option<f32> {
    let segment = segment.trim().to_ascii_lowercase();
    let rest = segment.strip_prefix("to ")?;
    let has = |side: &str| rest.split_whitespace().any(|t| t == side);
    let angle = match (has("top"), has("bottom"), has("left"), has("right")) {
        (true, false, false, true) => 45.0,
        (false, true, false, true) => 135.0,
        (false, true, true, false) => 225.0,
        (true, false, true, false) => 315.0,
        (true, false, false, false) => 0.0,
        (false, false, false, true) => 90.0,
        (false, false, true, false) => 270.0,
        _ => DEFAULT_GRADIENT_ANGLE,
    };
    Some(angle)
}

/// Parse a color in any syntax the core understands plus the perceptual
/// color functions.
///
/// Alpha below 0.01 collapses to fully transparent.
#[must_use]
pub fn parse_color(value: &str, mode: PerceptualColorMode) -> Option<Color> {
    if let Some(color) = Color::parse(value) {
        return Some(color);
    }
    let lower = value.trim().to_ascii_lowercase();
    let func = ColorFunction::parse(&lower)?;
    let color = match func.name {
        "oklab" | "oklch" | "lab" | "lch" => perceptual_color(&func, mode)?,
        _ => return None,
    };
    Some(color.normalized())
}

fn perceptual_color(func: &ColorFunction<'_>, mode: PerceptualColorMode) -> Option<Color> {
    if func.channels.len() != 3 {
        return None;
    }
    let alpha = func.alpha_value()?;
    let ok = func.name.starts_with("ok");
    // OKLab lightness is 0..1, CIELAB lightness 0..100; both accept percent.
    let lightness_range = if ok { 1.0 } else { 100.0 };
    let lightness = scaled_channel(func.channels[0], lightness_range)? / lightness_range;

    match mode {
        PerceptualColorMode::LightnessGray => {
            Some(Color::gray(unit_to_byte(lightness), alpha))
        }
        PerceptualColorMode::Convert => {
            let polar = func.name.ends_with("ch");
            let chroma_range = match (ok, polar) {
                (true, _) => 0.4,
                (false, true) => 150.0,
                (false, false) => 125.0,
            };
            let (axis_a, axis_b) = if polar {
                let chroma = scaled_channel(func.channels[1], chroma_range)?;
                let hue = if func.channels[2] == "none" {
                    0.0
                } else {
                    parse_hue(func.channels[2])?
                };
                let radians = hue.to_radians();
                (chroma * radians.cos(), chroma * radians.sin())
            } else {
                (
                    scaled_channel(func.channels[1], chroma_range)?,
                    scaled_channel(func.channels[2], chroma_range)?,
                )
            };
            let (red, green, blue) = if ok {
                oklab_to_linear_srgb(lightness, axis_a, axis_b)
            } else {
                lab_to_linear_srgb(lightness * 100.0, axis_a, axis_b)
            };
            Some(Color::rgba(
                unit_to_byte(gamma_encode(red)),
                unit_to_byte(gamma_encode(green)),
                unit_to_byte(gamma_encode(blue)),
                alpha,
            ))
        }
    }
}

/// A number, or a percentage of `reference`.
fn scaled_channel(token: &str, reference: f32) -> Option<f32> {
    if token == "none" {
        return Some(0.0);
    }
    let v = if let Some(pct) = token.strip_suffix('%') {
        pct.parse::<f32>().ok()? / 100.0 * reference
    } else {
        token.parse::<f32>().ok()?
    };
    v.is_finite().then_some(v)
}

fn parse_hue(token: &str) -> Option<f32> {
    parse_angle(token).or_else(|| {
        let v: f32 = token.parse().ok()?;
        v.is_finite().then(|| v.rem_euclid(360.0))
    })
}

#[allow(clippy::similar_names)]
fn oklab_to_linear_srgb(l: f32, a: f32, b: f32) -> (f32, f32, f32) {
    let l_ = l + 0.396_338 * a + 0.215_804 * b;
    let m_ = l - 0.105_561 * a - 0.063_854_2 * b;
    let s_ = l - 0.089_484_2 * a - 1.291_49 * b;
    let (l3, m3, s3) = (l_.powi(3), m_.powi(3), s_.powi(3));
    (
        4.076_74 * l3 - 3.307_71 * m3 + 0.230_97 * s3,
        -1.268_44 * l3 + 2.609_76 * m3 - 0.341_319 * s3,
        -0.004_196_09 * l3 - 0.703_419 * m3 + 1.707_61 * s3,
    )
}

#[allow(clippy::many_single_char_names)]
fn lab_to_linear_srgb(l: f32, a: f32, b: f32) -> (f32, f32, f32) {
    const EPSILON: f32 = 216.0 / 24389.0;
    const KAPPA: f32 = 24389.0 / 27.0;
    // D50 reference white
    const WHITE: (f32, f32, f32) = (0.964_22, 1.0, 0.825_21);

    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;
    let inverse = |f: f32| {
        let cubed = f.powi(3);
        if cubed > EPSILON {
            cubed
        } else {
            (116.0 * f - 16.0) / KAPPA
        }
    };
    let yr = if l > KAPPA * EPSILON {
        fy.powi(3)
    } else {
        l / KAPPA
    };
    let x = inverse(fx) * WHITE.0;
    let y = yr * WHITE.1;
    let z = inverse(fz) * WHITE.2;

    // XYZ (D50) to linear sRGB, Bradford-adapted.
    (
        3.134_14 * x - 1.617_39 * y - 0.490_662 * z,
        -0.978_796 * x + 1.916_25 * y + 0.033_442_7 * z,
        0.071_955_4 * x - 0.228_977 * y + 1.405_39 * z,
    )
}

fn gamma_encode(linear: f32) -> f32 {
    let c = linear.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Parse the first `linear-gradient(...)` in a `background-image` value.
///
/// Returns `None` when there is no linear gradient or fewer than two stops
/// could be read.
#[must_use]
pub fn parse_linear_gradient(value: &str, mode: PerceptualColorMode) -> Option<LinearGradient> {
    let args = linear_gradient_args(value)?;
    let mut segments = split_top_level(args, |c| c == ',');
    let mut angle = DEFAULT_GRADIENT_ANGLE;
    if let Some(first) = segments.first() {
        if let Some(direction) = direction_angle(first).or_else(|| parse_angle(first)) {
            angle = direction;
            segments.remove(0);
        }
    }

    let mut colors = Vec::new();
    let mut offsets = Vec::new();
    for segment in segments {
        let mut tokens = split_top_level(segment, char::is_whitespace);
        let mut positions = Vec::new();
        while tokens.len() > 1 && positions.len() < 2 {
            let Some(position) = tokens.last().and_then(|t| parse_stop_position(t)) else {
                break;
            };
            positions.insert(0, position.resolved());
            tokens.pop();
        }
        let Some(color) = parse_color(&tokens.join(" "), mode) else {
            // also covers bare transition hints like `40%`
            tracing::debug!(segment, "skipping unreadable gradient stop");
            continue;
        };
        if positions.is_empty() {
            positions.push(None);
        }
        for position in positions {
            colors.push(color);
            offsets.push(position);
        }
    }

    if colors.len() < 2 {
        return None;
    }
    let stops = distribute_offsets(&offsets)
        .into_iter()
        .zip(colors)
        .map(|(offset, color)| ColorStop { offset, color })
        .collect();
    Some(LinearGradient { angle, stops })
}

/// Inner arguments of the first non-repeating `linear-gradient(`.
fn linear_gradient_args(value: &str) -> Option<&str> {
    const NAME: &str = "linear-gradient(";
    let lower = value.to_ascii_lowercase();
    let mut search = 0;
    let start = loop {
        let found = search + lower[search..].find(NAME)?;
        if !lower[..found].ends_with('-') {
            break found + NAME.len();
        }
        search = found + NAME.len();
    };
    let mut depth = 1usize;
    for (index, c) in value[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&value[start..start + index]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Position token of a color stop.
#[derive(Debug, Clone, Copy, PartialEq)]
enum StopPosition {
    /// Fraction of the gradient line.
    Fraction(f32),
    /// A length that needs the gradient line's size to resolve.
    Length,
}

impl StopPosition {
    fn resolved(self) -> Option<f32> {
        match self {
            Self::Fraction(v) => Some(v),
            Self::Length => None,
        }
    }
}

fn parse_stop_position(token: &str) -> Option<StopPosition> {
    if let Some(pct) = token.strip_suffix('%') {
        let v: f32 = pct.trim().parse().ok()?;
        return v.is_finite().then_some(StopPosition::Fraction(v / 100.0));
    }
    let px = parse_px(token)?;
    if px.abs() < f32::EPSILON {
        Some(StopPosition::Fraction(0.0))
    } else {
        Some(StopPosition::Length)
    }
}

/// Fill in missing stop offsets.
///
/// A missing first offset is 0 and a missing last offset is 1. Runs of
/// missing offsets are spread evenly between their known neighbours, and an
/// offset smaller than an earlier one is raised to it.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn distribute_offsets(offsets: &[Option<f32>]) -> Vec<f32> {
    let count = offsets.len();
    let mut known: Vec<Option<f32>> = offsets.to_vec();
    if count == 0 {
        return Vec::new();
    }
    if known[0].is_none() {
        known[0] = Some(0.0);
    }
    if known[count - 1].is_none() {
        known[count - 1] = Some(1.0);
    }

    let mut floor = f32::NEG_INFINITY;
    for offset in known.iter_mut().flatten() {
        *offset = offset.max(floor).clamp(0.0, 1.0);
        floor = *offset;
    }

    let mut resolved = Vec::with_capacity(count);
    let mut last_known = (0usize, 0.0f32);
    for (index, offset) in known.iter().enumerate() {
        if let Some(value) = offset {
            last_known = (index, *value);
            resolved.push(*value);
            continue;
        }
        let (next_index, next_value) = known
            .iter()
            .enumerate()
            .skip(index + 1)
            .find_map(|(i, o)| o.map(|v| (i, v)))
            .unwrap_or((count - 1, 1.0));
        let (prev_index, prev_value) = last_known;
        let t = (index - prev_index) as f32 / (next_index - prev_index) as f32;
        resolved.push(prev_value + (next_value - prev_value) * t);
    }
    resolved
}
