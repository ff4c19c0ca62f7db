//! Compound blocks and text helpers shared by the built-in themes.

use brochure_core::itinerary::{Activity, FlightLeg, Hotel};
use brochure_core::{BlockKind, Color, DataSnapshot, ElementId};

use crate::builder::LayoutBuilder;

/// Default check-in time when the hotel record has none.
pub const DEFAULT_CHECK_IN: &str = "15:00";

/// Default check-out time when the hotel record has none.
pub const DEFAULT_CHECK_OUT: &str = "11:00";

/// Trimmed value or `fallback` when missing or blank.
#[must_use]
pub fn or_default<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => fallback,
    }
}

/// Departure date of the trip, from the meeting or cover fields.
#[must_use]
pub fn departure(data: &DataSnapshot) -> Option<&str> {
    data.meeting
        .as_ref()
        .and_then(|m| m.departure_date.as_deref())
        .or_else(|| data.cover.as_ref().and_then(|c| c.travel_dates.as_deref()))
}

/// Item count as a layout factor.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn units(n: usize) -> f32 {
    n as f32
}

/// Zero-padded two digit number.
#[must_use]
pub fn two_digit(n: usize) -> String {
    format!("{n:02}")
}

/// `"Day 2-4 (2晚)"`, or just the nights when the day range is unknown.
#[must_use]
pub fn stay_label(hotel: &Hotel) -> String {
    let nights = hotel.days.len().saturating_sub(1).max(1);
    let days = hotel.days_label();
    if days.is_empty() {
        format!("{nights}晚")
    } else {
        format!("{days} ({nights}晚)")
    }
}

/// `"IN 15:00 / OUT 11:00"` with defaults for missing times.
#[must_use]
pub fn check_times(hotel: &Hotel) -> String {
    format!(
        "IN {} / OUT {}",
        or_default(hotel.check_in.as_deref(), DEFAULT_CHECK_IN),
        or_default(hotel.check_out.as_deref(), DEFAULT_CHECK_OUT)
    )
}

/// Colors used by a flight leg card.
#[derive(Debug, Clone, Copy)]
pub struct LegPalette {
    /// Vertical marker line.
    pub marker: Color,
    /// Leg label ("Outbound").
    pub label: Color,
    /// Carrier and route text.
    pub text: Color,
}

/// Flight leg card: marker line, label, carrier and route.
pub fn flight_leg(
    b: &mut LayoutBuilder<'_>,
    name: &str,
    label: &str,
    leg: &FlightLeg,
    bounds: (f32, f32, f32, f32),
    palette: LegPalette,
) -> ElementId {
    let scale = b.style().fonts.scale;
    let carrier = leg.carrier_label();
    let route = leg.route_label();
    b.block(name, BlockKind::FlightInfo, bounds, |inner| {
        let w = inner.width();
        let h = inner.height();
        inner
            .rect(&format!("{name}.marker"))
            .at(0.0, 0.0, 3.0, h)
            .fill(palette.marker)
            .radius(1.5)
            .add();
        inner
            .text(&format!("{name}.label"), label)
            .at(12.0, 0.0, w - 12.0, scale.small * 1.4)
            .size(scale.small)
            .weight(700)
            .spacing(1.0)
            .color(palette.label)
            .add();
        inner
            .text(&format!("{name}.carrier"), carrier)
            .at(12.0, scale.small * 1.6, w - 12.0, scale.body * 1.4)
            .size(scale.body)
            .weight(600)
            .color(palette.text)
            .add();
        inner
            .text(&format!("{name}.route"), route)
            .at(
                12.0,
                scale.small * 1.6 + scale.body * 1.5,
                w - 12.0,
                scale.small * 1.4,
            )
            .size(scale.small)
            .color(palette.text.with_alpha(0.8))
            .add();
    })
}

/// One timeline entry: dot, optional connector, title and description.
pub fn timeline_item(
    b: &mut LayoutBuilder<'_>,
    name: &str,
    activity: &Activity,
    bounds: (f32, f32, f32, f32),
    dot: Color,
    connector: bool,
) -> ElementId {
    let style = b.style();
    let scale = style.fonts.scale;
    b.block(name, BlockKind::ItineraryItem, bounds, |inner| {
        let w = inner.width();
        let h = inner.height();
        if connector {
            inner
                .rect(&format!("{name}.connector"))
                .at(5.0, 12.0, 2.0, h - 12.0)
                .fill(style.colors.border)
                .add();
        }
        inner
            .circle(&format!("{name}.dot"))
            .at(0.0, 2.0, 12.0, 12.0)
            .fill(dot)
            .add();
        inner
            .text(&format!("{name}.title"), activity.title.as_str())
            .at(24.0, 0.0, w - 24.0, scale.h3 * 1.3)
            .size(scale.h3 * 0.8)
            .weight(700)
            .add();
        if let Some(description) = activity.description.as_deref().filter(|d| !d.is_empty()) {
            inner
                .text(&format!("{name}.description"), description)
                .at(24.0, scale.h3 * 1.3, w - 24.0, h - scale.h3 * 1.3)
                .size(scale.small)
                .line_height(1.5)
                .color(style.colors.text_secondary)
                .add();
        }
    })
}

/// Page number text anchored at the bottom edge.
pub fn page_number(b: &mut LayoutBuilder<'_>, label: &str, color: Color, right: bool) -> ElementId {
    let style = b.style();
    let pad = style.spacing.page_padding;
    let (w, h) = (b.width(), b.height());
    let size = style.fonts.scale.xs;
    let draft = b
        .text("page.number", label)
        .at(pad, h - pad / 2.0 - size * 1.4, w - pad * 2.0, size * 1.4)
        .size(size)
        .weight(600)
        .spacing(1.0)
        .color(color);
    if right {
        draft.right().add()
    } else {
        draft.add()
    }
}
