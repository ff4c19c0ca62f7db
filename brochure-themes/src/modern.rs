//! Modern theme: navy and pink, bold bands and oversized numerals.

use brochure_core::{BlockKind, Color, DataSnapshot};

use crate::blocks::{
    check_times, departure, flight_leg, or_default, page_number, stay_label, timeline_item,
    two_digit, units, LegPalette,
};
use crate::builder::LayoutBuilder;
use crate::dates::{compact_label, label_for, long_label};
use crate::style::{FontScale, GradientToken, ThemeColors, ThemeFonts, ThemeSpacing, ThemeStyle};
use crate::theme::Theme;

const CHAPTERS: [(&str, &str, u32); 4] = [
    ("Overview", "行程總覽", 4),
    ("Daily Plan", "每日行程", 6),
    ("Accommodation", "住宿資訊", 12),
    ("Information", "旅遊須知", 14),
];

/// Style tokens of the modern theme.
#[must_use]
pub fn style() -> ThemeStyle {
    let primary = Color::rgb(0x1e, 0x3a, 0x5f);
    let primary_dark = Color::rgb(0x0f, 0x28, 0x47);
    let accent = Color::rgb(0xec, 0x48, 0x99);
    ThemeStyle {
        colors: ThemeColors {
            primary,
            primary_light: Color::rgb(0x2d, 0x4a, 0x6f),
            primary_dark,
            accent,
            accent_light: Color::rgb(0xf4, 0x72, 0xb6),
            background: Color::WHITE,
            card_background: Color::rgb(0xf9, 0xfa, 0xfb),
            text_primary: Color::rgb(0x11, 0x18, 0x27),
            text_secondary: Color::rgb(0x6b, 0x72, 0x80),
            text_light: Color::WHITE,
            border: Color::rgb(0xe5, 0xe7, 0xeb),
            header_gradient: GradientToken {
                start: primary,
                end: primary_dark,
                angle: 135.0,
            },
            accent_gradient: GradientToken {
                start: accent,
                end: Color::rgb(0xdb, 0x27, 0x77),
                angle: 135.0,
            },
        },
        fonts: ThemeFonts {
            primary: "Noto Sans TC".into(),
            heading: "Montserrat".into(),
            scale: FontScale {
                h1: 36.0,
                h2: 28.0,
                h3: 20.0,
                body: 13.0,
                small: 11.0,
                xs: 9.0,
            },
        },
        spacing: ThemeSpacing {
            page_padding: 32.0,
            section_gap: 24.0,
            element_gap: 16.0,
            card_padding: 20.0,
        },
    }
}

/// The modern theme.
#[derive(Debug, Clone)]
pub struct ModernTheme {
    style: ThemeStyle,
}

impl ModernTheme {
    /// Create the theme.
    #[must_use]
    pub fn new() -> Self {
        Self { style: style() }
    }
}

impl Default for ModernTheme {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::too_many_lines)]
impl Theme for ModernTheme {
    fn id(&self) -> &str {
        "modern"
    }

    fn name(&self) -> &str {
        "Modern"
    }

    fn description(&self) -> &str {
        "Navy bands with pink accents"
    }

    fn style(&self) -> &ThemeStyle {
        &self.style
    }

    fn cover(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot) {
        let style = b.style();
        let c = &style.colors;
        let scale = style.fonts.scale;
        let pad = style.spacing.page_padding;
        let (width, height) = (b.width(), b.height());
        let cover = data.cover.clone().unwrap_or_default();

        b.background("cover.background", c.primary);
        if let Some(src) = cover.cover_image.as_deref().filter(|s| !s.trim().is_empty()) {
            b.image("cover.image", src, (0.0, 0.0, width, height));
            b.rect("cover.mask")
                .at(0.0, 0.0, width, height)
                .fill(Color::rgba(30, 58, 95, 0.7))
                .add();
        }
        b.circle("cover.circle.large")
            .at(width - 220.0, -120.0, 360.0, 360.0)
            .fill(c.accent.with_alpha(f32::from(0x20_u8) / 255.0))
            .add();
        b.circle("cover.circle.small")
            .at(-80.0, height - 260.0, 200.0, 200.0)
            .fill(c.accent.with_alpha(f32::from(0x30_u8) / 255.0))
            .add();

        b.rect("cover.brand.line")
            .at(pad, pad + 6.0, 32.0, 3.0)
            .fill(c.accent)
            .add();
        b.text(
            "cover.brand",
            or_default(cover.client_name.as_deref(), "TRAVEL GUIDE").to_uppercase(),
        )
        .at(pad + 44.0, pad, width - pad * 2.0 - 44.0, 14.0)
        .size(scale.small)
        .weight(700)
        .spacing(3.0)
        .color(c.text_light)
        .add();

        let center_y = height / 2.0 - 40.0;
        b.text("cover.country", or_default(cover.country.as_deref(), "").to_uppercase())
            .at(pad, center_y - 36.0, width - pad * 2.0, 18.0)
            .size(scale.body)
            .weight(600)
            .spacing(6.0)
            .color(c.accent_light)
            .add();
        b.text(
            "cover.city",
            or_default(cover.city.as_deref(), "DESTINATION").to_uppercase(),
        )
        .at(pad, center_y - 12.0, width - pad * 2.0, scale.h1 * 1.6)
        .size(scale.h1 * 1.4)
        .weight(900)
        .heading()
        .line_height(1.0)
        .color(c.text_light)
        .add();
        b.rect("cover.accent")
            .at(pad, center_y + scale.h1 * 1.7, 64.0, 4.0)
            .fill(c.accent)
            .add();
        b.text("cover.dates", or_default(cover.travel_dates.as_deref(), ""))
            .at(pad, center_y + scale.h1 * 1.7 + 16.0, width - pad * 2.0, 16.0)
            .size(scale.body)
            .weight(500)
            .spacing(2.0)
            .color(c.text_light.with_alpha(0.9))
            .add();

        let bottom_y = height - pad - 60.0;
        b.image("cover.logo", "/corner-logo.png", (pad, bottom_y + 24.0, 80.0, 24.0));
        let emergency = cover
            .emergency_contact
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|phone| format!("Emergency: {}", phone.trim()))
            .unwrap_or_default();
        b.text("cover.emergency", emergency)
            .at(width / 2.0, bottom_y + 24.0, width / 2.0 - pad, 14.0)
            .size(scale.small)
            .color(c.text_light.with_alpha(0.85))
            .right()
            .add();
        b.text(
            "cover.emergency.email",
            or_default(cover.emergency_email.as_deref(), ""),
        )
        .at(width / 2.0, bottom_y + 40.0, width / 2.0 - pad, 12.0)
        .size(scale.xs)
        .color(c.text_light.with_alpha(0.7))
        .right()
        .add();
    }

    fn blank(&self, b: &mut LayoutBuilder<'_>, _data: &DataSnapshot) {
        let style = b.style();
        let (width, height) = (b.width(), b.height());
        b.background("blank.background", style.colors.background);
        b.text("blank.note", "— Notes —")
            .at(0.0, height / 2.0 - 8.0, width, 16.0)
            .size(style.fonts.scale.small)
            .spacing(4.0)
            .color(style.colors.text_secondary.with_alpha(0.5))
            .center()
            .add();
    }

    fn contents(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot) {
        let style = b.style();
        let c = &style.colors;
        let scale = style.fonts.scale;
        let pad = style.spacing.page_padding;
        let (width, height) = (b.width(), b.height());
        let cover = data.cover.clone().unwrap_or_default();

        b.background("contents.background", c.background);
        b.rect("contents.sidebar")
            .at(0.0, 0.0, 8.0, height)
            .fill(style.colors.header_gradient.fill())
            .add();
        b.text("contents.title", "CONTENTS")
            .at(pad, pad + 8.0, width - pad * 2.0, scale.h2 * 1.3)
            .size(scale.h2)
            .weight(900)
            .heading()
            .spacing(2.0)
            .color(c.primary)
            .add();
        b.text(
            "contents.trip",
            cover.trip_name().unwrap_or_default().to_uppercase(),
        )
        .at(pad, pad + 8.0 + scale.h2 * 1.4, width - pad * 2.0, 14.0)
        .size(scale.small)
        .spacing(2.0)
        .color(c.accent)
        .add();

        let item_h = 100.0;
        let start_y = 140.0;
        for (i, (title, subtitle, page)) in CHAPTERS.iter().enumerate() {
            let y = start_y + units(i) * item_h;
            let prefix = format!("contents.chapter.{i}");
            b.text(&format!("{prefix}.number"), two_digit(i + 1))
                .at(pad, y, 80.0, scale.h1 * 1.4)
                .size(scale.h1 * 1.2)
                .weight(900)
                .heading()
                .color(c.accent.with_alpha(0.25))
                .add();
            b.text(&format!("{prefix}.title"), *title)
                .at(pad + 90.0, y + 8.0, width - pad * 2.0 - 160.0, scale.h3 * 1.3)
                .size(scale.h3)
                .weight(700)
                .color(c.primary)
                .add();
            b.text(&format!("{prefix}.subtitle"), *subtitle)
                .at(pad + 90.0, y + 10.0 + scale.h3 * 1.3, width - pad * 2.0 - 160.0, 14.0)
                .size(scale.small)
                .color(c.text_secondary)
                .add();
            b.text(&format!("{prefix}.page"), format!("{page:02}"))
                .at(width - pad - 60.0, y + 12.0, 60.0, 16.0)
                .size(scale.body)
                .weight(700)
                .color(c.accent)
                .right()
                .add();
            b.rect(&format!("{prefix}.rule"))
                .at(pad, y + item_h - 16.0, width - pad * 2.0, 1.0)
                .fill(c.border)
                .add();
        }
        page_number(b, "02", c.text_secondary, true);
    }

    fn overview_left(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot) {
        let style = b.style();
        let c = &style.colors;
        let scale = style.fonts.scale;
        let pad = style.spacing.page_padding;
        let (width, height) = (b.width(), b.height());
        let cover = data.cover.clone().unwrap_or_default();
        let meeting = data.meeting.clone().unwrap_or_default();
        let band_h = height * 0.4;

        b.background("overview.background", c.background);
        b.rect("overview.band")
            .at(0.0, 0.0, width, band_h)
            .fill(style.colors.header_gradient.fill())
            .add();
        if let Some(src) = cover.overview_image.as_deref().filter(|s| !s.trim().is_empty()) {
            b.image("overview.image", src, (0.0, 0.0, width, band_h));
            b.rect("overview.mask")
                .at(0.0, 0.0, width, band_h)
                .fill(Color::rgba(30, 58, 95, 0.6))
                .add();
        }
        b.text("overview.heading", "OVERVIEW")
            .at(pad, pad, width - pad * 2.0, 14.0)
            .size(scale.small)
            .weight(700)
            .spacing(4.0)
            .color(c.accent_light)
            .add();
        b.text("overview.city", or_default(cover.city.as_deref(), "Journey"))
            .at(pad, band_h - 48.0 * 1.3 - pad, width - pad * 2.0, 48.0 * 1.3)
            .size(48.0)
            .weight(900)
            .heading()
            .color(c.text_light)
            .add();

        let section_y = band_h + pad;
        b.text("overview.flight.title", "FLIGHT INFO")
            .at(pad, section_y, width - pad * 2.0, 14.0)
            .size(scale.small)
            .weight(800)
            .spacing(3.0)
            .color(c.accent)
            .add();
        let palette = LegPalette {
            marker: c.primary,
            label: c.accent,
            text: c.text_primary,
        };
        let legs = data
            .flight
            .as_ref()
            .map(|f| {
                [
                    ("outbound", "DEPARTURE 去程", f.outbound.as_ref()),
                    ("return", "RETURN 回程", f.return_leg.as_ref()),
                ]
            })
            .unwrap_or_default();
        let mut leg_y = section_y + 24.0;
        let mut any_leg = false;
        for (key, label, leg) in legs {
            if let Some(leg) = leg {
                flight_leg(
                    b,
                    &format!("overview.flight.{key}"),
                    label,
                    leg,
                    (pad, leg_y, width - pad * 2.0, 56.0),
                    palette,
                );
                leg_y += 64.0;
                any_leg = true;
            }
        }
        if !any_leg {
            b.text("overview.flight.pending", "航班資訊待確認")
                .at(pad, leg_y, width - pad * 2.0, 16.0)
                .size(scale.small)
                .color(c.text_secondary)
                .add();
        }

        let box_h = 110.0;
        let box_y = height - pad - 30.0 - box_h;
        b.rect("overview.meeting.box")
            .at(pad, box_y, width - pad * 2.0, box_h)
            .fill(c.primary)
            .radius(12.0)
            .add();
        b.text("overview.meeting.label", "MEETING POINT")
            .at(pad + 20.0, box_y + 16.0, width - pad * 2.0 - 40.0, 12.0)
            .size(scale.xs)
            .weight(800)
            .spacing(3.0)
            .color(c.accent_light)
            .add();
        b.text(
            "overview.meeting.time",
            or_default(meeting.meeting_time.as_deref(), "請確認行程"),
        )
        .at(pad + 20.0, box_y + 34.0, width - pad * 2.0 - 40.0, 18.0)
        .size(scale.h3 * 0.8)
        .weight(700)
        .color(c.text_light)
        .add();
        b.text(
            "overview.meeting.location",
            or_default(meeting.meeting_location.as_deref(), "集合地點待確認"),
        )
        .at(pad + 20.0, box_y + 58.0, width - pad * 2.0 - 40.0, 14.0)
        .size(scale.small)
        .color(c.text_light.with_alpha(0.85))
        .add();
        let leader = [meeting.leader_name.as_deref(), meeting.leader_phone.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join("  ");
        b.text("overview.leader", leader)
            .at(pad + 20.0, box_y + 80.0, width - pad * 2.0 - 40.0, 14.0)
            .size(scale.small)
            .weight(600)
            .color(c.accent_light)
            .add();

        page_number(b, "04", c.text_secondary, false);
    }

    fn overview_right(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot) {
        let style = b.style();
        let c = &style.colors;
        let scale = style.fonts.scale;
        let pad = style.spacing.page_padding;
        let (width, height) = (b.width(), b.height());
        let start = departure(data);

        b.background("itinerary.background", c.background);
        b.text("itinerary.title", "ITINERARY")
            .at(pad, pad, width - pad * 2.0, scale.h2 * 1.3)
            .size(scale.h2)
            .weight(900)
            .heading()
            .spacing(2.0)
            .color(c.primary)
            .add();

        let days: Vec<_> = data.daily_overview.iter().take(6).collect();
        let start_y = pad + scale.h2 * 1.3 + 24.0;
        if days.is_empty() {
            b.placeholder(
                "itinerary",
                "尚無行程資料",
                (pad, start_y, width - pad * 2.0, 200.0),
            );
        } else {
            let timeline_x = pad + 40.0;
            let day_h = (height - start_y - pad - 30.0) / units(days.len());
            b.rect("itinerary.timeline")
                .at(timeline_x, start_y + 6.0, 2.0, day_h * units(days.len()) - day_h / 2.0)
                .fill(c.border)
                .add();
            for (i, day) in days.iter().enumerate() {
                let y = start_y + units(i) * day_h;
                let prefix = format!("itinerary.day.{i}");
                let dot = if i % 2 == 0 { c.accent } else { c.primary };
                b.text(&format!("{prefix}.number"), two_digit(day.day_index + 1))
                    .at(pad, y, 32.0, scale.h3 * 1.2)
                    .size(scale.h3)
                    .weight(900)
                    .color(dot)
                    .add();
                b.circle(&format!("{prefix}.dot"))
                    .at(timeline_x - 5.0, y + 4.0, 12.0, 12.0)
                    .fill(dot)
                    .stroke(c.background, 2.0)
                    .add();
                b.text(
                    &format!("{prefix}.date"),
                    label_for(start, day.day_index, compact_label),
                )
                .at(timeline_x + 20.0, y, width - timeline_x - 20.0 - pad, 12.0)
                .size(scale.xs)
                .weight(700)
                .spacing(1.0)
                .color(c.text_secondary)
                .add();
                b.text(&format!("{prefix}.title"), day.title.as_str())
                    .at(timeline_x + 20.0, y + 14.0, width - timeline_x - 20.0 - pad, 18.0)
                    .size(scale.body)
                    .weight(700)
                    .color(c.primary)
                    .add();
                let activities = day
                    .activities
                    .iter()
                    .take(3)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" · ");
                b.text(&format!("{prefix}.activities"), activities)
                    .at(
                        timeline_x + 20.0,
                        y + 34.0,
                        width - timeline_x - 20.0 - pad,
                        (day_h - 44.0).max(12.0),
                    )
                    .size(scale.small)
                    .line_height(1.4)
                    .color(c.text_secondary)
                    .add();
            }
        }
        page_number(b, "05", c.text_secondary, true);
    }

    fn daily_left(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot) {
        let style = b.style();
        let c = &style.colors;
        let scale = style.fonts.scale;
        let pad = style.spacing.page_padding;
        let (width, height) = (b.width(), b.height());

        b.background("day.background", c.background);
        let Some(day) = data.day.as_ref() else {
            b.placeholder(
                "day",
                "尚無當日行程",
                (pad, height / 2.0 - 80.0, width - pad * 2.0, 160.0),
            );
            return;
        };

        let band_h = height * 0.35;
        let number = two_digit(day.number());
        let date = label_for(departure(data), day.day_index, long_label);
        b.block(
            "day.header",
            BlockKind::DayHeader,
            (0.0, 0.0, width, band_h),
            |inner| {
                let w = inner.width();
                let h = inner.height();
                inner
                    .rect("day.header.band")
                    .at(0.0, 0.0, w, h)
                    .fill(style.colors.header_gradient.fill())
                    .add();
                inner
                    .text("day.header.label", "DAY")
                    .at(pad, pad, 120.0, 16.0)
                    .size(scale.body)
                    .weight(800)
                    .spacing(6.0)
                    .color(c.accent_light)
                    .add();
                inner
                    .text("day.header.number", number)
                    .at(pad, pad + 14.0, 200.0, 86.0)
                    .size(72.0)
                    .weight(900)
                    .heading()
                    .color(c.text_light)
                    .add();
                inner
                    .text("day.header.date", date)
                    .at(pad, h - pad - 14.0, w - pad * 2.0, 14.0)
                    .size(scale.small)
                    .weight(600)
                    .spacing(2.0)
                    .color(c.text_light.with_alpha(0.85))
                    .add();
            },
        );

        let title_h = 80.0;
        b.rect("day.title.band")
            .at(0.0, band_h, width, title_h)
            .fill(c.card_background)
            .add();
        b.rect("day.title.accent")
            .at(0.0, band_h, 6.0, title_h)
            .fill(c.accent)
            .add();
        b.text("day.title", or_default(day.title.as_deref(), ""))
            .at(pad, band_h + 16.0, width - pad * 2.0, scale.h3 * 1.3)
            .size(scale.h3)
            .weight(800)
            .heading()
            .color(c.primary)
            .add();
        b.text("day.highlight", or_default(day.highlight.as_deref(), ""))
            .at(pad, band_h + 20.0 + scale.h3 * 1.3, width - pad * 2.0, 28.0)
            .size(scale.small)
            .line_height(1.4)
            .color(c.text_secondary)
            .add();

        let content_y = band_h + title_h + 20.0;
        let content_h = height - content_y - pad - 30.0;
        let image = day.images.first().filter(|s| !s.trim().is_empty());
        match (day.activities.len(), image) {
            (0, _) => {
                b.placeholder(
                    "day",
                    "移動日",
                    (pad, content_y, width - pad * 2.0, content_h.min(160.0)),
                );
            }
            (1, Some(src)) => {
                b.image("day.image", src.as_str(), (pad, content_y, width - pad * 2.0, content_h));
                b.rect("day.image.caption.band")
                    .at(pad, content_y + content_h - 40.0, width - pad * 2.0, 40.0)
                    .fill(c.primary.with_alpha(0.85))
                    .add();
                b.text("day.image.caption", day.activities[0].title.as_str())
                    .at(pad + 16.0, content_y + content_h - 28.0, width - pad * 2.0 - 32.0, 16.0)
                    .size(scale.body)
                    .weight(700)
                    .color(c.text_light)
                    .add();
            }
            (count, _) => {
                let shown = count.min(5);
                for (i, activity) in day.activities.iter().take(shown).enumerate() {
                    let dot = if i % 2 == 0 { c.accent } else { c.primary };
                    timeline_item(
                        b,
                        &format!("day.activity.{i}"),
                        activity,
                        (pad, content_y + units(i) * 70.0, width - pad * 2.0, 64.0),
                        dot,
                        i + 1 < shown,
                    );
                }
            }
        }
        page_number(
            b,
            &format!("{:02}", day.number() * 2 + 4),
            c.text_secondary,
            false,
        );
    }

    fn daily_right(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot) {
        let style = b.style();
        let c = &style.colors;
        let scale = style.fonts.scale;
        let pad = style.spacing.page_padding;
        let card_pad = style.spacing.card_padding;
        let (width, height) = (b.width(), b.height());

        b.background("spots.background", c.background);
        b.text("spots.title", "HIGHLIGHTS")
            .at(pad, pad, width - pad * 2.0, scale.h2 * 1.3)
            .size(scale.h2)
            .weight(900)
            .heading()
            .spacing(2.0)
            .color(c.primary)
            .add();

        let start_y = pad + scale.h2 * 1.3 + 16.0;
        let spots: Vec<_> = data
            .day
            .as_ref()
            .map(|d| d.activities.iter().take(2).enumerate().collect())
            .unwrap_or_default();
        if spots.is_empty() {
            b.placeholder(
                "spots",
                "尚無景點資訊",
                (pad, start_y, width - pad * 2.0, height - start_y - 100.0),
            );
        } else {
            let card_h = (height - start_y - pad - 40.0) / units(spots.len());
            for (i, activity) in spots {
                let src = activity
                    .image
                    .clone()
                    .or_else(|| data.day.as_ref().and_then(|d| d.images.get(i).cloned()))
                    .filter(|s| !s.trim().is_empty());
                let prefix = format!("spots.card.{i}");
                let title = activity.title.clone();
                let description = activity.description.clone().unwrap_or_default();
                b.block(
                    &prefix,
                    BlockKind::SpotCard,
                    (pad, start_y + units(i) * card_h, width - pad * 2.0, card_h - 16.0),
                    |inner| {
                        let w = inner.width();
                        let h = inner.height();
                        let image_h = h * 0.55;
                        inner
                            .rect(&format!("{prefix}.background"))
                            .at(0.0, 0.0, w, h)
                            .fill(c.card_background)
                            .stroke(c.border, 1.0)
                            .radius(12.0)
                            .add();
                        match src {
                            Some(src) => {
                                inner.image(&format!("{prefix}.image"), src, (0.0, 0.0, w, image_h));
                            }
                            None => {
                                inner.placeholder(&prefix, "No Image", (0.0, 0.0, w, image_h));
                            }
                        }
                        inner
                            .circle(&format!("{prefix}.badge"))
                            .at(card_pad, image_h - 18.0, 36.0, 36.0)
                            .fill(c.accent)
                            .add();
                        inner
                            .text(&format!("{prefix}.number"), two_digit(i + 1))
                            .at(card_pad, image_h - 6.0, 36.0, 12.0)
                            .size(scale.small)
                            .weight(800)
                            .color(c.text_light)
                            .center()
                            .add();
                        inner
                            .text(&format!("{prefix}.title"), title)
                            .at(card_pad, image_h + 24.0, w - card_pad * 2.0, scale.h3 * 1.2)
                            .size(scale.h3 * 0.85)
                            .weight(800)
                            .color(c.primary)
                            .add();
                        inner
                            .text(&format!("{prefix}.description"), description)
                            .at(
                                card_pad,
                                image_h + 26.0 + scale.h3 * 1.2,
                                w - card_pad * 2.0,
                                (h - image_h - scale.h3 * 1.2 - 32.0).max(12.0),
                            )
                            .size(scale.small)
                            .line_height(1.5)
                            .color(c.text_secondary)
                            .add();
                    },
                );
            }
        }
        let label = data
            .day
            .as_ref()
            .map_or_else(String::new, |d| format!("{:02}", d.number() * 2 + 5));
        page_number(b, &label, c.text_secondary, true);
    }

    fn accommodation_left(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot) {
        let style = b.style();
        let c = &style.colors;
        let scale = style.fonts.scale;
        let pad = style.spacing.page_padding;
        let (width, height) = (b.width(), b.height());
        let band_h = 100.0;

        b.background("stay.background", c.background);
        b.rect("stay.band")
            .at(0.0, 0.0, width, band_h)
            .fill(style.colors.header_gradient.fill())
            .add();
        b.text("stay.title", "STAY")
            .at(pad, band_h - pad - scale.h1 * 1.2, width - pad * 2.0, scale.h1 * 1.2)
            .size(scale.h1)
            .weight(900)
            .heading()
            .spacing(4.0)
            .color(c.text_light)
            .add();

        let start_y = band_h + pad;
        let gap = 16.0;
        let hotels: Vec<_> = data.accommodations.iter().take(3).collect();
        if hotels.is_empty() {
            b.placeholder(
                "stay",
                "尚無住宿資訊",
                (pad, start_y, width - pad * 2.0, 200.0),
            );
        } else {
            let n = units(hotels.len());
            let card_h = ((height - start_y - pad - 30.0 - gap * (n - 1.0)) / n).min(210.0);
            for (i, hotel) in hotels.into_iter().enumerate() {
                let prefix = format!("stay.hotel.{i}");
                let src = hotel.image.clone().filter(|s| !s.trim().is_empty());
                let hotel_name = hotel.name.clone();
                let days = hotel.days_label();
                b.block(
                    &prefix,
                    BlockKind::AccommodationCard,
                    (pad, start_y + units(i) * (card_h + gap), width - pad * 2.0, card_h),
                    |inner| {
                        let w = inner.width();
                        let h = inner.height();
                        let image_w = w * 0.45;
                        inner
                            .rect(&format!("{prefix}.background"))
                            .at(0.0, 0.0, w, h)
                            .fill(c.card_background)
                            .radius(12.0)
                            .add();
                        match src {
                            Some(src) => {
                                inner.image(&format!("{prefix}.image"), src, (0.0, 0.0, image_w, h));
                            }
                            None => {
                                inner
                                    .rect(&format!("{prefix}.image.empty"))
                                    .at(0.0, 0.0, image_w, h)
                                    .fill(c.primary_light)
                                    .radius(12.0)
                                    .add();
                            }
                        }
                        inner
                            .text(&format!("{prefix}.number"), two_digit(i + 1))
                            .at(image_w + 20.0, 16.0, 60.0, scale.h2 * 1.2)
                            .size(scale.h2)
                            .weight(900)
                            .color(c.accent)
                            .add();
                        inner
                            .text(&format!("{prefix}.name"), hotel_name)
                            .at(image_w + 20.0, 20.0 + scale.h2 * 1.2, w - image_w - 40.0, 40.0)
                            .size(scale.h3 * 0.85)
                            .weight(800)
                            .line_height(1.3)
                            .color(c.primary)
                            .add();
                        inner
                            .text(&format!("{prefix}.days"), days)
                            .at(image_w + 20.0, h - 32.0, w - image_w - 40.0, 14.0)
                            .size(scale.small)
                            .weight(700)
                            .spacing(1.0)
                            .color(c.text_secondary)
                            .add();
                    },
                );
            }
        }
        page_number(b, "12", c.text_secondary, false);
    }

    fn accommodation_right(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot) {
        let style = b.style();
        let c = &style.colors;
        let scale = style.fonts.scale;
        let pad = style.spacing.page_padding;
        let (width, height) = (b.width(), b.height());

        b.background("stay.details.background", c.background);
        b.text("stay.details.title", "ACCOMMODATION")
            .at(pad, pad, width - pad * 2.0, scale.h2 * 1.3)
            .size(scale.h2)
            .weight(900)
            .heading()
            .spacing(2.0)
            .color(c.primary)
            .add();
        b.text("stay.details.subtitle", "住宿詳情")
            .at(pad, pad + scale.h2 * 1.35, width - pad * 2.0, 14.0)
            .size(scale.small)
            .spacing(2.0)
            .color(c.accent)
            .add();

        let start_y = pad + scale.h2 * 1.35 + 32.0;
        let hotels: Vec<_> = data.accommodations.iter().take(3).collect();
        if hotels.is_empty() {
            b.placeholder(
                "stay.details",
                "尚無住宿資訊",
                (pad, start_y, width - pad * 2.0, 200.0),
            );
        } else {
            let entry_h = (height - start_y - pad - 30.0) / units(hotels.len());
            for (i, hotel) in hotels.into_iter().enumerate() {
                let prefix = format!("stay.details.hotel.{i}");
                let hotel_name = hotel.name.clone();
                let stay = stay_label(hotel);
                let rows = [
                    ("地址", or_default(hotel.address.as_deref(), "").to_string()),
                    ("電話", or_default(hotel.phone.as_deref(), "").to_string()),
                    ("時間", check_times(hotel)),
                ];
                let ink = if i % 2 == 0 { c.primary } else { c.accent };
                b.block(
                    &prefix,
                    BlockKind::AccommodationCard,
                    (pad, start_y + units(i) * entry_h, width - pad * 2.0, entry_h - 16.0),
                    |inner| {
                        let w = inner.width();
                        inner
                            .rect(&format!("{prefix}.rule"))
                            .at(0.0, 0.0, w, 2.0)
                            .fill(ink)
                            .add();
                        inner
                            .text(&format!("{prefix}.name"), hotel_name)
                            .at(0.0, 12.0, w * 0.65, scale.h3 * 1.3)
                            .size(scale.h3 * 0.9)
                            .weight(800)
                            .color(c.primary)
                            .add();
                        inner
                            .text(&format!("{prefix}.stay"), stay)
                            .at(w * 0.65, 16.0, w * 0.35, 14.0)
                            .size(scale.small)
                            .weight(700)
                            .color(ink)
                            .right()
                            .add();
                        for (row, (label, value)) in rows.into_iter().enumerate() {
                            let y = 20.0 + scale.h3 * 1.3 + units(row) * 20.0;
                            inner
                                .text(&format!("{prefix}.row.{row}.label"), label)
                                .at(0.0, y, 40.0, 14.0)
                                .size(scale.xs)
                                .weight(700)
                                .color(c.text_secondary)
                                .add();
                            inner
                                .text(&format!("{prefix}.row.{row}"), value)
                                .at(48.0, y, w - 48.0, 14.0)
                                .size(scale.small)
                                .add();
                        }
                    },
                );
            }
        }
        page_number(b, "13", c.text_secondary, true);
    }
}
