//! Classic theme: teal and orange on white, A5 travel handbook layouts.

use brochure_core::{BlockKind, Color, DataSnapshot, Fill, LinearGradient};

use crate::blocks::{
    check_times, departure, flight_leg, or_default, page_number, stay_label, timeline_item,
    two_digit, units, LegPalette,
};
use crate::builder::LayoutBuilder;
use crate::dates::{dotted_label, kanji_numeral, label_for, short_label};
use crate::style::{FontScale, GradientToken, ThemeColors, ThemeFonts, ThemeSpacing, ThemeStyle};
use crate::theme::Theme;

const SLATE: Color = Color::rgb(0x1e, 0x29, 0x3b);
const CYAN: Color = Color::rgb(0x22, 0xd3, 0xee);
const STEEL: Color = Color::rgb(0x47, 0x55, 0x69);

const CHAPTERS: [(&str, &str, u32); 6] = [
    ("Welcome", "はじめに", 3),
    ("Overview", "行程總覽", 4),
    ("Daily Plan", "每日行程", 6),
    ("Stay", "住宿資訊", 12),
    ("Notices", "注意事項", 14),
    ("Contact", "聯絡我們", 16),
];

/// Style tokens of the classic theme.
#[must_use]
pub fn style() -> ThemeStyle {
    let primary = Color::rgb(0x0d, 0x94, 0x88);
    let primary_dark = Color::rgb(0x0f, 0x76, 0x6e);
    let accent = Color::rgb(0xf9, 0x73, 0x16);
    ThemeStyle {
        colors: ThemeColors {
            primary,
            primary_light: Color::rgb(0x14, 0xb8, 0xa6),
            primary_dark,
            accent,
            accent_light: Color::rgb(0xfb, 0x92, 0x3c),
            background: Color::WHITE,
            card_background: Color::rgb(0xf8, 0xfa, 0xfc),
            text_primary: SLATE,
            text_secondary: Color::rgb(0x64, 0x74, 0x8b),
            text_light: Color::WHITE,
            border: Color::rgb(0xe2, 0xe8, 0xf0),
            header_gradient: GradientToken {
                start: primary,
                end: primary_dark,
                angle: 180.0,
            },
            accent_gradient: GradientToken {
                start: accent,
                end: Color::rgb(0xea, 0x58, 0x0c),
                angle: 180.0,
            },
        },
        fonts: ThemeFonts {
            primary: "Noto Sans TC".into(),
            heading: "Noto Serif TC".into(),
            scale: FontScale {
                h1: 30.0,
                h2: 24.0,
                h3: 18.0,
                body: 12.0,
                small: 10.0,
                xs: 8.0,
            },
        },
        spacing: ThemeSpacing {
            page_padding: 24.0,
            section_gap: 20.0,
            element_gap: 12.0,
            card_padding: 16.0,
        },
    }
}

/// The classic theme.
#[derive(Debug, Clone)]
pub struct ClassicTheme {
    style: ThemeStyle,
}

impl ClassicTheme {
    /// Create the theme.
    #[must_use]
    pub fn new() -> Self {
        Self { style: style() }
    }
}

impl Default for ClassicTheme {
    fn default() -> Self {
        Self::new()
    }
}

fn bottom_fade() -> Fill {
    Fill::Gradient(LinearGradient::two_stop(
        180.0,
        Color::TRANSPARENT,
        Color::rgba(0, 0, 0, 0.6),
    ))
}

#[allow(clippy::too_many_lines)]
impl Theme for ClassicTheme {
    fn id(&self) -> &str {
        "classic"
    }

    fn name(&self) -> &str {
        "Classic"
    }

    fn description(&self) -> &str {
        "Teal and orange travel handbook"
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

        match cover.cover_image.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(src) => {
                b.image("cover.image", src, (0.0, 0.0, width, height));
            }
            None => {
                b.background("cover.background", SLATE);
            }
        }
        b.rect("cover.mask")
            .at(0.0, 0.0, width, height)
            .fill(Color::rgba(0, 0, 0, 0.4))
            .add();

        if let Some(client) = cover.client_name.as_deref().filter(|s| !s.trim().is_empty()) {
            b.rect("cover.client.bar")
                .at(pad, 28.0, 2.0, 12.0)
                .fill(c.accent)
                .add();
            b.text("cover.client", client.trim().to_uppercase())
                .at(pad + 10.0, 27.0, width - pad * 2.0 - 10.0, 14.0)
                .size(scale.small)
                .weight(700)
                .spacing(2.0)
                .color(c.text_light)
                .add();
        }

        let center_y = height / 2.0;
        b.text("cover.country", or_default(cover.country.as_deref(), "").to_uppercase())
            .at(pad, center_y - 50.0, width - pad * 2.0, 20.0)
            .size(14.0)
            .weight(300)
            .spacing(10.0)
            .color(c.text_light)
            .center()
            .add();
        b.text("cover.city", or_default(cover.city.as_deref(), "CITY"))
            .at(pad, center_y - 25.0, width - pad * 2.0, scale.h1 * 1.4)
            .size(scale.h1)
            .weight(800)
            .heading()
            .color(c.text_light)
            .center()
            .add();

        let pill_x = (width - 180.0) / 2.0;
        let pill_y = center_y + 25.0;
        b.rect("cover.dates.pill")
            .at(pill_x, pill_y, 180.0, 28.0)
            .fill(Color::WHITE.with_alpha(0.15))
            .stroke(Color::WHITE.with_alpha(0.4), 1.0)
            .radius(14.0)
            .add();
        b.text(
            "cover.dates",
            format!("✈  {}", or_default(cover.travel_dates.as_deref(), "")),
        )
        .at(pill_x, pill_y + 7.0, 180.0, 14.0)
        .size(scale.small)
        .weight(600)
        .color(c.text_light)
        .center()
        .add();

        let bottom_y = height - pad - 50.0;
        b.rect("cover.divider")
            .at(pad, bottom_y, width - pad * 2.0, 1.0)
            .fill(Color::WHITE.with_alpha(0.3))
            .add();
        b.image("cover.logo", "/corner-logo.png", (pad, bottom_y + 18.0, 60.0, 16.0));
        b.text("cover.emergency.label", "Emergency Contact")
            .at(width / 2.0, bottom_y + 10.0, width / 2.0 - pad, 12.0)
            .size(scale.xs)
            .spacing(1.0)
            .color(c.text_light.with_alpha(0.7))
            .right()
            .add();
        b.text(
            "cover.emergency.phone",
            or_default(cover.emergency_contact.as_deref(), ""),
        )
        .at(width / 2.0, bottom_y + 23.0, width / 2.0 - pad, 14.0)
        .size(scale.small)
        .weight(600)
        .color(c.text_light)
        .right()
        .add();
        b.text(
            "cover.emergency.email",
            or_default(cover.emergency_email.as_deref(), ""),
        )
        .at(width / 2.0, bottom_y + 38.0, width / 2.0 - pad, 12.0)
        .size(scale.xs)
        .color(c.text_light.with_alpha(0.8))
        .right()
        .add();
    }

    fn blank(&self, b: &mut LayoutBuilder<'_>, _data: &DataSnapshot) {
        let style = b.style();
        let (width, height) = (b.width(), b.height());
        b.background("blank.background", style.colors.background);
        b.text("blank.note", "空白頁（封面背面）")
            .at(0.0, height / 2.0 - 8.0, width, 16.0)
            .size(style.fonts.scale.small)
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
        b.rect("contents.topbar").at(0.0, 0.0, width, 6.0).fill(CYAN).add();
        b.text("contents.tag", "GUIDEBOOK")
            .at(pad, 28.0, 120.0, 12.0)
            .size(scale.xs)
            .weight(700)
            .spacing(2.0)
            .color(c.primary)
            .add();
        b.text("contents.volume", "VOL. 01")
            .at(width - pad - 80.0, 28.0, 80.0, 12.0)
            .size(scale.xs)
            .color(c.text_secondary)
            .right()
            .add();
        b.text("contents.title", "CONTENTS")
            .at(pad, 44.0, width - pad * 2.0, scale.h2 * 1.3)
            .size(scale.h2)
            .weight(800)
            .heading()
            .add();
        let trip = cover
            .trip_name()
            .map_or_else(|| "TRIP".to_string(), |n| format!("{n} Trip").to_uppercase());
        b.text("contents.trip", trip)
            .at(pad, 78.0, width - pad * 2.0, 14.0)
            .size(scale.small)
            .spacing(1.0)
            .color(c.text_secondary)
            .add();

        let gap = 8.0;
        let grid_top = 104.0;
        let footer_y = height - pad - 48.0;
        let card_w = (width - pad * 2.0 - gap) / 2.0;
        let card_h = (footer_y - grid_top - gap * 3.0) / 3.0;
        for (i, (title, subtitle, page)) in CHAPTERS.iter().enumerate() {
            let x = pad + units(i % 2) * (card_w + gap);
            let y = grid_top + units(i / 2) * (card_h + gap);
            let prefix = format!("contents.chapter.{i}");
            b.rect(&format!("{prefix}.card"))
                .at(x, y, card_w, card_h)
                .fill(c.card_background)
                .stroke(c.border, 1.0)
                .radius(8.0)
                .add();
            b.text(&format!("{prefix}.number"), two_digit(i + 1))
                .at(x + 14.0, y + 12.0, 60.0, scale.h2 * 1.2)
                .size(scale.h2)
                .weight(800)
                .color(c.primary)
                .add();
            b.text(&format!("{prefix}.title"), *title)
                .at(x + 14.0, y + card_h - 52.0, card_w - 28.0, scale.h3 * 1.3)
                .size(scale.h3 * 0.9)
                .weight(700)
                .add();
            b.text(&format!("{prefix}.subtitle"), *subtitle)
                .at(x + 14.0, y + card_h - 28.0, card_w - 70.0, 14.0)
                .size(scale.small)
                .color(c.text_secondary)
                .add();
            b.text(&format!("{prefix}.page"), format!("P.{page:02}"))
                .at(x + card_w - 64.0, y + card_h - 28.0, 50.0, 14.0)
                .size(scale.xs)
                .weight(700)
                .color(c.accent)
                .right()
                .add();
        }

        b.circle("contents.airport.badge")
            .at(pad, footer_y, 40.0, 40.0)
            .fill(c.primary)
            .add();
        b.text(
            "contents.airport",
            or_default(cover.airport_code.as_deref(), "").to_uppercase(),
        )
        .at(pad, footer_y + 14.0, 40.0, 12.0)
        .size(scale.small)
        .weight(700)
        .color(c.text_light)
        .center()
        .add();
        let place = [cover.city.as_deref(), cover.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        b.text("contents.place", place)
            .at(pad + 52.0, footer_y + 6.0, width / 2.0, 14.0)
            .size(scale.body)
            .weight(700)
            .add();
        b.text("contents.farewell", "Bon Voyage")
            .at(pad + 52.0, footer_y + 22.0, width / 2.0, 12.0)
            .size(scale.xs)
            .spacing(1.0)
            .color(c.accent)
            .add();
        page_number(b, "Page 02", c.text_secondary, true);
    }

    fn overview_left(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot) {
        let style = b.style();
        let c = &style.colors;
        let scale = style.fonts.scale;
        let pad = style.spacing.page_padding;
        let (width, height) = (b.width(), b.height());
        let cover = data.cover.clone().unwrap_or_default();
        let meeting = data.meeting.clone().unwrap_or_default();
        let band_h = height * 0.5;

        b.background("overview.background", c.background);
        b.rect("overview.band")
            .at(0.0, 0.0, width, band_h)
            .fill(c.primary)
            .add();
        if let Some(src) = cover.overview_image.as_deref().filter(|s| !s.trim().is_empty()) {
            b.image("overview.image", src, (0.0, 0.0, width, band_h));
            b.rect("overview.mask")
                .at(0.0, 0.0, width, band_h)
                .fill(Color::rgba(13, 148, 136, 0.5))
                .add();
        }

        let box_y = band_h / 2.0 - 60.0;
        b.rect("overview.titlebox")
            .at(pad, box_y, width * 0.55, 120.0)
            .fill(Color::WHITE.with_alpha(0.92))
            .radius(4.0)
            .add();
        b.rect("overview.titlebox.accent")
            .at(pad, box_y, 4.0, 120.0)
            .fill(c.accent)
            .add();
        b.text("overview.city", or_default(cover.city.as_deref(), "Journey"))
            .at(pad + 20.0, box_y + 28.0, width * 0.55 - 40.0, scale.h1 * 1.3)
            .size(scale.h1)
            .weight(800)
            .heading()
            .color(c.primary_dark)
            .add();
        b.text("overview.subtitle", "Travel Guide")
            .at(pad + 20.0, box_y + 28.0 + scale.h1 * 1.4, width * 0.55 - 40.0, 14.0)
            .size(scale.small)
            .spacing(4.0)
            .color(c.text_secondary)
            .add();

        b.rect("overview.lower")
            .at(0.0, band_h, width, height - band_h)
            .fill(c.card_background)
            .add();
        let section_y = band_h + pad;
        b.text("overview.flight.title", "Flight Information / 航班資訊")
            .at(pad, section_y, width - pad * 2.0, scale.h3 * 1.3)
            .size(scale.h3 * 0.8)
            .weight(700)
            .color(c.primary)
            .add();

        let palette = LegPalette {
            marker: c.accent,
            label: c.primary,
            text: c.text_primary,
        };
        let legs = data
            .flight
            .as_ref()
            .map(|f| {
                [
                    ("outbound", "OUTBOUND 去程", f.outbound.as_ref()),
                    ("return", "RETURN 回程", f.return_leg.as_ref()),
                ]
            })
            .unwrap_or_default();
        let mut leg_y = section_y + 32.0;
        let mut any_leg = false;
        for (key, label, leg) in legs {
            if let Some(leg) = leg {
                flight_leg(
                    b,
                    &format!("overview.flight.{key}"),
                    label,
                    leg,
                    (pad, leg_y, width - pad * 2.0, 52.0),
                    palette,
                );
                leg_y += 60.0;
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

        let box_h = 90.0;
        let info_y = height - pad - 30.0 - box_h;
        let box_w = (width - pad * 2.0 - 12.0) / 2.0;
        b.rect("overview.meeting.box")
            .at(pad, info_y, box_w, box_h)
            .fill(c.background)
            .stroke(c.border, 1.0)
            .radius(8.0)
            .add();
        b.text("overview.meeting.label", "MEETING 集合")
            .at(pad + 12.0, info_y + 12.0, box_w - 24.0, 12.0)
            .size(scale.xs)
            .weight(700)
            .spacing(1.0)
            .color(c.primary)
            .add();
        b.text(
            "overview.meeting.time",
            or_default(meeting.meeting_time.as_deref(), ""),
        )
        .at(pad + 12.0, info_y + 30.0, box_w - 24.0, 16.0)
        .size(scale.body)
        .weight(700)
        .add();
        b.text(
            "overview.meeting.location",
            or_default(meeting.meeting_location.as_deref(), "桃園機場第二航廈 團體櫃檯前"),
        )
        .at(pad + 12.0, info_y + 50.0, box_w - 24.0, 32.0)
        .size(scale.small)
        .line_height(1.4)
        .color(c.text_secondary)
        .add();

        let leader_x = pad + box_w + 12.0;
        b.rect("overview.leader.box")
            .at(leader_x, info_y, box_w, box_h)
            .fill(c.background)
            .stroke(c.border, 1.0)
            .radius(8.0)
            .add();
        b.text("overview.leader.label", "LEADER 領隊")
            .at(leader_x + 12.0, info_y + 12.0, box_w - 24.0, 12.0)
            .size(scale.xs)
            .weight(700)
            .spacing(1.0)
            .color(c.accent)
            .add();
        b.text(
            "overview.leader.name",
            or_default(meeting.leader_name.as_deref(), ""),
        )
        .at(leader_x + 12.0, info_y + 30.0, box_w - 24.0, 16.0)
        .size(scale.body)
        .weight(700)
        .add();
        b.text(
            "overview.leader.phone",
            or_default(meeting.leader_phone.as_deref(), ""),
        )
        .at(leader_x + 12.0, info_y + 50.0, box_w - 24.0, 14.0)
        .size(scale.small)
        .color(c.text_secondary)
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
        b.text("itinerary.title", "行程總攬")
            .at(pad, pad, width - pad * 2.0, scale.h2 * 1.3)
            .size(scale.h2)
            .weight(800)
            .heading()
            .add();
        b.text("itinerary.subtitle", "Itinerary Overview")
            .at(pad, pad + scale.h2 * 1.4, width - pad * 2.0, 12.0)
            .size(scale.small)
            .spacing(2.0)
            .color(c.text_secondary)
            .add();

        let days: Vec<_> = data.daily_overview.iter().take(6).collect();
        let start_y = 90.0;
        if days.is_empty() {
            b.placeholder(
                "itinerary",
                "尚無行程資料",
                (pad, start_y, width - pad * 2.0, 200.0),
            );
        } else {
            let day_h = (height - start_y - 50.0) / units(days.len());
            b.rect("itinerary.timeline")
                .at(40.0, start_y, 2.0, day_h * units(days.len()) - 16.0)
                .fill(c.border)
                .add();
            for (i, day) in days.iter().enumerate() {
                let y = start_y + units(i) * day_h;
                let prefix = format!("itinerary.day.{i}");
                b.circle(&format!("{prefix}.dot"))
                    .at(35.0, y + 4.0, 12.0, 12.0)
                    .fill(c.primary)
                    .stroke(c.background, 2.0)
                    .add();
                b.text(&format!("{prefix}.label"), "DAY")
                    .at(60.0, y, 40.0, 10.0)
                    .size(scale.xs)
                    .weight(700)
                    .spacing(1.0)
                    .color(c.accent)
                    .add();
                b.text(&format!("{prefix}.number"), two_digit(day.day_index + 1))
                    .at(60.0, y + 10.0, 40.0, scale.h3 * 1.3)
                    .size(scale.h3)
                    .weight(800)
                    .color(c.primary)
                    .add();
                b.text(
                    &format!("{prefix}.date"),
                    label_for(start, day.day_index, short_label),
                )
                .at(110.0, y, width - 110.0 - pad, 12.0)
                .size(scale.small)
                .color(c.text_secondary)
                .add();
                b.text(&format!("{prefix}.title"), day.title.as_str())
                    .at(110.0, y + 14.0, width - 110.0 - pad, 16.0)
                    .size(scale.body)
                    .weight(700)
                    .add();
                let activities = day
                    .activities
                    .iter()
                    .take(3)
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" · ");
                b.text(&format!("{prefix}.activities"), activities)
                    .at(110.0, y + 32.0, width - 110.0 - pad, (day_h - 44.0).max(12.0))
                    .size(scale.small)
                    .line_height(1.4)
                    .color(c.text_secondary)
                    .add();
                if i + 1 < days.len() {
                    b.rect(&format!("{prefix}.separator"))
                        .at(60.0, y + day_h - 8.0, width - 60.0 - pad, 1.0)
                        .fill(c.border)
                        .add();
                }
            }
        }

        b.circle("itinerary.decoration")
            .at(width - 90.0, height - 110.0, 140.0, 140.0)
            .fill(c.primary_light.with_alpha(0.08))
            .add();
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

        let top_h = height * 0.45;
        b.rect("day.header.background")
            .at(0.0, 0.0, width, top_h)
            .fill(c.card_background)
            .add();
        b.circle("day.header.decoration")
            .at(width - 160.0, -60.0, 220.0, 220.0)
            .fill(c.primary.with_alpha(0.08))
            .add();
        let trip = data
            .cover
            .as_ref()
            .and_then(brochure_core::snapshot::CoverData::trip_name)
            .unwrap_or_else(|| "Japan Travel".to_string());
        b.text("day.trip", trip)
            .at(pad, pad, width / 2.0, 12.0)
            .size(scale.xs)
            .spacing(2.0)
            .color(c.text_secondary)
            .add();
        b.text(
            "day.date",
            label_for(departure(data), day.day_index, dotted_label),
        )
        .at(pad, pad + 14.0, width / 2.0, 12.0)
        .size(scale.xs)
        .weight(600)
        .color(c.text_secondary)
        .add();
        b.text("day.kanji", kanji_numeral(day.number()))
            .at(width - pad - 80.0, pad, 80.0, 44.0)
            .size(36.0)
            .weight(900)
            .color(c.primary.with_alpha(0.15))
            .right()
            .add();

        let title = or_default(day.title.as_deref(), "").to_string();
        let highlight = or_default(day.highlight.as_deref(), "").to_string();
        let number = two_digit(day.number());
        b.block(
            "day.header",
            BlockKind::DayHeader,
            (pad, 56.0, width - pad * 2.0, top_h - 56.0 - 8.0),
            |inner| {
                let w = inner.width();
                inner
                    .text("day.header.label", "Day")
                    .at(0.0, 0.0, 120.0, scale.h3 * 1.3)
                    .size(scale.h3)
                    .weight(300)
                    .color(c.primary)
                    .add();
                inner
                    .text("day.header.number", number)
                    .at(0.0, 16.0, 180.0, 86.0)
                    .size(72.0)
                    .weight(900)
                    .color(c.primary)
                    .add();
                inner
                    .rect("day.header.line")
                    .at(0.0, 108.0, 40.0, 3.0)
                    .fill(c.accent)
                    .add();
                inner
                    .text("day.title", title)
                    .at(0.0, 120.0, w, scale.h2 * 1.4)
                    .size(scale.h2 * 0.9)
                    .weight(800)
                    .heading()
                    .add();
                inner
                    .text("day.highlight", highlight)
                    .at(0.0, 120.0 + scale.h2 * 1.5, w, scale.body * 2.8)
                    .size(scale.body)
                    .line_height(1.4)
                    .color(c.text_secondary)
                    .add();
            },
        );

        let content_y = top_h + pad;
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
                b.rect("day.image.mask")
                    .at(pad, content_y, width - pad * 2.0, content_h)
                    .fill(bottom_fade())
                    .add();
                let caption = day.activities[0].title.as_str();
                b.text("day.image.caption", caption)
                    .at(pad + 16.0, content_y + content_h - 36.0, width - pad * 2.0 - 32.0, 20.0)
                    .size(scale.h3 * 0.8)
                    .weight(700)
                    .color(c.text_light)
                    .add();
            }
            (count, _) => {
                let dots = [c.primary, c.accent, c.primary_dark, STEEL];
                let shown = count.min(5);
                for (i, activity) in day.activities.iter().take(shown).enumerate() {
                    timeline_item(
                        b,
                        &format!("day.activity.{i}"),
                        activity,
                        (pad, content_y + units(i) * 75.0, width - pad * 2.0, 70.0),
                        dots[i % dots.len()],
                        i + 1 < shown,
                    );
                }
            }
        }

        page_number(
            b,
            &format!("P.{:02}", day.number() * 2 + 4),
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
        b.text("spots.title", "景點介紹")
            .at(pad, pad, width / 2.0, scale.h3 * 1.3)
            .size(scale.h3)
            .weight(800)
            .heading()
            .add();
        b.text("spots.subtitle", "HIGHLIGHTS")
            .at(width / 2.0, pad + 6.0, width / 2.0 - pad, 12.0)
            .size(scale.xs)
            .weight(700)
            .spacing(2.0)
            .color(c.accent)
            .right()
            .add();

        let start_y = 70.0;
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
            let card_h = (height - start_y - 100.0) / units(spots.len());
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
                    (pad, start_y + units(i) * card_h, width - pad * 2.0, card_h - 12.0),
                    |inner| {
                        let w = inner.width();
                        let h = inner.height();
                        let image_h = h * 0.6;
                        inner
                            .rect(&format!("{prefix}.background"))
                            .at(0.0, 0.0, w, h)
                            .fill(c.card_background)
                            .radius(8.0)
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
                            .text(&format!("{prefix}.title"), title)
                            .at(card_pad, image_h + 12.0, w - card_pad * 2.0, scale.h3 * 1.2)
                            .size(scale.h3 * 0.85)
                            .weight(700)
                            .add();
                        inner
                            .text(&format!("{prefix}.description"), description)
                            .at(
                                card_pad,
                                image_h + 14.0 + scale.h3 * 1.2,
                                w - card_pad * 2.0,
                                (h - image_h - scale.h3 * 1.2 - 20.0).max(12.0),
                            )
                            .size(scale.small)
                            .line_height(1.5)
                            .color(c.text_secondary)
                            .add();
                    },
                );
            }
        }

        b.text("spots.note", "行程內容可能依當地情況調整，敬請見諒")
            .at(pad, height - pad - 40.0, width - pad * 2.0, 12.0)
            .size(scale.xs)
            .color(c.text_secondary)
            .center()
            .add();
        let label = data.day.as_ref().map_or_else(
            || "SPOTS".to_string(),
            |d| format!("{}-{:02} / SPOTS", two_digit(d.number()), d.number() * 2 + 5),
        );
        page_number(b, &label, c.text_secondary, true);
    }

    fn accommodation_left(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot) {
        let style = b.style();
        let c = &style.colors;
        let scale = style.fonts.scale;
        let pad = style.spacing.page_padding;
        let (width, height) = (b.width(), b.height());

        b.background("stay.background", c.background);
        b.text("stay.title", "Accommodation")
            .at(pad, pad, width - pad * 2.0, scale.h2 * 1.3)
            .size(scale.h2)
            .weight(800)
            .heading()
            .color(c.primary)
            .add();
        b.text("stay.subtitle", "宿泊施設")
            .at(pad, pad + scale.h2 * 1.35, width / 2.0, 14.0)
            .size(scale.small)
            .spacing(2.0)
            .color(c.accent)
            .add();
        b.text("stay.caption", "嚴選住宿介紹")
            .at(width / 2.0, pad + scale.h2 * 1.35, width / 2.0 - pad, 14.0)
            .size(scale.body)
            .color(c.text_secondary)
            .right()
            .add();

        let start_y = 110.0;
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
            let card_h = ((height - start_y - pad - 40.0 - gap * (n - 1.0)) / n).min(200.0);
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
                        match src {
                            Some(src) => {
                                inner.image(&format!("{prefix}.image"), src, (0.0, 0.0, w, h));
                            }
                            None => {
                                inner
                                    .rect(&format!("{prefix}.image.empty"))
                                    .at(0.0, 0.0, w, h)
                                    .fill(c.primary_dark)
                                    .radius(8.0)
                                    .add();
                            }
                        }
                        inner
                            .rect(&format!("{prefix}.mask"))
                            .at(0.0, 0.0, w, h)
                            .fill(bottom_fade())
                            .radius(8.0)
                            .add();
                        inner
                            .circle(&format!("{prefix}.badge"))
                            .at(12.0, 12.0, 28.0, 28.0)
                            .fill(c.accent)
                            .add();
                        inner
                            .text(&format!("{prefix}.number"), two_digit(i + 1))
                            .at(12.0, 20.0, 28.0, 12.0)
                            .size(scale.small)
                            .weight(700)
                            .color(c.text_light)
                            .center()
                            .add();
                        inner
                            .text(&format!("{prefix}.name"), hotel_name)
                            .at(16.0, h - 52.0, w - 32.0, scale.h3 * 1.3)
                            .size(scale.h3)
                            .weight(700)
                            .color(c.text_light)
                            .add();
                        if !days.is_empty() {
                            inner
                                .rect(&format!("{prefix}.days.pill"))
                                .at(16.0, h - 24.0, 90.0, 16.0)
                                .fill(Color::WHITE.with_alpha(0.2))
                                .radius(8.0)
                                .add();
                            inner
                                .text(&format!("{prefix}.days"), days)
                                .at(16.0, h - 21.0, 90.0, 10.0)
                                .size(scale.xs)
                                .weight(600)
                                .color(c.text_light)
                                .center()
                                .add();
                        }
                    },
                );
            }
        }
        page_number(b, "16", c.text_secondary, false);
    }

    fn accommodation_right(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot) {
        let style = b.style();
        let c = &style.colors;
        let scale = style.fonts.scale;
        let pad = style.spacing.page_padding;
        let (width, height) = (b.width(), b.height());

        b.background("stay.details.background", c.background);
        b.text("stay.details.title", "住宿資訊")
            .at(pad, pad, width / 2.0, scale.h3 * 1.3)
            .size(scale.h3)
            .weight(800)
            .heading()
            .add();
        b.text("stay.details.subtitle", "HOTEL DETAILS")
            .at(width / 2.0, pad + 6.0, width / 2.0 - pad, 12.0)
            .size(scale.xs)
            .weight(700)
            .spacing(2.0)
            .color(c.accent)
            .right()
            .add();

        let schemes = [
            (c.primary, c.primary_light.with_alpha(0.1)),
            (c.accent, c.accent_light.with_alpha(0.1)),
            (c.primary_dark, c.primary.with_alpha(0.06)),
        ];
        let start_y = 80.0;
        let hotels: Vec<_> = data.accommodations.iter().take(3).collect();
        if hotels.is_empty() {
            b.placeholder(
                "stay.details",
                "尚無住宿資訊",
                (pad, start_y, width - pad * 2.0, 200.0),
            );
        } else {
            let entry_h = (height - start_y - 60.0) / units(hotels.len());
            for (i, hotel) in hotels.into_iter().enumerate() {
                let (ink, tint) = schemes[i % schemes.len()];
                let prefix = format!("stay.details.hotel.{i}");
                let hotel_name = hotel.name.clone();
                let stay = stay_label(hotel);
                let address = format!("📍 {}", or_default(hotel.address.as_deref(), ""));
                let phone = format!("📞 {}", or_default(hotel.phone.as_deref(), ""));
                let times = check_times(hotel);
                b.block(
                    &prefix,
                    BlockKind::AccommodationCard,
                    (pad, start_y + units(i) * entry_h, width - pad * 2.0, entry_h - 12.0),
                    |inner| {
                        let w = inner.width();
                        let h = inner.height();
                        inner
                            .rect(&format!("{prefix}.background"))
                            .at(0.0, 0.0, w, h)
                            .fill(tint)
                            .radius(8.0)
                            .add();
                        inner
                            .rect(&format!("{prefix}.stripe"))
                            .at(0.0, 0.0, 4.0, h)
                            .fill(ink)
                            .add();
                        inner
                            .text(&format!("{prefix}.number"), two_digit(i + 1))
                            .at(16.0, 12.0, 40.0, scale.h2 * 1.2)
                            .size(scale.h2)
                            .weight(800)
                            .color(ink)
                            .add();
                        inner
                            .text(&format!("{prefix}.name"), hotel_name)
                            .at(60.0, 14.0, w - 76.0, scale.h3 * 1.3)
                            .size(scale.h3 * 0.9)
                            .weight(700)
                            .add();
                        inner
                            .text(&format!("{prefix}.stay"), stay)
                            .at(60.0, 14.0 + scale.h3 * 1.3, w - 76.0, 12.0)
                            .size(scale.small)
                            .color(c.text_secondary)
                            .add();
                        inner
                            .rect(&format!("{prefix}.divider"))
                            .at(16.0, 64.0, w - 32.0, 1.0)
                            .fill(c.border)
                            .add();
                        inner
                            .text(&format!("{prefix}.address"), address)
                            .at(16.0, 74.0, w - 32.0, 14.0)
                            .size(scale.small)
                            .add();
                        inner
                            .text(&format!("{prefix}.phone"), phone)
                            .at(16.0, 92.0, w - 32.0, 14.0)
                            .size(scale.small)
                            .add();
                        inner
                            .text(&format!("{prefix}.times"), times)
                            .at(16.0, 110.0, w - 32.0, 14.0)
                            .size(scale.small)
                            .weight(600)
                            .color(ink)
                            .add();
                    },
                );
            }
        }
        page_number(b, "17", c.text_secondary, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brochure_core::itinerary::Activity;
    use brochure_core::snapshot::DayData;
    use brochure_core::{ElementKind, IdSource};

    fn layout(f: impl FnOnce(&ClassicTheme, &mut LayoutBuilder<'_>)) -> Vec<brochure_core::Element> {
        let theme = ClassicTheme::new();
        let mut ids = IdSource::seeded(7);
        let mut b = LayoutBuilder::new(theme.style(), &mut ids, 559.0, 794.0);
        f(&theme, &mut b);
        b.finish()
    }

    fn text_of<'e>(elements: &'e [brochure_core::Element], name: &str) -> Option<&'e str> {
        elements.iter().find(|e| e.name == name).and_then(|e| match &e.kind {
            ElementKind::Text { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    #[test]
    fn test_cover_defaults_city() {
        let elements = layout(|t, b| t.cover(b, &DataSnapshot::default()));
        assert_eq!(text_of(&elements, "cover.city"), Some("CITY"));
        assert!(elements.iter().any(|e| e.name == "cover.background"));
    }

    #[test]
    fn test_daily_left_page_number_and_kanji() {
        let data = DataSnapshot {
            day: Some(DayData {
                day_index: 1,
                activities: vec![
                    Activity {
                        title: "Temple".into(),
                        ..Activity::default()
                    },
                    Activity {
                        title: "Market".into(),
                        ..Activity::default()
                    },
                ],
                ..DayData::default()
            }),
            ..DataSnapshot::default()
        };
        let elements = layout(|t, b| t.daily_left(b, &data));
        assert_eq!(text_of(&elements, "page.number"), Some("P.08"));
        assert_eq!(text_of(&elements, "day.kanji"), Some("弐"));
        assert_eq!(
            elements
                .iter()
                .filter(|e| matches!(e.kind, ElementKind::Block { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn test_overview_right_dates() {
        let data = DataSnapshot {
            meeting: Some(brochure_core::snapshot::MeetingData {
                departure_date: Some("2024-05-01".into()),
                ..Default::default()
            }),
            daily_overview: vec![brochure_core::snapshot::DayOverview {
                day_index: 0,
                title: "Arrive".into(),
                activities: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            }],
            ..DataSnapshot::default()
        };
        let elements = layout(|t, b| t.overview_right(b, &data));
        assert_eq!(text_of(&elements, "itinerary.day.0.date"), Some("05/01 (Wed)"));
        assert_eq!(text_of(&elements, "itinerary.day.0.activities"), Some("A · B · C"));
    }
}
