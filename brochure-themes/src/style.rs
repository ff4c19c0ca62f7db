//! Theme style tokens: colors, type scale and spacing.

use brochure_core::{Color, Fill, LinearGradient};
use serde::{Deserialize, Serialize};

/// A two-stop gradient token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientToken {
    /// Start color.
    pub start: Color,
    /// End color.
    pub end: Color,
    /// CSS angle in degrees.
    pub angle: f32,
}

impl GradientToken {
    /// Shape fill for this gradient.
    #[must_use]
    pub fn fill(&self) -> Fill {
        Fill::Gradient(LinearGradient::two_stop(self.angle, self.start, self.end))
    }
}

/// Theme color palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeColors {
    /// Brand color.
    pub primary: Color,
    /// Lighter brand tint.
    pub primary_light: Color,
    /// Darker brand shade.
    pub primary_dark: Color,
    /// Accent color.
    pub accent: Color,
    /// Lighter accent tint.
    pub accent_light: Color,
    /// Page background.
    pub background: Color,
    /// Card and panel background.
    pub card_background: Color,
    /// Body text.
    pub text_primary: Color,
    /// Secondary text.
    pub text_secondary: Color,
    /// Text on dark backgrounds.
    pub text_light: Color,
    /// Hairlines and borders.
    pub border: Color,
    /// Header band gradient.
    pub header_gradient: GradientToken,
    /// Accent gradient.
    pub accent_gradient: GradientToken,
}

/// Font sizes in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontScale {
    /// Display heading.
    pub h1: f32,
    /// Section heading.
    pub h2: f32,
    /// Sub-heading.
    pub h3: f32,
    /// Body copy.
    pub body: f32,
    /// Captions.
    pub small: f32,
    /// Fine print.
    pub xs: f32,
}

/// Typography tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeFonts {
    /// Body font family.
    pub primary: String,
    /// Heading font family.
    pub heading: String,
    /// Size scale.
    pub scale: FontScale,
}

/// Spacing tokens in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThemeSpacing {
    /// Inset from the page edge.
    pub page_padding: f32,
    /// Gap between sections.
    pub section_gap: f32,
    /// Gap between sibling elements.
    pub element_gap: f32,
    /// Inset inside cards.
    pub card_padding: f32,
}

/// Complete style of a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeStyle {
    /// Palette.
    pub colors: ThemeColors,
    /// Typography.
    pub fonts: ThemeFonts,
    /// Spacing.
    pub spacing: ThemeSpacing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_token_fill() {
        let token = GradientToken {
            start: Color::BLACK,
            end: Color::WHITE,
            angle: 135.0,
        };
        match token.fill() {
            Fill::Gradient(g) => {
                assert_eq!(g.stops.len(), 2);
                assert!((g.angle - 135.0).abs() < f32::EPSILON);
            }
            Fill::Solid(_) => panic!("expected gradient"),
        }
    }
}
