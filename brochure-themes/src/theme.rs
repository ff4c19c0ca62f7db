//! The theme contract and the generator entry point.

use brochure_core::document::{DEFAULT_PAGE_HEIGHT, DEFAULT_PAGE_WIDTH};
use brochure_core::overrides::assign_dense_z;
use brochure_core::{DataSnapshot, Element, ElementKind, IdSource, PageTemplate};

use crate::builder::LayoutBuilder;
use crate::style::ThemeStyle;

/// A swappable visual theme with one layout per page template.
///
/// Layout methods append elements to the builder in paint order. They must be
/// deterministic: the same snapshot and builder size always yield the same
/// geometry, style and order.
pub trait Theme: Send + Sync {
    /// Stable identifier used in documents.
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// Short description.
    fn description(&self) -> &str {
        ""
    }

    /// Style tokens.
    fn style(&self) -> &ThemeStyle;

    /// Front cover.
    fn cover(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot);

    /// Empty notes page.
    fn blank(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot);

    /// Table of contents.
    fn contents(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot);

    /// Trip overview, left page.
    fn overview_left(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot);

    /// Day-by-day overview, right page.
    fn overview_right(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot);

    /// One travel day, left page.
    fn daily_left(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot);

    /// One travel day, right page.
    fn daily_right(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot);

    /// Hotel photos, left page.
    fn accommodation_left(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot);

    /// Hotel details, right page.
    fn accommodation_right(&self, b: &mut LayoutBuilder<'_>, data: &DataSnapshot);

    /// Free-form page: a background and a placeholder.
    fn custom(&self, b: &mut LayoutBuilder<'_>, _data: &DataSnapshot) {
        let background = b.style().colors.background;
        b.background("custom.background", background);
        let (w, h) = (b.width(), b.height());
        b.placeholder("custom", "Custom page", (w * 0.25, h / 2.0 - 40.0, w * 0.5, 80.0));
    }
}

/// Options controlling one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Derive element ids from this seed instead of minting random ones.
    pub id_seed: Option<u64>,
    /// Keep compound blocks instead of flattening them.
    pub keep_blocks: bool,
    /// Page width in pixels.
    pub page_width: f32,
    /// Page height in pixels.
    pub page_height: f32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            id_seed: None,
            keep_blocks: false,
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
        }
    }
}

impl GenerateOptions {
    /// Use seeded ids.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.id_seed = Some(seed);
        self
    }

    /// Keep blocks.
    #[must_use]
    pub fn with_blocks(mut self) -> Self {
        self.keep_blocks = true;
        self
    }

    /// Page size.
    #[must_use]
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }
}

/// Generate the elements of one page.
///
/// The result is never empty. Blocks are flattened unless
/// [`GenerateOptions::keep_blocks`] is set, images without a source are
/// dropped, and z-indices run `1..=n` in generation order.
#[must_use]
pub fn generate(
    template: PageTemplate,
    snapshot: &DataSnapshot,
    theme: &dyn Theme,
    options: &GenerateOptions,
) -> Vec<Element> {
    let mut ids = options.id_seed.map_or(IdSource::Random, IdSource::seeded);

    let generated = {
        let mut b = LayoutBuilder::new(
            theme.style(),
            &mut ids,
            options.page_width,
            options.page_height,
        );
        match template {
            PageTemplate::Cover => theme.cover(&mut b, snapshot),
            PageTemplate::Blank => theme.blank(&mut b, snapshot),
            PageTemplate::Contents => theme.contents(&mut b, snapshot),
            PageTemplate::OverviewLeft => theme.overview_left(&mut b, snapshot),
            PageTemplate::OverviewRight => theme.overview_right(&mut b, snapshot),
            PageTemplate::DailyLeft => theme.daily_left(&mut b, snapshot),
            PageTemplate::DailyRight => theme.daily_right(&mut b, snapshot),
            PageTemplate::AccommodationLeft => theme.accommodation_left(&mut b, snapshot),
            PageTemplate::AccommodationRight => theme.accommodation_right(&mut b, snapshot),
            PageTemplate::Custom => theme.custom(&mut b, snapshot),
        }
        b.finish()
    };

    let flattened = if options.keep_blocks {
        generated
    } else {
        generated
            .into_iter()
            .flat_map(Element::flatten_block)
            .collect()
    };
    let mut elements = drop_unresolvable(flattened);

    if elements.is_empty() {
        tracing::warn!(
            theme = theme.id(),
            ?template,
            "Theme produced no elements, using fallback layout"
        );
        let mut b = LayoutBuilder::new(
            theme.style(),
            &mut ids,
            options.page_width,
            options.page_height,
        );
        theme.custom(&mut b, snapshot);
        elements = b.finish();
    }

    assign_dense_z(&mut elements);
    tracing::debug!(
        theme = theme.id(),
        ?template,
        count = elements.len(),
        "Generated page elements"
    );
    elements
}

fn drop_unresolvable(elements: Vec<Element>) -> Vec<Element> {
    elements
        .into_iter()
        .filter_map(|mut element| {
            let src = match &mut element.kind {
                ElementKind::Image { src, .. }
                | ElementKind::Decoration { src, .. }
                | ElementKind::Icon { src, .. } => Some(src.trim().to_string()),
                ElementKind::Block { children, .. } => {
                    *children = drop_unresolvable(std::mem::take(children));
                    None
                }
                ElementKind::Text { .. } | ElementKind::Shape { .. } => None,
            };
            if src.is_some_and(|s| s.is_empty()) {
                tracing::debug!(name = %element.name, "Dropping element with unresolvable asset");
                return None;
            }
            Some(element)
        })
        .collect()
}
