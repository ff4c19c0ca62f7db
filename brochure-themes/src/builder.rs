//! Fluent element construction for layout code.
//!
//! A [`LayoutBuilder`] collects elements in paint order. Text and shape
//! drafts start from the theme's defaults and are committed with `add()`.

use brochure_core::{
    BlockKind, Color, Element, ElementId, ElementKind, Fill, FontWeight, IdSource, ShapeVariant,
    Stroke, TextAlign, TextStyle, Transform,
};

use crate::style::ThemeStyle;

/// Collects generated elements for one page.
pub struct LayoutBuilder<'a> {
    style: &'a ThemeStyle,
    ids: &'a mut IdSource,
    width: f32,
    height: f32,
    elements: Vec<Element>,
}

impl<'a> LayoutBuilder<'a> {
    /// Create a builder for a page of the given size.
    pub fn new(style: &'a ThemeStyle, ids: &'a mut IdSource, width: f32, height: f32) -> Self {
        Self {
            style,
            ids,
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Theme style; the borrow is independent of the builder.
    #[must_use]
    pub fn style(&self) -> &'a ThemeStyle {
        self.style
    }

    /// Page (or block) width.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Page (or block) height.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Number of elements so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Start a text element with body defaults.
    pub fn text(&mut self, name: &str, content: impl Into<String>) -> TextDraft<'_, 'a> {
        let style = TextStyle {
            font_family: self.style.fonts.primary.clone(),
            font_size: self.style.fonts.scale.body,
            color: self.style.colors.text_primary,
            ..TextStyle::default()
        };
        let element = Element::text(content, style).with_name(name);
        TextDraft {
            builder: self,
            element,
        }
    }

    /// Start a rectangle filled with the card background.
    pub fn rect(&mut self, name: &str) -> ShapeDraft<'_, 'a> {
        let fill = self.style.colors.card_background;
        let element = Element::shape(ShapeVariant::Rectangle, fill).with_name(name);
        ShapeDraft {
            builder: self,
            element,
        }
    }

    /// Start a circle inscribed in its box.
    pub fn circle(&mut self, name: &str) -> ShapeDraft<'_, 'a> {
        let fill = self.style.colors.card_background;
        let element = Element::shape(ShapeVariant::Circle, fill).with_name(name);
        ShapeDraft {
            builder: self,
            element,
        }
    }

    /// Add a cover-fit image.
    pub fn image(
        &mut self,
        name: &str,
        src: impl Into<String>,
        (x, y, width, height): (f32, f32, f32, f32),
    ) -> ElementId {
        let element = Element::image(src)
            .with_name(name)
            .with_bounds(x, y, width, height);
        self.push(element)
    }

    /// Full-size background rectangle.
    pub fn background(&mut self, name: &str, fill: impl Into<Fill>) -> ElementId {
        let (w, h) = (self.width, self.height);
        self.rect(name).at(0.0, 0.0, w, h).fill(fill).add()
    }

    /// Placeholder panel and message for an empty region.
    ///
    /// Emits `<prefix>.placeholder.bg` and `<prefix>.placeholder`.
    pub fn placeholder(
        &mut self,
        prefix: &str,
        message: &str,
        (x, y, width, height): (f32, f32, f32, f32),
    ) -> ElementId {
        let style = self.style;
        self.rect(&format!("{prefix}.placeholder.bg"))
            .at(x, y, width, height)
            .fill(style.colors.card_background)
            .radius(8.0)
            .add();
        let text_height = style.fonts.scale.body * 1.6;
        self.text(&format!("{prefix}.placeholder"), message)
            .at(x, y + (height - text_height) / 2.0, width, text_height)
            .color(style.colors.text_secondary.with_alpha(0.6))
            .center()
            .add()
    }

    /// Add a compound block whose children are laid out relative to `bounds`.
    pub fn block(
        &mut self,
        name: &str,
        kind: BlockKind,
        (x, y, width, height): (f32, f32, f32, f32),
        build: impl FnOnce(&mut LayoutBuilder<'_>),
    ) -> ElementId {
        let id = self.ids.next_id();
        let children = {
            let mut inner = LayoutBuilder::new(self.style, &mut *self.ids, width, height);
            build(&mut inner);
            inner.finish()
        };
        let element = Element::new(ElementKind::Block {
            block: kind,
            children,
        })
        .with_id(id)
        .with_name(name)
        .with_bounds(x, y, width, height);
        self.elements.push(element);
        id
    }

    /// Elements in the order they were added.
    #[must_use]
    pub fn finish(self) -> Vec<Element> {
        self.elements
    }

    fn push(&mut self, element: Element) -> ElementId {
        let id = self.ids.next_id();
        self.elements.push(element.with_id(id));
        id
    }
}

/// A text element under construction.
pub struct TextDraft<'b, 'a> {
    builder: &'b mut LayoutBuilder<'a>,
    element: Element,
}

impl TextDraft<'_, '_> {
    fn style_mut(&mut self) -> Option<&mut TextStyle> {
        match &mut self.element.kind {
            ElementKind::Text { style, .. } => Some(style),
            _ => None,
        }
    }

    /// Position and size.
    #[must_use]
    pub fn at(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.element.transform = Transform::rect(x, y, width, height);
        self
    }

    /// Font size in pixels.
    #[must_use]
    pub fn size(mut self, size: f32) -> Self {
        if let Some(style) = self.style_mut() {
            style.font_size = size;
        }
        self
    }

    /// Numeric font weight.
    #[must_use]
    pub fn weight(mut self, weight: u16) -> Self {
        if let Some(style) = self.style_mut() {
            style.font_weight = FontWeight::from_numeric(f32::from(weight));
        }
        self
    }

    /// Text color.
    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        if let Some(style) = self.style_mut() {
            style.color = color;
        }
        self
    }

    /// Center alignment.
    #[must_use]
    pub fn center(mut self) -> Self {
        if let Some(style) = self.style_mut() {
            style.align = TextAlign::Center;
        }
        self
    }

    /// Right alignment.
    #[must_use]
    pub fn right(mut self) -> Self {
        if let Some(style) = self.style_mut() {
            style.align = TextAlign::Right;
        }
        self
    }

    /// Letter spacing in pixels.
    #[must_use]
    pub fn spacing(mut self, spacing: f32) -> Self {
        if let Some(style) = self.style_mut() {
            style.letter_spacing = spacing;
        }
        self
    }

    /// Line height multiple.
    #[must_use]
    pub fn line_height(mut self, line_height: f32) -> Self {
        if let Some(style) = self.style_mut() {
            style.line_height = line_height;
        }
        self
    }

    /// Use the heading font family.
    #[must_use]
    pub fn heading(mut self) -> Self {
        let family = self.builder.style.fonts.heading.clone();
        if let Some(style) = self.style_mut() {
            style.font_family = family;
        }
        self
    }

    /// Commit the element.
    pub fn add(self) -> ElementId {
        self.builder.push(self.element)
    }
}

/// A shape element under construction.
pub struct ShapeDraft<'b, 'a> {
    builder: &'b mut LayoutBuilder<'a>,
    element: Element,
}

impl ShapeDraft<'_, '_> {
    /// Position and size.
    #[must_use]
    pub fn at(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.element.transform = Transform::rect(x, y, width, height);
        self
    }

    /// Fill paint.
    #[must_use]
    pub fn fill(mut self, paint: impl Into<Fill>) -> Self {
        if let ElementKind::Shape { fill, .. } = &mut self.element.kind {
            *fill = paint.into();
        }
        self
    }

    /// Outline.
    #[must_use]
    pub fn stroke(mut self, color: Color, width: f32) -> Self {
        if let ElementKind::Shape { stroke, .. } = &mut self.element.kind {
            *stroke = Some(Stroke { color, width });
        }
        self
    }

    /// Corner radius.
    #[must_use]
    pub fn radius(mut self, radius: f32) -> Self {
        if let ElementKind::Shape { corner_radius, .. } = &mut self.element.kind {
            *corner_radius = radius;
        }
        self
    }

    /// Element opacity.
    #[must_use]
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.element = self.element.with_opacity(opacity);
        self
    }

    /// Commit the element.
    pub fn add(self) -> ElementId {
        self.builder.push(self.element)
    }
}
