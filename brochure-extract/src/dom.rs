//! Read-only view of a rendered DOM.
//!
//! The extractor only needs a handful of facts about each node: its tag,
//! attributes, layout box and resolved style. [`DomNode`] captures exactly
//! that, so a live browser DOM and a serialized snapshot look the same to it.

use std::collections::BTreeMap;

use brochure_core::Rect;
use serde::{Deserialize, Serialize};

use crate::error::ExtractResult;

/// A node of a rendered document.
pub trait DomNode {
    /// Lowercase tag name, such as `div` or `img`.
    fn tag_name(&self) -> &str;

    /// Attribute value by name.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Layout box in viewport pixels.
    fn bounding_rect(&self) -> Rect;

    /// Resolved (computed) value of a CSS property.
    fn computed_style(&self, property: &str) -> Option<&str>;

    /// Concatenated text of the node and its descendants.
    fn text_content(&self) -> String;

    /// The source an `<img>` actually loaded, if known.
    fn current_src(&self) -> Option<&str> {
        None
    }

    /// Child elements in document order.
    fn children(&self) -> Vec<&Self>;
}

/// A serialized DOM node.
///
/// This is the JSON shape a preview page dumps for offline extraction:
///
/// ```json
/// {
///   "tag": "div",
///   "attributes": { "data-element": "text" },
///   "rect": { "x": 40, "y": 60, "width": 200, "height": 24 },
///   "style": { "font-size": "18px", "color": "rgb(51, 51, 51)" },
///   "text": "Day 1"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    /// Tag name.
    pub tag: String,
    /// Attributes.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Layout box.
    #[serde(default)]
    pub rect: Rect,
    /// Computed style properties.
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    /// Own text, excluding children.
    #[serde(default)]
    pub text: String,
    /// Loaded image source.
    #[serde(default, rename = "currentSrc", skip_serializing_if = "Option::is_none")]
    pub current_src: Option<String>,
    /// Child nodes.
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    /// Create a node with a tag and layout box.
    #[must_use]
    pub fn new(tag: impl Into<String>, rect: Rect) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            rect,
            ..Self::default()
        }
    }

    /// Parse a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not match the snapshot shape.
    pub fn from_json(json: &str) -> ExtractResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set a computed style property.
    #[must_use]
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(property.into(), value.into());
        self
    }

    /// Set the node's own text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: SnapshotNode) -> Self {
        self.children.push(child);
        self
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

impl DomNode for SnapshotNode {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn bounding_rect(&self) -> Rect {
        self.rect
    }

    fn computed_style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn current_src(&self) -> Option<&str> {
        self.current_src.as_deref()
    }

    fn children(&self) -> Vec<&Self> {
        self.children.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_includes_descendants() {
        let node = SnapshotNode::new("p", Rect::default())
            .with_text("Day ")
            .with_child(SnapshotNode::new("span", Rect::default()).with_text("1"));
        assert_eq!(node.text_content(), "Day 1");
    }

    #[test]
    fn test_snapshot_from_json() {
        let json = r#"{
            "tag": "img",
            "attributes": { "data-element": "image", "src": "a.jpg" },
            "rect": { "x": 1, "y": 2, "width": 3, "height": 4 },
            "currentSrc": "https://cdn/a.jpg"
        }"#;
        let node = SnapshotNode::from_json(json).expect("valid snapshot");
        assert_eq!(node.tag_name(), "img");
        assert_eq!(node.attribute("src"), Some("a.jpg"));
        assert_eq!(node.current_src(), Some("https://cdn/a.jpg"));
        assert_eq!(node.bounding_rect(), Rect::new(1.0, 2.0, 3.0, 4.0));
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_snapshot_rejects_malformed_json() {
        assert!(SnapshotNode::from_json("{\"rect\": 3}").is_err());
    }

    #[test]
    fn test_tag_is_lowercased() {
        assert_eq!(SnapshotNode::new("IMG", Rect::default()).tag_name(), "img");
    }
}
