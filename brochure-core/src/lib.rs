//! # Brochure Core
//!
//! Schema for printable travel brochures: elements, pages, documents and the
//! trip data they are generated from.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                brochure-core                │
//! ├─────────────────────────────────────────────┤
//! │  Document        │  Element Model           │
//! │  - Pages         │  - Text / image / shape  │
//! │  - Settings      │  - Decoration / icon     │
//! │  - Navigation    │  - Blocks                │
//! ├─────────────────────────────────────────────┤
//! │  Page            │  Overrides               │
//! │  - Z-order       │  - Partial records       │
//! │  - Snapshots     │  - Regeneration merge    │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod document;
pub mod element;
pub mod error;
pub mod geometry;
pub mod itinerary;
pub mod overrides;
pub mod page;
pub mod snapshot;

pub use color::Color;
pub use document::{Document, DocumentSettings};
pub use element::{
    BlockKind, ColorStop, CropRect, Element, ElementId, ElementKind, Fill, FontWeight, IdSource,
    ImageFilters, LinearGradient, ObjectFit, ShapeVariant, Stroke, TextAlign, TextStyle,
    Transform,
};
pub use error::{CoreError, CoreResult};
pub use geometry::{GeometryUpdate, Rect};
pub use itinerary::Itinerary;
pub use overrides::{apply_overrides, regenerate, ElementOverride, TextStyleOverride};
pub use page::{Page, PageId, PageTemplate, ZOrderChange};
pub use snapshot::{DataSnapshot, SourceReference};

/// Brochure core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
