//! # Brochure Extract
//!
//! Turns a rendered brochure page back into elements.
//!
//! Designers sometimes prototype a page as HTML; the extractor reads the
//! laid-out DOM (live or as a [`SnapshotNode`] JSON dump) and produces
//! unbound elements that can be dropped onto a page.
//!
//! ```text
//! container ─┬─ div[data-element=shape]   ──▶ Shape (gradient / solid)
//!            ├─ img[data-element=image]   ──▶ Image (data-src > currentSrc > src > url())
//!            └─ p[data-element=text]      ──▶ Text  (resolved typography)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod css;
pub mod dom;
pub mod error;
pub mod extract;

pub use css::PerceptualColorMode;
pub use dom::{DomNode, SnapshotNode};
pub use error::{ExtractError, ExtractResult};
pub use extract::{extract, ElementMarker, ExtractOptions, MARKER_ATTRIBUTE};
