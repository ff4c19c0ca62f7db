//! # Brochure Themes
//!
//! Layout generation for brochure pages.
//!
//! A [`Theme`] turns a page template and its [`DataSnapshot`] into positioned
//! elements. [`generate`] wraps a theme with the post-processing every page
//! needs: block flattening, dropping unresolvable assets, a non-empty
//! fallback and dense z-order.
//!
//! ```ignore
//! let registry = ThemeRegistry::builtin();
//! let elements = registry.generate("classic", PageTemplate::Cover, &snapshot, &GenerateOptions::default())?;
//! ```
//!
//! [`DataSnapshot`]: brochure_core::DataSnapshot

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod blocks;
pub mod builder;
pub mod classic;
pub mod dates;
pub mod error;
pub mod modern;
pub mod registry;
pub mod style;
pub mod theme;

pub use builder::{LayoutBuilder, ShapeDraft, TextDraft};
pub use classic::ClassicTheme;
pub use error::{LayoutError, LayoutResult};
pub use modern::ModernTheme;
pub use registry::{ThemeInfo, ThemeRegistry, DEFAULT_THEME};
pub use style::{FontScale, GradientToken, ThemeColors, ThemeFonts, ThemeSpacing, ThemeStyle};
pub use theme::{generate, GenerateOptions, Theme};
