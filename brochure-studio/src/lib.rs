//! # Brochure Studio
//!
//! Document ownership for the brochure engine, shared by the `brochure`
//! binary and integration tests.
//!
//! ```text
//!   Itinerary ──▶ SchemaStore::from_itinerary ──▶ Document (pages of elements)
//!                        │                              │
//!        apply_theme / refresh / overrides         export_pages ──▶ SVG per page
//!                        │
//!                 open_session(canvas) ──▶ EditorSession ──▶ overrides
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod store;

pub use config::{LogFormat, PageOverrides, StudioConfig};
pub use error::{StoreError, StoreResult};
pub use store::{ApplyThemeOptions, SchemaStore, StoreEvent, SubscriptionId};
