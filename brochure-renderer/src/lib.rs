//! # Brochure Renderer
//!
//! Draws pages onto a retained-mode host canvas and keeps the canvas and the
//! page in sync while the user edits.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────┐  render()   ┌──────────────┐  CanvasEvent   ┌───────────────┐
//! │   Page   │ ──────────▶ │  HostCanvas  │ ─────────────▶ │ EditorSession │
//! │ elements │             │ CanvasObject │                │  state machine│
//! └──────────┘             └──────────────┘                └───────┬───────┘
//!      ▲                                                            │
//!      └──────────────────── GeometryUpdate ◀───────────────────────┘
//! ```
//!
//! Editable and read-only renders share one paint function; the print
//! exporter serializes the read-only render, so what the editor shows is
//! what gets printed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod canvas;
pub mod error;
pub mod export;
pub mod guides;
pub mod object;
pub mod render;
pub mod retained;
pub mod session;

pub use canvas::{HostCanvas, ListenerId, ObjectHandle, ResolvedGeometry};
pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportFormat, PageExporter};
pub use guides::{detect_overlaps, snap, GuideAxis, SnapGuide, SnapResult};
pub use object::{CanvasObject, Interaction, ObjectPaint, PaintFill, ShapePaint, StrokePaint};
pub use render::{render, RenderOptions, RenderStats};
pub use retained::{CanvasCounters, RetainedCanvas};
pub use session::{CanvasEvent, EditorKey, EditorSession, GestureKind, SessionState, SyncEvent};
