//! SketchInk Core Library
//!
//! Curve lifecycle and history engine for freehand drawing: raw pointer
//! samples become curves, curves become renderable paths, and completed
//! curves carry an undo/redo history and a JSON/SVG export boundary.

pub mod codec;
pub mod color;
pub mod config;
pub mod curve;
pub mod export;
pub mod history;
pub mod ids;
pub mod input;
pub mod session;
pub mod smoothing;
pub mod store;
pub mod view;

pub use codec::{CodecError, SvgOptions, to_bez_path, to_path_descriptor, to_svg_document};
pub use color::Color;
pub use config::{DEFAULT_STROKE_WIDTH, SessionConfig};
pub use curve::{Curve, CurveId, CurveStyle, CurvesDump};
pub use export::{ImageFormat, SnapshotOptions, SnapshotSurface};
pub use history::{HistoryStack, RedoPolicy};
pub use ids::{CurveIdAllocator, IdPolicy};
pub use input::PointerEvent;
pub use session::{FnListener, ListenerId, SessionController, SessionEvent, SessionListener};
pub use smoothing::{FreehandSmoother, Smoother, SmoothingOptions};
pub use store::{ActiveCurve, CurveStore};
pub use view::{CompletedPath, DerivedPaths, DerivedView, derive};
