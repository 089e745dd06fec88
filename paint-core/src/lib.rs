//! # Paint Core
//!
//! Sparse pixel-canvas editing engine for daily collaborative paintings.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                PaintSession                 │
//! ├─────────────────────────────────────────────┤
//! │  EditorState      │  FrameManager           │
//! │  - Tools, raster  │  - Frames, composite    │
//! │  - Undo / redo    │  - Playback             │
//! ├─────────────────────────────────────────────┤
//! │  PixelStore       │  Interchange            │
//! │  - Sparse map     │  - Hex payloads         │
//! │  - Snapshots      │  - Stroke JSON          │
//! ├─────────────────────────────────────────────┤
//! │  SessionStore · Debouncer · Submitter       │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod event;
pub mod frames;
pub mod history;
pub mod pixels;
pub mod playback;
pub mod raster;
pub mod schedule;
pub mod schema;
pub mod session;
pub mod state;
pub mod store;
pub mod strokes;
pub mod submit;

pub use config::{PaintConfig, Theme};
pub use error::{PaintError, PaintResult};
pub use event::{EditAction, KeyModifiers, Point, ShapeKind, Shortcut, Tool};
pub use frames::{remaining_strength, Frame, FrameId, FrameManager};
pub use history::{History, MAX_HISTORY};
pub use pixels::{Color, Pixel, PixelStore, PixelUpdate};
pub use playback::{frame_duration, AnimationPlayer};
pub use schedule::{Clock, Debouncer, ManualClock, RedrawRequest, SystemClock};
pub use schema::{FrameDocument, SessionDocument};
pub use session::PaintSession;
pub use state::{EditorState, PointerPhase};
pub use store::SessionStore;
pub use strokes::{DiffStroke, StrokePoint, StrokeRecord, SPACER_PAYLOAD};
pub use submit::{SubmitError, SubmitOutcome, Submitter};

/// Paint core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
