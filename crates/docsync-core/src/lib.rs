#![warn(missing_docs)]
//! Docsync Core - Shadow-Copy Document Synchronization Kernel
//!
//! # Overview
//!
//! `docsync-core` keeps two independently editable copies of a rich text document consistent
//! across a request/response round trip, while named sub-ranges of the text (markers) and their
//! annotations follow every edit. It performs no I/O and owns no event loop: every operation is
//! a synchronous call that returns its results.
//!
//! # Core Features
//!
//! - **Persistent Snapshots**: rope text plus copy-on-write marker and annotation collections
//! - **Character Diff**: prefix/suffix trimming around a bounded Myers O(ND) search
//! - **Edit Scripts**: offset-based operations with optional marker/annotation replacements
//! - **Range Adjustment**: per-marker policies, caret clamps, whole-text replacement adjuster
//! - **Round-Trip Sessions**: shadow/authoritative reconciliation with returned events
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  SyncSession (authoritative side)           │  ← Round-trip protocol
//! │  LiveDocument (surface side)                │
//! ├─────────────────────────────────────────────┤
//! │  Edit Scripts (diff / apply)                │  ← State transfer
//! ├─────────────────────────────────────────────┤
//! │  Range Adjuster                             │  ← Marker tracking
//! ├─────────────────────────────────────────────┤
//! │  Document Snapshot                          │  ← Immutable state
//! ├─────────────────────────────────────────────┤
//! │  Line Index (Rope-based)                    │  ← Row/column access
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use docsync_core::{apply, diff, DocumentSnapshot, Marker, MarkerKind, OnTextChange, Range};
//!
//! let older = DocumentSnapshot::from_text("fn main() {}");
//! let newer = DocumentSnapshot::from_text("fn main() { run(); }").with_additional_marker(
//!     Marker::new("m1", Range::new(0, 12, 0, 18), "call", MarkerKind::Range, false, OnTextChange::Adjust),
//! );
//!
//! let script = diff(&older, &newer);
//! assert_eq!(apply(&script, &older).unwrap(), newer);
//! ```
//!
//! # Module Description
//!
//! - [`range`] - Positions, ranges and text-bound ranges
//! - [`line_index`] - Rope based row/column index
//! - [`marker`] / [`annotation`] - Marker and annotation data model
//! - [`snapshot`] - Immutable document snapshots
//! - [`mod@diff`] - Character diff algorithm
//! - [`delta`] - Edit scripts, `diff` and `apply`
//! - [`adjust`] - Range and marker adjustment after edits
//! - [`surface`] - Live document model behind an editing surface
//! - [`session`] - Round-trip synchronization session
//! - [`config`] - Configuration
//! - [`error`] - Error types
//!
//! # Logging
//!
//! The crate emits [`tracing`] events under the `docsync.session`, `docsync.surface` and
//! `docsync.delta` targets. It never installs a subscriber.

pub mod adjust;
pub mod annotation;
pub mod config;
pub mod delta;
pub mod diff;
pub mod error;
pub mod line_index;
pub mod marker;
pub mod range;
pub mod session;
pub mod snapshot;
pub mod surface;

pub use adjust::{
    AdjustOutcome, EditAction, EditEvent, MarkerAdjustment, TextAdjuster, adjust_marker,
    adjust_markers, adjust_on_insert, adjust_on_remove, adjust_range, clamp_caret,
};
pub use annotation::{Annotation, MarkerAnnotation, RenderedAnnotation, RowAnnotation, Severity};
pub use config::{DiffOptions, SyncConfig};
pub use delta::{EditOp, EditScript, apply, diff, diff_with};
pub use error::{ApplyError, DiffTarget, SyncError};
pub use line_index::LineIndex;
pub use marker::{Marker, MarkerId, MarkerIdGenerator, MarkerKind, OnTextChange};
pub use range::{Position, Range, RangeSpec, TextRange};
pub use session::{
    InboundContent, InboundMessage, OutboundContent, OutboundMessage, SyncEvent, SyncSession,
};
pub use snapshot::{DocumentSnapshot, MarkerAnnotationSet, MarkerMap, RowAnnotationSet};
pub use surface::{InvisibleMarkerId, LiveDocument, SurfaceChange};
