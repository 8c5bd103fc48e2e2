//! Synchronization session.
//!
//! A [`SyncSession`] owns the authoritative copy of one document together with the *shadow*:
//! the last state the peer is known to have. Every round trip runs the same way:
//!
//! 1. the peer's message arrives ([`SyncSession::receive`]); its diff is applied to both the
//!    shadow and the authoritative copy, and the session is marked as being on a round trip;
//! 2. the reply is produced ([`SyncSession::outbound`]): the full document on the first
//!    message, otherwise `diff(shadow, authoritative)`, after which the shadow catches up.
//!
//! Outgoing diffs are always computed against the shadow, so a peer applying every diff it
//! receives, in order, ends up with the session's authoritative text.
//!
//! The session never calls back into the host. [`SyncSession::receive`] returns the
//! [`SyncEvent`]s the host should dispatch.
//!
//! # Example
//!
//! ```rust
//! use docsync_core::{
//!     EditOp, EditScript, InboundContent, InboundMessage, OutboundContent, RangeSpec,
//!     SyncEvent, SyncSession,
//! };
//!
//! let mut session = SyncSession::new("hello");
//!
//! // The first reply carries the whole document.
//! assert!(matches!(session.outbound().content, OutboundContent::Document(_)));
//!
//! // The peer appends a character and reports its cursor.
//! let events = session
//!     .receive(InboundMessage {
//!         content: InboundContent::Diff(EditScript::from_ops(vec![EditOp::insert(5, "!")])),
//!         selection: RangeSpec::Offsets { start: 6, end: 6 },
//!         focused: true,
//!     })
//!     .unwrap();
//! assert!(matches!(events[0], SyncEvent::TextChanged { ref text, cursor: 6 } if text == "hello!"));
//!
//! // Meanwhile the host edited locally; the reply carries only that change.
//! session.set_text("hello!?");
//! match session.outbound().content {
//!     OutboundContent::Diff(script) => assert_eq!(script.ops(), &[EditOp::insert(6, "?")]),
//!     other => panic!("unexpected reply {other:?}"),
//! }
//! ```

use crate::annotation::{MarkerAnnotation, RowAnnotation};
use crate::config::SyncConfig;
use crate::delta::{EditScript, diff_with};
use crate::error::{ApplyError, DiffTarget, SyncError};
use crate::marker::{Marker, MarkerId, MarkerIdGenerator, MarkerKind, OnTextChange};
use crate::range::{Position, Range, RangeSpec, TextRange};
use crate::snapshot::{DocumentSnapshot, MarkerAnnotationSet, RowAnnotationSet};

/// Document content of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundContent {
    /// Changes the peer made since the last round trip.
    Diff(EditScript),
    /// Nothing changed on the peer; reconciliation is skipped.
    NoContentChange,
}

/// A message from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Document changes.
    pub content: InboundContent,
    /// The peer's selection, against the peer's text after `content`.
    pub selection: RangeSpec,
    /// Whether the peer's surface has focus.
    pub focused: bool,
}

/// Document content of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundContent {
    /// The whole document (first message, or after a resync request).
    Document(DocumentSnapshot),
    /// Changes since the shadow.
    Diff(EditScript),
    /// Local changes are waiting; the peer should start a round trip to collect them.
    ChangedLocally,
    /// Nothing to report.
    NoContentChange,
}

impl OutboundContent {
    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Diff(_) => "diff",
            Self::ChangedLocally => "changedLocally",
            Self::NoContentChange => "noContentChange",
        }
    }
}

/// A message to the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Document changes.
    pub content: OutboundContent,
    /// Selection to impose on the peer, sent once after it was set locally.
    pub selection: Option<Range>,
}

/// Notifications produced by [`SyncSession::receive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The authoritative text changed.
    TextChanged {
        /// Text after the change.
        text: String,
        /// Cursor offset reported with the change.
        cursor: usize,
    },
    /// A non-identity diff was applied.
    ContentDiff(EditScript),
    /// The peer's selection changed.
    SelectionChanged(TextRange),
    /// The peer's surface gained focus.
    FocusGained,
    /// The peer's surface lost focus.
    FocusLost,
}

/// Shadow-copy synchronization state for one document.
#[derive(Debug, Clone)]
pub struct SyncSession {
    config: SyncConfig,
    authoritative: DocumentSnapshot,
    shadow: DocumentSnapshot,
    round_trip_pending: bool,
    initial_sent: bool,
    resync_requested: bool,
    version: u64,
    selection: TextRange,
    focused: bool,
    outbound_selection: Option<RangeSpec>,
    marker_ids: MarkerIdGenerator,
}

impl Default for SyncSession {
    fn default() -> Self {
        Self::with_config(DocumentSnapshot::new(), SyncConfig::default())
    }
}

impl SyncSession {
    /// A session over `text` with default configuration.
    pub fn new(text: &str) -> Self {
        Self::with_config(DocumentSnapshot::from_text(text), SyncConfig::default())
    }

    /// A session over `doc`.
    pub fn with_config(doc: DocumentSnapshot, config: SyncConfig) -> Self {
        let marker_ids = MarkerIdGenerator::new(config.marker_id_prefix.clone());
        Self {
            config,
            authoritative: doc,
            shadow: DocumentSnapshot::new(),
            round_trip_pending: false,
            initial_sent: false,
            resync_requested: false,
            version: 0,
            selection: TextRange::default(),
            focused: false,
            outbound_selection: None,
            marker_ids,
        }
    }

    /// Configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The authoritative document.
    pub fn document(&self) -> &DocumentSnapshot {
        &self.authoritative
    }

    /// The last document the peer is known to have.
    pub fn shadow(&self) -> &DocumentSnapshot {
        &self.shadow
    }

    /// The authoritative text.
    pub fn text(&self) -> String {
        self.authoritative.text()
    }

    /// Current selection.
    pub fn selection(&self) -> TextRange {
        self.selection
    }

    /// Current cursor offset (the active end of the selection).
    pub fn cursor_position(&self) -> usize {
        self.selection.cursor()
    }

    /// Whether the peer's surface last reported focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Incremented every time the authoritative document changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether a peer message has been received and not yet answered.
    pub fn is_round_trip_pending(&self) -> bool {
        self.round_trip_pending
    }

    /// Process a message from the peer.
    ///
    /// A diff that does not fit the shadow or the authoritative text is rejected with
    /// [`SyncError::MalformedDiff`] and leaves the session untouched.
    pub fn receive(&mut self, message: InboundMessage) -> Result<Vec<SyncEvent>, SyncError> {
        let mut events = Vec::new();
        let mut text_changed = false;

        if let InboundContent::Diff(script) = message.content {
            let shadow = script
                .apply_to(&self.shadow)
                .map_err(|source| self.reject(DiffTarget::Shadow, source))?;
            let authoritative = script
                .apply_to(&self.authoritative)
                .map_err(|source| self.reject(DiffTarget::Authoritative, source))?;

            if self.shadow.rope() != self.authoritative.rope() {
                tracing::warn!(
                    target: "docsync.session",
                    version = self.version,
                    "applying peer diff to an authoritative copy with unsent local changes"
                );
            }

            text_changed = authoritative.rope() != self.authoritative.rope();
            self.shadow = shadow;
            self.replace_document(authoritative);

            if !script.is_identity() {
                events.push(SyncEvent::ContentDiff(script));
            }
        }

        self.round_trip_pending = true;

        let selection = message.selection.resolve(self.authoritative.rope());
        if text_changed {
            events.insert(
                0,
                SyncEvent::TextChanged {
                    text: self.authoritative.text(),
                    cursor: selection.cursor(),
                },
            );
        }
        if selection != self.selection {
            self.selection = selection;
            events.push(SyncEvent::SelectionChanged(selection));
        }

        if message.focused != self.focused {
            self.focused = message.focused;
            events.push(if message.focused {
                SyncEvent::FocusGained
            } else {
                SyncEvent::FocusLost
            });
        }

        tracing::debug!(
            target: "docsync.session",
            version = self.version,
            text_changed,
            events = events.len(),
            "received peer message"
        );
        Ok(events)
    }

    fn reject(&self, target: DiffTarget, source: ApplyError) -> SyncError {
        tracing::warn!(
            target: "docsync.session",
            %target,
            error = %source,
            version = self.version,
            "rejected malformed peer diff"
        );
        SyncError::MalformedDiff { target, source }
    }

    /// Produce the next message to the peer.
    pub fn outbound(&mut self) -> OutboundMessage {
        let content = if !self.initial_sent || self.resync_requested {
            self.initial_sent = true;
            self.resync_requested = false;
            self.round_trip_pending = false;
            self.shadow = self.authoritative.clone();
            OutboundContent::Document(self.authoritative.clone())
        } else if self.round_trip_pending {
            let script = diff_with(&self.shadow, &self.authoritative, &self.config.diff);
            self.shadow = self.authoritative.clone();
            self.round_trip_pending = false;
            OutboundContent::Diff(script)
        } else if self.shadow != self.authoritative {
            OutboundContent::ChangedLocally
        } else {
            OutboundContent::NoContentChange
        };

        let selection = self
            .outbound_selection
            .take()
            .map(|spec| spec.resolve(self.authoritative.rope()).range());

        tracing::debug!(
            target: "docsync.session",
            version = self.version,
            content = content.kind(),
            selection = selection.is_some(),
            "prepared outbound message"
        );
        OutboundMessage { content, selection }
    }

    /// Make the next outbound message carry the full document.
    pub fn request_full_resync(&mut self) {
        self.resync_requested = true;
    }

    fn replace_document(&mut self, next: DocumentSnapshot) -> bool {
        if next == self.authoritative {
            return false;
        }
        self.authoritative = next;
        self.version += 1;
        tracing::trace!(
            target: "docsync.session",
            version = self.version,
            chars = self.authoritative.char_count(),
            markers = self.authoritative.markers().len(),
            "authoritative document replaced"
        );
        true
    }

    /// Replace the authoritative document. Returns `false` (and does nothing) when `doc` is
    /// equal to it.
    pub fn set_document(&mut self, doc: DocumentSnapshot) -> bool {
        self.replace_document(doc)
    }

    /// Replace the authoritative text, keeping markers and annotations.
    pub fn set_text(&mut self, text: &str) -> bool {
        if self.authoritative.has_text(text) {
            return false;
        }
        self.replace_document(self.authoritative.with_text(text))
    }

    /// Add a marker, replacing any marker with the same id.
    pub fn add_marker(&mut self, marker: Marker) -> MarkerId {
        let id = marker.id.clone();
        self.replace_document(self.authoritative.with_additional_marker(marker));
        id
    }

    /// Add a marker under a freshly generated id.
    pub fn add_generated_marker(
        &mut self,
        range: Range,
        style_class: impl Into<String>,
        kind: MarkerKind,
        in_front: bool,
        on_text_change: OnTextChange,
    ) -> MarkerId {
        let id = self.marker_ids.next_id();
        self.add_marker(Marker::new(
            id,
            range,
            style_class,
            kind,
            in_front,
            on_text_change,
        ))
    }

    /// Remove a marker. Returns whether it existed.
    pub fn remove_marker(&mut self, id: &MarkerId) -> bool {
        self.replace_document(self.authoritative.without_marker(id))
    }

    /// Remove all markers.
    pub fn clear_markers(&mut self) {
        self.replace_document(self.authoritative.without_markers());
    }

    /// Add a row annotation.
    pub fn add_row_annotation(&mut self, annotation: RowAnnotation) {
        self.replace_document(self.authoritative.with_additional_row_annotation(annotation));
    }

    /// Add a marker annotation.
    pub fn add_marker_annotation(&mut self, annotation: MarkerAnnotation) {
        self.replace_document(
            self.authoritative
                .with_additional_marker_annotation(annotation),
        );
    }

    /// Remove all row annotations.
    pub fn clear_row_annotations(&mut self) {
        self.replace_document(
            self.authoritative
                .with_row_annotations(RowAnnotationSet::new()),
        );
    }

    /// Remove all marker annotations.
    pub fn clear_marker_annotations(&mut self) {
        self.replace_document(
            self.authoritative
                .with_marker_annotations(MarkerAnnotationSet::new()),
        );
    }

    /// Select the characters between two offsets and send the selection with the next message.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let spec = RangeSpec::Offsets { start, end };
        self.selection = spec.resolve(self.authoritative.rope());
        self.outbound_selection = Some(spec);
    }

    /// Select a row/column range and send the selection with the next message.
    pub fn set_selection_row_col(&mut self, range: Range) {
        let spec = RangeSpec::RowCol(range);
        self.selection = spec.resolve(self.authoritative.rope());
        self.outbound_selection = Some(spec);
    }

    /// Place the cursor at an offset.
    pub fn set_cursor_position(&mut self, offset: usize) {
        self.set_selection(offset, offset);
    }

    /// Place the cursor at a row/column position.
    pub fn set_cursor_row_col(&mut self, row: usize, column: usize) {
        self.set_selection_row_col(Range::point(Position::new(row, column)));
    }
}
