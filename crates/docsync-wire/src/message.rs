//! JSON wire types for session messages.
//!
//! Every type here is a plain serde mirror of a `docsync-core` type with camelCase field names.
//! Conversions from core types are infallible; conversions back can fail on unknown marker
//! kinds or annotation severities.
//!
//! Host to peer:
//!
//! ```json
//! {"content": {"type": "diff", "operations": [{"offset": 5, "insertedText": "!"}]},
//!  "selection": {"startRow": 0, "startCol": 6, "endRow": 0, "endCol": 6}}
//! ```
//!
//! Peer to host:
//!
//! ```json
//! {"content": {"type": "noContentChange"},
//!  "selection": {"startOffset": 3, "endOffset": 3},
//!  "focused": true}
//! ```

use crate::error::WireError;
use docsync_core::{
    Annotation, DocumentSnapshot, EditOp, EditScript, InboundContent, InboundMessage, Marker,
    MarkerAnnotation, MarkerAnnotationSet, MarkerKind, MarkerMap, OnTextChange, OutboundContent,
    OutboundMessage, Range, RangeSpec, RowAnnotation, RowAnnotationSet, Severity,
};
use serde::{Deserialize, Serialize};

/// A single text operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireOp {
    /// `{offset, insertedText}`
    Insert {
        /// Insertion offset, in characters.
        offset: usize,
        /// Inserted text.
        #[serde(rename = "insertedText")]
        inserted_text: String,
    },
    /// `{offset, deletedLength}`
    Delete {
        /// First deleted character.
        offset: usize,
        /// Number of deleted characters.
        #[serde(rename = "deletedLength")]
        deleted_length: usize,
    },
}

impl From<&EditOp> for WireOp {
    fn from(op: &EditOp) -> Self {
        match op {
            EditOp::Insert { offset, text } => Self::Insert {
                offset: *offset,
                inserted_text: text.clone(),
            },
            EditOp::Delete { offset, len } => Self::Delete {
                offset: *offset,
                deleted_length: *len,
            },
        }
    }
}

impl From<WireOp> for EditOp {
    fn from(op: WireOp) -> Self {
        match op {
            WireOp::Insert {
                offset,
                inserted_text,
            } => EditOp::insert(offset, inserted_text),
            WireOp::Delete {
                offset,
                deleted_length,
            } => EditOp::delete(offset, deleted_length),
        }
    }
}

/// Row/column range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRowColRange {
    /// Anchor row.
    pub start_row: usize,
    /// Anchor column.
    pub start_col: usize,
    /// Active-end row.
    pub end_row: usize,
    /// Active-end column.
    pub end_col: usize,
}

impl From<Range> for WireRowColRange {
    fn from(range: Range) -> Self {
        Self {
            start_row: range.start.row,
            start_col: range.start.column,
            end_row: range.end.row,
            end_col: range.end.column,
        }
    }
}

impl From<WireRowColRange> for Range {
    fn from(range: WireRowColRange) -> Self {
        Range::new(range.start_row, range.start_col, range.end_row, range.end_col)
    }
}

/// Character-offset range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOffsetRange {
    /// Anchor offset.
    pub start_offset: usize,
    /// Active-end offset.
    pub end_offset: usize,
}

/// A selection as reported by a peer, in either form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireRange {
    /// Row/column form.
    RowCol(WireRowColRange),
    /// Offset form.
    Offsets(WireOffsetRange),
}

impl From<RangeSpec> for WireRange {
    fn from(spec: RangeSpec) -> Self {
        match spec {
            RangeSpec::RowCol(range) => Self::RowCol(range.into()),
            RangeSpec::Offsets { start, end } => Self::Offsets(WireOffsetRange {
                start_offset: start,
                end_offset: end,
            }),
        }
    }
}

impl From<WireRange> for RangeSpec {
    fn from(range: WireRange) -> Self {
        match range {
            WireRange::RowCol(range) => RangeSpec::RowCol(range.into()),
            WireRange::Offsets(range) => RangeSpec::Offsets {
                start: range.start_offset,
                end: range.end_offset,
            },
        }
    }
}

/// Marker edit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireOnTextChange {
    /// Follow the text.
    Adjust,
    /// Drop on a touching edit.
    Remove,
}

impl From<OnTextChange> for WireOnTextChange {
    fn from(policy: OnTextChange) -> Self {
        match policy {
            OnTextChange::Adjust => Self::Adjust,
            OnTextChange::Remove => Self::Remove,
        }
    }
}

impl From<WireOnTextChange> for OnTextChange {
    fn from(policy: WireOnTextChange) -> Self {
        match policy {
            WireOnTextChange::Adjust => Self::Adjust,
            WireOnTextChange::Remove => Self::Remove,
        }
    }
}

fn default_kind() -> String {
    MarkerKind::Range.as_str().to_string()
}

fn default_policy() -> WireOnTextChange {
    WireOnTextChange::Adjust
}

/// A marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMarker {
    /// Marker id.
    pub id: String,
    /// Covered region.
    pub range: WireRowColRange,
    /// Style class.
    #[serde(default)]
    pub style_class: String,
    /// Kind name, see [`MarkerKind::as_str`].
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// Render above other markers.
    #[serde(default)]
    pub in_front: bool,
    /// Edit policy.
    #[serde(default = "default_policy")]
    pub on_text_change: WireOnTextChange,
}

impl From<&Marker> for WireMarker {
    fn from(marker: &Marker) -> Self {
        Self {
            id: marker.id.as_str().to_string(),
            range: marker.range.into(),
            style_class: marker.style_class.clone(),
            kind: marker.kind.as_str().to_string(),
            in_front: marker.in_front,
            on_text_change: marker.on_text_change.into(),
        }
    }
}

impl TryFrom<WireMarker> for Marker {
    type Error = WireError;

    fn try_from(marker: WireMarker) -> Result<Self, Self::Error> {
        let kind = MarkerKind::parse(&marker.kind)
            .ok_or_else(|| WireError::UnknownMarkerKind(marker.kind.clone()))?;
        Ok(Marker::new(
            marker.id,
            marker.range.into(),
            marker.style_class,
            kind,
            marker.in_front,
            marker.on_text_change.into(),
        ))
    }
}

/// A severity/message pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAnnotation {
    /// Severity name, see [`Severity::as_str`].
    #[serde(rename = "type")]
    pub severity: String,
    /// Message text.
    #[serde(default)]
    pub message: String,
}

impl From<&Annotation> for WireAnnotation {
    fn from(annotation: &Annotation) -> Self {
        Self {
            severity: annotation.severity.as_str().to_string(),
            message: annotation.message.clone(),
        }
    }
}

impl TryFrom<WireAnnotation> for Annotation {
    type Error = WireError;

    fn try_from(annotation: WireAnnotation) -> Result<Self, Self::Error> {
        let severity = Severity::parse(&annotation.severity)
            .ok_or_else(|| WireError::UnknownSeverity(annotation.severity.clone()))?;
        Ok(Annotation::new(severity, annotation.message))
    }
}

/// An annotation pinned to a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRowAnnotation {
    /// Zero-based row.
    pub row: usize,
    /// The annotation.
    #[serde(flatten)]
    pub annotation: WireAnnotation,
}

/// An annotation attached to a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMarkerAnnotation {
    /// Owning marker.
    pub marker_id: String,
    /// The annotation.
    #[serde(flatten)]
    pub annotation: WireAnnotation,
}

fn markers_to_wire(markers: &MarkerMap) -> Vec<WireMarker> {
    markers.values().map(WireMarker::from).collect()
}

fn markers_from_wire(markers: Vec<WireMarker>) -> Result<MarkerMap, WireError> {
    markers
        .into_iter()
        .map(|marker| Marker::try_from(marker).map(|m| (m.id.clone(), m)))
        .collect()
}

fn row_annotations_to_wire(annotations: &RowAnnotationSet) -> Vec<WireRowAnnotation> {
    annotations
        .iter()
        .map(|a| WireRowAnnotation {
            row: a.row,
            annotation: (&a.annotation).into(),
        })
        .collect()
}

fn row_annotations_from_wire(
    annotations: Vec<WireRowAnnotation>,
) -> Result<RowAnnotationSet, WireError> {
    annotations
        .into_iter()
        .map(|a| {
            let annotation = Annotation::try_from(a.annotation)?;
            Ok(RowAnnotation::new(a.row, annotation))
        })
        .collect()
}

fn marker_annotations_to_wire(annotations: &MarkerAnnotationSet) -> Vec<WireMarkerAnnotation> {
    annotations
        .iter()
        .map(|a| WireMarkerAnnotation {
            marker_id: a.marker_id.as_str().to_string(),
            annotation: (&a.annotation).into(),
        })
        .collect()
}

fn marker_annotations_from_wire(
    annotations: Vec<WireMarkerAnnotation>,
) -> Result<MarkerAnnotationSet, WireError> {
    annotations
        .into_iter()
        .map(|a| {
            let annotation = Annotation::try_from(a.annotation)?;
            Ok(MarkerAnnotation::new(a.marker_id, annotation))
        })
        .collect()
}

/// An edit script: operations plus optional full replacements.
///
/// A diff with no operations is still a diff; it is not the same message as
/// `noContentChange`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDiff {
    /// Operations in application order.
    #[serde(default)]
    pub operations: Vec<WireOp>,
    /// Full marker replacement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markers: Option<Vec<WireMarker>>,
    /// Full row-annotation replacement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_annotations: Option<Vec<WireRowAnnotation>>,
    /// Full marker-annotation replacement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_annotations: Option<Vec<WireMarkerAnnotation>>,
}

impl From<&EditScript> for WireDiff {
    fn from(script: &EditScript) -> Self {
        Self {
            operations: script.ops().iter().map(WireOp::from).collect(),
            markers: script.markers().map(markers_to_wire),
            row_annotations: script.row_annotations().map(row_annotations_to_wire),
            marker_annotations: script.marker_annotations().map(marker_annotations_to_wire),
        }
    }
}

impl TryFrom<WireDiff> for EditScript {
    type Error = WireError;

    fn try_from(diff: WireDiff) -> Result<Self, Self::Error> {
        let mut script =
            EditScript::from_ops(diff.operations.into_iter().map(EditOp::from).collect());
        if let Some(markers) = diff.markers {
            script = script.with_markers(markers_from_wire(markers)?);
        }
        if let Some(annotations) = diff.row_annotations {
            script = script.with_row_annotations(row_annotations_from_wire(annotations)?);
        }
        if let Some(annotations) = diff.marker_annotations {
            script = script.with_marker_annotations(marker_annotations_from_wire(annotations)?);
        }
        Ok(script)
    }
}

/// A full document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDocument {
    /// Document text.
    pub text: String,
    /// All markers.
    #[serde(default)]
    pub markers: Vec<WireMarker>,
    /// All row annotations.
    #[serde(default)]
    pub row_annotations: Vec<WireRowAnnotation>,
    /// All marker annotations.
    #[serde(default)]
    pub marker_annotations: Vec<WireMarkerAnnotation>,
}

impl From<&DocumentSnapshot> for WireDocument {
    fn from(doc: &DocumentSnapshot) -> Self {
        Self {
            text: doc.text(),
            markers: markers_to_wire(doc.markers()),
            row_annotations: row_annotations_to_wire(doc.row_annotations()),
            marker_annotations: marker_annotations_to_wire(doc.marker_annotations()),
        }
    }
}

impl TryFrom<WireDocument> for DocumentSnapshot {
    type Error = WireError;

    fn try_from(doc: WireDocument) -> Result<Self, Self::Error> {
        Ok(DocumentSnapshot::from_text(&doc.text)
            .with_markers(markers_from_wire(doc.markers)?)
            .with_row_annotations(row_annotations_from_wire(doc.row_annotations)?)
            .with_marker_annotations(marker_annotations_from_wire(doc.marker_annotations)?))
    }
}

/// Content of a peer message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PeerContent {
    /// Changes since the last shared state.
    Diff(WireDiff),
    /// Nothing changed.
    NoContentChange,
}

/// A message from the editing peer to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerMessage {
    /// Content.
    pub content: PeerContent,
    /// Current selection.
    pub selection: WireRange,
    /// Whether the surface has focus.
    #[serde(default)]
    pub focused: bool,
}

impl From<&InboundMessage> for PeerMessage {
    fn from(message: &InboundMessage) -> Self {
        let content = match &message.content {
            InboundContent::Diff(script) => PeerContent::Diff(script.into()),
            InboundContent::NoContentChange => PeerContent::NoContentChange,
        };
        Self {
            content,
            selection: message.selection.into(),
            focused: message.focused,
        }
    }
}

impl TryFrom<PeerMessage> for InboundMessage {
    type Error = WireError;

    fn try_from(message: PeerMessage) -> Result<Self, Self::Error> {
        let content = match message.content {
            PeerContent::Diff(diff) => InboundContent::Diff(diff.try_into()?),
            PeerContent::NoContentChange => InboundContent::NoContentChange,
        };
        Ok(Self {
            content,
            selection: message.selection.into(),
            focused: message.focused,
        })
    }
}

/// Content of a host message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostContent {
    /// The whole document.
    Document(WireDocument),
    /// Changes relative to the peer's last known state.
    Diff(WireDiff),
    /// The host changed the document outside a round trip.
    ChangedLocally,
    /// Nothing to send.
    NoContentChange,
}

/// A message from the host to the editing peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostMessage {
    /// Content.
    pub content: HostContent,
    /// Selection the host wants shown, if it changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<WireRowColRange>,
}

impl From<&OutboundMessage> for HostMessage {
    fn from(message: &OutboundMessage) -> Self {
        let content = match &message.content {
            OutboundContent::Document(doc) => HostContent::Document(doc.into()),
            OutboundContent::Diff(script) => HostContent::Diff(script.into()),
            OutboundContent::ChangedLocally => HostContent::ChangedLocally,
            OutboundContent::NoContentChange => HostContent::NoContentChange,
        };
        Self {
            content,
            selection: message.selection.map(WireRowColRange::from),
        }
    }
}

impl TryFrom<HostMessage> for OutboundMessage {
    type Error = WireError;

    fn try_from(message: HostMessage) -> Result<Self, Self::Error> {
        let content = match message.content {
            HostContent::Document(doc) => OutboundContent::Document(doc.try_into()?),
            HostContent::Diff(diff) => OutboundContent::Diff(diff.try_into()?),
            HostContent::ChangedLocally => OutboundContent::ChangedLocally,
            HostContent::NoContentChange => OutboundContent::NoContentChange,
        };
        Ok(Self {
            content,
            selection: message.selection.map(Range::from),
        })
    }
}

/// Encode a host message as JSON.
pub fn encode_outbound(message: &OutboundMessage) -> Result<String, WireError> {
    let json = serde_json::to_string(&HostMessage::from(message))?;
    tracing::trace!(
        target: "docsync.wire",
        kind = message.content.kind(),
        bytes = json.len(),
        "encoded host message"
    );
    Ok(json)
}

/// Decode a host message from JSON.
pub fn decode_outbound(json: &str) -> Result<OutboundMessage, WireError> {
    let message: HostMessage = serde_json::from_str(json)?;
    message.try_into()
}

/// Encode a peer message as JSON.
pub fn encode_inbound(message: &InboundMessage) -> Result<String, WireError> {
    Ok(serde_json::to_string(&PeerMessage::from(message))?)
}

/// Decode a peer message from JSON.
pub fn decode_inbound(json: &str) -> Result<InboundMessage, WireError> {
    let message: PeerMessage = serde_json::from_str(json)?;
    let decoded = InboundMessage::try_from(message);
    if let Err(err) = &decoded {
        tracing::debug!(target: "docsync.wire", error = %err, "rejected peer message");
    }
    decoded
}
