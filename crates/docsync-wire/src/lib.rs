#![warn(missing_docs)]
//! `docsync-wire` - JSON wire format for `docsync-core` sessions.
//!
//! This crate maps the session messages of `docsync_core::SyncSession` onto camelCase JSON.
//! Moving the encoded strings between host and peer is left to the embedding application.
//!
//! ```rust
//! use docsync_core::SyncSession;
//! use docsync_wire::{decode_outbound, encode_outbound};
//!
//! let mut session = SyncSession::new("hello");
//! let json = encode_outbound(&session.outbound()).unwrap();
//! let decoded = decode_outbound(&json).unwrap();
//! assert_eq!(decoded.content.kind(), "document");
//! ```

pub mod error;
pub mod message;

pub use error::WireError;
pub use message::{
    HostContent, HostMessage, PeerContent, PeerMessage, WireAnnotation, WireDiff, WireDocument,
    WireMarker, WireMarkerAnnotation, WireOffsetRange, WireOnTextChange, WireOp, WireRange,
    WireRowAnnotation, WireRowColRange, decode_inbound, decode_outbound, encode_inbound,
    encode_outbound,
};
