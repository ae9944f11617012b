//! Gridiron Events - the ordered semantic event stream of a game.
//!
//! The orchestrator's only outbound surface is a stream of [`FlowEvent`]s.
//! This crate defines that vocabulary, the append-only [`EventLog`] that
//! carries it, and the stream audits and BLAKE3 digests used to verify that
//! a game is legal and reproducible.
//!
//! # Modules
//!
//! - [`event`]: `FlowEvent` variants and the `EventLog`.
//! - [`audit`]: HUD monotonicity, score-then-kickoff, stream digests and
//!   divergence search.
//!
//! [`FlowEvent`]: event::FlowEvent
//! [`EventLog`]: event::EventLog

#![deny(unsafe_code)]

pub mod audit;
pub mod event;

/// Errors produced while digesting event streams.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventsError {
    /// The stream could not be serialized for hashing.
    #[error("failed to serialize event stream: {details}")]
    Serialize { details: String },
}

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::audit::{
        audit_stream, check_hud, check_score_kickoff, first_divergence, stream_digest,
        AuditViolation,
    };
    pub use crate::event::{ChoiceKind, EventLog, FlowEvent, ScoreKind, VfxKind};
    pub use crate::EventsError;
}
