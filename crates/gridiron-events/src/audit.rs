//! Checks over a finished game's event stream, plus the stream digest used
//! for determinism comparisons.
//!
//! The audits are the stream-level invariants every completed game must
//! satisfy:
//!
//! - HUD snapshots never move backwards: quarter is non-decreasing, the clock
//!   is non-increasing within a quarter, and the ball stays on the field.
//! - Every score is followed by a kick within a bounded window, unless the
//!   half or the game ends first.
//! - The last event of the stream is a HUD snapshot.

use serde::Serialize;

use crate::event::FlowEvent;
use crate::EventsError;

/// A broken stream invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum AuditViolation {
    #[error("event {index}: quarter went from {from} back to {to}")]
    QuarterRegressed { index: usize, from: u8, to: u8 },

    #[error("event {index}: clock rose from {from} to {to} within quarter {quarter}")]
    ClockRose {
        index: usize,
        quarter: u8,
        from: u32,
        to: u32,
    },

    #[error("event {index}: ball on {ball_on} is off the field")]
    BallOffField { index: usize, ball_on: i32 },

    #[error("event {index}: score not followed by a kickoff within {window} events")]
    ScoreWithoutKickoff { index: usize, window: usize },

    #[error("stream does not end with a hud snapshot")]
    MissingFinalHud,
}

/// HUD monotonicity and field bounds.
pub fn check_hud(events: &[FlowEvent]) -> Vec<AuditViolation> {
    let mut violations = Vec::new();
    let mut previous: Option<(u8, u32)> = None;

    for (index, event) in events.iter().enumerate() {
        let FlowEvent::Hud { snapshot } = event else {
            continue;
        };
        if !(0..=100).contains(&snapshot.ball_on) {
            violations.push(AuditViolation::BallOffField {
                index,
                ball_on: snapshot.ball_on,
            });
        }
        if let Some((quarter, clock)) = previous {
            if snapshot.quarter < quarter {
                violations.push(AuditViolation::QuarterRegressed {
                    index,
                    from: quarter,
                    to: snapshot.quarter,
                });
            } else if snapshot.quarter == quarter && snapshot.clock > clock {
                violations.push(AuditViolation::ClockRose {
                    index,
                    quarter,
                    from: clock,
                    to: snapshot.clock,
                });
            }
        }
        previous = Some((snapshot.quarter, snapshot.clock));
    }
    violations
}

/// Every score must be followed by a kickoff within `window` events. A
/// halftime or final event before the kickoff excuses the score.
pub fn check_score_kickoff(events: &[FlowEvent], window: usize) -> Vec<AuditViolation> {
    let mut violations = Vec::new();
    for (index, event) in events.iter().enumerate() {
        if !matches!(event, FlowEvent::Score { .. }) {
            continue;
        }
        let after = events.get(index + 1..).unwrap_or(&[]);
        let restart = after.iter().position(|e| {
            matches!(
                e,
                FlowEvent::Kickoff { .. } | FlowEvent::Halftime | FlowEvent::Final { .. }
            )
        });
        let ok = match restart {
            Some(offset) => match after[offset] {
                FlowEvent::Kickoff { .. } => offset < window,
                _ => true,
            },
            None => false,
        };
        if !ok {
            violations.push(AuditViolation::ScoreWithoutKickoff { index, window });
        }
    }
    violations
}

/// Run every audit over a completed game's stream.
pub fn audit_stream(events: &[FlowEvent], score_kickoff_window: usize) -> Vec<AuditViolation> {
    let mut violations = check_hud(events);
    violations.extend(check_score_kickoff(events, score_kickoff_window));
    if !events.last().is_some_and(FlowEvent::is_hud) {
        violations.push(AuditViolation::MissingFinalHud);
    }
    violations
}

/// BLAKE3 hex digest of the serialized stream. Equal streams have equal
/// digests byte for byte.
pub fn stream_digest(events: &[FlowEvent]) -> Result<String, EventsError> {
    let bytes = serde_json::to_vec(events).map_err(|e| EventsError::Serialize {
        details: e.to_string(),
    })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Index of the first event where two streams differ, or `None` when they
/// are identical.
pub fn first_divergence(expected: &[FlowEvent], actual: &[FlowEvent]) -> Option<usize> {
    let shared = expected.len().min(actual.len());
    (0..shared)
        .find(|&i| expected[i] != actual[i])
        .or_else(|| (expected.len() != actual.len()).then_some(shared))
}
