//! The flow event vocabulary and the append-only log that carries it.
//!
//! Every call into the orchestrator appends [`FlowEvent`]s to one
//! [`EventLog`] in the order the rules require: play result, penalty
//! resolution, scoring, kicks, quarter transitions, and finally a `hud`
//! snapshot. Consumers (UI, narration, telemetry, audits) only ever read the
//! log; nothing downstream may reorder or drop entries.
//!
//! # Example
//!
//! ```
//! use gridiron_events::event::{EventLog, FlowEvent};
//! use gridiron_rules::state::GameState;
//!
//! let mut log = EventLog::new();
//! log.push(FlowEvent::log("Kickoff"));
//! log.push(FlowEvent::Kickoff { onside: false });
//! log.push(FlowEvent::hud(&GameState::new(1)));
//!
//! assert_eq!(log.len(), 3);
//! assert!(log.last_hud().is_some());
//! ```

use gridiron_rules::state::{GameState, HudSnapshot, Score, Side};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event payload kinds
// ---------------------------------------------------------------------------

/// How points were scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Touchdown,
    ExtraPoint,
    TwoPointConversion,
    FieldGoal,
    Safety,
}

impl ScoreKind {
    pub fn points(self) -> u32 {
        match self {
            ScoreKind::Touchdown => 6,
            ScoreKind::FieldGoal => 3,
            ScoreKind::Safety | ScoreKind::TwoPointConversion => 2,
            ScoreKind::ExtraPoint => 1,
        }
    }
}

/// Which decision the orchestrator halted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    Penalty,
    Pat,
}

/// Presentation cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VfxKind {
    TwoMinuteWarning,
    Touchdown,
    FieldGoal,
    Safety,
    Turnover,
}

// ---------------------------------------------------------------------------
// FlowEvent
// ---------------------------------------------------------------------------

/// One semantic event in a game's stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FlowEvent {
    /// Human-readable play-by-play line.
    Log { message: String },
    /// Points awarded. Exactly one of the deltas is non-zero.
    Score {
        player_delta: u32,
        ai_delta: u32,
        kind: ScoreKind,
    },
    /// Display snapshot; always the last event of an orchestrator call.
    Hud { snapshot: HudSnapshot },
    /// A kick restarted play (kickoff, onside kick or safety free kick).
    Kickoff { onside: bool },
    /// The orchestrator halted until the caller decides.
    #[serde(rename = "choice-required")]
    ChoiceRequired {
        choice: ChoiceKind,
        /// Decision payload (candidates, hint), serialized for the UI.
        data: serde_json::Value,
    },
    EndOfQuarter { quarter: u8 },
    Halftime,
    Final { score: Score },
    Vfx { kind: VfxKind },
}

impl FlowEvent {
    pub fn log(message: impl Into<String>) -> Self {
        FlowEvent::Log {
            message: message.into(),
        }
    }

    pub fn hud(state: &GameState) -> Self {
        FlowEvent::Hud {
            snapshot: state.hud(),
        }
    }

    /// Score event crediting `side`.
    pub fn score(side: Side, kind: ScoreKind) -> Self {
        let points = kind.points();
        let (player_delta, ai_delta) = match side {
            Side::Player => (points, 0),
            Side::Ai => (0, points),
        };
        FlowEvent::Score {
            player_delta,
            ai_delta,
            kind,
        }
    }

    /// Short discriminant, matching the serialized `type` tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FlowEvent::Log { .. } => "log",
            FlowEvent::Score { .. } => "score",
            FlowEvent::Hud { .. } => "hud",
            FlowEvent::Kickoff { .. } => "kickoff",
            FlowEvent::ChoiceRequired { .. } => "choice-required",
            FlowEvent::EndOfQuarter { .. } => "endOfQuarter",
            FlowEvent::Halftime => "halftime",
            FlowEvent::Final { .. } => "final",
            FlowEvent::Vfx { .. } => "vfx",
        }
    }

    pub fn is_hud(&self) -> bool {
        matches!(self, FlowEvent::Hud { .. })
    }
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Append-only, ordered event stream for one game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<FlowEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: FlowEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = FlowEvent>) {
        self.events.extend(events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in emission order.
    pub fn events(&self) -> &[FlowEvent] {
        &self.events
    }

    /// Events appended at or after `index`.
    pub fn since(&self, index: usize) -> &[FlowEvent] {
        self.events.get(index..).unwrap_or(&[])
    }

    pub fn last(&self) -> Option<&FlowEvent> {
        self.events.last()
    }

    pub fn last_hud(&self) -> Option<&HudSnapshot> {
        self.events.iter().rev().find_map(|e| match e {
            FlowEvent::Hud { snapshot } => Some(snapshot),
            _ => None,
        })
    }

    /// Number of events with the given [`FlowEvent::kind_name`].
    pub fn count_kind(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind_name() == kind).count()
    }

    pub fn into_events(self) -> Vec<FlowEvent> {
        self.events
    }
}

impl From<Vec<FlowEvent>> for EventLog {
    fn from(events: Vec<FlowEvent>) -> Self {
        Self { events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_tags() {
        let json = serde_json::to_value(FlowEvent::ChoiceRequired {
            choice: ChoiceKind::Pat,
            data: serde_json::Value::Null,
        })
        .unwrap();
        assert_eq!(json["type"], "choice-required");
        assert_eq!(json["choice"], "pat");

        let json = serde_json::to_value(FlowEvent::EndOfQuarter { quarter: 1 }).unwrap();
        assert_eq!(json["type"], "endOfQuarter");

        let json = serde_json::to_value(FlowEvent::Halftime).unwrap();
        assert_eq!(json["type"], "halftime");
    }

    #[test]
    fn tag_matches_kind_name() {
        let events = [
            FlowEvent::log("x"),
            FlowEvent::score(Side::Ai, ScoreKind::FieldGoal),
            FlowEvent::hud(&GameState::new(1)),
            FlowEvent::Kickoff { onside: true },
            FlowEvent::EndOfQuarter { quarter: 2 },
            FlowEvent::Halftime,
            FlowEvent::Final {
                score: Score::default(),
            },
            FlowEvent::Vfx {
                kind: VfxKind::Safety,
            },
        ];
        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["type"], event.kind_name());
        }
    }

    #[test]
    fn score_credits_one_side() {
        assert_eq!(
            FlowEvent::score(Side::Ai, ScoreKind::Touchdown),
            FlowEvent::Score {
                player_delta: 0,
                ai_delta: 6,
                kind: ScoreKind::Touchdown
            }
        );
    }

    #[test]
    fn log_round_trips_through_json() {
        let mut log = EventLog::new();
        log.push(FlowEvent::log("Opening kickoff"));
        log.push(FlowEvent::Kickoff { onside: false });
        log.push(FlowEvent::hud(&GameState::new(5)));
        let json = serde_json::to_string(&log).unwrap();
        let back: EventLog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
        assert_eq!(back.since(1).len(), 2);
        assert!(back.since(10).is_empty());
    }
}
