//! The game-flow orchestrator.
//!
//! [`GameFlow`] owns one game: its [`GameState`], its single [`GameRng`],
//! the [`EventLog`] and the drive tracker. Every public call validates the
//! current phase, mutates the state in rule order and returns the events it
//! appended, the last of which is always a `hud` snapshot.
//!
//! Phases are derived from state rather than stored: pre-snap, awaiting a
//! penalty decision, awaiting a PAT choice, and game over. Human-controlled
//! decisions halt the flow with a `choice-required` event; the caller resumes
//! with [`GameFlow::finalize_penalty`] or [`GameFlow::finalize_pat`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use gridiron_engine::prelude::*;
//!
//! let tables = Arc::new(TableRepository::builtin().unwrap());
//! let config = EngineConfig::default()
//!     .with_engine(EngineKind::Chart)
//!     .with_controllers(Controllers::all_ai());
//! let mut flow = GameFlow::new(7, config, tables);
//!
//! let step = flow.start_game().unwrap();
//! assert!(step.events.last().unwrap().is_hud());
//!
//! let step = flow
//!     .resolve_snap(&PlayInput::new("Pro Style", "Off Tackle", "Pass Defense"))
//!     .unwrap();
//! assert!(step.events.last().unwrap().is_hud());
//! ```

use std::sync::Arc;

use gridiron_events::event::{ChoiceKind, EventLog, FlowEvent, ScoreKind, VfxKind};
use gridiron_rules::clock::{apply_time_off, time_off, ClockContext, Tempo, TimeOff};
use gridiron_rules::dice::DiceOutcomeKind;
use gridiron_rules::outcome::{OutcomeCategory, PenaltyCall, PlayOutcome};
use gridiron_rules::penalty::{administer, PenaltyAdministration, PenaltyDecision, PenaltyInput};
use gridiron_rules::rng::GameRng;
use gridiron_rules::special_teams::{
    attempt_pat, field_goal, kickoff, punt, safety_free_kick, KickResult, KickoffType, PatChoice,
    TOUCHBACK_LINE,
};
use gridiron_rules::state::{GameState, HudSnapshot, Side, FIELD_LENGTH, QUARTER_SECONDS};
use gridiron_rules::tables::TableRepository;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Controller, EngineConfig};
use crate::drive::{DriveResult, DriveSummary, DriveTracker};
use crate::policy::{DefaultPolicy, Policy, Situation};
use crate::resolver::{PlayInput, Resolver, SnapResolution, FIELD_GOAL_LABEL, PUNT_LABEL};
use crate::FlowError;

/// Offense-relative spot of the try after a touchdown.
pub const PAT_YARD_LINE: i32 = 98;

// ---------------------------------------------------------------------------
// FlowStep
// ---------------------------------------------------------------------------

/// What one orchestrator call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowStep {
    /// Events appended by this call, ending with a `hud` snapshot.
    pub events: Vec<FlowEvent>,
    /// State after the call.
    pub state: GameState,
}

/// A penalty waiting on a human decision.
#[derive(Debug, Clone)]
struct PendingPenalty {
    admin: PenaltyAdministration,
    /// The play the flag came in on; `None` when the penalty replaced it.
    underlying: Option<PlayOutcome>,
    runoff: Option<u32>,
    tempo: Tempo,
}

/// One flagged snap on its way to the administrator.
#[derive(Debug, Clone)]
struct Flag {
    call: PenaltyCall,
    underlying: Option<PlayOutcome>,
    /// Measure defensive fouls from midfield.
    long_gain: bool,
    runoff: Option<u32>,
    tempo: Tempo,
    /// Override slots: accepted with no choice offered.
    forced: bool,
}

// ---------------------------------------------------------------------------
// GameFlow
// ---------------------------------------------------------------------------

/// One game, driven one call at a time.
pub struct GameFlow {
    config: EngineConfig,
    resolver: Resolver,
    policy: Box<dyn Policy>,
    state: GameState,
    rng: GameRng,
    log: EventLog,
    drives: DriveTracker,
    pending_penalty: Option<PendingPenalty>,
    pending_pat: Option<Side>,
    next_kickoff: Option<KickoffType>,
    started: bool,
}

impl GameFlow {
    /// Create a game. Nothing happens until [`start_game`](Self::start_game).
    pub fn new(seed: u64, config: EngineConfig, tables: Arc<TableRepository>) -> Self {
        let resolver = Resolver::new(config.engine, tables);
        Self {
            config,
            resolver,
            policy: Box::new(DefaultPolicy),
            state: GameState::new(seed),
            rng: GameRng::from_seed(seed),
            log: EventLog::new(),
            drives: DriveTracker::new(),
            pending_penalty: None,
            pending_pat: None,
            next_kickoff: None,
            started: false,
        }
    }

    /// Replace the AI decision policy.
    pub fn with_policy(mut self, policy: Box<dyn Policy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tables(&self) -> &Arc<TableRepository> {
        self.resolver.tables()
    }

    pub fn policy(&self) -> &dyn Policy {
        self.policy.as_ref()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access to the live state, for setting up situations in tests
    /// and tooling. Phase flags are not re-validated.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn events(&self) -> &EventLog {
        &self.log
    }

    pub fn drives(&self) -> &DriveTracker {
        &self.drives
    }

    pub fn completed_drives(&self) -> &[DriveSummary] {
        self.drives.completed()
    }

    /// Candidates and hint for the penalty awaiting a decision.
    pub fn pending_penalty(&self) -> Option<&PenaltyAdministration> {
        self.pending_penalty.as_ref().map(|p| &p.admin)
    }

    /// Side whose try is awaiting a choice.
    pub fn pending_pat(&self) -> Option<Side> {
        self.pending_pat
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_over(&self) -> bool {
        self.state.game_over
    }

    /// Number of draws taken from the game's random source.
    pub fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }

    /// Display projection of the current state.
    pub fn hud_payload(&self) -> HudSnapshot {
        self.state.hud()
    }

    /// Kick type for the next kickoff by a human-controlled side. Consumed by
    /// that kickoff.
    pub fn set_next_kickoff(&mut self, kind: KickoffType) {
        self.next_kickoff = Some(kind);
    }

    // -----------------------------------------------------------------------
    // Public transitions
    // -----------------------------------------------------------------------

    /// Opening kickoff: the AI kicks to the player.
    pub fn start_game(&mut self) -> Result<FlowStep, FlowError> {
        if self.started {
            return Err(FlowError::AlreadyStarted);
        }
        self.started = true;
        let receiver = Side::Player;
        self.state.opening_kick_to = Some(receiver);
        info!(seed = self.state.seed, engine = ?self.config.engine, "game start");

        let mut out = vec![FlowEvent::log(format!("Opening kickoff to {receiver}"))];
        self.kick_off(receiver.opponent(), &mut out);
        Ok(self.finish(out))
    }

    /// Resolve one snap from the pre-snap phase.
    pub fn resolve_snap(&mut self, input: &PlayInput) -> Result<FlowStep, FlowError> {
        self.ensure_pre_snap()?;
        if input.play_label == PUNT_LABEL && self.state.down != 4 {
            return Err(FlowError::PuntNotAllowed {
                down: self.state.down,
            });
        }

        let offense = self.state.possession;
        let tempo = input.tempo.unwrap_or_else(|| match self.controller(offense) {
            Controller::Ai => self.policy.choose_tempo(&self.situation(offense)),
            Controller::Human => Tempo::Normal,
        });

        let mut out = Vec::new();
        match input.play_label.as_str() {
            PUNT_LABEL => self.run_punt(&mut out),
            FIELD_GOAL_LABEL => self.run_field_goal(&mut out),
            _ => {
                let input = self.with_default_deck(input);
                let res = self.resolver.resolve(&input, &self.state, &mut self.rng)?;
                self.scrimmage(&input, res, tempo, &mut out);
            }
        }

        if self.pending_penalty.is_none() && !self.state.awaiting_pat {
            self.check_end_of_quarter(&mut out);
        }
        Ok(self.finish(out))
    }

    /// Resume after a `choice-required` penalty event.
    pub fn finalize_penalty(&mut self, decision: PenaltyDecision) -> Result<FlowStep, FlowError> {
        if self.state.game_over {
            return Err(FlowError::GameOver);
        }
        let pending = self
            .pending_penalty
            .take()
            .ok_or(FlowError::NoPendingPenalty)?;

        let mut out = Vec::new();
        self.apply_penalty_decision(pending, decision, &mut out);
        if !self.state.awaiting_pat {
            self.check_end_of_quarter(&mut out);
        }
        Ok(self.finish(out))
    }

    /// Resume after a `choice-required` PAT event.
    pub fn finalize_pat(&mut self, choice: PatChoice) -> Result<FlowStep, FlowError> {
        if self.state.game_over {
            return Err(FlowError::GameOver);
        }
        let side = self.pending_pat.take().ok_or(FlowError::NoPendingPat)?;

        let mut out = Vec::new();
        self.resolve_pat(side, choice, &mut out);
        self.check_end_of_quarter(&mut out);
        Ok(self.finish(out))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn ensure_pre_snap(&self) -> Result<(), FlowError> {
        if !self.started {
            return Err(FlowError::GameNotStarted);
        }
        if self.state.game_over {
            return Err(FlowError::GameOver);
        }
        if self.pending_penalty.is_some() {
            return Err(FlowError::PenaltyDecisionPending);
        }
        if self.state.awaiting_pat {
            return Err(FlowError::PatPending);
        }
        Ok(())
    }

    fn with_default_deck(&self, input: &PlayInput) -> PlayInput {
        let mut input = input.clone();
        if input.deck_name.is_empty() {
            input.deck_name.clone_from(&self.config.deck);
        }
        input
    }

    fn controller(&self, side: Side) -> Controller {
        self.config.controllers.of(side)
    }

    fn situation(&self, side: Side) -> Situation {
        Situation::new(&self.state, side)
    }

    fn two_minute_stops(&self, state: &GameState) -> bool {
        self.config.uses_two_minute_stops() && state.in_two_minute_window()
    }

    /// Q2 or Q4 with no time left: scores are not followed by a kick.
    fn half_expired(&self) -> bool {
        self.state.clock == 0 && matches!(self.state.quarter, 2 | 4)
    }

    fn finish(&mut self, mut out: Vec<FlowEvent>) -> FlowStep {
        out.push(FlowEvent::hud(&self.state));
        self.log.extend(out.iter().cloned());
        FlowStep {
            events: out,
            state: self.state.clone(),
        }
    }

    fn apply_clock(&mut self, off: TimeOff, out: &mut Vec<FlowEvent>) {
        apply_time_off(&mut self.state, off);
        if off.two_minute_warning {
            info!(quarter = self.state.quarter, "two-minute warning");
            out.push(FlowEvent::log("Two-minute warning"));
            out.push(FlowEvent::Vfx {
                kind: VfxKind::TwoMinuteWarning,
            });
        }
    }

    /// Special-teams runoff, still subject to the two-minute clamp.
    fn run_special_clock(&mut self, seconds: u32, untimed: bool, out: &mut Vec<FlowEvent>) {
        let off = if untimed {
            TimeOff::default()
        } else {
            time_off(
                &PlayOutcome::other(),
                &self.state,
                ClockContext {
                    base_override: Some(seconds),
                    ..ClockContext::default()
                },
            )
        };
        self.apply_clock(off, out);
    }

    fn hand_over(&mut self, side: Side, yard_line: i32) {
        self.state.give_ball(side, yard_line);
        self.drives.start(side, self.state.offense_yard_line());
    }

    fn end_drive(&mut self, result: DriveResult, out: &mut Vec<FlowEvent>) {
        if let Some(summary) = self.drives.end_drive_summary(result) {
            debug!(offense = %summary.offense, plays = summary.plays, yards = summary.yards, %result, "drive over");
            out.push(FlowEvent::log(summary.to_string()));
        }
    }

    // -----------------------------------------------------------------------
    // Scrimmage
    // -----------------------------------------------------------------------

    fn scrimmage(
        &mut self,
        input: &PlayInput,
        res: SnapResolution,
        tempo: Tempo,
        out: &mut Vec<FlowEvent>,
    ) {
        let offense = self.state.possession;
        out.push(FlowEvent::log(format!(
            "{offense}: {} vs {}, {}",
            input.play_label,
            input.defense_label,
            describe(&res.outcome)
        )));

        if let Some(dice) = &res.dice {
            match dice.kind {
                DiceOutcomeKind::ForcedDefensiveTouchdown => {
                    out.push(FlowEvent::log("Snake eyes: the defense takes it the distance"));
                }
                DiceOutcomeKind::ForcedOffensiveTouchdown => {
                    out.push(FlowEvent::log("Boxcars: nothing stops the offense"));
                }
                DiceOutcomeKind::PenaltyOverride => {
                    if let Some(call) = dice.penalty.clone() {
                        let flag = Flag {
                            call,
                            underlying: None,
                            long_gain: false,
                            runoff: res.runoff,
                            tempo,
                            forced: true,
                        };
                        self.flag(flag, out);
                        return;
                    }
                }
                DiceOutcomeKind::PenaltyOption => {
                    if let Some(call) = dice.penalty.clone() {
                        let flag = Flag {
                            call,
                            long_gain: res.outcome.long_gain,
                            underlying: Some(res.outcome),
                            runoff: res.runoff,
                            tempo,
                            forced: false,
                        };
                        self.flag(flag, out);
                        return;
                    }
                }
                DiceOutcomeKind::Normal | DiceOutcomeKind::Stub => {}
            }
        }

        if res.outcome.category == OutcomeCategory::Penalty {
            if let Some(call) = res.outcome.penalty.clone() {
                let flag = Flag {
                    call,
                    underlying: None,
                    long_gain: res.outcome.long_gain,
                    runoff: res.runoff,
                    tempo,
                    forced: false,
                };
                self.flag(flag, out);
                return;
            }
        }

        self.apply_play(&res.outcome, res.runoff, tempo, out);
    }

    /// Apply a non-penalty snap to the live state, which must still be the
    /// pre-snap state.
    fn apply_play(
        &mut self,
        play: &PlayOutcome,
        runoff: Option<u32>,
        tempo: Tempo,
        out: &mut Vec<FlowEvent>,
    ) {
        let pre = self.state.clone();
        self.state.untimed_down_scheduled = false;
        let offense = pre.possession;
        let defense = pre.defense();
        let from = pre.offense_yard_line();

        let off = if pre.untimed_down_scheduled {
            TimeOff::default()
        } else {
            time_off(
                play,
                &pre,
                ClockContext {
                    in_two_minute_window: self.two_minute_stops(&pre),
                    converts: play.converts(pre.to_go),
                    tempo,
                    base_override: runoff,
                },
            )
        };
        self.apply_clock(off, out);

        if play.is_turnover() {
            let lost_at = (from + play.yards).clamp(0, FIELD_LENGTH);
            let spot = play
                .return_to
                .unwrap_or(FIELD_LENGTH - lost_at + play.intercept_return.unwrap_or(0));
            let result = if play.category == OutcomeCategory::Interception {
                DriveResult::Interception
            } else {
                DriveResult::Fumble
            };
            self.drives.record_play(lost_at - from);
            out.push(FlowEvent::log(format!("Turnover: {result}, {defense} ball")));
            out.push(FlowEvent::Vfx {
                kind: VfxKind::Turnover,
            });
            self.end_drive(result, out);

            if spot >= FIELD_LENGTH {
                self.state.possession = defense;
                self.score_touchdown(defense, out);
            } else if spot <= 0 {
                out.push(FlowEvent::log("Touchback"));
                self.hand_over(defense, TOUCHBACK_LINE);
            } else {
                self.hand_over(defense, spot);
            }
            return;
        }

        let spot = from + play.yards;
        self.drives
            .record_play(play.yards.clamp(-from, FIELD_LENGTH - from));

        if spot >= FIELD_LENGTH {
            self.end_drive(DriveResult::Touchdown, out);
            self.score_touchdown(offense, out);
        } else if spot <= 0 {
            self.safety(offense, out);
        } else {
            self.state.set_offense_yard_line(spot);
            if spot >= pre.line_to_gain() {
                self.state.set_first_down();
                out.push(FlowEvent::log("First down"));
            } else if pre.down >= 4 {
                out.push(FlowEvent::log(format!("Turnover on downs, {defense} ball")));
                self.end_drive(DriveResult::Downs, out);
                self.hand_over(defense, FIELD_LENGTH - spot);
            } else {
                self.state.down = pre.down + 1;
                self.state.to_go = (pre.line_to_gain() - spot).max(1);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Penalties
    // -----------------------------------------------------------------------

    fn flag(&mut self, flag: Flag, out: &mut Vec<FlowEvent>) {
        let Flag {
            call,
            underlying,
            long_gain,
            runoff,
            tempo,
            forced,
        } = flag;
        let pre = &self.state;
        let admin = administer(PenaltyInput {
            pre,
            call: &call,
            play: underlying.as_ref(),
            long_gain,
            in_two_minute_window: self.two_minute_stops(pre),
            play_first_down: underlying.as_ref().is_some_and(|p| p.converts(pre.to_go)),
            tempo,
            runoff,
        });
        out.push(FlowEvent::log(format!(
            "Flag: {} on the {}, {} yards",
            call.label, call.on, call.yards
        )));

        let pending = PendingPenalty {
            admin,
            underlying,
            runoff,
            tempo,
        };
        if forced {
            self.apply_penalty_decision(pending, PenaltyDecision::Accept, out);
            return;
        }

        let decider = pending.admin.meta.deciding_side;
        match self.controller(decider) {
            Controller::Ai => {
                let decision = pending.admin.hint.recommendation.as_decision();
                debug!(%decider, ?decision, hint = ?pending.admin.hint.recommendation, "penalty decided");
                self.apply_penalty_decision(pending, decision, out);
            }
            Controller::Human => {
                info!(%decider, label = %pending.admin.meta.label, "awaiting penalty decision");
                out.push(FlowEvent::ChoiceRequired {
                    choice: ChoiceKind::Penalty,
                    data: choice_data(&pending.admin),
                });
                self.pending_penalty = Some(pending);
            }
        }
    }

    fn apply_penalty_decision(
        &mut self,
        pending: PendingPenalty,
        decision: PenaltyDecision,
        out: &mut Vec<FlowEvent>,
    ) {
        let meta = &pending.admin.meta;
        match decision {
            PenaltyDecision::Accept => {
                let before = self.state.possession;
                let from = self.state.offense_yard_line();
                let mut message = format!(
                    "Penalty accepted by {}: {}, {} yards",
                    meta.deciding_side, meta.label, meta.applied_yards
                );
                if meta.capped {
                    message.push_str(" (half the distance)");
                }
                if meta.automatic_first_down {
                    message.push_str(", automatic first down");
                }
                out.push(FlowEvent::log(message));

                self.state = pending.admin.accepted.clone();
                if meta.accepted_time_off.two_minute_warning {
                    out.push(FlowEvent::log("Two-minute warning"));
                    out.push(FlowEvent::Vfx {
                        kind: VfxKind::TwoMinuteWarning,
                    });
                }
                if meta.untimed_down {
                    out.push(FlowEvent::log("Untimed down to follow"));
                }

                if self.state.possession != before {
                    self.drives.record_play(0);
                    out.push(FlowEvent::log(format!(
                        "Turnover on downs, {} ball",
                        self.state.possession
                    )));
                    self.end_drive(DriveResult::Downs, out);
                    self.drives
                        .start(self.state.possession, self.state.offense_yard_line());
                } else {
                    self.drives.record_play(self.state.offense_yard_line() - from);
                }
            }
            PenaltyDecision::Decline => {
                out.push(FlowEvent::log(format!(
                    "Penalty declined by {}: {}",
                    meta.deciding_side, meta.label
                )));
                let play = pending.underlying.unwrap_or_else(PlayOutcome::other);
                self.apply_play(&play, pending.runoff, pending.tempo, out);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Scoring
    // -----------------------------------------------------------------------

    fn score_touchdown(&mut self, side: Side, out: &mut Vec<FlowEvent>) {
        self.state.score.add(side, ScoreKind::Touchdown.points());
        info!(%side, player = self.state.score.player, ai = self.state.score.ai, "touchdown");
        out.push(FlowEvent::log(format!("Touchdown, {side}!")));
        out.push(FlowEvent::score(side, ScoreKind::Touchdown));
        out.push(FlowEvent::Vfx {
            kind: VfxKind::Touchdown,
        });

        self.state.possession = side;
        self.state.set_offense_yard_line(PAT_YARD_LINE);
        self.state.down = 1;
        self.state.to_go = FIELD_LENGTH - PAT_YARD_LINE;
        self.state.awaiting_pat = true;

        match self.controller(side) {
            Controller::Human => {
                self.pending_pat = Some(side);
                out.push(FlowEvent::ChoiceRequired {
                    choice: ChoiceKind::Pat,
                    data: serde_json::json!({ "side": side }),
                });
            }
            Controller::Ai => {
                let choice = self.policy.choose_pat(&self.situation(side));
                self.resolve_pat(side, choice, out);
            }
        }
    }

    fn resolve_pat(&mut self, side: Side, choice: PatChoice, out: &mut Vec<FlowEvent>) {
        let result = attempt_pat(choice, &mut self.rng);
        let (kind, label) = match choice {
            PatChoice::Kick => (ScoreKind::ExtraPoint, "Extra point"),
            PatChoice::TwoPoint => (ScoreKind::TwoPointConversion, "Two-point try"),
        };
        if result.good {
            self.state.score.add(side, result.points);
            out.push(FlowEvent::log(format!("{label} is good")));
            out.push(FlowEvent::score(side, kind));
        } else {
            out.push(FlowEvent::log(format!("{label} fails")));
        }
        self.state.awaiting_pat = false;
        self.pending_pat = None;
        self.restart_after_score(side, out);
    }

    fn restart_after_score(&mut self, kicking: Side, out: &mut Vec<FlowEvent>) {
        if self.half_expired() {
            out.push(FlowEvent::log("Time has expired, no kickoff"));
            return;
        }
        self.kick_off(kicking, out);
    }

    fn safety(&mut self, conceding: Side, out: &mut Vec<FlowEvent>) {
        let scorer = conceding.opponent();
        self.state.score.add(scorer, ScoreKind::Safety.points());
        info!(%scorer, "safety");
        out.push(FlowEvent::log(format!("Safety, two points to {scorer}")));
        out.push(FlowEvent::score(scorer, ScoreKind::Safety));
        out.push(FlowEvent::Vfx {
            kind: VfxKind::Safety,
        });
        self.end_drive(DriveResult::Safety, out);

        if self.half_expired() {
            out.push(FlowEvent::log("Time has expired, no free kick"));
            return;
        }
        let kind = match self.controller(conceding) {
            Controller::Human => self.config.safety_free_kick,
            Controller::Ai => self
                .policy
                .choose_safety_free_kick(&self.situation(conceding)),
        };
        let result = safety_free_kick(conceding, kind);
        out.push(FlowEvent::Kickoff { onside: false });
        self.apply_kick(result, false, out);
    }

    // -----------------------------------------------------------------------
    // Kicks
    // -----------------------------------------------------------------------

    fn kick_off(&mut self, kicking: Side, out: &mut Vec<FlowEvent>) {
        let kind = match self.controller(kicking) {
            Controller::Human => self.next_kickoff.take().unwrap_or_default(),
            Controller::Ai => self.policy.choose_kickoff_type(&self.situation(kicking)),
        };
        let result = kickoff(kicking, kind, &self.state.score, &mut self.rng);
        debug!(%kicking, ?kind, receiver = %result.possession, yard_line = result.yard_line, "kickoff");
        out.push(FlowEvent::Kickoff {
            onside: kind == KickoffType::Onside,
        });
        self.apply_kick(result, false, out);
    }

    fn apply_kick(&mut self, result: KickResult, untimed: bool, out: &mut Vec<FlowEvent>) {
        out.push(FlowEvent::log(result.description.clone()));
        self.run_special_clock(result.seconds, untimed, out);
        if result.return_touchdown {
            self.drives.start(result.possession, 0);
            self.end_drive(DriveResult::Touchdown, out);
            self.state.possession = result.possession;
            self.score_touchdown(result.possession, out);
            return;
        }
        self.hand_over(result.possession, result.yard_line);
    }

    fn run_punt(&mut self, out: &mut Vec<FlowEvent>) {
        let untimed = std::mem::take(&mut self.state.untimed_down_scheduled);
        let kicking = self.state.possession;
        let result = punt(kicking, self.state.offense_yard_line(), &mut self.rng);
        self.drives.record_play(0);
        self.end_drive(DriveResult::Punt, out);
        self.apply_kick(result, untimed, out);
    }

    fn run_field_goal(&mut self, out: &mut Vec<FlowEvent>) {
        let untimed = std::mem::take(&mut self.state.untimed_down_scheduled);
        let kicking = self.state.possession;
        let result = field_goal(kicking, self.state.offense_yard_line(), &mut self.rng);
        self.drives.record_play(0);

        if result.good {
            self.state.score.add(kicking, ScoreKind::FieldGoal.points());
            info!(%kicking, distance = result.distance, "field goal");
            out.push(FlowEvent::log(format!(
                "{}-yard field goal is good",
                result.distance
            )));
            out.push(FlowEvent::score(kicking, ScoreKind::FieldGoal));
            out.push(FlowEvent::Vfx {
                kind: VfxKind::FieldGoal,
            });
            self.end_drive(DriveResult::FieldGoal, out);
            self.run_special_clock(result.seconds, untimed, out);
            self.restart_after_score(kicking, out);
        } else {
            self.end_drive(DriveResult::MissedFieldGoal, out);
            if let Some(miss) = result.miss {
                self.apply_kick(miss, untimed, out);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Quarters
    // -----------------------------------------------------------------------

    fn check_end_of_quarter(&mut self, out: &mut Vec<FlowEvent>) {
        if self.state.game_over || self.state.clock > 0 || self.state.untimed_down_scheduled {
            return;
        }
        let quarter = self.state.quarter;
        info!(quarter, "end of quarter");
        out.push(FlowEvent::EndOfQuarter { quarter });

        match quarter {
            2 => {
                self.end_drive(DriveResult::EndOfHalf, out);
                out.push(FlowEvent::Halftime);
                self.next_quarter();
                let receiver = self
                    .state
                    .opening_kick_to
                    .map_or(Side::Ai, Side::opponent);
                out.push(FlowEvent::log(format!("Second-half kickoff to {receiver}")));
                self.kick_off(receiver.opponent(), out);
            }
            q if q >= 4 => {
                self.end_drive(DriveResult::EndOfGame, out);
                self.state.game_over = true;
                info!(
                    player = self.state.score.player,
                    ai = self.state.score.ai,
                    "final"
                );
                out.push(FlowEvent::Final {
                    score: self.state.score,
                });
            }
            _ => self.next_quarter(),
        }
    }

    fn next_quarter(&mut self) {
        self.state.quarter += 1;
        self.state.clock = QUARTER_SECONDS;
        self.state.two_minute_warning_given = false;
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

fn describe(outcome: &PlayOutcome) -> String {
    let mut text = match outcome.category {
        OutcomeCategory::Gain => format!("gain of {}", outcome.yards),
        OutcomeCategory::Loss => format!("loss of {}", -outcome.yards),
        OutcomeCategory::Incomplete => "incomplete".to_owned(),
        OutcomeCategory::Interception => "intercepted".to_owned(),
        OutcomeCategory::Fumble => "fumble".to_owned(),
        OutcomeCategory::Penalty => "flag on the play".to_owned(),
        OutcomeCategory::Other => "no gain".to_owned(),
    };
    if outcome.out_of_bounds {
        text.push_str(", out of bounds");
    }
    text
}

fn choice_data<T: Serialize>(payload: &T) -> serde_json::Value {
    serde_json::to_value(payload).unwrap_or_else(|e| {
        warn!(error = %e, "choice payload did not serialize");
        serde_json::Value::Null
    })
}
