//! Scenario tests for the game-flow orchestrator.
//!
//! Most scenarios use the chart engine, whose results for a given
//! play/defense pairing are fixed, and place the ball directly through
//! `GameFlow::state_mut` after the opening kickoff.

use std::sync::Arc;

use gridiron_engine::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tables() -> Arc<TableRepository> {
    Arc::new(TableRepository::builtin().unwrap())
}

fn started_game(seed: u64, engine: EngineKind, controllers: Controllers) -> GameFlow {
    let config = EngineConfig::default()
        .with_engine(engine)
        .with_controllers(controllers);
    let mut flow = GameFlow::new(seed, config, tables());
    flow.start_game().unwrap();
    flow
}

/// Started chart game with `side` on offense at its own `yard_line`, first
/// quarter, ten minutes left.
fn chart_game(controllers: Controllers, side: Side, yard_line: i32) -> GameFlow {
    let mut flow = started_game(21, EngineKind::Chart, controllers);
    let state = flow.state_mut();
    state.give_ball(side, yard_line);
    state.quarter = 1;
    state.clock = 600;
    flow
}

fn snap(flow: &mut GameFlow, play: &str, defense: &str) -> FlowStep {
    flow.resolve_snap(&PlayInput::new("Pro Style", play, defense))
        .unwrap()
}

fn count(events: &[FlowEvent], pred: impl Fn(&FlowEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

fn has_log(events: &[FlowEvent], needle: &str) -> bool {
    events
        .iter()
        .any(|e| matches!(e, FlowEvent::Log { message } if message.contains(needle)))
}

// ---------------------------------------------------------------------------
// Opening kickoff
// ---------------------------------------------------------------------------

#[test]
fn opening_kickoff_precedes_first_hud() {
    for seed in [1u64, 2, 3, 99, 12345] {
        let config = EngineConfig::default();
        let mut flow = GameFlow::new(seed, config, tables());
        let step = flow.start_game().unwrap();

        let first_hud = step.events.iter().position(FlowEvent::is_hud).unwrap();
        assert_eq!(first_hud, step.events.len() - 1);
        let kickoffs = count(&step.events[..first_hud], |e| {
            matches!(e, FlowEvent::Kickoff { .. })
        });
        assert_eq!(kickoffs, 1, "seed {seed}");
        assert_eq!(step.state.down, 1);
        assert_eq!(step.state.to_go, 10);
        assert_eq!(step.state.opening_kick_to, Some(Side::Player));
        assert!(step.state.clock < 900);
    }
}

// ---------------------------------------------------------------------------
// Downs
// ---------------------------------------------------------------------------

#[test]
fn fourth_down_short_is_turnover_on_downs() {
    let mut flow = chart_game(Controllers::all_ai(), Side::Player, 30);
    {
        let state = flow.state_mut();
        state.down = 4;
        state.to_go = 3;
    }
    // Off Tackle into Goal Line is a one-yard gain.
    let step = snap(&mut flow, "Off Tackle", "Goal Line");

    assert_eq!(step.state.possession, Side::Ai);
    assert_eq!(step.state.down, 1);
    assert_eq!(step.state.to_go, 10);
    assert_eq!(step.state.offense_yard_line(), 69);
    assert!(has_log(&step.events, "Turnover on downs"));

    let last = flow.completed_drives().last().unwrap();
    assert_eq!(last.result, Some(DriveResult::Downs));
    assert_eq!(flow.drives().current().unwrap().offense, Side::Ai);
}

#[test]
fn first_down_resets_the_chains() {
    let mut flow = chart_game(Controllers::all_ai(), Side::Player, 30);
    flow.state_mut().down = 3;
    flow.state_mut().to_go = 5;
    let step = snap(&mut flow, "Sideline Pass", "Run Defense");
    assert_eq!(step.state.offense_yard_line(), 44);
    assert_eq!(step.state.down, 1);
    assert_eq!(step.state.to_go, 10);
    assert!(has_log(&step.events, "First down"));
}

// ---------------------------------------------------------------------------
// Two-minute warning
// ---------------------------------------------------------------------------

#[test]
fn two_minute_clamp_lands_on_120() {
    let mut flow = chart_game(Controllers::all_ai(), Side::Player, 20);
    {
        let state = flow.state_mut();
        state.quarter = 2;
        state.clock = 130;
    }
    // A 22-yard gain takes 45 seconds off.
    let step = snap(&mut flow, "Long Bomb", "Goal Line");
    assert_eq!(step.state.clock, 120);
    assert!(step.state.two_minute_warning_given);
    let vfx = count(&step.events, |e| {
        matches!(e, FlowEvent::Vfx { kind: VfxKind::TwoMinuteWarning })
    });
    assert_eq!(vfx, 1);
    assert_eq!(
        count(&step.events, |e| matches!(e, FlowEvent::Log { message } if message == "Two-minute warning")),
        1
    );

    // Later snaps in the quarter never warn again.
    let step = flow
        .resolve_snap(&PlayInput::new("Pro Style", "Off Tackle", "Pass Defense").with_tempo(Tempo::Normal))
        .unwrap();
    assert_eq!(step.state.clock, 90);
    assert!(!step
        .events
        .iter()
        .any(|e| matches!(e, FlowEvent::Vfx { kind: VfxKind::TwoMinuteWarning })));
}

#[test]
fn legacy_chart_clock_ignores_two_minute_stops() {
    for (legacy, expected) in [(true, 90u32), (false, 120)] {
        let config = EngineConfig {
            engine: EngineKind::Chart,
            controllers: Controllers::all_ai(),
            legacy_chart_clock: legacy,
            ..EngineConfig::default()
        };
        let mut flow = GameFlow::new(4, config, tables());
        flow.start_game().unwrap();
        {
            let state = flow.state_mut();
            state.give_ball(Side::Player, 30);
            state.quarter = 2;
            state.clock = 120;
            state.two_minute_warning_given = true;
        }
        // Sixteen yards converts a first down, which stops the clock inside
        // the window.
        let step = flow
            .resolve_snap(&PlayInput::new("Pro Style", "Sideline Pass", "Goal Line").with_tempo(Tempo::Normal))
            .unwrap();
        assert_eq!(step.state.clock, expected, "legacy = {legacy}");
    }
}

// ---------------------------------------------------------------------------
// Penalties
// ---------------------------------------------------------------------------

#[test]
fn human_penalty_decision_halts_without_clock() {
    // The AI offense commits a foul; the human defense decides.
    let mut flow = chart_game(Controllers::default(), Side::Ai, 40);
    let pre = flow.state().clone();
    let events_before = flow.events().len();

    let step = snap(&mut flow, "Sideline Pass", "Pass Defense");
    assert_eq!(step.state, pre);
    assert!(matches!(
        step.events[step.events.len() - 2],
        FlowEvent::ChoiceRequired { choice: ChoiceKind::Penalty, .. }
    ));
    assert!(step.events.last().unwrap().is_hud());
    assert_eq!(flow.events().len(), events_before + step.events.len());

    let admin = flow.pending_penalty().unwrap();
    assert_eq!(admin.meta.deciding_side, Side::Player);
    assert_eq!(admin.accepted.offense_yard_line(), 30);

    let err = flow
        .resolve_snap(&PlayInput::new("Pro Style", "Draw", "Blitz"))
        .unwrap_err();
    assert_eq!(err, FlowError::PenaltyDecisionPending);

    let step = flow.finalize_penalty(PenaltyDecision::Accept).unwrap();
    assert_eq!(step.state.possession, Side::Ai);
    assert_eq!(step.state.offense_yard_line(), 30);
    assert_eq!(step.state.down, 1);
    assert_eq!(step.state.to_go, 20);
    assert_eq!(step.state.clock, 585);
    assert!(step.events.last().unwrap().is_hud());
    assert!(flow.pending_penalty().is_none());

    assert_eq!(
        flow.finalize_penalty(PenaltyDecision::Accept).unwrap_err(),
        FlowError::NoPendingPenalty
    );
}

#[test]
fn declined_penalty_replays_the_down() {
    let mut flow = chart_game(Controllers::default(), Side::Ai, 40);
    snap(&mut flow, "Sideline Pass", "Pass Defense");

    let step = flow.finalize_penalty(PenaltyDecision::Decline).unwrap();
    assert_eq!(step.state.offense_yard_line(), 40);
    assert_eq!(step.state.down, 2);
    assert_eq!(step.state.to_go, 10);
    assert_eq!(step.state.clock, 570);
    assert!(has_log(&step.events, "Penalty declined"));
}

#[test]
fn declined_dice_penalty_matches_the_offered_candidate() {
    let mut checked = 0;
    for seed in 0..600u64 {
        let mut flow = started_game(seed, EngineKind::Dice, Controllers::default());
        {
            let state = flow.state_mut();
            state.give_ball(Side::Player, 40);
            state.quarter = 1;
            state.clock = 600;
        }
        flow.resolve_snap(&PlayInput::new("", "Long Bomb", "Pass Defense"))
            .unwrap();
        let Some(admin) = flow.pending_penalty() else {
            continue;
        };
        let offered = admin.declined.clone();

        let step = flow.finalize_penalty(PenaltyDecision::Decline).unwrap();
        if step.events.iter().any(|e| matches!(e, FlowEvent::Score { .. })) {
            continue;
        }
        checked += 1;
        assert_eq!(step.state.clock, offered.clock, "seed {seed}");
        assert_eq!(step.state.ball_on, offered.ball_on, "seed {seed}");
        assert_eq!(step.state.possession, offered.possession, "seed {seed}");
        assert_eq!(step.state.down, offered.down, "seed {seed}");
        assert_eq!(step.state.to_go, offered.to_go, "seed {seed}");
    }
    assert!(checked > 0);
}

#[test]
fn defensive_foul_at_the_gun_gives_an_untimed_down() {
    let mut flow = chart_game(Controllers::all_ai(), Side::Player, 30);
    {
        let state = flow.state_mut();
        state.quarter = 2;
        state.clock = 10;
        state.two_minute_warning_given = true;
    }
    // Defensive foul on a long-gain play: 15 from midfield, automatic first
    // down, and the 15-second runoff expires the clock.
    let step = snap(&mut flow, "Long Bomb", "Blitz");
    assert_eq!(step.state.quarter, 2);
    assert_eq!(step.state.clock, 0);
    assert!(step.state.untimed_down_scheduled);
    assert_eq!(step.state.offense_yard_line(), 65);
    assert_eq!(step.state.down, 1);
    assert!(has_log(&step.events, "Untimed down to follow"));
    assert!(!step.events.iter().any(|e| e.kind_name() == "endOfQuarter"));

    let step = snap(&mut flow, "Off Tackle", "Run Defense");
    let order: Vec<&str> = step.events.iter().map(FlowEvent::kind_name).collect();
    let eoq = order.iter().position(|k| *k == "endOfQuarter").unwrap();
    let half = order.iter().position(|k| *k == "halftime").unwrap();
    let kick = order.iter().rposition(|k| *k == "kickoff").unwrap();
    assert!(eoq < half && half < kick);
    assert_eq!(step.state.quarter, 3);
    assert!(!step.state.untimed_down_scheduled);
}

#[test]
fn ai_decider_resolves_penalty_immediately() {
    // The human offense fouls; the AI defense decides on the spot.
    let mut flow = chart_game(Controllers::default(), Side::Player, 40);
    let step = snap(&mut flow, "Sideline Pass", "Pass Defense");
    assert!(!step
        .events
        .iter()
        .any(|e| matches!(e, FlowEvent::ChoiceRequired { .. })));
    assert!(flow.pending_penalty().is_none());
    assert!(has_log(&step.events, "Flag:"));
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[test]
fn human_touchdown_waits_for_pat_choice() {
    let mut flow = chart_game(Controllers::default(), Side::Player, 90);
    let step = snap(&mut flow, "Long Bomb", "Goal Line");

    assert_eq!(step.state.score.player, 6);
    assert!(step.state.awaiting_pat);
    assert_eq!(flow.pending_pat(), Some(Side::Player));
    assert_eq!(
        count(&step.events, |e| matches!(
            e,
            FlowEvent::Score { player_delta: 6, ai_delta: 0, kind: ScoreKind::Touchdown }
        )),
        1
    );
    assert!(step
        .events
        .iter()
        .any(|e| matches!(e, FlowEvent::ChoiceRequired { choice: ChoiceKind::Pat, .. })));
    assert_eq!(
        flow.completed_drives().last().unwrap().result,
        Some(DriveResult::Touchdown)
    );

    let err = flow
        .resolve_snap(&PlayInput::new("Pro Style", "Draw", "Blitz"))
        .unwrap_err();
    assert_eq!(err, FlowError::PatPending);

    let step = flow.finalize_pat(PatChoice::Kick).unwrap();
    assert!(!step.state.awaiting_pat);
    assert!(matches!(step.state.score.player, 6 | 7));
    assert_eq!(
        count(&step.events, |e| matches!(e, FlowEvent::Kickoff { onside: false })),
        1
    );
    assert_eq!(flow.finalize_pat(PatChoice::Kick).unwrap_err(), FlowError::NoPendingPat);
}

#[test]
fn sack_in_the_end_zone_is_a_safety() {
    let mut flow = chart_game(Controllers::all_ai(), Side::Player, 3);
    let step = snap(&mut flow, "Sideline Pass", "Blitz");

    assert_eq!(step.state.score.ai, 2);
    let score_at = step
        .events
        .iter()
        .position(|e| matches!(e, FlowEvent::Score { ai_delta: 2, kind: ScoreKind::Safety, .. }))
        .unwrap();
    let kick_at = step
        .events
        .iter()
        .position(|e| matches!(e, FlowEvent::Kickoff { onside: false }))
        .unwrap();
    assert!(score_at < kick_at);
    // Default policy free-kicks to the receiver's 25.
    assert_eq!(step.state.possession, Side::Ai);
    assert_eq!(step.state.offense_yard_line(), 25);
    assert_eq!(
        flow.completed_drives().last().unwrap().result,
        Some(DriveResult::Safety)
    );
}

#[test]
fn field_goal_scores_or_turns_over() {
    let mut flow = chart_game(Controllers::all_ai(), Side::Player, 90);
    flow.state_mut().down = 4;
    let step = flow.resolve_snap(&PlayInput::field_goal("Pro Style")).unwrap();

    let made = step
        .events
        .iter()
        .any(|e| matches!(e, FlowEvent::Score { kind: ScoreKind::FieldGoal, .. }));
    if made {
        assert_eq!(step.state.score.player, 3);
        assert!(step.events.iter().any(|e| matches!(e, FlowEvent::Kickoff { .. })));
    } else {
        assert_eq!(step.state.score.player, 0);
        assert_eq!(step.state.possession, Side::Ai);
        assert_eq!(step.state.offense_yard_line(), 20);
    }
    let results: Vec<_> = flow.completed_drives().iter().filter_map(|d| d.result).collect();
    assert!(results.contains(&DriveResult::FieldGoal) || results.contains(&DriveResult::MissedFieldGoal));
}

#[test]
fn punt_flips_possession_on_fourth_down() {
    let mut flow = chart_game(Controllers::all_ai(), Side::Player, 30);
    flow.state_mut().down = 4;
    let step = flow.resolve_snap(&PlayInput::punt("Pro Style")).unwrap();

    assert!(flow
        .completed_drives()
        .iter()
        .any(|d| d.offense == Side::Player && d.result == Some(DriveResult::Punt)));
    assert_eq!(step.state.down, 1);
    let returned_for_score = step
        .events
        .iter()
        .any(|e| matches!(e, FlowEvent::Score { .. }));
    if !returned_for_score {
        assert_eq!(step.state.possession, Side::Ai);
        assert_eq!(step.state.clock, 590);
    }
}

// ---------------------------------------------------------------------------
// Dice doubles
// ---------------------------------------------------------------------------

#[test]
fn snake_eyes_scores_for_the_defense_without_a_choice() {
    let mut seen = false;
    for seed in 0..8_000u64 {
        let mut flow = started_game(seed, EngineKind::Dice, Controllers::all_ai());
        {
            let state = flow.state_mut();
            state.give_ball(Side::Player, 30);
            state.quarter = 1;
            state.clock = 600;
        }
        let step = snap(&mut flow, "Draw", "Blitz");
        if !has_log(&step.events, "Snake eyes") {
            continue;
        }
        seen = true;
        assert!(step.state.score.ai >= 6);
        assert_eq!(step.state.score.player, 0);
        assert!(!step
            .events
            .iter()
            .any(|e| matches!(e, FlowEvent::ChoiceRequired { .. })));
        assert!(!has_log(&step.events, "Flag:"));
        assert!(step
            .events
            .iter()
            .any(|e| matches!(e, FlowEvent::Score { ai_delta: 6, kind: ScoreKind::Touchdown, .. })));
        break;
    }
    assert!(seen, "no 1-1 roll in the seed range");
}

// ---------------------------------------------------------------------------
// Quarters
// ---------------------------------------------------------------------------

#[test]
fn end_of_second_quarter_is_halftime() {
    let mut flow = chart_game(Controllers::all_ai(), Side::Player, 30);
    {
        let state = flow.state_mut();
        state.quarter = 2;
        state.clock = 20;
        state.two_minute_warning_given = true;
    }
    let step = flow
        .resolve_snap(&PlayInput::new("Pro Style", "Off Tackle", "Run Defense").with_tempo(Tempo::Normal))
        .unwrap();

    let order: Vec<&str> = step.events.iter().map(FlowEvent::kind_name).collect();
    let eoq = order.iter().position(|k| *k == "endOfQuarter").unwrap();
    let half = order.iter().position(|k| *k == "halftime").unwrap();
    let kick = order.iter().rposition(|k| *k == "kickoff").unwrap();
    assert!(eoq < half && half < kick);

    assert_eq!(step.state.quarter, 3);
    assert!(step.state.clock < 900);
    assert!(!step.state.two_minute_warning_given);
    // The player received the opening kickoff, so the AI receives now.
    assert!(flow
        .completed_drives()
        .iter()
        .any(|d| d.result == Some(DriveResult::EndOfHalf)));
}

#[test]
fn end_of_fourth_quarter_is_final() {
    let mut flow = chart_game(Controllers::all_ai(), Side::Player, 30);
    {
        let state = flow.state_mut();
        state.quarter = 4;
        state.clock = 10;
        state.two_minute_warning_given = true;
    }
    let step = snap(&mut flow, "Off Tackle", "Run Defense");
    assert!(step.state.game_over);
    assert!(step
        .events
        .iter()
        .any(|e| matches!(e, FlowEvent::Final { .. })));
    assert_eq!(
        flow.resolve_snap(&PlayInput::new("Pro Style", "Draw", "Blitz"))
            .unwrap_err(),
        FlowError::GameOver
    );
}

#[test]
fn every_call_ends_with_hud() {
    let mut flow = chart_game(Controllers::all_ai(), Side::Player, 30);
    for (play, defense) in [
        ("Off Tackle", "Pass Defense"),
        ("Quick Slant", "Pass Defense"),
        ("Draw", "Blitz"),
        ("Screen Pass", "Prevent"),
    ] {
        if flow.state().down == 4 {
            break;
        }
        let step = snap(&mut flow, play, defense);
        assert!(step.events.last().unwrap().is_hud());
        assert_eq!(
            flow.hud_payload(),
            match step.events.last().unwrap() {
                FlowEvent::Hud { snapshot } => *snapshot,
                _ => unreachable!(),
            }
        );
    }
}
