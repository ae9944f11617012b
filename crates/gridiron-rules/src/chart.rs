//! Chart-based resolution.
//!
//! The offense chart maps `(deck, play, defense)` to a short result string
//! such as `"+7"`, `"Sack-7"`, `"INTERCEPT+12"` or `"LG"`. The string is
//! parsed by an ordered list of rules ([`CHART_RULES`]); the first rule that
//! matches wins, so a string like `"PENALTY+15 LG"` is a penalty (on a
//! long-gain play), never a long gain. The order is part of the chart
//! corpus contract and must not be rearranged.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::long_gain::roll_long_gain;
use crate::outcome::{PenaltyCall, PenaltyOn, PlayOutcome};
use crate::rng::GameRng;
use crate::tables::OffenseChart;

/// Stated chart penalty yardage at which a defensive foul carries an
/// automatic first down.
pub const CHART_AUTO_FIRST_DOWN_YARDS: i32 = 15;

// ---------------------------------------------------------------------------
// ChartResult
// ---------------------------------------------------------------------------

/// A parsed result string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartResult {
    Incomplete,
    Fumble,
    Interception { return_yards: i32 },
    /// Signed: positive is against the defense.
    Penalty { yards: i32, long_gain: bool },
    /// Yards lost (negative).
    Sack { yards: i32 },
    LongGain,
    Yardage(i32),
    Other,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// One entry of the ordered parse list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRule {
    Incomplete,
    Fumble,
    Intercept,
    Penalty,
    Sack,
    LongGain,
    SignedInteger,
}

/// Parse priority. First match wins.
///
/// Besides the canonical spellings (`Incomplete`, `FUMBLE`, `INTERCEPT±N`,
/// `PENALTY±N`, `Sack-N`, `LG`, a bare signed integer) each rule accepts a
/// few aliases found in hand-edited charts: `INCOMPLETE` and a standalone
/// `INC`, `Fumble`, `INT±N`, and `SACK-N`. Aliases never change a rule's
/// place in the order.
pub const CHART_RULES: [ChartRule; 7] = [
    ChartRule::Incomplete,
    ChartRule::Fumble,
    ChartRule::Intercept,
    ChartRule::Penalty,
    ChartRule::Sack,
    ChartRule::LongGain,
    ChartRule::SignedInteger,
];

macro_rules! vetted_regex {
    ($name:ident, $pattern:literal) => {
        fn $name() -> &'static Regex {
            static RE: LazyLock<Regex> = LazyLock::new(|| {
                #[allow(clippy::unwrap_used)]
                Regex::new($pattern).unwrap()
            });
            &RE
        }
    };
}

vetted_regex!(incomplete_re, r"Incomplete|INCOMPLETE|\bINC\b");
vetted_regex!(fumble_re, r"FUMBLE|Fumble");
vetted_regex!(intercept_re, r"(?:INTERCEPT|\bINT)\s*([+-]\d+)");
vetted_regex!(penalty_re, r"PENALTY\s*([+-]\d+)");
vetted_regex!(sack_re, r"(?:Sack|SACK)\s*-\s*(\d+)");
vetted_regex!(long_gain_re, r"\bLG\b");
vetted_regex!(signed_integer_re, r"^\s*([+-]?\d+)\s*$");

fn capture_i32(re: &Regex, text: &str) -> Option<i32> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

impl ChartRule {
    /// Apply this rule to a result string.
    pub fn apply(self, text: &str) -> Option<ChartResult> {
        match self {
            ChartRule::Incomplete => incomplete_re()
                .is_match(text)
                .then_some(ChartResult::Incomplete),
            ChartRule::Fumble => fumble_re().is_match(text).then_some(ChartResult::Fumble),
            ChartRule::Intercept => capture_i32(intercept_re(), text)
                .map(|return_yards| ChartResult::Interception { return_yards }),
            ChartRule::Penalty => capture_i32(penalty_re(), text).map(|yards| ChartResult::Penalty {
                yards,
                long_gain: long_gain_re().is_match(text),
            }),
            ChartRule::Sack => {
                capture_i32(sack_re(), text).map(|lost| ChartResult::Sack { yards: -lost })
            }
            ChartRule::LongGain => long_gain_re()
                .is_match(text)
                .then_some(ChartResult::LongGain),
            ChartRule::SignedInteger => {
                capture_i32(signed_integer_re(), text).map(ChartResult::Yardage)
            }
        }
    }
}

/// Parse a chart result string with [`CHART_RULES`].
pub fn parse_result(text: &str) -> ChartResult {
    CHART_RULES
        .iter()
        .find_map(|rule| rule.apply(text))
        .unwrap_or(ChartResult::Other)
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a snap from the offense chart.
///
/// Draws from `rng` only for `LG` results. Unknown decks, plays or defenses
/// (and a missing chart) produce the stub outcome.
pub fn resolve_chart(
    chart: Option<&OffenseChart>,
    deck: &str,
    play: &str,
    defense: &str,
    rng: &mut GameRng,
) -> PlayOutcome {
    let Some(chart) = chart else {
        warn!(deck, play, defense, "no offense chart loaded, using stub result");
        return PlayOutcome::stub();
    };
    let Some(text) = chart.lookup(deck, play, defense) else {
        warn!(deck, play, defense, "unknown chart entry, using stub result");
        return PlayOutcome::stub();
    };
    outcome_from_result(parse_result(text), rng)
}

/// Turn a parsed result into an outcome.
pub fn outcome_from_result(result: ChartResult, rng: &mut GameRng) -> PlayOutcome {
    match result {
        ChartResult::Incomplete => PlayOutcome::incomplete(),
        ChartResult::Fumble => PlayOutcome::fumble(0, 0),
        ChartResult::Interception { return_yards } => PlayOutcome::interception(0, return_yards),
        ChartResult::Penalty { yards, long_gain } => {
            let on = if yards > 0 {
                PenaltyOn::Defense
            } else {
                PenaltyOn::Offense
            };
            let stated = yards.abs();
            PlayOutcome::penalty(PenaltyCall {
                on,
                yards: stated,
                first_down: on == PenaltyOn::Defense && stated >= CHART_AUTO_FIRST_DOWN_YARDS,
                loss_of_down: false,
                label: format!("Penalty {yards:+}"),
            })
            .with_long_gain(long_gain)
        }
        ChartResult::Sack { yards } => PlayOutcome::yardage(yards),
        ChartResult::LongGain => PlayOutcome::yardage(roll_long_gain(rng)).with_long_gain(true),
        ChartResult::Yardage(yards) => PlayOutcome::yardage(yards),
        ChartResult::Other => PlayOutcome::other(),
    }
}
