//! Outcome tables and the repository that owns them.
//!
//! Tables are immutable once loaded. A [`TableRepository`] is built once per
//! session (from the built-in data or a directory of JSON files), wrapped in
//! an `Arc` and shared read-only by every resolver and every game.
//!
//! # Formats
//!
//! - `chart.json`: `deck → play label → defense label → result string`.
//! - `matchups.json`: `"OFF|DEF" → { entries["3".."39"], doubles, meta }`.
//!   A defense of `*` matches any defensive card.
//! - `penalties.json`: `name → { entries["1".."10"] }`.
//!
//! Validation runs at load time: every matchup table must cover every 2d20
//! sum from 3 through 39, every clock value must be `10`, `20` or `30`, every
//! doubles reference must name a penalty table, and every penalty table must
//! have exactly ten slots.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::outcome::{PenaltyCall, PenaltyOn};
use crate::RulesError;

/// Lowest possible 2d20 sum.
pub const MIN_DICE_SUM: u32 = 3;
/// Highest sum that is not doubles-only.
pub const MAX_DICE_SUM: u32 = 39;
/// Number of penalty slots (one per d10 face).
pub const PENALTY_SLOTS: usize = 10;

const BUILTIN_CHART: &str = include_str!("../data/chart.json");
const BUILTIN_MATCHUPS: &str = include_str!("../data/matchups.json");
const BUILTIN_PENALTIES: &str = include_str!("../data/penalties.json");

// ---------------------------------------------------------------------------
// Offense chart
// ---------------------------------------------------------------------------

/// Deterministic result chart: deck → play → defense → result string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OffenseChart {
    pub decks: BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>,
}

impl OffenseChart {
    pub fn lookup(&self, deck: &str, play: &str, defense: &str) -> Option<&str> {
        self.decks
            .get(deck)?
            .get(play)?
            .get(defense)
            .map(String::as_str)
    }

    /// Play labels of a deck in stable (sorted) order.
    pub fn plays(&self, deck: &str) -> Vec<&str> {
        self.decks
            .get(deck)
            .map(|plays| plays.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Defensive labels used by a deck, in stable order.
    pub fn defenses(&self, deck: &str) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .decks
            .get(deck)
            .into_iter()
            .flat_map(|plays| plays.values())
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }
}

// ---------------------------------------------------------------------------
// Matchup table (2d20)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnoverKind {
    #[serde(rename = "INT")]
    Interception,
    #[serde(rename = "FUM")]
    Fumble,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turnover {
    #[serde(rename = "type")]
    pub kind: TurnoverKind,
    #[serde(default)]
    pub return_yards: i32,
    /// Recovering team's own yard line where the return ends.
    #[serde(default)]
    pub return_to: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupEntry {
    pub yards: i32,
    /// `"10"`, `"20"` or `"30"`.
    pub clock: String,
    #[serde(default)]
    pub turnover: Option<Turnover>,
    #[serde(default)]
    pub oob: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MatchupEntry {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn clock_seconds(&self) -> Option<u32> {
        match self.clock.as_str() {
            "10" => Some(10),
            "20" => Some(20),
            "30" => Some(30),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyRef {
    pub penalty_table_ref: String,
}

/// Routing for doubles. `1-1` and `20-20` are fixed by the rules; the
/// entries are kept for documentation. `2-19` names the penalty table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoublesRules {
    #[serde(rename = "1", default)]
    pub snake_eyes: Option<String>,
    #[serde(rename = "20", default)]
    pub boxcars: Option<String>,
    #[serde(rename = "2-19")]
    pub middle: PenaltyRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupMeta {
    #[serde(default)]
    pub field_pos_clamp: bool,
    /// Sums at or above this are explosive plays.
    #[serde(default = "default_explosive_start")]
    pub explosive_start_sum: u32,
}

fn default_explosive_start() -> u32 {
    34
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupTable {
    pub entries: BTreeMap<String, MatchupEntry>,
    pub doubles: DoublesRules,
    pub meta: MatchupMeta,
}

impl MatchupTable {
    /// Entry for a 2d20 sum. A miss inside `3..=39` is a contract violation
    /// because tables are validated complete at load.
    pub fn entry(&self, sum: u32) -> Result<&MatchupEntry, RulesError> {
        self.entries
            .get(&sum.to_string())
            .ok_or(RulesError::MissingDiceSum { sum })
    }

    pub fn is_explosive(&self, sum: u32) -> bool {
        sum >= self.meta.explosive_start_sum
    }

    fn validate(&self, name: &str, penalties: &BTreeMap<String, PenaltyTable>) -> Result<(), RulesError> {
        let missing: Vec<u32> = (MIN_DICE_SUM..=MAX_DICE_SUM)
            .filter(|sum| !self.entries.contains_key(&sum.to_string()))
            .collect();
        if !missing.is_empty() {
            return Err(RulesError::IncompleteMatchupTable {
                table: name.to_owned(),
                missing,
            });
        }
        for (sum, entry) in &self.entries {
            if entry.clock_seconds().is_none() {
                return Err(RulesError::InvalidClockValue {
                    table: name.to_owned(),
                    sum: sum.clone(),
                    value: entry.clock.clone(),
                });
            }
        }
        let reference = &self.doubles.middle.penalty_table_ref;
        if !penalties.contains_key(reference) {
            return Err(RulesError::UnknownPenaltyTable {
                table: name.to_owned(),
                reference: reference.clone(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Penalty table (1d10)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyEntry {
    pub side: PenaltyOn,
    #[serde(default)]
    pub yards: Option<i32>,
    #[serde(default)]
    pub auto_first_down: bool,
    #[serde(default)]
    pub loss_of_down: bool,
    /// Forced override: the penalty replaces the play, no accept/decline.
    #[serde(default)]
    pub override_play_result: bool,
    pub label: String,
}

impl PenaltyEntry {
    pub fn to_call(&self) -> PenaltyCall {
        PenaltyCall {
            on: self.side,
            yards: self.yards.unwrap_or(0).abs(),
            first_down: self.auto_first_down && self.side == PenaltyOn::Defense,
            loss_of_down: self.loss_of_down,
            label: self.label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyTable {
    pub entries: BTreeMap<String, PenaltyEntry>,
}

impl PenaltyTable {
    /// Slot for a d10 face (`1..=10`).
    pub fn slot(&self, face: u32) -> Option<&PenaltyEntry> {
        self.entries.get(&face.to_string())
    }

    fn validate(&self, name: &str) -> Result<(), RulesError> {
        let complete = (1..=PENALTY_SLOTS).all(|i| self.entries.contains_key(&i.to_string()));
        if self.entries.len() != PENALTY_SLOTS || !complete {
            return Err(RulesError::PenaltyTableSize {
                table: name.to_owned(),
                found: self.entries.len(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DiceTables
// ---------------------------------------------------------------------------

/// Matchup tables plus the penalty tables they reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceTables {
    pub matchups: BTreeMap<String, MatchupTable>,
    pub penalties: BTreeMap<String, PenaltyTable>,
}

impl DiceTables {
    pub fn from_json(matchups: &str, penalties: &str) -> Result<Self, RulesError> {
        let matchups: BTreeMap<String, MatchupTable> = serde_json::from_str(matchups)
            .map_err(|e| RulesError::TableParse {
                table: "matchups".to_owned(),
                details: e.to_string(),
            })?;
        let penalties: BTreeMap<String, PenaltyTable> = serde_json::from_str(penalties)
            .map_err(|e| RulesError::TableParse {
                table: "penalties".to_owned(),
                details: e.to_string(),
            })?;
        let tables = Self { matchups, penalties };
        tables.validate()?;
        Ok(tables)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        for (name, table) in &self.penalties {
            table.validate(name)?;
        }
        for (name, table) in &self.matchups {
            table.validate(name, &self.penalties)?;
        }
        Ok(())
    }

    /// Matchup table for a card pairing: exact `OFF|DEF`, then `OFF|*`,
    /// then `*|*`.
    pub fn matchup_for(&self, offense: &str, defense: &str) -> Option<&MatchupTable> {
        self.matchups
            .get(&format!("{offense}|{defense}"))
            .or_else(|| self.matchups.get(&format!("{offense}|*")))
            .or_else(|| self.matchups.get("*|*"))
    }

    pub fn penalty_table_for(&self, matchup: &MatchupTable) -> Option<&PenaltyTable> {
        self.penalties.get(&matchup.doubles.middle.penalty_table_ref)
    }

    /// Offensive card ids that have at least one matchup table.
    pub fn offense_cards(&self) -> Vec<&str> {
        let mut cards: Vec<&str> = self
            .matchups
            .keys()
            .filter_map(|key| key.split('|').next())
            .filter(|card| *card != "*")
            .collect();
        cards.dedup();
        cards
    }
}

// ---------------------------------------------------------------------------
// TableRepository
// ---------------------------------------------------------------------------

/// Every table a game needs, owned by the session and passed down.
///
/// A `None` table means loading failed; resolvers that need it degrade to
/// the stub result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRepository {
    pub chart: Option<OffenseChart>,
    pub dice: Option<DiceTables>,
}

impl TableRepository {
    /// The tables shipped with the crate.
    pub fn builtin() -> Result<Self, RulesError> {
        Self::from_json(BUILTIN_CHART, BUILTIN_MATCHUPS, BUILTIN_PENALTIES)
    }

    pub fn from_json(chart: &str, matchups: &str, penalties: &str) -> Result<Self, RulesError> {
        Ok(Self {
            chart: Some(parse_chart(chart)?),
            dice: Some(DiceTables::from_json(matchups, penalties)?),
        })
    }

    /// Load `chart.json`, `matchups.json` and `penalties.json` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, RulesError> {
        let chart = read_table(dir, "chart.json")?;
        let matchups = read_table(dir, "matchups.json")?;
        let penalties = read_table(dir, "penalties.json")?;
        Self::from_json(&chart, &matchups, &penalties)
    }

    /// Load what can be loaded from `dir`; each failure is logged and the
    /// affected engine degrades to stub resolution.
    pub fn load_or_degrade(dir: &Path) -> Self {
        let chart = read_table(dir, "chart.json").and_then(|raw| parse_chart(&raw));
        let dice = read_table(dir, "matchups.json").and_then(|matchups| {
            let penalties = read_table(dir, "penalties.json")?;
            DiceTables::from_json(&matchups, &penalties)
        });

        let chart = chart
            .map_err(|e| warn!(error = %e, "offense chart unavailable, chart engine will use stub results"))
            .ok();
        let dice = dice
            .map_err(|e| warn!(error = %e, "dice tables unavailable, dice engine will use stub results"))
            .ok();
        Self { chart, dice }
    }
}

fn parse_chart(raw: &str) -> Result<OffenseChart, RulesError> {
    serde_json::from_str(raw).map_err(|e| RulesError::TableParse {
        table: "chart".to_owned(),
        details: e.to_string(),
    })
}

fn read_table(dir: &Path, file: &str) -> Result<String, RulesError> {
    let path = dir.join(file);
    std::fs::read_to_string(&path).map_err(|e| RulesError::Io {
        path: path.display().to_string(),
        details: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_load_and_validate() {
        let repo = TableRepository::builtin().unwrap();
        let chart = repo.chart.unwrap();
        assert_eq!(chart.lookup("Pro Style", "Long Bomb", "Run Defense"), Some("LG"));
        let dice = repo.dice.unwrap();
        assert!(dice.matchup_for("Draw", "Blitz").is_some());
        assert!(dice.matchup_for("Hail Mary", "Blitz").is_none());
    }

    #[test]
    fn exact_pairing_beats_wildcard() {
        let dice = TableRepository::builtin().unwrap().dice.unwrap();
        let exact = dice.matchup_for("Long Bomb", "Prevent").unwrap();
        let wildcard = dice.matchup_for("Long Bomb", "Blitz").unwrap();
        assert_ne!(exact, wildcard);
    }

    #[test]
    fn missing_sum_fails_validation() {
        let mut matchups: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(BUILTIN_MATCHUPS).unwrap();
        let table = matchups.get_mut("Draw|*").unwrap();
        table["entries"].as_object_mut().unwrap().remove("17");
        let raw = serde_json::to_string(&matchups).unwrap();

        let err = DiceTables::from_json(&raw, BUILTIN_PENALTIES).unwrap_err();
        match err {
            RulesError::IncompleteMatchupTable { table, missing } => {
                assert_eq!(table, "Draw|*");
                assert_eq!(missing, vec![17]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn penalty_table_needs_ten_slots() {
        let mut penalties: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(BUILTIN_PENALTIES).unwrap();
        penalties.get_mut("standard").unwrap()["entries"]
            .as_object_mut()
            .unwrap()
            .remove("10");
        let raw = serde_json::to_string(&penalties).unwrap();

        let err = DiceTables::from_json(BUILTIN_MATCHUPS, &raw).unwrap_err();
        assert!(matches!(err, RulesError::PenaltyTableSize { found: 9, .. }));
    }

    #[test]
    fn bad_clock_value_is_rejected() {
        let mut matchups: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(BUILTIN_MATCHUPS).unwrap();
        matchups.get_mut("Draw|*").unwrap()["entries"]["12"]["clock"] = serde_json::json!("25");
        let raw = serde_json::to_string(&matchups).unwrap();
        let err = DiceTables::from_json(&raw, BUILTIN_PENALTIES).unwrap_err();
        assert!(matches!(err, RulesError::InvalidClockValue { .. }));
    }

    #[test]
    fn forced_override_slots_are_four_through_six() {
        let dice = TableRepository::builtin().unwrap().dice.unwrap();
        let table = &dice.penalties["standard"];
        for face in 1..=10u32 {
            let forced = table.slot(face).unwrap().override_play_result;
            assert_eq!(forced, (4..=6).contains(&face), "slot {face}");
        }
    }

    #[test]
    fn missing_directory_degrades_instead_of_failing() {
        let repo = TableRepository::load_or_degrade(Path::new("/definitely/not/here"));
        assert!(repo.chart.is_none());
        assert!(repo.dice.is_none());
    }
}
