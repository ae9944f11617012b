//! Drive bookkeeping: one summary per possession.

use std::fmt;

use gridiron_rules::state::Side;
use serde::{Deserialize, Serialize};

/// How a possession ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveResult {
    Touchdown,
    FieldGoal,
    MissedFieldGoal,
    Punt,
    Interception,
    Fumble,
    Downs,
    Safety,
    EndOfHalf,
    EndOfGame,
}

impl fmt::Display for DriveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DriveResult::Touchdown => "touchdown",
            DriveResult::FieldGoal => "field goal",
            DriveResult::MissedFieldGoal => "missed field goal",
            DriveResult::Punt => "punt",
            DriveResult::Interception => "interception",
            DriveResult::Fumble => "fumble",
            DriveResult::Downs => "turnover on downs",
            DriveResult::Safety => "safety",
            DriveResult::EndOfHalf => "end of half",
            DriveResult::EndOfGame => "end of game",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveSummary {
    pub offense: Side,
    /// Offense-relative starting yard line.
    pub start_yard_line: i32,
    pub plays: u32,
    pub yards: i32,
    pub result: Option<DriveResult>,
}

impl fmt::Display for DriveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Drive summary: {} from own {}, {} plays, {} yards",
            self.offense, self.start_yard_line, self.plays, self.yards
        )?;
        if let Some(result) = self.result {
            write!(f, ", {result}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveTracker {
    current: Option<DriveSummary>,
    completed: Vec<DriveSummary>,
}

impl DriveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a drive. An unfinished drive is dropped without a summary.
    pub fn start(&mut self, offense: Side, start_yard_line: i32) {
        self.current = Some(DriveSummary {
            offense,
            start_yard_line,
            plays: 0,
            yards: 0,
            result: None,
        });
    }

    pub fn record_play(&mut self, yards: i32) {
        if let Some(drive) = self.current.as_mut() {
            drive.plays += 1;
            drive.yards += yards;
        }
    }

    /// Close the open drive with `result`. Returns `None` when no drive is
    /// open.
    pub fn end_drive_summary(&mut self, result: DriveResult) -> Option<DriveSummary> {
        let mut drive = self.current.take()?;
        drive.result = Some(result);
        self.completed.push(drive.clone());
        Some(drive)
    }

    pub fn current(&self) -> Option<&DriveSummary> {
        self.current.as_ref()
    }

    pub fn completed(&self) -> &[DriveSummary] {
        &self.completed
    }
}
