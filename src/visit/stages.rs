// Step table - the ordered stages a visit moves through

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::visit::errors::StageTableError;
use crate::visit::types::Visit;

/// Identifies one stage of the visit workflow.
///
/// Each id maps onto exactly one `StageRecord` of [`Visit`], so field access
/// is checked by the compiler instead of by string name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    CheckIn,
    WaitingEnd,
    MeetingStart,
    MeetingEnd,
    CheckOut,
}

impl StageId {
    pub const ALL: [StageId; 5] = [
        StageId::CheckIn,
        StageId::WaitingEnd,
        StageId::MeetingStart,
        StageId::MeetingEnd,
        StageId::CheckOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::CheckIn => "check_in",
            StageId::WaitingEnd => "waiting_end",
            StageId::MeetingStart => "meeting_start",
            StageId::MeetingEnd => "meeting_end",
            StageId::CheckOut => "check_out",
        }
    }

    /// Human readable label used on triggers and notifications
    pub fn label(&self) -> &'static str {
        match self {
            StageId::CheckIn => "Check In",
            StageId::WaitingEnd => "End Waiting",
            StageId::MeetingStart => "Start Meeting",
            StageId::MeetingEnd => "End Meeting",
            StageId::CheckOut => "Check Out",
        }
    }

    /// Name of the trigger control the host renders for this stage
    pub fn trigger(&self) -> &'static str {
        match self {
            StageId::CheckIn => "check_in_button",
            StageId::WaitingEnd => "waiting_end_button",
            StageId::MeetingStart => "meeting_start_button",
            StageId::MeetingEnd => "meeting_end_button",
            StageId::CheckOut => "check_out_button",
        }
    }

    pub fn timestamp_field(&self) -> &'static str {
        match self {
            StageId::CheckIn => "check_in_time",
            StageId::WaitingEnd => "waiting_end_time",
            StageId::MeetingStart => "meeting_start_time",
            StageId::MeetingEnd => "meeting_end_time",
            StageId::CheckOut => "check_out_time",
        }
    }

    pub fn latitude_field(&self) -> &'static str {
        match self {
            StageId::CheckIn => "check_in_latitude",
            StageId::WaitingEnd => "waiting_end_latitude",
            StageId::MeetingStart => "meeting_start_latitude",
            StageId::MeetingEnd => "meeting_end_latitude",
            StageId::CheckOut => "check_out_latitude",
        }
    }

    pub fn longitude_field(&self) -> &'static str {
        match self {
            StageId::CheckIn => "check_in_longitude",
            StageId::WaitingEnd => "waiting_end_longitude",
            StageId::MeetingStart => "meeting_start_longitude",
            StageId::MeetingEnd => "meeting_end_longitude",
            StageId::CheckOut => "check_out_longitude",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = StageTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        StageId::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| StageTableError::UnknownStage(s.to_string()))
    }
}

/// Static descriptor of one workflow stage. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub id: StageId,
    pub trigger: &'static str,
    /// Whether completing the stage captures a latitude/longitude pair
    pub geotag: bool,
}

impl Stage {
    pub fn new(id: StageId, geotag: bool) -> Self {
        Self {
            id,
            trigger: id.trigger(),
            geotag,
        }
    }
}

/// Ordered, duplicate-free list of stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTable {
    stages: Vec<Stage>,
}

impl StageTable {
    pub fn new(stages: Vec<Stage>) -> Result<Self, StageTableError> {
        if stages.is_empty() {
            return Err(StageTableError::Empty);
        }
        for (index, stage) in stages.iter().enumerate() {
            if stages[..index].iter().any(|earlier| earlier.id == stage.id) {
                return Err(StageTableError::Duplicate(stage.id));
            }
        }
        Ok(Self { stages })
    }

    /// Full table: check-in, waiting, meeting, check-out. Location is
    /// captured when arriving and when leaving.
    pub fn standard() -> Self {
        Self {
            stages: vec![
                Stage::new(StageId::CheckIn, true),
                Stage::new(StageId::WaitingEnd, false),
                Stage::new(StageId::MeetingStart, false),
                Stage::new(StageId::MeetingEnd, false),
                Stage::new(StageId::CheckOut, true),
            ],
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|stage| stage.id).collect()
    }

    pub fn get(&self, id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.id == id)
    }

    pub fn position(&self, id: StageId) -> Option<usize> {
        self.stages.iter().position(|stage| stage.id == id)
    }

    /// Number of leading stages whose timestamp is recorded
    pub fn completed_count(&self, visit: &Visit) -> usize {
        self.stages
            .iter()
            .take_while(|stage| visit.stage(stage.id).is_stamped())
            .count()
    }

    /// Verify that no recorded stage follows an unrecorded one.
    pub fn check_progression(&self, visit: &Visit) -> Result<(), StageTableError> {
        let mut first_missing: Option<StageId> = None;
        for stage in &self.stages {
            let stamped = visit.stage(stage.id).is_stamped();
            match (stamped, first_missing) {
                (false, None) => first_missing = Some(stage.id),
                (true, Some(missing)) => {
                    return Err(StageTableError::ProgressionGap {
                        stamped: stage.id,
                        missing,
                    })
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl Default for StageTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stamp(visit: &mut Visit, id: StageId) {
        visit.stage_mut(id).at = NaiveDate::from_ymd_opt(2025, 3, 4)
            .and_then(|d| d.and_hms_opt(9, 30, 0));
    }

    #[test]
    fn test_standard_table_order() {
        let table = StageTable::standard();
        assert_eq!(table.ids(), StageId::ALL.to_vec());
        assert!(table.get(StageId::CheckIn).unwrap().geotag);
        assert!(!table.get(StageId::MeetingStart).unwrap().geotag);
        assert!(table.get(StageId::CheckOut).unwrap().geotag);
    }

    #[test]
    fn test_rejects_empty_and_duplicate_tables() {
        assert!(matches!(StageTable::new(vec![]), Err(StageTableError::Empty)));

        let duplicate = StageTable::new(vec![
            Stage::new(StageId::CheckIn, true),
            Stage::new(StageId::CheckOut, true),
            Stage::new(StageId::CheckIn, false),
        ]);
        assert!(matches!(
            duplicate,
            Err(StageTableError::Duplicate(StageId::CheckIn))
        ));
    }

    #[test]
    fn test_stage_id_parsing() {
        assert_eq!("check-in".parse::<StageId>().unwrap(), StageId::CheckIn);
        assert_eq!("MEETING_END".parse::<StageId>().unwrap(), StageId::MeetingEnd);
        assert!("lunch".parse::<StageId>().is_err());
    }

    #[test]
    fn test_progression_gap_detected() {
        let table = StageTable::standard();
        let mut visit = Visit::default();
        assert!(table.check_progression(&visit).is_ok());

        stamp(&mut visit, StageId::CheckIn);
        stamp(&mut visit, StageId::MeetingStart);

        match table.check_progression(&visit) {
            Err(StageTableError::ProgressionGap { stamped, missing }) => {
                assert_eq!(stamped, StageId::MeetingStart);
                assert_eq!(missing, StageId::WaitingEnd);
            }
            other => panic!("expected progression gap, got {other:?}"),
        }
        assert_eq!(table.completed_count(&visit), 1);
    }

    #[test]
    fn test_stages_outside_table_are_ignored() {
        let table = StageTable::new(vec![
            Stage::new(StageId::CheckIn, true),
            Stage::new(StageId::CheckOut, true),
        ])
        .unwrap();
        let mut visit = Visit::default();
        stamp(&mut visit, StageId::CheckIn);
        stamp(&mut visit, StageId::CheckOut);

        assert!(table.check_progression(&visit).is_ok());
        assert_eq!(table.completed_count(&visit), 2);
    }
}
