use crate::core::aggregation::ExerciseKey;
use crate::core::calendar::CalendarEvent;
use crate::core::presentation::ChartSeries;
use crate::core::range_filter::RangeNotice;
use crate::core::reminders::ReminderNotice;
use crate::core::schedule_check::ScheduleCheck;
use crate::domain::model::{AggregatedSessionPoint, Prescription, SessionRecord};
use crate::utils::error::DataError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// extract 階段的輸出：已攤平、已解碼的快照
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub prescriptions: Vec<Prescription>,
    pub sessions: Vec<SessionRecord>,
    pub rejected: Vec<DataError>,
}

/// adherence.csv 的一列
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdherenceRow {
    #[serde(rename = "PrescriptionKey")]
    pub key: String,
    #[serde(rename = "PatientId")]
    pub patient_id: String,
    #[serde(rename = "ExerciseName")]
    pub exercise_name: String,
    #[serde(rename = "StartDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "EndDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "ScheduledSessions")]
    pub scheduled: usize,
    #[serde(rename = "ElapsedSessions")]
    pub completed: usize,
    #[serde(rename = "PercentComplete")]
    pub percent_complete: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseReport {
    #[serde(flatten)]
    pub key: ExerciseKey,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub notifications: Vec<RangeNotice>,
    pub points: Vec<AggregatedSessionPoint>,
    pub chart: ChartSeries,
    #[serde(skip)]
    pub csv: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub reference_date: NaiveDate,
    pub adherence: Vec<AdherenceRow>,
    pub exercises: Vec<ExerciseReport>,
    pub schedule_checks: Vec<ScheduleCheck>,
    pub calendar: BTreeMap<String, Vec<CalendarEvent>>,
    pub reminders: Vec<ReminderNotice>,
    pub rejected: Vec<DataError>,
}

impl TransformResult {
    /// 進入圖表的資料點總數
    pub fn point_count(&self) -> usize {
        self.exercises.iter().map(|e| e.points.len()).sum()
    }
}
