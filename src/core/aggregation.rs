//! Per-session summaries of raw repetition data.

use crate::domain::model::{AggregatedSessionPoint, SessionRecord, StoredInstant};
use crate::utils::error::DataError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationOutcome {
    pub points: Vec<AggregatedSessionPoint>,
    pub rejected: Vec<DataError>,
}

/// 病患 + 動作名稱，用來分組
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseKey {
    pub patient_id: String,
    pub exercise_name: String,
}

/// 把每筆紀錄彙整成一個資料點，依時間遞增排序並編號 1..N。
///
/// 時間戳缺漏或格式錯誤、成功率不在 [0, 1] 的紀錄會放進 `rejected`，
/// 不影響其他紀錄。沒有任何組數的紀錄仍會保留。
pub fn aggregate(records: &[SessionRecord]) -> AggregationOutcome {
    let mut points = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for (position, record) in records.iter().enumerate() {
        match summarize(record, position) {
            Ok(point) => points.push(point),
            Err(e) => {
                tracing::warn!("⚠️ Skipping session record: {}", e);
                rejected.push(e);
            }
        }
    }

    // 穩定排序，同一時間的紀錄維持輸入順序
    points.sort_by_key(|p| p.timestamp);
    for (i, point) in points.iter_mut().enumerate() {
        point.sequence_index = i + 1;
    }

    tracing::debug!(
        "Aggregated {} session(s), rejected {}",
        points.len(),
        rejected.len()
    );

    AggregationOutcome { points, rejected }
}

/// 單筆紀錄的統計；sequence_index 由 `aggregate` 指定
pub fn summarize(record: &SessionRecord, position: usize) -> Result<AggregatedSessionPoint, DataError> {
    let label = record.label(position);
    let timestamp =
        resolve_timestamp(record.timestamp.as_ref()).map_err(|reason| DataError::new(&label, reason))?;

    let mut left = RunningMean::default();
    let mut right = RunningMean::default();
    let mut total_reps = 0;

    for (set_no, set) in record.sets.iter().enumerate() {
        total_reps += set.reps.len();
        for (rep_no, rep) in set.reps.iter().enumerate() {
            if let Some(rate) = rep.success_rate_left {
                check_rate(rate).map_err(|reason| {
                    DataError::new(&label, format!("set {} rep {} successRateLeft {}", set_no + 1, rep_no + 1, reason))
                })?;
                left.push(rate);
            }
            if let Some(rate) = rep.success_rate_right {
                check_rate(rate).map_err(|reason| {
                    DataError::new(&label, format!("set {} rep {} successRateRight {}", set_no + 1, rep_no + 1, reason))
                })?;
                right.push(rate);
            }
        }
    }

    Ok(AggregatedSessionPoint {
        timestamp,
        sequence_index: 0,
        total_sets: record.sets.len(),
        total_reps,
        avg_success_rate_left: left.value(),
        avg_success_rate_right: right.value(),
    })
}

/// {seconds, nanoseconds} 轉回絕對時間
pub fn resolve_timestamp(instant: Option<&StoredInstant>) -> Result<DateTime<Utc>, String> {
    let instant = instant.ok_or_else(|| "timestamp is missing".to_string())?;
    let seconds = instant
        .seconds
        .ok_or_else(|| "timestamp.seconds is missing".to_string())?;
    let nanoseconds = instant
        .nanoseconds
        .ok_or_else(|| "timestamp.nanoseconds is missing".to_string())?;

    if !(0..NANOS_PER_SECOND).contains(&nanoseconds) {
        return Err(format!("timestamp.nanoseconds {} is out of range", nanoseconds));
    }

    DateTime::from_timestamp(seconds, nanoseconds as u32)
        .ok_or_else(|| format!("timestamp.seconds {} is out of range", seconds))
}

/// 依 (病患, 動作) 分組，動作名稱去掉多餘的雙引號
pub fn group_by_exercise(records: &[SessionRecord]) -> BTreeMap<ExerciseKey, Vec<SessionRecord>> {
    let mut groups: BTreeMap<ExerciseKey, Vec<SessionRecord>> = BTreeMap::new();
    for record in records {
        let key = ExerciseKey {
            patient_id: record.patient_id.clone(),
            exercise_name: normalize_exercise_name(&record.exercise_name),
        };
        groups.entry(key).or_default().push(record.clone());
    }
    groups
}

pub fn normalize_exercise_name(name: &str) -> String {
    name.replace('"', "").trim().to_string()
}

fn check_rate(rate: f64) -> Result<(), String> {
    if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
        return Err(format!("{} is not a fraction in [0, 1]", rate));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}
