use crate::utils::error::ValidationError;
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// 處方可選的星期，編號 Sunday=0 .. Saturday=6
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayOfWeek {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Sunday",
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
        }
    }

    /// 表單上儲存的標籤格式，例如 "Every Monday"
    pub fn label(self) -> String {
        format!("Every {}", self.name())
    }

    /// 接受 "Monday"、"every monday" 等寫法
    pub fn from_label(label: &str) -> Result<Self, ValidationError> {
        let trimmed = label.trim();
        let lowered = trimmed.to_ascii_lowercase();
        let day = lowered.strip_prefix("every ").unwrap_or(&lowered).trim();

        Self::ALL
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(day))
            .ok_or_else(|| ValidationError::UnknownWeekday {
                label: trimmed.to_string(),
            })
    }

    pub fn from_chrono(weekday: chrono::Weekday) -> Self {
        // num_days_from_sunday 一定落在 0..=6
        Self::ALL[weekday.num_days_from_sunday() as usize]
    }

    pub fn of(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self::from_chrono(date.weekday())
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DayOfWeek {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

impl TryFrom<String> for DayOfWeek {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value)
    }
}

impl From<DayOfWeek> for String {
    fn from(day: DayOfWeek) -> Self {
        day.label()
    }
}

/// 日期區間，兩端皆包含。不合法的區間可以被建立，由 validate 檢出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub const DEFAULT_LENGTH_DAYS: u64 = 14;

    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// 新處方預設期間：今天起兩週
    pub fn starting_at(today: NaiveDate) -> Self {
        let end = today
            .checked_add_days(Days::new(Self::DEFAULT_LENGTH_DAYS))
            .unwrap_or(NaiveDate::MAX);
        Self { start: today, end }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start > self.end {
            return Err(ValidationError::InvalidWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub patient_id: String,
    #[serde(default, alias = "ptId")]
    pub therapist_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exercise_name: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub sets: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub reps: u32,
    #[serde(default, alias = "holdTime", deserialize_with = "lenient_u32")]
    pub hold_time_seconds: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 依輸入順序，重複的星期只留第一個
    #[serde(default, alias = "daysOfWeek", deserialize_with = "distinct_weekdays")]
    pub weekdays: Vec<DayOfWeek>,
    #[serde(default, alias = "dates")]
    pub scheduled_dates: Vec<NaiveDate>,
}

impl Prescription {
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.window().contains(date)
    }
}

/// 儲存層的時間格式 {seconds, nanoseconds}，欄位可能缺漏
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredInstant {
    pub seconds: Option<i64>,
    pub nanoseconds: Option<i64>,
}

impl StoredInstant {
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self {
            seconds: Some(instant.timestamp()),
            nanoseconds: Some(i64::from(instant.timestamp_subsec_nanos())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rep {
    pub success_rate_left: Option<f64>,
    pub success_rate_right: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub reps: Vec<Rep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub patient_id: String,
    pub exercise_name: String,
    pub timestamp: Option<StoredInstant>,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
}

impl SessionRecord {
    /// 錯誤訊息裡用來指出是哪一筆
    pub fn label(&self, position: usize) -> String {
        match &self.key {
            Some(key) => key.clone(),
            None => format!("#{}", position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedSessionPoint {
    pub timestamp: DateTime<Utc>,
    pub sequence_index: usize,
    pub total_sets: usize,
    pub total_reps: usize,
    pub avg_success_rate_left: Option<f64>,
    pub avg_success_rate_right: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceReport {
    pub percent_complete: u8,
    pub completed: usize,
    pub total: usize,
    pub reference_date: NaiveDate,
}

fn distinct_weekdays<'de, D>(deserializer: D) -> std::result::Result<Vec<DayOfWeek>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut days: Vec<DayOfWeek> = Vec::deserialize(deserializer)?;
    let mut seen = [false; 7];
    days.retain(|day| !std::mem::replace(&mut seen[day.index() as usize], true));
    Ok(days)
}

// 表單欄位常以字串存入，空字串視為 0
fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(u32),
        Text(String),
    }

    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(text) if text.trim().is_empty() => Ok(0),
        NumberOrText::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected a whole number, got '{}'", text))),
    }
}
