use crate::domain::model::AggregatedSessionPoint;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// 區間檢查產生的提示，Display 即為顯示給使用者的文字
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeNotice {
    StartAfterEnd,
    NoDataBefore(NaiveDate),
    NoDataAfter(NaiveDate),
}

impl fmt::Display for RangeNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeNotice::StartAfterEnd => f.write_str("Start date must be before end date"),
            RangeNotice::NoDataBefore(date) => {
                write!(f, "No exercise data before {}", date.format("%Y-%m-%d"))
            }
            RangeNotice::NoDataAfter(date) => {
                write!(f, "No exercise data after {}", date.format("%Y-%m-%d"))
            }
        }
    }
}

impl Serialize for RangeNotice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOutcome {
    pub filtered: Vec<AggregatedSessionPoint>,
    pub notifications: Vec<RangeNotice>,
}

impl FilterOutcome {
    /// start > end 時區間視為無效
    pub fn is_valid_range(&self) -> bool {
        !self.notifications.contains(&RangeNotice::StartAfterEnd)
    }

    pub fn messages(&self) -> Vec<String> {
        self.notifications.iter().map(|n| n.to_string()).collect()
    }
}

/// 以 UTC 日曆日篩選，見 `filter_in`
pub fn filter(
    points: &[AggregatedSessionPoint],
    requested_start: NaiveDate,
    requested_end: NaiveDate,
) -> FilterOutcome {
    filter_in(points, requested_start, requested_end, &Utc)
}

/// 篩出日曆日（在 `tz` 時區）落在 [start, end] 的資料點，兩端包含。
///
/// 三條提示規則各自判斷，可能同時出現。除了 start > end 以外，
/// 就算有提示也照樣回傳部分結果。`points` 需已依時間排序。
pub fn filter_in<Tz: TimeZone>(
    points: &[AggregatedSessionPoint],
    requested_start: NaiveDate,
    requested_end: NaiveDate,
    tz: &Tz,
) -> FilterOutcome {
    let day_of = |p: &AggregatedSessionPoint| p.timestamp.with_timezone(tz).date_naive();
    let mut notifications = Vec::new();

    let inverted = requested_start > requested_end;
    if inverted {
        notifications.push(RangeNotice::StartAfterEnd);
    }

    if let Some(earliest) = points.first().map(day_of) {
        if requested_start < earliest {
            notifications.push(RangeNotice::NoDataBefore(earliest));
        }
    }

    if let Some(latest) = points.last().map(day_of) {
        if requested_end > latest {
            notifications.push(RangeNotice::NoDataAfter(latest));
        }
    }

    let filtered = if inverted {
        Vec::new()
    } else {
        points
            .iter()
            .filter(|p| {
                let day = day_of(*p);
                requested_start <= day && day <= requested_end
            })
            .cloned()
            .collect()
    };

    tracing::debug!(
        "Range {}..{} kept {} of {} point(s), {} notice(s)",
        requested_start,
        requested_end,
        filtered.len(),
        points.len(),
        notifications.len()
    );

    FilterOutcome {
        filtered,
        notifications,
    }
}
