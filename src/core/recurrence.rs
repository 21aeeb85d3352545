//! Expands a weekly prescription into the concrete calendar dates it covers.

use crate::domain::model::{DayOfWeek, Prescription};
use crate::utils::error::ValidationError;
use chrono::{Days, NaiveDate};
use std::collections::BTreeSet;

/// 展開 [start, end] 內所有落在 `weekdays` 的日期，遞增且不重複。
///
/// 使用 `NaiveDate` 運算，不帶時間部分，日光節約時間不會讓星期跑掉。
/// 每一輪都先檢查 `d <= end` 才加入，不會產生超出區間的日期。
pub fn expand(
    start: NaiveDate,
    end: NaiveDate,
    weekdays: &BTreeSet<DayOfWeek>,
) -> Result<Vec<NaiveDate>, ValidationError> {
    if start > end {
        return Err(ValidationError::InvalidWindow { start, end });
    }

    let start_index = DayOfWeek::of(start).index();
    let mut dates = BTreeSet::new();

    for day in weekdays {
        let offset = (day.index() + 7 - start_index) % 7;
        let mut current = start.checked_add_days(Days::new(u64::from(offset)));

        while let Some(date) = current {
            if date > end {
                break;
            }
            dates.insert(date);
            current = date.checked_add_days(Days::new(7));
        }
    }

    tracing::debug!(
        "Expanded {}..{} over {} weekday(s) into {} date(s)",
        start,
        end,
        weekdays.len(),
        dates.len()
    );

    Ok(dates.into_iter().collect())
}

/// 先解析 "Every Monday" 之類的標籤，再展開
pub fn expand_labels<S: AsRef<str>>(
    start: NaiveDate,
    end: NaiveDate,
    labels: &[S],
) -> Result<Vec<NaiveDate>, ValidationError> {
    let weekdays = parse_weekdays(labels)?;
    expand(start, end, &weekdays)
}

pub fn parse_weekdays<S: AsRef<str>>(labels: &[S]) -> Result<BTreeSet<DayOfWeek>, ValidationError> {
    labels
        .iter()
        .map(|label| DayOfWeek::from_label(label.as_ref()))
        .collect()
}

/// 保留輸入順序的版本，提醒訊息照處方上的順序列出星期
pub fn weekdays_in_order<S: AsRef<str>>(labels: &[S]) -> Result<Vec<DayOfWeek>, ValidationError> {
    let mut days = Vec::with_capacity(labels.len());
    for label in labels {
        let day = DayOfWeek::from_label(label.as_ref())?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}

/// 依處方本身的欄位重新計算排程
pub fn expand_prescription(prescription: &Prescription) -> Result<Vec<NaiveDate>, ValidationError> {
    let weekdays: BTreeSet<DayOfWeek> = prescription.weekdays.iter().copied().collect();
    expand(prescription.start_date, prescription.end_date, &weekdays)
}
