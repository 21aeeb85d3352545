use crate::domain::model::AdherenceReport;
use chrono::{DateTime, NaiveDate, TimeZone};

/// 已經過去的排程日比例（百分比）。
///
/// 排程日早於參考時間所在的日曆日（以參考時間自己的時區判斷）才算完成；
/// 沒有任何排程日時回傳 0%。
pub fn adherence<Tz: TimeZone>(scheduled_dates: &[NaiveDate], reference: &DateTime<Tz>) -> AdherenceReport {
    adherence_on(scheduled_dates, reference.date_naive())
}

pub fn adherence_on(scheduled_dates: &[NaiveDate], reference_date: NaiveDate) -> AdherenceReport {
    let total = scheduled_dates.len();
    let completed = scheduled_dates
        .iter()
        .filter(|date| **date < reference_date)
        .count();

    AdherenceReport {
        percent_complete: percent(completed, total),
        completed,
        total,
        reference_date,
    }
}

// 四捨五入，.5 進位
fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    ((200 * completed + total) / (2 * total)) as u8
}
