use crate::core::aggregation::resolve_timestamp;
use crate::domain::model::{Prescription, SessionRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

pub const REMINDER_SUBJECT: &str = "Exercise Reminder";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderNotice {
    pub prescription_key: Option<String>,
    pub patient_id: String,
    pub email: Option<String>,
    pub subject: String,
    pub message: String,
}

/// 處方在 `today` 有效，且病患在任何排程日都沒有訓練紀錄時，需要提醒。
///
/// 訓練日以 UTC 日曆日比對；時間戳無法解析的紀錄不列入。
pub fn reminder_due(prescription: &Prescription, sessions: &[SessionRecord], today: NaiveDate) -> bool {
    if !prescription.is_active_on(today) {
        return false;
    }

    let scheduled: BTreeSet<NaiveDate> = prescription.scheduled_dates.iter().copied().collect();

    !sessions
        .iter()
        .filter(|s| s.patient_id == prescription.patient_id)
        .filter_map(|s| resolve_timestamp(s.timestamp.as_ref()).ok())
        .any(|instant| scheduled.contains(&instant.date_naive()))
}

pub fn reminder_message(prescription: &Prescription) -> String {
    let days: Vec<String> = prescription.weekdays.iter().map(|d| d.label()).collect();
    format!(
        "This is a reminder to perform the exercises prescribed by your physical therapist: {}, {} sets of {} reps with {} seconds hold time on {}.",
        prescription.exercise_name,
        prescription.sets,
        prescription.reps,
        prescription.hold_time_seconds,
        days.join(", ")
    )
}

pub fn due_reminders(
    prescriptions: &[Prescription],
    sessions: &[SessionRecord],
    today: NaiveDate,
) -> Vec<ReminderNotice> {
    let notices: Vec<ReminderNotice> = prescriptions
        .iter()
        .filter(|p| reminder_due(p, sessions, today))
        .map(|p| ReminderNotice {
            prescription_key: p.key.clone(),
            patient_id: p.patient_id.clone(),
            email: p.email.clone(),
            subject: REMINDER_SUBJECT.to_string(),
            message: reminder_message(p),
        })
        .collect();

    tracing::debug!(
        "{} of {} prescription(s) need a reminder on {}",
        notices.len(),
        prescriptions.len(),
        today
    );
    notices
}
