use crate::domain::model::Prescription;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    pub date: NaiveDate,
}

pub fn event_title(prescription: &Prescription) -> String {
    format!(
        "{}\n{} sets of {} reps\nwith {} sec hold time",
        prescription.exercise_name,
        prescription.sets,
        prescription.reps,
        prescription.hold_time_seconds
    )
}

/// 某位病患所有處方的排程日，依日期排序
pub fn calendar_events(prescriptions: &[Prescription], patient_id: &str) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = prescriptions
        .iter()
        .filter(|p| p.patient_id == patient_id)
        .flat_map(|p| {
            let title = event_title(p);
            p.scheduled_dates.iter().map(move |date| CalendarEvent {
                title: title.clone(),
                date: *date,
            })
        })
        .collect();

    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.title.cmp(&b.title)));
    events
}
