use crate::core::recurrence::{expand, parse_weekdays, weekdays_in_order};
use std::collections::BTreeSet;
use crate::domain::model::{DateWindow, Prescription};
use crate::utils::error::{Result, ValidationError};
use crate::utils::validation::Validate;
use chrono::NaiveDate;

/// 治療師送出的處方表單，建立前先驗證
#[derive(Debug, Clone, Default)]
pub struct PrescriptionDraft {
    pub patient_id: String,
    pub therapist_id: String,
    pub patient_name: Option<String>,
    pub email: Option<String>,
    pub exercise_name: String,
    pub sets: u32,
    pub reps: u32,
    pub hold_time_seconds: u32,
    pub window: Option<DateWindow>,
    pub weekday_labels: Vec<String>,
}

impl PrescriptionDraft {
    pub fn check(&self) -> std::result::Result<(), ValidationError> {
        for (field, value) in [
            ("patientId", &self.patient_id),
            ("therapistId", &self.therapist_id),
            ("exerciseName", &self.exercise_name),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField {
                    field: field.to_string(),
                });
            }
        }

        for (field, value) in [("sets", self.sets), ("reps", self.reps)] {
            if value == 0 {
                return Err(ValidationError::NonPositive {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if let Some(window) = &self.window {
            window.validate()?;
        }
        parse_weekdays(&self.weekday_labels)?;
        Ok(())
    }

    /// 沒指定期間時用 today 起兩週，並展開排程日
    pub fn build(self, today: NaiveDate) -> std::result::Result<Prescription, ValidationError> {
        self.check()?;

        let window = self.window.unwrap_or_else(|| DateWindow::starting_at(today));
        let weekdays = weekdays_in_order(&self.weekday_labels)?;
        let distinct: BTreeSet<_> = weekdays.iter().copied().collect();
        let scheduled_dates = expand(window.start, window.end, &distinct)?;

        tracing::info!(
            "📅 Prescribed '{}' for {}: {} session(s) between {} and {}",
            self.exercise_name,
            self.patient_id,
            scheduled_dates.len(),
            window.start,
            window.end
        );

        Ok(Prescription {
            key: None,
            patient_id: self.patient_id,
            therapist_id: self.therapist_id,
            patient_name: self.patient_name,
            email: self.email,
            exercise_name: self.exercise_name,
            sets: self.sets,
            reps: self.reps,
            hold_time_seconds: self.hold_time_seconds,
            start_date: window.start,
            end_date: window.end,
            weekdays,
            scheduled_dates,
        })
    }
}

impl Validate for PrescriptionDraft {
    fn validate(&self) -> Result<()> {
        self.check()?;
        Ok(())
    }
}
