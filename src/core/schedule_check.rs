use crate::core::recurrence::expand_prescription;
use crate::domain::model::Prescription;
use crate::utils::error::ValidationError;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// 儲存的 `dates` 與重新展開結果的比對
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCheck {
    pub key: Option<String>,
    pub patient_id: String,
    pub exercise_name: String,
    pub expected: Vec<NaiveDate>,
    /// 有存但不該存在的日期（例如超出結束日一週）
    pub phantom: Vec<NaiveDate>,
    pub missing: Vec<NaiveDate>,
    pub duplicated: Vec<NaiveDate>,
}

impl ScheduleCheck {
    pub fn is_consistent(&self) -> bool {
        self.phantom.is_empty() && self.missing.is_empty() && self.duplicated.is_empty()
    }
}

pub fn check_schedule(prescription: &Prescription) -> Result<ScheduleCheck, ValidationError> {
    let expected = expand_prescription(prescription)?;
    let expected_set: BTreeSet<NaiveDate> = expected.iter().copied().collect();

    let mut seen = BTreeSet::new();
    let mut duplicated = BTreeSet::new();
    for date in &prescription.scheduled_dates {
        if !seen.insert(*date) {
            duplicated.insert(*date);
        }
    }

    let phantom: Vec<NaiveDate> = seen.difference(&expected_set).copied().collect();
    let missing: Vec<NaiveDate> = expected_set.difference(&seen).copied().collect();

    let check = ScheduleCheck {
        key: prescription.key.clone(),
        patient_id: prescription.patient_id.clone(),
        exercise_name: prescription.exercise_name.clone(),
        expected,
        phantom,
        missing,
        duplicated: duplicated.into_iter().collect(),
    };

    if !check.is_consistent() {
        tracing::warn!(
            "⚠️ Stored schedule for '{}' ({}) differs: {} phantom, {} missing, {} duplicated",
            check.exercise_name,
            check.patient_id,
            check.phantom.len(),
            check.missing.len(),
            check.duplicated.len()
        );
    }

    Ok(check)
}
