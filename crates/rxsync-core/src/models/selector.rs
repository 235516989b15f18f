//! Query selector for the local store

use serde::{Deserialize, Serialize};

/// Exact-match filter over `{patient_id, doctor_id}`.
///
/// Empty fields match everything, so `SearchSelector::default()` selects all
/// live records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSelector {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
}

impl SearchSelector {
    /// Selector for a patient/doctor pair, the shape the pull path queries.
    #[must_use]
    pub const fn for_pair(patient_id: i64, doctor_id: i64) -> Self {
        Self {
            patient_id: Some(patient_id),
            doctor_id: Some(doctor_id),
        }
    }

    /// True when no field constrains the query.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.patient_id.is_none() && self.doctor_id.is_none()
    }

    /// Whether a record's references satisfy this selector.
    #[must_use]
    pub fn matches(&self, patient_id: i64, doctor_id: i64) -> bool {
        self.patient_id.map_or(true, |id| id == patient_id)
            && self.doctor_id.map_or(true, |id| id == doctor_id)
    }
}
