//! Stored roster entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::WeeklyPayload;

/// One student's saved week for one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSchedule {
    pub course: String,
    pub email: String,
    pub name: String,
    pub availability: WeeklyPayload,
    pub updated_at: DateTime<Utc>,
}

impl StudentSchedule {
    pub fn new(
        course: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        availability: WeeklyPayload,
    ) -> Self {
        Self {
            course: course.into(),
            email: email.into(),
            name: name.into(),
            availability,
            updated_at: Utc::now(),
        }
    }
}
