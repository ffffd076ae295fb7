//! Leave and day-absence models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{LeaveKind, LeaveStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaveRecord {
    pub id: Uuid,
    pub faculty_id: String,
    pub kind: LeaveKind,
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl LeaveRecord {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Leave application
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ApplyLeave {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 1, message = "reason is required"))]
    pub reason: String,
}

/// Approve or reject a pending leave
#[derive(Debug, Deserialize, ToSchema)]
pub struct DecideLeave {
    pub status: LeaveStatus,
}

/// Full-day absence for the acting faculty
#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAbsent {
    pub date: NaiveDate,
}
