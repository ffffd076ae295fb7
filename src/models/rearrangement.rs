//! Rearrangement (substitution) request models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{
    enums::{Decision, RequestStatus},
    timetable::ClassKey,
};

/// A single-date, single-period substitution of one faculty by another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RearrangementRequest {
    pub id: Uuid,
    pub date: NaiveDate,
    pub period_id: String,
    pub department_id: String,
    pub year: i16,
    pub semester: i16,
    pub section: String,
    /// Display label of the class, e.g. "Year2-A"
    pub class_label: String,
    pub subject_name: String,
    /// The absent party
    pub original_faculty_id: String,
    pub original_faculty_name: String,
    pub substitute_faculty_id: String,
    pub substitute_faculty_name: String,
    pub status: RequestStatus,
    /// Set when the requester cancels
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    /// Hidden from listings; accepted requests still hold their slot
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RearrangementRequest {
    pub fn class_key(&self) -> ClassKey {
        ClassKey {
            department_id: self.department_id.clone(),
            year: self.year,
            semester: self.semester,
            section: self.section.clone(),
        }
    }
}

/// Create request payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateRearrangement {
    /// Calendar date of the single occurrence (YYYY-MM-DD)
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "period_id is required"))]
    pub period_id: String,
    #[validate(length(min = 1, message = "department_id is required"))]
    pub department_id: String,
    /// Absent faculty; defaults to the acting faculty over HTTP
    #[serde(default)]
    pub original_faculty_id: String,
    #[validate(length(min = 1, message = "substitute_faculty_id is required"))]
    pub substitute_faculty_id: String,
    /// Display override, the timetable's subject is used otherwise
    pub subject_name: Option<String>,
    /// Display override, derived from the class otherwise
    pub class_label: Option<String>,
}

/// Substitute's response payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RespondRearrangement {
    pub decision: Decision,
}

/// Requester's cancellation payload
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CancelRearrangement {
    pub reason: Option<String>,
}

/// Store-level filter over rearrangement requests
#[derive(Debug, Clone, Default)]
pub struct RearrangementQuery {
    pub date: Option<NaiveDate>,
    pub period_id: Option<String>,
    pub department_id: Option<String>,
    pub original_faculty_id: Option<String>,
    pub substitute_faculty_id: Option<String>,
    pub statuses: Vec<RequestStatus>,
    pub include_deleted: bool,
}

impl RearrangementQuery {
    /// Accepted requests on a date, deleted ones included
    pub fn accepted_on(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            statuses: vec![RequestStatus::Accepted],
            include_deleted: true,
            ..Default::default()
        }
    }

    pub fn matches(&self, r: &RearrangementRequest) -> bool {
        self.date.map_or(true, |d| r.date == d)
            && self.period_id.as_ref().map_or(true, |p| &r.period_id == p)
            && self.department_id.as_ref().map_or(true, |d| &r.department_id == d)
            && self
                .original_faculty_id
                .as_ref()
                .map_or(true, |f| &r.original_faculty_id == f)
            && self
                .substitute_faculty_id
                .as_ref()
                .map_or(true, |f| &r.substitute_faculty_id == f)
            && (self.statuses.is_empty() || self.statuses.contains(&r.status))
            && (self.include_deleted || r.deleted_at.is_none())
    }
}

/// Query parameters for the date listing
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct RearrangementListQuery {
    /// Date (YYYY-MM-DD)
    pub date: NaiveDate,
    pub department_id: Option<String>,
}

/// Result of a compare-and-set status transition
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The request was pending and now holds the new status
    Applied(RearrangementRequest),
    /// The request had already left `pending`; current state returned
    NotPending(RearrangementRequest),
    /// Acceptance refused: the substitute already holds an accepted request
    /// for the same date and period
    SubstituteBooked,
}
