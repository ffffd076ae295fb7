//! Effective (date-resolved) schedule views

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{
    enums::{DayOfWeek, SubjectType},
    timetable::ClassKey,
};

/// Whose schedule is being resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleScope {
    Faculty { faculty_id: String },
    Class { class: ClassKey },
}

/// How a period differs from the weekly timetable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// As in the weekly timetable
    Scheduled,
    /// Class view: a substitute teaches the period
    Substituted,
    /// Absent faculty's view: the period is covered by someone else
    CoveredBySubstitute,
    /// Substitute's view: an extra period taken over from someone else
    Covering,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubstitutionInfo {
    pub request_id: Uuid,
    pub original_faculty_id: String,
    pub original_faculty_name: String,
    pub substitute_faculty_id: String,
    pub substitute_faculty_name: String,
}

/// One resolved period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EffectiveSlot {
    pub period_id: String,
    pub subject_id: Option<String>,
    pub subject_name: String,
    pub subject_type: Option<SubjectType>,
    pub class: ClassKey,
    pub class_label: String,
    pub room: Option<String>,
    /// Who actually teaches the period on this date
    pub faculty_id: String,
    pub faculty_name: String,
    pub status: SlotStatus,
    pub substitution: Option<SubstitutionInfo>,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EffectiveSchedule {
    pub scope: ScheduleScope,
    pub date: NaiveDate,
    /// `None` on days without classes
    pub day_of_week: Option<DayOfWeek>,
    pub slots: Vec<EffectiveSlot>,
}

/// Query parameters for schedule resolution
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EffectiveScheduleQuery {
    /// Date (YYYY-MM-DD)
    pub date: NaiveDate,
}
