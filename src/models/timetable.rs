//! Weekly timetable models (period grid, classes, recurring entries)

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{DayOfWeek, SubjectType};
use crate::{
    config::TimetableConfig,
    error::{AppError, AppResult},
};

// ---------------------------------------------------------------------------
// Period grid
// ---------------------------------------------------------------------------

/// A named interval of the teaching day (e.g. "P3") or a break ("SB", "LB")
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PeriodDefinition {
    pub id: String,
    /// Start time (HH:MM)
    pub start: String,
    /// End time (HH:MM)
    pub end: String,
    #[serde(default)]
    pub is_break: bool,
}

/// Ordered daily periods plus the lab layout rule
#[derive(Debug, Clone)]
pub struct PeriodGrid {
    periods: Vec<PeriodDefinition>,
    lab_span: usize,
}

impl PeriodGrid {
    pub fn new(periods: Vec<PeriodDefinition>, lab_span: usize) -> Self {
        Self {
            periods,
            lab_span: lab_span.max(1),
        }
    }

    pub fn from_config(config: &TimetableConfig) -> Self {
        Self::new(config.periods.clone(), config.lab_span as usize)
    }

    pub fn periods(&self) -> &[PeriodDefinition] {
        &self.periods
    }

    pub fn get(&self, period_id: &str) -> Option<&PeriodDefinition> {
        self.periods.iter().find(|p| p.id == period_id)
    }

    /// Position in the day, unknown ids sort last
    pub fn order_of(&self, period_id: &str) -> usize {
        self.periods
            .iter()
            .position(|p| p.id == period_id)
            .unwrap_or(usize::MAX)
    }

    /// Fails unless `period_id` names a teaching (non-break) period
    pub fn require_teaching_period(&self, period_id: &str) -> AppResult<&PeriodDefinition> {
        match self.get(period_id) {
            Some(p) if p.is_break => Err(AppError::Validation(format!(
                "Period {} is a break, not a teaching period",
                period_id
            ))),
            Some(p) => Ok(p),
            None => Err(AppError::Validation(format!("Unknown period {}", period_id))),
        }
    }

    /// Every period an entry occupies. A lab anchored at P covers P and the
    /// following teaching periods up to the lab span; breaks are skipped.
    pub fn covered_periods(&self, entry: &WeeklyScheduleEntry) -> Vec<String> {
        let span = match entry.subject_type {
            SubjectType::Theory => 1,
            SubjectType::Lab => self.lab_span,
        };

        let Some(start) = self.periods.iter().position(|p| p.id == entry.period_id) else {
            return vec![entry.period_id.clone()];
        };

        self.periods[start..]
            .iter()
            .filter(|p| !p.is_break)
            .take(span)
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn covers(&self, entry: &WeeklyScheduleEntry, period_id: &str) -> bool {
        self.covered_periods(entry).iter().any(|p| p == period_id)
    }
}

impl Default for PeriodGrid {
    fn default() -> Self {
        Self::from_config(&TimetableConfig::default())
    }
}

// ---------------------------------------------------------------------------
// ClassKey
// ---------------------------------------------------------------------------

/// Identifies one class: (department, year, semester, section)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct ClassKey {
    pub department_id: String,
    pub year: i16,
    pub semester: i16,
    pub section: String,
}

impl ClassKey {
    /// Short display label, e.g. "Year2-A"
    pub fn label(&self) -> String {
        format!("Year{}-{}", self.year, self.section)
    }
}

// ---------------------------------------------------------------------------
// WeeklyScheduleEntry
// ---------------------------------------------------------------------------

/// Recurring binding of a class period to a subject and faculty.
/// Labs are stored once, at their anchor period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WeeklyScheduleEntry {
    pub department_id: String,
    pub year: i16,
    pub semester: i16,
    pub section: String,
    pub day_of_week: DayOfWeek,
    pub period_id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub subject_type: SubjectType,
    pub faculty_id: String,
    pub faculty_name: String,
    /// Second lab instructor, labs only
    pub secondary_faculty_id: Option<String>,
    pub secondary_faculty_name: Option<String>,
    pub room: Option<String>,
}

impl WeeklyScheduleEntry {
    pub fn class_key(&self) -> ClassKey {
        ClassKey {
            department_id: self.department_id.clone(),
            year: self.year,
            semester: self.semester,
            section: self.section.clone(),
        }
    }

    /// Primary or secondary faculty of this entry
    pub fn is_taught_by(&self, faculty_id: &str) -> bool {
        self.faculty_id == faculty_id || self.secondary_faculty_id.as_deref() == Some(faculty_id)
    }
}

/// One entry of a class timetable publication
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PublishedEntry {
    pub day_of_week: DayOfWeek,
    #[validate(length(min = 1, message = "period_id is required"))]
    pub period_id: String,
    #[validate(length(min = 1, message = "subject_id is required"))]
    pub subject_id: String,
    #[validate(length(min = 1, message = "subject_name is required"))]
    pub subject_name: String,
    pub subject_type: SubjectType,
    #[validate(length(min = 1, message = "faculty_id is required"))]
    pub faculty_id: String,
    pub faculty_name: String,
    pub secondary_faculty_id: Option<String>,
    pub secondary_faculty_name: Option<String>,
    pub room: Option<String>,
}

impl PublishedEntry {
    pub fn into_entry(self, class: &ClassKey) -> WeeklyScheduleEntry {
        WeeklyScheduleEntry {
            department_id: class.department_id.clone(),
            year: class.year,
            semester: class.semester,
            section: class.section.clone(),
            day_of_week: self.day_of_week,
            period_id: self.period_id,
            subject_id: self.subject_id,
            subject_name: self.subject_name,
            subject_type: self.subject_type,
            faculty_id: self.faculty_id,
            faculty_name: self.faculty_name,
            secondary_faculty_id: self.secondary_faculty_id,
            secondary_faculty_name: self.secondary_faculty_name,
            room: self.room,
        }
    }
}

/// Publish (replace) a class timetable
#[derive(Debug, Deserialize, ToSchema)]
pub struct PublishTimetable {
    pub entries: Vec<PublishedEntry>,
}
