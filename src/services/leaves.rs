//! Leave applications and day absences
//!
//! Approved records feed the availability check: a faculty member on approved
//! leave, or marked absent, is never offered as a substitute that day.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{leave::ApplyLeave, LeaveKind, LeaveRecord, LeaveStatus},
    repository::Repository,
};

#[derive(Clone)]
pub struct LeavesService {
    repository: Repository,
}

impl LeavesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// File a pending leave application
    pub async fn apply(&self, faculty_id: &str, data: ApplyLeave) -> AppResult<LeaveRecord> {
        data.validate()?;
        if data.end_date < data.start_date {
            return Err(AppError::Validation(
                "end_date must not be before start_date".to_string(),
            ));
        }
        self.require_faculty(faculty_id).await?;

        let record = self
            .repository
            .leaves
            .insert(LeaveRecord {
                id: Uuid::new_v4(),
                faculty_id: faculty_id.to_string(),
                kind: LeaveKind::Leave,
                start_date: data.start_date,
                end_date: data.end_date,
                reason: Some(data.reason),
                status: LeaveStatus::Pending,
                created_at: Utc::now(),
                decided_at: None,
            })
            .await?;

        tracing::info!(
            "Leave {} applied by {} ({} to {})",
            record.id,
            faculty_id,
            record.start_date,
            record.end_date
        );
        Ok(record)
    }

    /// Approve or reject a pending leave
    pub async fn decide(&self, leave_id: Uuid, status: LeaveStatus) -> AppResult<LeaveRecord> {
        if status == LeaveStatus::Pending {
            return Err(AppError::Validation(
                "A leave can only be approved or rejected".to_string(),
            ));
        }

        let current = self
            .repository
            .leaves
            .get(leave_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Leave {} not found", leave_id)))?;
        if current.status != LeaveStatus::Pending {
            return Err(AppError::AlreadyResolved(format!(
                "Leave {} is already {}",
                leave_id,
                current.status.as_str()
            )));
        }

        let decided = self
            .repository
            .leaves
            .decide(leave_id, status, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::AlreadyResolved(format!("Leave {} was decided concurrently", leave_id))
            })?;

        tracing::info!("Leave {} {}", decided.id, decided.status.as_str());
        Ok(decided)
    }

    /// Record a full-day absence, approved immediately. Marking the same
    /// day twice returns the existing record.
    pub async fn mark_absent(&self, faculty_id: &str, date: NaiveDate) -> AppResult<LeaveRecord> {
        self.require_faculty(faculty_id).await?;

        if let Some(existing) = self.repository.leaves.find_day_absence(faculty_id, date).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let inserted = self
            .repository
            .leaves
            .insert(LeaveRecord {
                id: Uuid::new_v4(),
                faculty_id: faculty_id.to_string(),
                kind: LeaveKind::DayAbsence,
                start_date: date,
                end_date: date,
                reason: None,
                status: LeaveStatus::Approved,
                created_at: now,
                decided_at: Some(now),
            })
            .await;

        match inserted {
            Ok(record) => {
                tracing::info!("{} marked absent on {}", faculty_id, date);
                Ok(record)
            }
            // Lost a race with an identical mark
            Err(AppError::Conflict(_)) => self
                .repository
                .leaves
                .find_day_absence(faculty_id, date)
                .await?
                .ok_or_else(|| AppError::Internal(format!("Day absence for {} vanished", faculty_id))),
            Err(e) => Err(e),
        }
    }

    pub async fn list(&self, faculty_id: &str) -> AppResult<Vec<LeaveRecord>> {
        self.repository.leaves.list_for_faculty(faculty_id).await
    }

    pub async fn is_on_approved_leave(&self, faculty_id: &str, date: NaiveDate) -> AppResult<bool> {
        self.repository.leaves.is_on_approved_leave(faculty_id, date).await
    }

    async fn require_faculty(&self, faculty_id: &str) -> AppResult<()> {
        self.repository
            .faculty
            .get_faculty(faculty_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Faculty {} not found", faculty_id)))
    }
}
