//! In-memory store implementing every repository contract
//!
//! All state sits behind one lock, so each trait method is atomic with
//! respect to every other; that is what makes the conditional transitions
//! safe under concurrent callers.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FacultyDirectory, LeaveStore, RearrangementStore, TimetableStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        ClassKey, DayOfWeek, Faculty, LeaveKind, LeaveRecord, LeaveStatus, RearrangementQuery,
        RearrangementRequest, RequestStatus, TransitionOutcome, WeeklyScheduleEntry,
    },
};

#[derive(Default)]
struct MemoryState {
    faculty: HashMap<String, Faculty>,
    entries: Vec<WeeklyScheduleEntry>,
    leaves: Vec<LeaveRecord>,
    requests: Vec<RearrangementRequest>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimetableStore for MemoryStore {
    async fn entries_for_weekday(
        &self,
        department_id: &str,
        day: DayOfWeek,
    ) -> AppResult<Vec<WeeklyScheduleEntry>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .filter(|e| e.department_id == department_id && e.day_of_week == day)
            .cloned()
            .collect())
    }

    async fn entries_for_faculty(
        &self,
        faculty_id: &str,
        day: DayOfWeek,
    ) -> AppResult<Vec<WeeklyScheduleEntry>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .filter(|e| e.day_of_week == day && e.is_taught_by(faculty_id))
            .cloned()
            .collect())
    }

    async fn entries_for_class(&self, class: &ClassKey) -> AppResult<Vec<WeeklyScheduleEntry>> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .iter()
            .filter(|e| &e.class_key() == class)
            .cloned()
            .collect())
    }

    async fn replace_class(
        &self,
        class: &ClassKey,
        entries: Vec<WeeklyScheduleEntry>,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.entries.retain(|e| &e.class_key() != class);
        state.entries.extend(entries);
        Ok(())
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn is_on_approved_leave(&self, faculty_id: &str, date: NaiveDate) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state.leaves.iter().any(|l| {
            l.faculty_id == faculty_id && l.status == LeaveStatus::Approved && l.covers(date)
        }))
    }

    async fn insert(&self, record: LeaveRecord) -> AppResult<LeaveRecord> {
        let mut state = self.state.write().await;
        if record.kind == LeaveKind::DayAbsence
            && state.leaves.iter().any(|l| {
                l.kind == LeaveKind::DayAbsence
                    && l.faculty_id == record.faculty_id
                    && l.start_date == record.start_date
            })
        {
            return Err(AppError::Conflict(format!(
                "Faculty {} is already marked absent on {}",
                record.faculty_id, record.start_date
            )));
        }
        state.leaves.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<LeaveRecord>> {
        let state = self.state.read().await;
        Ok(state.leaves.iter().find(|l| l.id == id).cloned())
    }

    async fn decide(
        &self,
        id: Uuid,
        status: LeaveStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<LeaveRecord>> {
        let mut state = self.state.write().await;
        match state
            .leaves
            .iter_mut()
            .find(|l| l.id == id && l.status == LeaveStatus::Pending)
        {
            Some(leave) => {
                leave.status = status;
                leave.decided_at = Some(at);
                Ok(Some(leave.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_for_faculty(&self, faculty_id: &str) -> AppResult<Vec<LeaveRecord>> {
        let state = self.state.read().await;
        let mut leaves: Vec<LeaveRecord> = state
            .leaves
            .iter()
            .filter(|l| l.faculty_id == faculty_id)
            .cloned()
            .collect();
        leaves.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(leaves)
    }

    async fn find_day_absence(
        &self,
        faculty_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<LeaveRecord>> {
        let state = self.state.read().await;
        Ok(state
            .leaves
            .iter()
            .find(|l| {
                l.kind == LeaveKind::DayAbsence && l.faculty_id == faculty_id && l.start_date == date
            })
            .cloned())
    }
}

#[async_trait]
impl FacultyDirectory for MemoryStore {
    async fn list_faculty(&self, department_id: &str) -> AppResult<Vec<Faculty>> {
        let state = self.state.read().await;
        let mut faculty: Vec<Faculty> = state
            .faculty
            .values()
            .filter(|f| f.department_id == department_id)
            .cloned()
            .collect();
        faculty.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(faculty)
    }

    async fn get_faculty(&self, faculty_id: &str) -> AppResult<Option<Faculty>> {
        let state = self.state.read().await;
        Ok(state.faculty.get(faculty_id).cloned())
    }

    async fn upsert_faculty(&self, faculty: Faculty) -> AppResult<Faculty> {
        let mut state = self.state.write().await;
        state.faculty.insert(faculty.id.clone(), faculty.clone());
        Ok(faculty)
    }
}

#[async_trait]
impl RearrangementStore for MemoryStore {
    async fn insert(&self, request: RearrangementRequest) -> AppResult<RearrangementRequest> {
        let mut state = self.state.write().await;
        let duplicate = state.requests.iter().any(|r| {
            r.date == request.date
                && r.period_id == request.period_id
                && r.original_faculty_id == request.original_faculty_id
                && r.status.is_live()
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "A live rearrangement already exists for {} on {} {}",
                request.original_faculty_id, request.date, request.period_id
            )));
        }
        state.requests.push(request.clone());
        Ok(request)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<RearrangementRequest>> {
        let state = self.state.read().await;
        Ok(state.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, query: &RearrangementQuery) -> AppResult<Vec<RearrangementRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<RearrangementRequest> = state
            .requests
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(requests)
    }

    async fn transition(
        &self,
        id: Uuid,
        to: RequestStatus,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> AppResult<TransitionOutcome> {
        let mut state = self.state.write().await;

        let current = state
            .requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Rearrangement {} not found", id)))?;

        if current.status != RequestStatus::Pending {
            return Ok(TransitionOutcome::NotPending(current));
        }

        if to == RequestStatus::Accepted {
            let booked = state.requests.iter().any(|r| {
                r.id != id
                    && r.status == RequestStatus::Accepted
                    && r.date == current.date
                    && r.period_id == current.period_id
                    && r.substitute_faculty_id == current.substitute_faculty_id
            });
            if booked {
                return Ok(TransitionOutcome::SubstituteBooked);
            }
        }

        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::Internal(format!("Rearrangement {} vanished", id)))?;
        request.status = to;
        request.responded_at = Some(at);
        if reason.is_some() {
            request.reason = reason;
        }
        Ok(TransitionOutcome::Applied(request.clone()))
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut state = self.state.write().await;
        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Rearrangement {} not found", id)))?;
        if request.deleted_at.is_none() {
            request.deleted_at = Some(at);
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
