//! Repository layer: storage contracts and their backends
//!
//! Each collaborator of the engine is a trait so that the services run
//! unchanged over PostgreSQL or the in-memory store.

pub mod faculty;
pub mod leaves;
pub mod memory;
pub mod rearrangements;
pub mod timetable;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        ClassKey, DayOfWeek, Faculty, LeaveRecord, LeaveStatus, RearrangementQuery,
        RearrangementRequest, RequestStatus, TransitionOutcome, WeeklyScheduleEntry,
    },
};

/// Read access to the published weekly timetable, plus the publish step
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimetableStore: Send + Sync {
    /// Every entry of a department's classes on a weekday
    async fn entries_for_weekday(
        &self,
        department_id: &str,
        day: DayOfWeek,
    ) -> AppResult<Vec<WeeklyScheduleEntry>>;

    /// Entries where the faculty is primary or secondary instructor
    async fn entries_for_faculty(
        &self,
        faculty_id: &str,
        day: DayOfWeek,
    ) -> AppResult<Vec<WeeklyScheduleEntry>>;

    async fn entries_for_class(&self, class: &ClassKey) -> AppResult<Vec<WeeklyScheduleEntry>>;

    /// Replace a class's timetable wholesale
    async fn replace_class(
        &self,
        class: &ClassKey,
        entries: Vec<WeeklyScheduleEntry>,
    ) -> AppResult<()>;
}

/// Leave applications and day absences
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn is_on_approved_leave(&self, faculty_id: &str, date: NaiveDate) -> AppResult<bool>;

    async fn insert(&self, record: LeaveRecord) -> AppResult<LeaveRecord>;

    async fn get(&self, id: Uuid) -> AppResult<Option<LeaveRecord>>;

    /// Pending → `status`; `None` when the leave is no longer pending
    async fn decide(
        &self,
        id: Uuid,
        status: LeaveStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<LeaveRecord>>;

    async fn list_for_faculty(&self, faculty_id: &str) -> AppResult<Vec<LeaveRecord>>;

    async fn find_day_absence(
        &self,
        faculty_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<LeaveRecord>>;
}

/// Faculty directory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FacultyDirectory: Send + Sync {
    async fn list_faculty(&self, department_id: &str) -> AppResult<Vec<Faculty>>;

    async fn get_faculty(&self, faculty_id: &str) -> AppResult<Option<Faculty>>;

    async fn upsert_faculty(&self, faculty: Faculty) -> AppResult<Faculty>;
}

/// Durable rearrangement requests. Status only ever moves through
/// [`RearrangementStore::transition`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RearrangementStore: Send + Sync {
    /// Persist a new pending request. Fails with `Conflict` when a pending or
    /// accepted request already exists for the same date, period and
    /// original faculty.
    async fn insert(&self, request: RearrangementRequest) -> AppResult<RearrangementRequest>;

    /// Fetch by id, deleted requests included
    async fn get(&self, id: Uuid) -> AppResult<Option<RearrangementRequest>>;

    /// Matching requests, newest first
    async fn list(&self, query: &RearrangementQuery) -> AppResult<Vec<RearrangementRequest>>;

    /// Compare-and-set from `pending` to `to`. Moving to `accepted` also
    /// verifies, atomically, that the substitute holds no other accepted
    /// request for the same date and period.
    async fn transition(
        &self,
        id: Uuid,
        to: RequestStatus,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> AppResult<TransitionOutcome>;

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Storage reachability
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding one handle per collaborator
#[derive(Clone)]
pub struct Repository {
    pub timetable: Arc<dyn TimetableStore>,
    pub leaves: Arc<dyn LeaveStore>,
    pub faculty: Arc<dyn FacultyDirectory>,
    pub rearrangements: Arc<dyn RearrangementStore>,
}

impl Repository {
    /// Create a PostgreSQL-backed repository with the given pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            timetable: Arc::new(timetable::TimetableRepository::new(pool.clone())),
            leaves: Arc::new(leaves::LeavesRepository::new(pool.clone())),
            faculty: Arc::new(faculty::FacultyRepository::new(pool.clone())),
            rearrangements: Arc::new(rearrangements::RearrangementsRepository::new(pool)),
        }
    }

    /// Create a repository over a fresh in-memory store
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Self {
            timetable: store.clone(),
            leaves: store.clone(),
            faculty: store.clone(),
            rearrangements: store,
        }
    }
}
