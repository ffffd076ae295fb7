//! Leave / day-absence repository (PostgreSQL)

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use super::{rearrangements::unique_violation, LeaveStore};
use crate::{
    error::{AppError, AppResult},
    models::{LeaveKind, LeaveRecord, LeaveStatus},
};

#[derive(FromRow)]
struct LeaveRow {
    id: Uuid,
    faculty_id: String,
    kind: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<LeaveRow> for LeaveRecord {
    type Error = AppError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        Ok(LeaveRecord {
            id: row.id,
            faculty_id: row.faculty_id,
            kind: row.kind.parse()?,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status: row.status.parse()?,
            created_at: row.created_at,
            decided_at: row.decided_at,
        })
    }
}

#[derive(Clone)]
pub struct LeavesRepository {
    pool: Pool<Postgres>,
}

impl LeavesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveStore for LeavesRepository {
    async fn is_on_approved_leave(&self, faculty_id: &str, date: NaiveDate) -> AppResult<bool> {
        let on_leave: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM leave_records
                WHERE faculty_id = $1 AND status = $2
                  AND start_date <= $3 AND end_date >= $3
            )
            "#,
        )
        .bind(faculty_id)
        .bind(LeaveStatus::Approved.as_str())
        .bind(date)
        .fetch_one(&self.pool)
        .await?;
        Ok(on_leave)
    }

    async fn insert(&self, record: LeaveRecord) -> AppResult<LeaveRecord> {
        let row = sqlx::query_as::<_, LeaveRow>(
            r#"
            INSERT INTO leave_records (
                id, faculty_id, kind, start_date, end_date, reason, status, created_at, decided_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(&record.faculty_id)
        .bind(record.kind.as_str())
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(&record.reason)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .bind(record.decided_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => AppError::Conflict(format!(
                "Faculty {} is already marked absent on {}",
                record.faculty_id, record.start_date
            )),
            None => AppError::Database(e),
        })?;
        row.try_into()
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<LeaveRecord>> {
        sqlx::query_as::<_, LeaveRow>("SELECT * FROM leave_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(LeaveRecord::try_from)
            .transpose()
    }

    async fn decide(
        &self,
        id: Uuid,
        status: LeaveStatus,
        at: DateTime<Utc>,
    ) -> AppResult<Option<LeaveRecord>> {
        sqlx::query_as::<_, LeaveRow>(
            r#"
            UPDATE leave_records SET status = $2, decided_at = $3
            WHERE id = $1 AND status = $4
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(at)
        .bind(LeaveStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(LeaveRecord::try_from)
        .transpose()
    }

    async fn list_for_faculty(&self, faculty_id: &str) -> AppResult<Vec<LeaveRecord>> {
        let rows = sqlx::query_as::<_, LeaveRow>(
            "SELECT * FROM leave_records WHERE faculty_id = $1 ORDER BY start_date DESC",
        )
        .bind(faculty_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(LeaveRecord::try_from).collect()
    }

    async fn find_day_absence(
        &self,
        faculty_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<LeaveRecord>> {
        sqlx::query_as::<_, LeaveRow>(
            "SELECT * FROM leave_records WHERE faculty_id = $1 AND kind = $2 AND start_date = $3",
        )
        .bind(faculty_id)
        .bind(LeaveKind::DayAbsence.as_str())
        .bind(date)
        .fetch_optional(&self.pool)
        .await?
        .map(LeaveRecord::try_from)
        .transpose()
    }
}
