//! Rearrangement request repository (PostgreSQL)
//!
//! Two partial unique indexes back the invariants:
//! - `rearrangement_live_original_idx` on (date, period, original faculty)
//!   for pending/accepted rows,
//! - `rearrangement_booked_substitute_idx` on (date, period, substitute)
//!   for accepted rows.
//!
//! Status changes are conditional updates (`WHERE status = 'pending'`), so two
//! concurrent responders cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use super::RearrangementStore;
use crate::{
    error::{AppError, AppResult},
    models::{RearrangementQuery, RearrangementRequest, RequestStatus, TransitionOutcome},
};

const BOOKED_SUBSTITUTE_INDEX: &str = "rearrangement_booked_substitute_idx";

/// Name of the violated unique constraint, if `e` is a unique violation
pub(crate) fn unique_violation(e: &sqlx::Error) -> Option<String> {
    match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

#[derive(FromRow)]
struct RearrangementRow {
    id: Uuid,
    request_date: NaiveDate,
    period_id: String,
    department_id: String,
    year: i16,
    semester: i16,
    section: String,
    class_label: String,
    subject_name: String,
    original_faculty_id: String,
    original_faculty_name: String,
    substitute_faculty_id: String,
    substitute_faculty_name: String,
    status: String,
    reason: Option<String>,
    created_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<RearrangementRow> for RearrangementRequest {
    type Error = AppError;

    fn try_from(row: RearrangementRow) -> Result<Self, Self::Error> {
        Ok(RearrangementRequest {
            id: row.id,
            date: row.request_date,
            period_id: row.period_id,
            department_id: row.department_id,
            year: row.year,
            semester: row.semester,
            section: row.section,
            class_label: row.class_label,
            subject_name: row.subject_name,
            original_faculty_id: row.original_faculty_id,
            original_faculty_name: row.original_faculty_name,
            substitute_faculty_id: row.substitute_faculty_id,
            substitute_faculty_name: row.substitute_faculty_name,
            status: row.status.parse()?,
            reason: row.reason,
            created_at: row.created_at,
            responded_at: row.responded_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[derive(Clone)]
pub struct RearrangementsRepository {
    pool: Pool<Postgres>,
}

impl RearrangementsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RearrangementStore for RearrangementsRepository {
    async fn insert(&self, request: RearrangementRequest) -> AppResult<RearrangementRequest> {
        let row = sqlx::query_as::<_, RearrangementRow>(
            r#"
            INSERT INTO rearrangement_requests (
                id, request_date, period_id, department_id, year, semester, section,
                class_label, subject_name, original_faculty_id, original_faculty_name,
                substitute_faculty_id, substitute_faculty_name, status, reason, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.date)
        .bind(&request.period_id)
        .bind(&request.department_id)
        .bind(request.year)
        .bind(request.semester)
        .bind(&request.section)
        .bind(&request.class_label)
        .bind(&request.subject_name)
        .bind(&request.original_faculty_id)
        .bind(&request.original_faculty_name)
        .bind(&request.substitute_faculty_id)
        .bind(&request.substitute_faculty_name)
        .bind(request.status.as_str())
        .bind(&request.reason)
        .bind(request.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(_) => AppError::Conflict(format!(
                "A live rearrangement already exists for {} on {} {}",
                request.original_faculty_id, request.date, request.period_id
            )),
            None => AppError::Database(e),
        })?;
        row.try_into()
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<RearrangementRequest>> {
        sqlx::query_as::<_, RearrangementRow>("SELECT * FROM rearrangement_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(RearrangementRequest::try_from)
            .transpose()
    }

    async fn list(&self, query: &RearrangementQuery) -> AppResult<Vec<RearrangementRequest>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.date.is_some() {
            conditions.push(format!("request_date = ${}", idx));
            idx += 1;
        }
        if query.period_id.is_some() {
            conditions.push(format!("period_id = ${}", idx));
            idx += 1;
        }
        if query.department_id.is_some() {
            conditions.push(format!("department_id = ${}", idx));
            idx += 1;
        }
        if query.original_faculty_id.is_some() {
            conditions.push(format!("original_faculty_id = ${}", idx));
            idx += 1;
        }
        if query.substitute_faculty_id.is_some() {
            conditions.push(format!("substitute_faculty_id = ${}", idx));
            idx += 1;
        }
        if !query.statuses.is_empty() {
            conditions.push(format!("status = ANY(${})", idx));
        }
        if !query.include_deleted {
            conditions.push("deleted_at IS NULL".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let select_q = format!(
            "SELECT * FROM rearrangement_requests {} ORDER BY created_at DESC, id DESC",
            where_clause
        );

        let statuses: Vec<String> = query.statuses.iter().map(|s| s.as_str().to_string()).collect();

        let mut builder = sqlx::query_as::<_, RearrangementRow>(&select_q);
        if let Some(date) = query.date { builder = builder.bind(date); }
        if let Some(ref period) = query.period_id { builder = builder.bind(period); }
        if let Some(ref dept) = query.department_id { builder = builder.bind(dept); }
        if let Some(ref original) = query.original_faculty_id { builder = builder.bind(original); }
        if let Some(ref substitute) = query.substitute_faculty_id { builder = builder.bind(substitute); }
        if !statuses.is_empty() { builder = builder.bind(statuses); }

        let rows = builder.fetch_all(&self.pool).await?;
        rows.into_iter().map(RearrangementRequest::try_from).collect()
    }

    async fn transition(
        &self,
        id: Uuid,
        to: RequestStatus,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> AppResult<TransitionOutcome> {
        let updated = sqlx::query_as::<_, RearrangementRow>(
            r#"
            UPDATE rearrangement_requests
            SET status = $2, reason = COALESCE($3, reason), responded_at = $4
            WHERE id = $1 AND status = $5
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(to.as_str())
        .bind(&reason)
        .bind(at)
        .bind(RequestStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await;

        match updated {
            Ok(Some(row)) => Ok(TransitionOutcome::Applied(row.try_into()?)),
            Ok(None) => {
                let current = self
                    .get(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Rearrangement {} not found", id)))?;
                Ok(TransitionOutcome::NotPending(current))
            }
            Err(e) => match unique_violation(&e) {
                Some(constraint) if constraint == BOOKED_SUBSTITUTE_INDEX => {
                    Ok(TransitionOutcome::SubstituteBooked)
                }
                Some(constraint) => Err(AppError::Conflict(format!(
                    "Rearrangement {} violates {}",
                    id, constraint
                ))),
                None => Err(AppError::Database(e)),
            },
        }
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE rearrangement_requests SET deleted_at = COALESCE(deleted_at, $2) WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Rearrangement {} not found", id)));
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
