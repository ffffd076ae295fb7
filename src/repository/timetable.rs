//! Weekly timetable repository (PostgreSQL)

use async_trait::async_trait;
use sqlx::{FromRow, Pool, Postgres};

use super::TimetableStore;
use crate::{
    error::{AppError, AppResult},
    models::{ClassKey, DayOfWeek, WeeklyScheduleEntry},
};

#[derive(FromRow)]
struct EntryRow {
    department_id: String,
    year: i16,
    semester: i16,
    section: String,
    day_of_week: i16,
    period_id: String,
    subject_id: String,
    subject_name: String,
    subject_type: String,
    faculty_id: String,
    faculty_name: String,
    secondary_faculty_id: Option<String>,
    secondary_faculty_name: Option<String>,
    room: Option<String>,
}

impl TryFrom<EntryRow> for WeeklyScheduleEntry {
    type Error = AppError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Ok(WeeklyScheduleEntry {
            department_id: row.department_id,
            year: row.year,
            semester: row.semester,
            section: row.section,
            day_of_week: DayOfWeek::try_from(row.day_of_week)?,
            period_id: row.period_id,
            subject_id: row.subject_id,
            subject_name: row.subject_name,
            subject_type: row.subject_type.parse()?,
            faculty_id: row.faculty_id,
            faculty_name: row.faculty_name,
            secondary_faculty_id: row.secondary_faculty_id,
            secondary_faculty_name: row.secondary_faculty_name,
            room: row.room,
        })
    }
}

fn into_entries(rows: Vec<EntryRow>) -> AppResult<Vec<WeeklyScheduleEntry>> {
    rows.into_iter().map(WeeklyScheduleEntry::try_from).collect()
}

const ENTRY_COLUMNS: &str = r#"
    department_id, year, semester, section, day_of_week, period_id,
    subject_id, subject_name, subject_type, faculty_id, faculty_name,
    secondary_faculty_id, secondary_faculty_name, room
"#;

#[derive(Clone)]
pub struct TimetableRepository {
    pool: Pool<Postgres>,
}

impl TimetableRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TimetableStore for TimetableRepository {
    async fn entries_for_weekday(
        &self,
        department_id: &str,
        day: DayOfWeek,
    ) -> AppResult<Vec<WeeklyScheduleEntry>> {
        let query = format!(
            "SELECT {} FROM weekly_schedule_entries WHERE department_id = $1 AND day_of_week = $2",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, EntryRow>(&query)
            .bind(department_id)
            .bind(i16::from(day))
            .fetch_all(&self.pool)
            .await?;
        into_entries(rows)
    }

    async fn entries_for_faculty(
        &self,
        faculty_id: &str,
        day: DayOfWeek,
    ) -> AppResult<Vec<WeeklyScheduleEntry>> {
        let query = format!(
            r#"
            SELECT {} FROM weekly_schedule_entries
            WHERE day_of_week = $2 AND (faculty_id = $1 OR secondary_faculty_id = $1)
            "#,
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, EntryRow>(&query)
            .bind(faculty_id)
            .bind(i16::from(day))
            .fetch_all(&self.pool)
            .await?;
        into_entries(rows)
    }

    async fn entries_for_class(&self, class: &ClassKey) -> AppResult<Vec<WeeklyScheduleEntry>> {
        let query = format!(
            r#"
            SELECT {} FROM weekly_schedule_entries
            WHERE department_id = $1 AND year = $2 AND semester = $3 AND section = $4
            ORDER BY day_of_week, period_id
            "#,
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, EntryRow>(&query)
            .bind(&class.department_id)
            .bind(class.year)
            .bind(class.semester)
            .bind(&class.section)
            .fetch_all(&self.pool)
            .await?;
        into_entries(rows)
    }

    async fn replace_class(
        &self,
        class: &ClassKey,
        entries: Vec<WeeklyScheduleEntry>,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM weekly_schedule_entries
            WHERE department_id = $1 AND year = $2 AND semester = $3 AND section = $4
            "#,
        )
        .bind(&class.department_id)
        .bind(class.year)
        .bind(class.semester)
        .bind(&class.section)
        .execute(&mut *tx)
        .await?;

        for entry in &entries {
            let query = format!(
                "INSERT INTO weekly_schedule_entries ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
                ENTRY_COLUMNS
            );
            sqlx::query(&query)
                .bind(&entry.department_id)
                .bind(entry.year)
                .bind(entry.semester)
                .bind(&entry.section)
                .bind(i16::from(entry.day_of_week))
                .bind(&entry.period_id)
                .bind(&entry.subject_id)
                .bind(&entry.subject_name)
                .bind(entry.subject_type.as_str())
                .bind(&entry.faculty_id)
                .bind(&entry.faculty_name)
                .bind(&entry.secondary_faculty_id)
                .bind(&entry.secondary_faculty_name)
                .bind(&entry.room)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
