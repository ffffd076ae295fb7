//! Faculty directory repository (PostgreSQL)

use async_trait::async_trait;
use sqlx::{FromRow, Pool, Postgres};

use super::FacultyDirectory;
use crate::{error::AppResult, models::Faculty};

#[derive(FromRow)]
struct FacultyRow {
    id: String,
    name: String,
    designation: Option<String>,
    department_id: String,
}

impl From<FacultyRow> for Faculty {
    fn from(row: FacultyRow) -> Self {
        Faculty {
            id: row.id,
            name: row.name,
            designation: row.designation,
            department_id: row.department_id,
        }
    }
}

#[derive(Clone)]
pub struct FacultyRepository {
    pool: Pool<Postgres>,
}

impl FacultyRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FacultyDirectory for FacultyRepository {
    async fn list_faculty(&self, department_id: &str) -> AppResult<Vec<Faculty>> {
        let rows = sqlx::query_as::<_, FacultyRow>(
            "SELECT id, name, designation, department_id FROM faculty WHERE department_id = $1 ORDER BY name, id",
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Faculty::from).collect())
    }

    async fn get_faculty(&self, faculty_id: &str) -> AppResult<Option<Faculty>> {
        let row = sqlx::query_as::<_, FacultyRow>(
            "SELECT id, name, designation, department_id FROM faculty WHERE id = $1",
        )
        .bind(faculty_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Faculty::from))
    }

    async fn upsert_faculty(&self, faculty: Faculty) -> AppResult<Faculty> {
        let row = sqlx::query_as::<_, FacultyRow>(
            r#"
            INSERT INTO faculty (id, name, designation, department_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name,
                    designation = EXCLUDED.designation,
                    department_id = EXCLUDED.department_id
            RETURNING id, name, designation, department_id
            "#,
        )
        .bind(&faculty.id)
        .bind(&faculty.name)
        .bind(&faculty.designation)
        .bind(&faculty.department_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }
}
