//! Faculty directory service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{faculty::UpsertFaculty, Faculty},
    repository::Repository,
};

#[derive(Clone)]
pub struct FacultyService {
    repository: Repository,
}

impl FacultyService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create or update a faculty member
    pub async fn upsert(&self, faculty_id: &str, data: UpsertFaculty) -> AppResult<Faculty> {
        data.validate()?;
        if faculty_id.trim().is_empty() {
            return Err(AppError::Validation("faculty id is required".to_string()));
        }

        let faculty = self
            .repository
            .faculty
            .upsert_faculty(Faculty {
                id: faculty_id.trim().to_string(),
                name: data.name,
                designation: data.designation,
                department_id: data.department_id,
            })
            .await?;

        tracing::info!("Faculty {} saved in {}", faculty.id, faculty.department_id);
        Ok(faculty)
    }

    pub async fn get(&self, faculty_id: &str) -> AppResult<Faculty> {
        self.repository
            .faculty
            .get_faculty(faculty_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Faculty {} not found", faculty_id)))
    }

    pub async fn list(&self, department_id: &str) -> AppResult<Vec<Faculty>> {
        self.repository.faculty.list_faculty(department_id).await
    }
}
