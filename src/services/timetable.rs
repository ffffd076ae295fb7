//! Weekly timetable service (publish and read)

use std::{collections::HashMap, sync::Arc};

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{timetable::PublishTimetable, ClassKey, DayOfWeek, PeriodGrid, WeeklyScheduleEntry},
    repository::Repository,
};

#[derive(Clone)]
pub struct TimetableService {
    repository: Repository,
    grid: Arc<PeriodGrid>,
}

impl TimetableService {
    pub fn new(repository: Repository, grid: Arc<PeriodGrid>) -> Self {
        Self { repository, grid }
    }

    pub fn grid(&self) -> &PeriodGrid {
        &self.grid
    }

    /// Replace a class's weekly timetable.
    ///
    /// Every entry must sit on a teaching period, and once labs are expanded
    /// no two entries may occupy the same weekday and period.
    pub async fn publish_class(
        &self,
        class: ClassKey,
        data: PublishTimetable,
    ) -> AppResult<Vec<WeeklyScheduleEntry>> {
        if class.department_id.trim().is_empty() || class.section.trim().is_empty() {
            return Err(AppError::Validation(
                "department_id and section are required".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(data.entries.len());
        for published in data.entries {
            published.validate()?;
            if published.secondary_faculty_id.as_deref() == Some(published.faculty_id.as_str()) {
                return Err(AppError::Validation(format!(
                    "{} cannot be both primary and secondary faculty of {}",
                    published.faculty_id, published.subject_id
                )));
            }
            entries.push(published.into_entry(&class));
        }

        let mut occupied: HashMap<(DayOfWeek, String), &str> = HashMap::new();
        for entry in &entries {
            self.grid.require_teaching_period(&entry.period_id)?;
            for period_id in self.grid.covered_periods(entry) {
                if let Some(other) = occupied.insert((entry.day_of_week, period_id.clone()), &entry.subject_id) {
                    return Err(AppError::Validation(format!(
                        "{} {} is taken by both {} and {}",
                        entry.day_of_week, period_id, other, entry.subject_id
                    )));
                }
            }
        }

        self.repository
            .timetable
            .replace_class(&class, entries.clone())
            .await?;

        tracing::info!(
            "Published {} timetable entries for {} {} sem {}",
            entries.len(),
            class.department_id,
            class.label(),
            class.semester
        );

        Ok(entries)
    }

    pub async fn get_class(&self, class: &ClassKey) -> AppResult<Vec<WeeklyScheduleEntry>> {
        let mut entries = self.repository.timetable.entries_for_class(class).await?;
        self.sort(&mut entries);
        Ok(entries)
    }

    pub async fn entries_for_weekday(
        &self,
        department_id: &str,
        day: DayOfWeek,
    ) -> AppResult<Vec<WeeklyScheduleEntry>> {
        let mut entries = self
            .repository
            .timetable
            .entries_for_weekday(department_id, day)
            .await?;
        self.sort(&mut entries);
        Ok(entries)
    }

    pub async fn entries_for_faculty(
        &self,
        faculty_id: &str,
        day: DayOfWeek,
    ) -> AppResult<Vec<WeeklyScheduleEntry>> {
        let mut entries = self
            .repository
            .timetable
            .entries_for_faculty(faculty_id, day)
            .await?;
        self.sort(&mut entries);
        Ok(entries)
    }

    // Stable output regardless of storage order
    fn sort(&self, entries: &mut [WeeklyScheduleEntry]) {
        entries.sort_by(|a, b| {
            a.day_of_week
                .cmp(&b.day_of_week)
                .then_with(|| self.grid.order_of(&a.period_id).cmp(&self.grid.order_of(&b.period_id)))
                .then_with(|| a.year.cmp(&b.year))
                .then_with(|| a.semester.cmp(&b.semester))
                .then_with(|| a.section.cmp(&b.section))
        });
    }
}
