//! Availability resolver: who is free to cover a period on a date

use std::{collections::HashSet, sync::Arc};

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::{AvailabilityCandidate, DayOfWeek, PeriodGrid, RearrangementQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
    grid: Arc<PeriodGrid>,
}

impl AvailabilityService {
    pub fn new(repository: Repository, grid: Arc<PeriodGrid>) -> Self {
        Self { repository, grid }
    }

    /// Department faculty free at `period_id` on `date`, sorted by name.
    ///
    /// Excluded: faculty teaching that period per the weekly timetable (labs
    /// expanded to every period they span), faculty already committed as an
    /// accepted substitute for the slot, faculty on approved leave that day,
    /// and `exclude_faculty_id` (the absent party). An empty list is a valid
    /// answer.
    pub async fn find_free(
        &self,
        department_id: &str,
        date: NaiveDate,
        period_id: &str,
        exclude_faculty_id: Option<&str>,
    ) -> AppResult<Vec<AvailabilityCandidate>> {
        self.grid.require_teaching_period(period_id)?;
        let day = teaching_day(date)?;

        let faculty = self.repository.faculty.list_faculty(department_id).await?;

        let entries = self
            .repository
            .timetable
            .entries_for_weekday(department_id, day)
            .await?;
        let mut busy: HashSet<String> = HashSet::new();
        for entry in entries.iter().filter(|e| self.grid.covers(e, period_id)) {
            busy.insert(entry.faculty_id.clone());
            if let Some(secondary) = &entry.secondary_faculty_id {
                busy.insert(secondary.clone());
            }
        }

        let committed: HashSet<String> = self
            .repository
            .rearrangements
            .list(&RearrangementQuery {
                period_id: Some(period_id.to_string()),
                ..RearrangementQuery::accepted_on(date)
            })
            .await?
            .into_iter()
            .map(|r| r.substitute_faculty_id)
            .collect();

        let mut candidates = Vec::new();
        for member in faculty {
            if Some(member.id.as_str()) == exclude_faculty_id
                || busy.contains(&member.id)
                || committed.contains(&member.id)
            {
                continue;
            }
            if self
                .repository
                .leaves
                .is_on_approved_leave(&member.id, date)
                .await?
            {
                continue;
            }
            candidates.push(AvailabilityCandidate::from(member));
        }

        candidates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        tracing::debug!(
            "{} free faculty in {} on {} {}",
            candidates.len(),
            department_id,
            date,
            period_id
        );

        Ok(candidates)
    }
}

/// Weekday of a date that has classes
pub(crate) fn teaching_day(date: NaiveDate) -> AppResult<DayOfWeek> {
    DayOfWeek::from_date(date)
        .ok_or_else(|| AppError::Validation(format!("{} is a Sunday, no classes are scheduled", date)))
}
