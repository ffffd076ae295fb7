//! Business logic services

pub mod availability;
pub mod effective;
pub mod faculty;
pub mod leaves;
pub mod negotiation;
pub mod notifications;
pub mod redis;
pub mod timetable;

use std::sync::Arc;

use crate::{config::TimetableConfig, models::PeriodGrid, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub availability: availability::AvailabilityService,
    pub negotiation: negotiation::NegotiationService,
    pub effective: effective::EffectiveScheduleService,
    pub timetable: timetable::TimetableService,
    pub faculty: faculty::FacultyService,
    pub leaves: leaves::LeavesService,
    pub notifier: notifications::Notifier,
    repository: Repository,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(
        repository: Repository,
        timetable_config: &TimetableConfig,
        notifier: notifications::Notifier,
    ) -> Self {
        let grid = Arc::new(PeriodGrid::from_config(timetable_config));
        let availability = availability::AvailabilityService::new(repository.clone(), grid.clone());

        Self {
            negotiation: negotiation::NegotiationService::new(
                repository.clone(),
                availability.clone(),
                grid.clone(),
                notifier.clone(),
            ),
            effective: effective::EffectiveScheduleService::new(repository.clone(), grid.clone()),
            timetable: timetable::TimetableService::new(repository.clone(), grid),
            faculty: faculty::FacultyService::new(repository.clone()),
            leaves: leaves::LeavesService::new(repository.clone()),
            availability,
            notifier,
            repository,
        }
    }

    /// Storage reachability, for readiness probes
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.rearrangements.ping().await
    }
}
