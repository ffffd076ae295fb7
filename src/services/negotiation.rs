//! Negotiation coordinator: create, respond to, cancel and tidy up
//! rearrangement requests
//!
//! The store's conditional transition is the source of truth for both
//! invariants; the checks made here before writing only give early,
//! well-typed answers.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use super::{
    availability::{teaching_day, AvailabilityService},
    notifications::{EventKind, Notifier, RearrangementEvent},
};
use crate::{
    error::{AppError, AppResult},
    models::{
        rearrangement::CreateRearrangement, Decision, PeriodGrid, RearrangementQuery,
        RearrangementRequest, RequestStatus, TransitionOutcome,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct NegotiationService {
    repository: Repository,
    availability: AvailabilityService,
    grid: Arc<PeriodGrid>,
    notifier: Notifier,
}

impl NegotiationService {
    pub fn new(
        repository: Repository,
        availability: AvailabilityService,
        grid: Arc<PeriodGrid>,
        notifier: Notifier,
    ) -> Self {
        Self {
            repository,
            availability,
            grid,
            notifier,
        }
    }

    /// Open a pending request asking `substitute_faculty_id` to cover the
    /// original faculty's class at `period_id` on `date`
    pub async fn create_request(&self, data: CreateRearrangement) -> AppResult<RearrangementRequest> {
        data.validate()?;
        if data.original_faculty_id.is_empty() {
            return Err(AppError::Validation("original_faculty_id is required".to_string()));
        }
        if data.original_faculty_id == data.substitute_faculty_id {
            return Err(AppError::Validation(
                "A faculty member cannot substitute for themself".to_string(),
            ));
        }
        self.grid.require_teaching_period(&data.period_id)?;
        let day = teaching_day(data.date)?;

        let original = self
            .repository
            .faculty
            .get_faculty(&data.original_faculty_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Faculty {} not found", data.original_faculty_id))
            })?;

        // The class being replaced, from the original faculty's own timetable
        let entries = self
            .repository
            .timetable
            .entries_for_faculty(&original.id, day)
            .await?;
        let covering: Vec<_> = entries
            .into_iter()
            .filter(|e| e.department_id == data.department_id && self.grid.covers(e, &data.period_id))
            .collect();
        let entry = match covering.iter().find(|e| e.faculty_id == original.id) {
            Some(entry) => entry.clone(),
            None if !covering.is_empty() => {
                return Err(AppError::Validation(format!(
                    "{} is only the secondary lab faculty at {} on {}; only the primary assignment can be rearranged",
                    original.id, data.period_id, day
                )));
            }
            None => {
                return Err(AppError::NotFound(format!(
                    "{} has no class at {} on {}",
                    original.id, data.period_id, day
                )));
            }
        };

        let live = self
            .repository
            .rearrangements
            .list(&RearrangementQuery {
                date: Some(data.date),
                period_id: Some(data.period_id.clone()),
                original_faculty_id: Some(original.id.clone()),
                statuses: vec![RequestStatus::Pending, RequestStatus::Accepted],
                include_deleted: true,
                ..Default::default()
            })
            .await?;
        if !live.is_empty() {
            tracing::debug!(
                "Duplicate rearrangement for {} on {} {}",
                original.id,
                data.date,
                data.period_id
            );
            return Err(AppError::Conflict(format!(
                "{} already has a live rearrangement on {} {}",
                original.id, data.date, data.period_id
            )));
        }

        // Re-validated now rather than trusting the candidate list shown earlier
        let free = self
            .availability
            .find_free(&data.department_id, data.date, &data.period_id, Some(&original.id))
            .await?;
        let substitute = free
            .into_iter()
            .find(|c| c.id == data.substitute_faculty_id)
            .ok_or_else(|| {
                AppError::Unavailable(format!(
                    "{} is not free on {} {}",
                    data.substitute_faculty_id, data.date, data.period_id
                ))
            })?;

        let class = entry.class_key();
        let request = RearrangementRequest {
            id: Uuid::new_v4(),
            date: data.date,
            period_id: data.period_id,
            department_id: class.department_id.clone(),
            year: class.year,
            semester: class.semester,
            section: class.section.clone(),
            class_label: non_empty(data.class_label).unwrap_or_else(|| class.label()),
            subject_name: non_empty(data.subject_name).unwrap_or(entry.subject_name),
            original_faculty_id: original.id,
            original_faculty_name: original.name,
            substitute_faculty_id: substitute.id,
            substitute_faculty_name: substitute.name,
            status: RequestStatus::Pending,
            reason: None,
            created_at: Utc::now(),
            responded_at: None,
            deleted_at: None,
        };

        let request = self.repository.rearrangements.insert(request).await?;

        tracing::info!(
            "Rearrangement {} created: {} -> {} on {} {}",
            request.id,
            request.original_faculty_id,
            request.substitute_faculty_id,
            request.date,
            request.period_id
        );
        self.notifier
            .publish(RearrangementEvent::new(EventKind::RequestCreated, &request));

        Ok(request)
    }

    /// Substitute's accept/reject. Exactly one of any number of concurrent
    /// responses wins; the others get `AlreadyResolved`.
    pub async fn respond(
        &self,
        request_id: Uuid,
        acting_faculty_id: &str,
        decision: Decision,
    ) -> AppResult<RearrangementRequest> {
        let request = self.get(request_id).await?;

        if request.substitute_faculty_id != acting_faculty_id {
            return Err(AppError::Forbidden(format!(
                "Only the designated substitute can respond to rearrangement {}",
                request_id
            )));
        }
        if request.status != RequestStatus::Pending {
            return Err(already_resolved(&request));
        }

        let outcome = self
            .repository
            .rearrangements
            .transition(request_id, decision.target_status(), None, Utc::now())
            .await?;

        match outcome {
            TransitionOutcome::Applied(updated) => {
                tracing::info!(
                    "Rearrangement {} {} by {}",
                    updated.id,
                    updated.status,
                    acting_faculty_id
                );
                let kind = match updated.status {
                    RequestStatus::Accepted => EventKind::RequestAccepted,
                    _ => EventKind::RequestRejected,
                };
                self.notifier.publish(RearrangementEvent::new(kind, &updated));
                Ok(updated)
            }
            TransitionOutcome::NotPending(current) => Err(already_resolved(&current)),
            TransitionOutcome::SubstituteBooked => {
                tracing::debug!(
                    "Rearrangement {} refused: {} already covers {} {}",
                    request_id,
                    request.substitute_faculty_id,
                    request.date,
                    request.period_id
                );
                Err(AppError::Conflict(format!(
                    "{} already covers another class on {} {}",
                    request.substitute_faculty_id, request.date, request.period_id
                )))
            }
        }
    }

    /// Requester withdraws a pending request. Repeating it on a request that
    /// is already terminal is a no-op for the requester.
    pub async fn cancel(
        &self,
        request_id: Uuid,
        acting_faculty_id: &str,
        reason: Option<String>,
    ) -> AppResult<RearrangementRequest> {
        let request = self.get(request_id).await?;

        if request.original_faculty_id != acting_faculty_id {
            return Err(AppError::Forbidden(format!(
                "Only the requester can cancel rearrangement {}",
                request_id
            )));
        }
        if request.status.is_terminal() {
            tracing::debug!("Cancel of {} ignored, already {}", request_id, request.status);
            return Ok(request);
        }

        let reason = format!(
            "Cancelled by requester{}",
            non_empty(reason).map(|r| format!(": {}", r)).unwrap_or_default()
        );

        match self
            .repository
            .rearrangements
            .transition(request_id, RequestStatus::Rejected, Some(reason), Utc::now())
            .await?
        {
            TransitionOutcome::Applied(updated) => {
                tracing::info!("Rearrangement {} cancelled by {}", updated.id, acting_faculty_id);
                self.notifier
                    .publish(RearrangementEvent::new(EventKind::RequestRejected, &updated));
                Ok(updated)
            }
            // The substitute answered first
            TransitionOutcome::NotPending(current) => Ok(current),
            TransitionOutcome::SubstituteBooked => Err(AppError::Internal(
                "Cancellation reported a booking conflict".to_string(),
            )),
        }
    }

    /// Hide a terminal request from the requester's lists
    pub async fn delete(&self, request_id: Uuid, acting_faculty_id: &str) -> AppResult<()> {
        let request = self.get(request_id).await?;

        if request.original_faculty_id != acting_faculty_id {
            return Err(AppError::Forbidden(format!(
                "Only the requester of rearrangement {} can remove it",
                request_id
            )));
        }
        if !request.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Rearrangement {} is still pending; cancel it instead",
                request_id
            )));
        }

        self.repository
            .rearrangements
            .soft_delete(request_id, Utc::now())
            .await
    }

    pub async fn get(&self, request_id: Uuid) -> AppResult<RearrangementRequest> {
        self.repository
            .rearrangements
            .get(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rearrangement {} not found", request_id)))
    }

    /// Requests waiting for this faculty's answer
    pub async fn list_pending_for_substitute(
        &self,
        faculty_id: &str,
    ) -> AppResult<Vec<RearrangementRequest>> {
        self.repository
            .rearrangements
            .list(&RearrangementQuery {
                substitute_faculty_id: Some(faculty_id.to_string()),
                statuses: vec![RequestStatus::Pending],
                ..Default::default()
            })
            .await
    }

    /// Requests raised by this faculty, any status
    pub async fn list_my_requests(
        &self,
        original_faculty_id: &str,
    ) -> AppResult<Vec<RearrangementRequest>> {
        self.repository
            .rearrangements
            .list(&RearrangementQuery {
                original_faculty_id: Some(original_faculty_id.to_string()),
                ..Default::default()
            })
            .await
    }

    /// Every visible request on a date. Accepted requests stay listed after
    /// removal since they still hold the slot.
    pub async fn list_for_date(
        &self,
        date: NaiveDate,
        department_id: Option<String>,
    ) -> AppResult<Vec<RearrangementRequest>> {
        let requests = self
            .repository
            .rearrangements
            .list(&RearrangementQuery {
                date: Some(date),
                department_id,
                include_deleted: true,
                ..Default::default()
            })
            .await?;

        Ok(requests
            .into_iter()
            .filter(|r| r.deleted_at.is_none() || r.status == RequestStatus::Accepted)
            .collect())
    }
}

fn already_resolved(request: &RearrangementRequest) -> AppError {
    AppError::AlreadyResolved(format!(
        "Rearrangement {} is already {}",
        request.id, request.status
    ))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
