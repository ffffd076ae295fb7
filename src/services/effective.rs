//! Effective schedule resolver
//!
//! The schedule shown for a date is a read-time projection of the weekly
//! timetable with that date's accepted rearrangements laid on top. Weekly
//! entries are never written here.

use std::{collections::BTreeMap, sync::Arc};

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{
        effective::SubstitutionInfo, DayOfWeek, EffectiveSchedule, EffectiveSlot, PeriodGrid,
        RearrangementQuery, RearrangementRequest, RequestStatus, ScheduleScope, SlotStatus,
        WeeklyScheduleEntry,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EffectiveScheduleService {
    repository: Repository,
    grid: Arc<PeriodGrid>,
}

impl EffectiveScheduleService {
    pub fn new(repository: Repository, grid: Arc<PeriodGrid>) -> Self {
        Self { repository, grid }
    }

    /// Resolve the schedule of a faculty member or a class on `date`
    pub async fn resolve(&self, scope: ScheduleScope, date: NaiveDate) -> AppResult<EffectiveSchedule> {
        let Some(day) = DayOfWeek::from_date(date) else {
            return Ok(EffectiveSchedule {
                scope,
                date,
                day_of_week: None,
                slots: Vec::new(),
            });
        };

        let accepted_on = RearrangementQuery::accepted_on(date);
        let (baseline, accepted) = match &scope {
            ScheduleScope::Faculty { faculty_id } => {
                let baseline = self
                    .repository
                    .timetable
                    .entries_for_faculty(faculty_id, day)
                    .await?;
                let mut accepted = self
                    .repository
                    .rearrangements
                    .list(&RearrangementQuery {
                        original_faculty_id: Some(faculty_id.clone()),
                        ..accepted_on.clone()
                    })
                    .await?;
                accepted.extend(
                    self.repository
                        .rearrangements
                        .list(&RearrangementQuery {
                            substitute_faculty_id: Some(faculty_id.clone()),
                            ..accepted_on
                        })
                        .await?,
                );
                (baseline, accepted)
            }
            ScheduleScope::Class { class } => {
                let baseline = self
                    .repository
                    .timetable
                    .entries_for_class(class)
                    .await?
                    .into_iter()
                    .filter(|e| e.day_of_week == day)
                    .collect();
                let accepted = self
                    .repository
                    .rearrangements
                    .list(&RearrangementQuery {
                        department_id: Some(class.department_id.clone()),
                        ..accepted_on
                    })
                    .await?
                    .into_iter()
                    .filter(|r| r.class_key() == *class)
                    .collect();
                (baseline, accepted)
            }
        };

        Ok(project(&self.grid, scope, date, &baseline, &accepted))
    }
}

/// Pure merge of a weekly baseline with accepted requests. Identical inputs
/// always give identical output.
pub fn project(
    grid: &PeriodGrid,
    scope: ScheduleScope,
    date: NaiveDate,
    baseline: &[WeeklyScheduleEntry],
    accepted: &[RearrangementRequest],
) -> EffectiveSchedule {
    let Some(day) = DayOfWeek::from_date(date) else {
        return EffectiveSchedule {
            scope,
            date,
            day_of_week: None,
            slots: Vec::new(),
        };
    };

    let mut slots: Vec<EffectiveSlot> = Vec::new();
    for entry in baseline.iter().filter(|e| e.day_of_week == day) {
        for period_id in grid.covered_periods(entry) {
            slots.push(scheduled_slot(entry, period_id, &scope));
        }
    }

    let relevant = accepted
        .iter()
        .filter(|r| r.date == date && r.status == RequestStatus::Accepted);

    match &scope {
        ScheduleScope::Class { .. } => {
            for request in latest_per_period(relevant, "class") {
                match slots.iter_mut().find(|s| s.period_id == request.period_id) {
                    Some(slot) => apply_substitution(slot, request),
                    None => {
                        let mut slot = slot_from_request(request, SlotStatus::Substituted);
                        slot.display = substituted_display(&request.subject_name, request);
                        slots.push(slot);
                    }
                }
            }
        }
        ScheduleScope::Faculty { faculty_id } => {
            let (as_original, as_substitute): (Vec<_>, Vec<_>) =
                relevant.partition(|r| r.original_faculty_id == *faculty_id);

            for request in latest_per_period(as_original.into_iter(), "original") {
                match slots.iter_mut().find(|s| {
                    s.period_id == request.period_id
                        && s.faculty_id == request.original_faculty_id
                        && s.status == SlotStatus::Scheduled
                }) {
                    Some(slot) => {
                        slot.status = SlotStatus::CoveredBySubstitute;
                        slot.faculty_id = request.substitute_faculty_id.clone();
                        slot.faculty_name = request.substitute_faculty_name.clone();
                        slot.substitution = Some(substitution_info(request));
                        slot.display =
                            covered_display(&slot.subject_name, &slot.class_label, request);
                    }
                    // Timetable changed since the request was accepted
                    None => {
                        let mut slot = slot_from_request(request, SlotStatus::CoveredBySubstitute);
                        slot.display =
                            covered_display(&request.subject_name, &request.class_label, request);
                        slots.push(slot);
                    }
                }
            }

            for request in latest_per_period(
                as_substitute
                    .into_iter()
                    .filter(|r| r.substitute_faculty_id == *faculty_id),
                "substitute",
            ) {
                let mut slot = slot_from_request(request, SlotStatus::Covering);
                slot.display = format!(
                    "covering {} for {}, {}",
                    request.original_faculty_name, request.subject_name, request.class_label
                );
                slots.push(slot);
            }
        }
    }

    slots.sort_by(|a, b| {
        grid.order_of(&a.period_id)
            .cmp(&grid.order_of(&b.period_id))
            .then_with(|| a.period_id.cmp(&b.period_id))
            .then_with(|| a.class_label.cmp(&b.class_label))
    });

    EffectiveSchedule {
        scope,
        date,
        day_of_week: Some(day),
        slots,
    }
}

/// One request per period. Several accepted requests for the same period
/// and role is a data anomaly: the newest wins and the rest are logged.
fn latest_per_period<'a>(
    requests: impl Iterator<Item = &'a RearrangementRequest>,
    role: &str,
) -> Vec<&'a RearrangementRequest> {
    let mut by_period: BTreeMap<&str, Vec<&RearrangementRequest>> = BTreeMap::new();
    for request in requests {
        by_period.entry(request.period_id.as_str()).or_default().push(request);
    }

    by_period
        .into_values()
        .filter_map(|mut group| {
            group.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
            if group.len() > 1 {
                tracing::warn!(
                    "{} accepted rearrangements for {} on {} {} ({}), using {}",
                    group.len(),
                    role,
                    group[0].date,
                    group[0].period_id,
                    group
                        .iter()
                        .map(|r| r.id.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                    group[0].id
                );
            }
            group.into_iter().next()
        })
        .collect()
}

fn scheduled_slot(entry: &WeeklyScheduleEntry, period_id: String, scope: &ScheduleScope) -> EffectiveSlot {
    let class = entry.class_key();
    let class_label = class.label();
    let display = match scope {
        ScheduleScope::Faculty { .. } => format!("{} ({})", entry.subject_name, class_label),
        ScheduleScope::Class { .. } => format!("{} - {}", entry.subject_name, entry.faculty_name),
    };
    // A secondary lab instructor sees themselves on their own schedule
    let (faculty_id, faculty_name) = match (scope, &entry.secondary_faculty_id) {
        (ScheduleScope::Faculty { faculty_id }, Some(secondary))
            if secondary == faculty_id && entry.faculty_id != *faculty_id =>
        {
            (
                secondary.clone(),
                entry
                    .secondary_faculty_name
                    .clone()
                    .unwrap_or_else(|| secondary.clone()),
            )
        }
        _ => (entry.faculty_id.clone(), entry.faculty_name.clone()),
    };
    EffectiveSlot {
        period_id,
        subject_id: Some(entry.subject_id.clone()),
        subject_name: entry.subject_name.clone(),
        subject_type: Some(entry.subject_type),
        class,
        class_label,
        room: entry.room.clone(),
        faculty_id,
        faculty_name,
        status: SlotStatus::Scheduled,
        substitution: None,
        display,
    }
}

fn slot_from_request(request: &RearrangementRequest, status: SlotStatus) -> EffectiveSlot {
    EffectiveSlot {
        period_id: request.period_id.clone(),
        subject_id: None,
        subject_name: request.subject_name.clone(),
        subject_type: None,
        class: request.class_key(),
        class_label: request.class_label.clone(),
        room: None,
        faculty_id: request.substitute_faculty_id.clone(),
        faculty_name: request.substitute_faculty_name.clone(),
        status,
        substitution: Some(substitution_info(request)),
        display: String::new(),
    }
}

fn apply_substitution(slot: &mut EffectiveSlot, request: &RearrangementRequest) {
    slot.faculty_id = request.substitute_faculty_id.clone();
    slot.faculty_name = request.substitute_faculty_name.clone();
    slot.status = SlotStatus::Substituted;
    slot.substitution = Some(substitution_info(request));
    slot.display = substituted_display(&slot.subject_name, request);
}

fn covered_display(subject_name: &str, class_label: &str, request: &RearrangementRequest) -> String {
    format!(
        "{} ({}), covered by {}",
        subject_name, class_label, request.substitute_faculty_name
    )
}

fn substituted_display(subject_name: &str, request: &RearrangementRequest) -> String {
    format!(
        "{} - {} (for {})",
        subject_name, request.substitute_faculty_name, request.original_faculty_name
    )
}

fn substitution_info(request: &RearrangementRequest) -> SubstitutionInfo {
    SubstitutionInfo {
        request_id: request.id,
        original_faculty_id: request.original_faculty_id.clone(),
        original_faculty_name: request.original_faculty_name.clone(),
        substitute_faculty_id: request.substitute_faculty_id.clone(),
        substitute_faculty_name: request.substitute_faculty_name.clone(),
    }
}
