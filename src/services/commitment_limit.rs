use chrono::NaiveDate;
use serde_json::json;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::commitment::CommitmentRecord;
use crate::models::organisation::{commitment_ceiling, OrganisationRecord};
use crate::services::commitment_resolver::{
    ensure_commitment_percentage, resolve_commitment, ResolvedCommitment,
};
use crate::services::snapshot_index::SnapshotIndex;
use crate::utils::date_range::{format_date, overlap};

/// Tolerance for floating-point noise when comparing against the ceiling.
pub const CEILING_EPSILON: f64 = 1e-9;

/// Checks that persisting `candidate` keeps every person it binds at or under
/// the organisation's daily ceiling on every day of its range.
///
/// `existing` is the persisted commitment set; an entry sharing the
/// candidate's id is the version being replaced and is ignored. Callers must
/// serialize validate-then-write per organisation.
pub fn validate_commitment_limit(
    candidate: &CommitmentRecord,
    existing: &[CommitmentRecord],
    organisation: &OrganisationRecord,
    index: &SnapshotIndex<'_>,
) -> AppResult<()> {
    if !organisation.hours_per_day.is_finite() || organisation.hours_per_day <= 0.0 {
        return Err(AppError::validation_with_details(
            "organisation hours per day must be positive",
            json!({"organisationId": organisation.id}),
        ));
    }
    let ceiling = commitment_ceiling(organisation.hours_per_day);

    ensure_commitment_percentage(candidate.percentage)?;
    if candidate.percentage > ceiling + CEILING_EPSILON {
        return Err(AppError::validation_with_details(
            "commitment percentage exceeds 24 hours/day theoretical limit",
            json!({
                "commitmentId": candidate.id,
                "percentage": candidate.percentage,
                "ceiling": ceiling,
            }),
        ));
    }

    let Some(resolved) = resolve_commitment(candidate, index)? else {
        debug!(
            target: "app::commitment",
            commitment_id = %candidate.id,
            "candidate binds nobody, nothing to check"
        );
        return Ok(());
    };

    let mut others: Vec<ResolvedCommitment<'_>> = Vec::with_capacity(existing.len());
    for commitment in existing {
        if commitment.id == candidate.id {
            continue;
        }
        if let Some(other) = resolve_commitment(commitment, index)? {
            others.push(other);
        }
    }

    for person_id in &resolved.person_ids {
        check_person(person_id, &resolved, &others, ceiling)?;
    }

    Ok(())
}

fn check_person(
    person_id: &str,
    candidate: &ResolvedCommitment<'_>,
    others: &[ResolvedCommitment<'_>],
    ceiling: f64,
) -> AppResult<()> {
    let mut events: Vec<(NaiveDate, f64)> = Vec::new();
    for other in others.iter().filter(|other| other.binds(person_id)) {
        let Some((start, end)) = overlap(candidate.start, candidate.end, other.start, other.end)
        else {
            continue;
        };
        events.push((start, other.percentage));
        if let Some(after) = end.succ_opt() {
            events.push((after, -other.percentage));
        }
    }

    if events.is_empty() {
        return Ok(());
    }

    events.sort_by_key(|(date, _)| *date);
    let mut running = candidate.percentage;
    let mut index = 0;
    while index < events.len() {
        let date = events[index].0;
        if date > candidate.end {
            break;
        }
        while index < events.len() && events[index].0 == date {
            running += events[index].1;
            index += 1;
        }

        if running > ceiling + CEILING_EPSILON {
            return Err(AppError::validation_with_details(
                "commitment exceeds 24 hours/day theoretical limit",
                json!({
                    "commitmentId": candidate.commitment_id,
                    "personId": person_id,
                    "date": format_date(date),
                    "totalPercentage": running,
                    "ceiling": ceiling,
                }),
            ));
        }
    }

    debug!(
        target: "app::commitment",
        commitment_id = %candidate.commitment_id,
        person_id = %person_id,
        events = events.len(),
        "commitment within daily ceiling"
    );

    Ok(())
}
