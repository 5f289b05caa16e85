use std::collections::{BTreeMap, HashMap};
use std::convert::TryFrom;

use chrono::{Datelike, Duration, NaiveDate};
use serde_json::json;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::absence::{AbsenceRecord, AbsenceScope};
use crate::models::report::{
    CapacityReport, ReportBucket, ReportGranularity, ReportRequest, ReportScope,
};
use crate::models::snapshot::OrganisationSnapshot;
use crate::services::commitment_resolver::resolve_commitment;
use crate::services::employment_timeline::EmploymentTimeline;
use crate::services::scope_resolver::{resolve_scope, ResolvedScope};
use crate::services::snapshot_index::SnapshotIndex;
use crate::utils::date_range::{format_date, parse_closed_range, parse_date};

/// A report request after validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub scope: ReportScope,
    pub granularity: ReportGranularity,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

pub fn validate_request(request: &ReportRequest) -> AppResult<ValidatedRequest> {
    let scope = ReportScope::try_from(request.scope.as_str()).map_err(AppError::validation)?;
    let granularity =
        ReportGranularity::try_from(request.granularity.as_str()).map_err(AppError::validation)?;
    let (from, to) = parse_closed_range(&request.from, &request.to)?;

    Ok(ValidatedRequest {
        scope,
        granularity,
        from,
        to,
    })
}

/// First day of the bucket `date` falls into.
pub fn period_start(date: NaiveDate, granularity: ReportGranularity) -> NaiveDate {
    match granularity {
        ReportGranularity::Day => date,
        ReportGranularity::Week => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        ReportGranularity::Month => date.with_day(1).unwrap_or(date),
        ReportGranularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
    }
}

pub fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveCommitment<'a> {
    project_id: &'a str,
    percentage: f64,
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Debug, Default, Clone, Copy)]
struct BucketTotals {
    available: f64,
    load: f64,
    project_load: f64,
}

/// Per-date absence hours, split by who they apply to.
#[derive(Default)]
struct AbsenceCalendar<'a> {
    holidays: HashMap<NaiveDate, f64>,
    teams: HashMap<(&'a str, NaiveDate), f64>,
    people: HashMap<(&'a str, NaiveDate), f64>,
}

impl<'a> AbsenceCalendar<'a> {
    fn build(absences: &'a [AbsenceRecord]) -> AppResult<Self> {
        let mut calendar = Self::default();
        for absence in absences {
            let date = parse_date(&absence.date)?;
            if !absence.hours.is_finite() || absence.hours < 0.0 {
                return Err(AppError::validation_with_details(
                    "absence hours must be a finite, non-negative number",
                    json!({"absenceId": absence.id, "hours": absence.hours.to_string()}),
                ));
            }
            match &absence.scope {
                AbsenceScope::Organisation => {
                    *calendar.holidays.entry(date).or_insert(0.0) += absence.hours;
                }
                AbsenceScope::Team(team_id) => {
                    *calendar.teams.entry((team_id.as_str(), date)).or_insert(0.0) +=
                        absence.hours;
                }
                AbsenceScope::Person(person_id) => {
                    *calendar
                        .people
                        .entry((person_id.as_str(), date))
                        .or_insert(0.0) += absence.hours;
                }
            }
        }
        Ok(calendar)
    }

    fn hours_for(&self, person_id: &str, teams: &[&str], date: NaiveDate) -> f64 {
        let holiday = self.holidays.get(&date).copied().unwrap_or(0.0);
        let personal = self.people.get(&(person_id, date)).copied().unwrap_or(0.0);
        let team: f64 = teams
            .iter()
            .filter_map(|team_id| self.teams.get(&(*team_id, date)))
            .sum();
        holiday + personal + team
    }
}

/// Computes bucketed availability and committed load for the request scope.
///
/// Pure over the snapshot: no I/O, no shared state. Cost is
/// O(days × people in scope × commitments per person).
pub fn calculate_report(
    snapshot: &OrganisationSnapshot,
    request: &ReportRequest,
) -> AppResult<CapacityReport> {
    let validated = validate_request(request)?;
    let organisation = &snapshot.organisation;
    let hours_per_day = organisation.hours_per_day;
    if !hours_per_day.is_finite() || hours_per_day <= 0.0 {
        return Err(AppError::validation_with_details(
            "organisation hours per day must be positive",
            json!({"organisationId": organisation.id}),
        ));
    }

    let index = SnapshotIndex::new(snapshot);
    let absences = AbsenceCalendar::build(&snapshot.absences)?;

    let mut commitments_by_person: HashMap<&str, Vec<ActiveCommitment<'_>>> = HashMap::new();
    for commitment in &snapshot.commitments {
        let Some(resolved) = resolve_commitment(commitment, &index)? else {
            continue;
        };
        for person_id in resolved.person_ids {
            commitments_by_person
                .entry(person_id)
                .or_default()
                .push(ActiveCommitment {
                    project_id: resolved.project_id,
                    percentage: resolved.percentage,
                    start: resolved.start,
                    end: resolved.end,
                });
        }
    }

    let scope = resolve_scope(validated.scope, &request.ids, snapshot, &index)?;
    let project_estimation = project_estimation(snapshot, &scope);

    let mut timelines: Vec<(&str, EmploymentTimeline, &[&str])> =
        Vec::with_capacity(scope.person_ids.len());
    for person_id in &scope.person_ids {
        if let Some(person) = index.person(person_id) {
            timelines.push((
                person.id.as_str(),
                EmploymentTimeline::from_person(person)?,
                index.teams_of(person_id),
            ));
        }
    }

    let mut buckets: BTreeMap<NaiveDate, BucketTotals> = BTreeMap::new();
    let mut day = validated.from;
    loop {
        let totals = buckets
            .entry(period_start(day, validated.granularity))
            .or_default();

        for (person_id, timeline, teams) in &timelines {
            let capacity = hours_per_day * timeline.percent_on(day) / 100.0;
            if capacity <= 0.0 {
                continue;
            }

            let absence = absences
                .hours_for(person_id, teams, day)
                .clamp(0.0, capacity);
            totals.available += capacity - absence;

            let committed_percentage: f64 = commitments_by_person
                .get(person_id)
                .map(|commitments| {
                    commitments
                        .iter()
                        .filter(|c| c.start <= day && day <= c.end)
                        .filter(|c| scope.includes_project(c.project_id))
                        .map(|c| c.percentage)
                        .sum()
                })
                .unwrap_or(0.0);
            let load = hours_per_day * committed_percentage / 100.0;
            totals.load += load;
            if scope.project_ids.is_some() {
                totals.project_load += load;
            }
        }

        if day >= validated.to {
            break;
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    let report_buckets = finalize_buckets(&buckets, &scope, project_estimation);

    debug!(
        target: "app::report",
        organisation_id = %organisation.id,
        scope = %validated.scope,
        granularity = %validated.granularity,
        people = timelines.len(),
        buckets = report_buckets.len(),
        "capacity report calculated"
    );

    Ok(CapacityReport {
        scope: validated.scope,
        granularity: validated.granularity,
        from: format_date(validated.from),
        to: format_date(validated.to),
        person_ids: scope.person_ids.iter().cloned().collect(),
        project_ids: scope
            .project_ids
            .as_ref()
            .map(|projects| projects.iter().cloned().collect()),
        buckets: report_buckets,
    })
}

fn project_estimation(snapshot: &OrganisationSnapshot, scope: &ResolvedScope) -> f64 {
    match &scope.project_ids {
        Some(project_ids) => snapshot
            .projects
            .iter()
            .filter(|project| project_ids.contains(&project.id))
            .map(|project| project.estimated_effort_hours)
            .sum(),
        None => 0.0,
    }
}

fn finalize_buckets(
    buckets: &BTreeMap<NaiveDate, BucketTotals>,
    scope: &ResolvedScope,
    project_estimation: f64,
) -> Vec<ReportBucket> {
    let project_scope = scope.project_ids.is_some();
    let mut cumulative_project_load = 0.0;

    buckets
        .iter()
        .map(|(period_start, totals)| {
            let utilization = if totals.available > 0.0 {
                totals.load / totals.available * 100.0
            } else {
                0.0
            };

            let (project_load, estimation, completion) = if project_scope {
                cumulative_project_load += totals.project_load;
                let completion = if project_estimation > 0.0 {
                    cumulative_project_load / project_estimation * 100.0
                } else {
                    0.0
                };
                (
                    Some(round2(cumulative_project_load)),
                    Some(round2(project_estimation)),
                    Some(round2(completion)),
                )
            } else {
                (None, None, None)
            };

            ReportBucket {
                period_start: format_date(*period_start),
                available_hours: round2(totals.available),
                load_hours: round2(totals.load),
                free_hours: round2(totals.available - totals.load),
                utilization_percentage: round2(utilization),
                project_load_hours: project_load,
                project_estimation_hours: estimation,
                completion_percentage: completion,
            }
        })
        .collect()
}
