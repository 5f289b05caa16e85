use chrono::NaiveDate;
use serde_json::json;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::commitment::{CommitmentRecord, CommitmentTarget};
use crate::services::snapshot_index::SnapshotIndex;
use crate::utils::date_range::resolve_open_range;

/// A commitment reduced to the people it binds and a concrete date range.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCommitment<'a> {
    pub commitment_id: &'a str,
    pub project_id: &'a str,
    pub percentage: f64,
    pub person_ids: Vec<&'a str>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ResolvedCommitment<'_> {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn binds(&self, person_id: &str) -> bool {
        self.person_ids.iter().any(|id| *id == person_id)
    }
}

/// Resolves a commitment against the snapshot.
///
/// Malformed dates or percentages are errors. A dangling target (unknown
/// person, unknown team, or a team without known members) yields `Ok(None)`.
pub fn resolve_commitment<'a>(
    commitment: &'a CommitmentRecord,
    index: &SnapshotIndex<'a>,
) -> AppResult<Option<ResolvedCommitment<'a>>> {
    let (start, end) = resolve_open_range(&commitment.start_date, &commitment.end_date)
        .map_err(|err| with_commitment_context(err, commitment))?;
    ensure_commitment_percentage(commitment.percentage)
        .map_err(|err| with_commitment_context(err, commitment))?;

    let person_ids: Vec<&str> = match &commitment.target {
        CommitmentTarget::Person(person_id) => match index.person(person_id) {
            Some(person) => vec![person.id.as_str()],
            None => Vec::new(),
        },
        CommitmentTarget::Team(team_id) => index.known_members(team_id),
    };

    if person_ids.is_empty() {
        debug!(
            target: "app::commitment",
            commitment_id = %commitment.id,
            target = %commitment.target,
            "commitment target does not resolve, skipping"
        );
        return Ok(None);
    }

    Ok(Some(ResolvedCommitment {
        commitment_id: &commitment.id,
        project_id: &commitment.project_id,
        percentage: commitment.percentage,
        person_ids,
        start,
        end,
    }))
}

/// Commitment percentages are relative to a full-time day and may exceed 100,
/// but never be negative or non-finite.
pub fn ensure_commitment_percentage(percentage: f64) -> AppResult<()> {
    if percentage.is_finite() && percentage >= 0.0 {
        Ok(())
    } else {
        Err(AppError::validation_with_details(
            "commitment percentage must be a finite, non-negative number",
            json!({"percentage": percentage.to_string()}),
        ))
    }
}

fn with_commitment_context(error: AppError, commitment: &CommitmentRecord) -> AppError {
    match error {
        AppError::Validation {
            message,
            source,
            details,
        } => {
            let mut context = json!({"commitmentId": commitment.id});
            if let (Some(extra), Some(map)) = (details, context.as_object_mut()) {
                map.insert("cause".to_string(), extra);
            }
            AppError::Validation {
                message: format!("commitment {}: {message}", commitment.id),
                source,
                details: Some(context),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::person::PersonRecord;
    use crate::models::team::TeamRecord;
    use crate::utils::date_range::{open_end, open_start, parse_date};

    fn person(id: &str) -> PersonRecord {
        PersonRecord {
            id: id.to_string(),
            organisation_id: "o1".to_string(),
            name: id.to_uppercase(),
            employment_percentage: 100.0,
            employment_changes: Vec::new(),
        }
    }

    fn team(id: &str, members: &[&str]) -> TeamRecord {
        TeamRecord {
            id: id.to_string(),
            organisation_id: "o1".to_string(),
            name: id.to_uppercase(),
            member_ids: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn commitment(target: CommitmentTarget, start: &str, end: &str) -> CommitmentRecord {
        CommitmentRecord {
            id: "c1".to_string(),
            organisation_id: "o1".to_string(),
            target,
            project_id: "pr1".to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            percentage: 50.0,
        }
    }

    #[test]
    fn known_person_resolves_to_exactly_that_person() {
        let people = vec![person("p1"), person("p2")];
        let index = SnapshotIndex::from_parts(&people, &[]);
        let record = commitment(
            CommitmentTarget::Person("p1".into()),
            "2026-01-01",
            "2026-01-31",
        );

        let resolved = resolve_commitment(&record, &index).unwrap().unwrap();
        assert_eq!(resolved.person_ids, vec!["p1"]);
        assert_eq!(resolved.start, parse_date("2026-01-01").unwrap());
        assert!(resolved.is_active_on(parse_date("2026-01-31").unwrap()));
        assert!(!resolved.is_active_on(parse_date("2026-02-01").unwrap()));
    }

    #[test]
    fn unknown_person_is_skipped_not_an_error() {
        let people = vec![person("p1")];
        let index = SnapshotIndex::from_parts(&people, &[]);
        let record = commitment(CommitmentTarget::Person("ghost".into()), "", "");
        assert!(resolve_commitment(&record, &index).unwrap().is_none());
    }

    #[test]
    fn team_expands_to_known_members_only() {
        let people = vec![person("p1"), person("p2")];
        let teams = vec![
            team("t1", &["p1", "p2", "gone", "p1"]),
            team("empty", &["gone"]),
        ];
        let index = SnapshotIndex::from_parts(&people, &teams);

        let record = commitment(CommitmentTarget::Team("t1".into()), "", "");
        let resolved = resolve_commitment(&record, &index).unwrap().unwrap();
        assert_eq!(resolved.person_ids, vec!["p1", "p2"]);
        assert_eq!(resolved.start, open_start());
        assert_eq!(resolved.end, open_end());

        let empty = commitment(CommitmentTarget::Team("empty".into()), "", "");
        assert!(resolve_commitment(&empty, &index).unwrap().is_none());

        let missing = commitment(CommitmentTarget::Team("nope".into()), "", "");
        assert!(resolve_commitment(&missing, &index).unwrap().is_none());
    }

    #[test]
    fn malformed_dates_fail_even_for_dangling_targets() {
        let index = SnapshotIndex::from_parts(&[], &[]);
        let record = commitment(
            CommitmentTarget::Person("ghost".into()),
            "2026-13-01",
            "",
        );
        let error = resolve_commitment(&record, &index).unwrap_err();
        assert!(error.is_validation());
        assert_eq!(error.details().unwrap()["commitmentId"], "c1");

        let reversed = commitment(
            CommitmentTarget::Person("ghost".into()),
            "2026-02-01",
            "2026-01-01",
        );
        assert!(resolve_commitment(&reversed, &index).is_err());
    }

    #[test]
    fn negative_percentage_is_rejected() {
        let people = vec![person("p1")];
        let index = SnapshotIndex::from_parts(&people, &[]);
        let mut record = commitment(CommitmentTarget::Person("p1".into()), "", "");
        record.percentage = -5.0;
        assert!(resolve_commitment(&record, &index).unwrap_err().is_validation());
        record.percentage = f64::NAN;
        assert!(resolve_commitment(&record, &index).unwrap_err().is_validation());
    }
}
