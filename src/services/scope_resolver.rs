use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::commitment::CommitmentTarget;
use crate::models::report::ReportScope;
use crate::models::snapshot::OrganisationSnapshot;
use crate::services::snapshot_index::SnapshotIndex;

/// People in view for a report and, for project scope, the projects whose
/// commitments count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedScope {
    pub person_ids: BTreeSet<String>,
    pub project_ids: Option<BTreeSet<String>>,
}

impl ResolvedScope {
    pub fn includes_project(&self, project_id: &str) -> bool {
        match &self.project_ids {
            Some(projects) => projects.contains(project_id),
            None => true,
        }
    }
}

pub fn resolve_scope(
    scope: ReportScope,
    ids: &[String],
    snapshot: &OrganisationSnapshot,
    index: &SnapshotIndex<'_>,
) -> AppResult<ResolvedScope> {
    let resolved = match scope {
        ReportScope::Organisation => ResolvedScope {
            person_ids: all_people(snapshot),
            project_ids: None,
        },
        ReportScope::Person => {
            let person_ids = if ids.is_empty() {
                all_people(snapshot)
            } else {
                let mut selected = BTreeSet::new();
                for id in ids {
                    if !index.has_person(id) {
                        return Err(AppError::not_found("person", id.as_str()));
                    }
                    selected.insert(id.clone());
                }
                selected
            };
            ResolvedScope {
                person_ids,
                project_ids: None,
            }
        }
        ReportScope::Team => {
            let team_ids = if ids.is_empty() {
                snapshot.teams.iter().map(|team| team.id.clone()).collect()
            } else {
                ids.to_vec()
            };

            let mut person_ids = BTreeSet::new();
            for team_id in &team_ids {
                if !index.has_team(team_id) {
                    return Err(AppError::not_found("team", team_id.as_str()));
                }
                person_ids.extend(index.known_members(team_id).into_iter().map(String::from));
            }
            ResolvedScope {
                person_ids,
                project_ids: None,
            }
        }
        ReportScope::Project => resolve_project_scope(ids, snapshot, index)?,
    };

    debug!(
        target: "app::report",
        scope = %scope,
        people = resolved.person_ids.len(),
        projects = resolved.project_ids.as_ref().map(BTreeSet::len),
        "scope resolved"
    );

    Ok(resolved)
}

fn resolve_project_scope(
    ids: &[String],
    snapshot: &OrganisationSnapshot,
    index: &SnapshotIndex<'_>,
) -> AppResult<ResolvedScope> {
    let project_ids: BTreeSet<String> = if ids.is_empty() {
        snapshot
            .projects
            .iter()
            .map(|project| project.id.clone())
            .collect()
    } else {
        let mut selected = BTreeSet::new();
        for id in ids {
            if !snapshot.projects.iter().any(|project| &project.id == id) {
                return Err(AppError::not_found("project", id.as_str()));
            }
            selected.insert(id.clone());
        }
        selected
    };

    let mut person_ids = BTreeSet::new();
    for commitment in &snapshot.commitments {
        if !project_ids.contains(&commitment.project_id) {
            continue;
        }
        match &commitment.target {
            CommitmentTarget::Person(person_id) => {
                if index.has_person(person_id) {
                    person_ids.insert(person_id.clone());
                }
            }
            CommitmentTarget::Team(team_id) => {
                person_ids.extend(index.known_members(team_id).into_iter().map(String::from));
            }
        }
    }

    Ok(ResolvedScope {
        person_ids,
        project_ids: Some(project_ids),
    })
}

fn all_people(snapshot: &OrganisationSnapshot) -> BTreeSet<String> {
    snapshot
        .people
        .iter()
        .map(|person| person.id.clone())
        .collect()
}
