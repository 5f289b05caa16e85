use serde::{Deserialize, Serialize};

use crate::models::absence::AbsenceRecord;
use crate::models::commitment::CommitmentRecord;
use crate::models::organisation::OrganisationRecord;
use crate::models::person::PersonRecord;
use crate::models::project::ProjectRecord;
use crate::models::team::TeamRecord;

/// Everything the calculation engine and the limit validator read for one
/// organisation, fully materialized before either runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationSnapshot {
    pub organisation: OrganisationRecord,
    #[serde(default)]
    pub people: Vec<PersonRecord>,
    #[serde(default)]
    pub teams: Vec<TeamRecord>,
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub commitments: Vec<CommitmentRecord>,
    #[serde(default)]
    pub absences: Vec<AbsenceRecord>,
}

impl OrganisationSnapshot {
    pub fn new(organisation: OrganisationRecord) -> Self {
        Self {
            organisation,
            people: Vec::new(),
            teams: Vec::new(),
            projects: Vec::new(),
            commitments: Vec::new(),
            absences: Vec::new(),
        }
    }
}
