use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What a commitment is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommitmentTarget {
    Person(String),
    Team(String),
}

impl CommitmentTarget {
    pub fn kind(&self) -> CommitmentTargetKind {
        match self {
            CommitmentTarget::Person(_) => CommitmentTargetKind::Person,
            CommitmentTarget::Team(_) => CommitmentTargetKind::Team,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            CommitmentTarget::Person(id) | CommitmentTarget::Team(id) => id,
        }
    }

    /// Builds a target from stored or submitted fields.
    ///
    /// Records written before team targets existed carry no target type and
    /// only a direct `personId`; those are read as person targets.
    pub fn from_fields(
        target_type: Option<&str>,
        target_id: Option<&str>,
        legacy_person_id: Option<&str>,
    ) -> Result<Self, String> {
        let target_type = target_type.map(str::trim).filter(|value| !value.is_empty());
        let target_id = target_id.map(str::trim).filter(|value| !value.is_empty());
        let legacy_person_id = legacy_person_id
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match target_type {
            Some(kind) => {
                let kind = CommitmentTargetKind::try_from(kind)?;
                let id = target_id
                    .or(match kind {
                        CommitmentTargetKind::Person => legacy_person_id,
                        CommitmentTargetKind::Team => None,
                    })
                    .ok_or_else(|| format!("commitment target id is required for {kind} targets"))?;
                Ok(kind.with_id(id))
            }
            None => match (legacy_person_id, target_id) {
                (Some(person_id), _) => Ok(CommitmentTarget::Person(person_id.to_string())),
                (None, Some(_)) => Err("commitment target type is required".to_string()),
                (None, None) => Err("commitment has no target".to_string()),
            },
        }
    }
}

impl fmt::Display for CommitmentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentTargetKind {
    Person,
    Team,
}

impl CommitmentTargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitmentTargetKind::Person => "person",
            CommitmentTargetKind::Team => "team",
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> CommitmentTarget {
        match self {
            CommitmentTargetKind::Person => CommitmentTarget::Person(id.into()),
            CommitmentTargetKind::Team => CommitmentTarget::Team(id.into()),
        }
    }
}

impl fmt::Display for CommitmentTargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CommitmentTargetKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "person" => Ok(CommitmentTargetKind::Person),
            "team" => Ok(CommitmentTargetKind::Team),
            other => Err(format!("unsupported commitment target type: {other}")),
        }
    }
}

/// A person or team committed to a project for a date range, at a percentage
/// of one full-time organisation day. Empty `start_date`/`end_date` leave the
/// range open on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CommitmentPayload", into = "CommitmentPayload")]
pub struct CommitmentRecord {
    pub id: String,
    pub organisation_id: String,
    pub target: CommitmentTarget,
    pub project_id: String,
    pub start_date: String,
    pub end_date: String,
    pub percentage: f64,
}

/// Wire shape of a commitment, including the legacy `personId` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentPayload {
    pub id: String,
    pub organisation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    pub percentage: f64,
}

impl TryFrom<CommitmentPayload> for CommitmentRecord {
    type Error = String;

    fn try_from(payload: CommitmentPayload) -> Result<Self, Self::Error> {
        let target = CommitmentTarget::from_fields(
            payload.target_type.as_deref(),
            payload.target_id.as_deref(),
            payload.person_id.as_deref(),
        )?;

        Ok(Self {
            id: payload.id,
            organisation_id: payload.organisation_id,
            target,
            project_id: payload.project_id,
            start_date: payload.start_date,
            end_date: payload.end_date,
            percentage: payload.percentage,
        })
    }
}

impl From<CommitmentRecord> for CommitmentPayload {
    fn from(record: CommitmentRecord) -> Self {
        Self {
            id: record.id,
            organisation_id: record.organisation_id,
            target_type: Some(record.target.kind().as_str().to_string()),
            target_id: Some(record.target.id().to_string()),
            person_id: None,
            project_id: record.project_id,
            start_date: record.start_date,
            end_date: record.end_date,
            percentage: record.percentage,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentCreateInput {
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub person_id: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentUpdateInput {
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub percentage: Option<f64>,
}
