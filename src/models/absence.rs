use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Who an absence applies to. Organisation-wide absences are holidays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "targetId", rename_all = "lowercase")]
pub enum AbsenceScope {
    Organisation,
    Team(String),
    Person(String),
}

impl AbsenceScope {
    pub fn kind(&self) -> AbsenceKind {
        match self {
            AbsenceScope::Organisation => AbsenceKind::Holiday,
            AbsenceScope::Team(_) => AbsenceKind::Team,
            AbsenceScope::Person(_) => AbsenceKind::Person,
        }
    }

    pub fn target_id(&self) -> Option<&str> {
        match self {
            AbsenceScope::Organisation => None,
            AbsenceScope::Team(id) | AbsenceScope::Person(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AbsenceKind {
    Holiday,
    Team,
    Person,
}

impl AbsenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbsenceKind::Holiday => "holiday",
            AbsenceKind::Team => "team",
            AbsenceKind::Person => "person",
        }
    }

    pub fn scope(self, target_id: Option<String>) -> Result<AbsenceScope, String> {
        match (self, target_id) {
            (AbsenceKind::Holiday, _) => Ok(AbsenceScope::Organisation),
            (AbsenceKind::Team, Some(id)) => Ok(AbsenceScope::Team(id)),
            (AbsenceKind::Person, Some(id)) => Ok(AbsenceScope::Person(id)),
            (kind, None) => Err(format!("{kind} absence requires a target id")),
        }
    }
}

impl fmt::Display for AbsenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AbsenceKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "holiday" => Ok(AbsenceKind::Holiday),
            "team" => Ok(AbsenceKind::Team),
            "person" => Ok(AbsenceKind::Person),
            other => Err(format!("unsupported absence kind: {other}")),
        }
    }
}

/// Hours of a single calendar day that are not available for work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceRecord {
    pub id: String,
    pub organisation_id: String,
    pub scope: AbsenceScope,
    pub date: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceCreateInput {
    pub scope: AbsenceScope,
    pub date: String,
    pub hours: f64,
}
