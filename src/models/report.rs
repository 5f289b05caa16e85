use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportScope {
    Organisation,
    Person,
    Team,
    Project,
}

impl ReportScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportScope::Organisation => "organisation",
            ReportScope::Person => "person",
            ReportScope::Team => "team",
            ReportScope::Project => "project",
        }
    }
}

impl fmt::Display for ReportScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReportScope {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "organisation" => Ok(ReportScope::Organisation),
            "person" => Ok(ReportScope::Person),
            "team" => Ok(ReportScope::Team),
            "project" => Ok(ReportScope::Project),
            other => Err(format!("unsupported report scope: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ReportGranularity {
    Day,
    Week,
    Month,
    Year,
}

impl ReportGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportGranularity::Day => "day",
            ReportGranularity::Week => "week",
            ReportGranularity::Month => "month",
            ReportGranularity::Year => "year",
        }
    }
}

impl fmt::Display for ReportGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReportGranularity {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "day" => Ok(ReportGranularity::Day),
            "week" => Ok(ReportGranularity::Week),
            "month" => Ok(ReportGranularity::Month),
            "year" => Ok(ReportGranularity::Year),
            other => Err(format!("unsupported report granularity: {other}")),
        }
    }
}

/// Report request as received from callers. Scope and granularity stay raw
/// strings here and are validated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub scope: String,
    #[serde(default)]
    pub ids: Vec<String>,
    pub from: String,
    pub to: String,
    pub granularity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportBucket {
    pub period_start: String,
    pub available_hours: f64,
    pub load_hours: f64,
    pub free_hours: f64,
    pub utilization_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_load_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_estimation_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CapacityReport {
    pub scope: ReportScope,
    pub granularity: ReportGranularity,
    pub from: String,
    pub to: String,
    pub person_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_ids: Option<Vec<String>>,
    pub buckets: Vec<ReportBucket>,
}
