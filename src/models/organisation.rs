use serde::{Deserialize, Serialize};

/// Hours in a calendar day; the absolute bound on any person's daily load.
pub const HOURS_PER_CALENDAR_DAY: f64 = 24.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationRecord {
    pub id: String,
    pub name: String,
    pub hours_per_day: f64,
    pub hours_per_week: f64,
    pub hours_per_year: f64,
}

impl OrganisationRecord {
    /// Maximum aggregate commitment percentage a single person may carry on
    /// one day: 24h expressed as a percentage of the organisation's day.
    pub fn commitment_ceiling(&self) -> f64 {
        commitment_ceiling(self.hours_per_day)
    }
}

pub fn commitment_ceiling(hours_per_day: f64) -> f64 {
    HOURS_PER_CALENDAR_DAY * 100.0 / hours_per_day
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationCreateInput {
    pub name: String,
    pub hours_per_day: f64,
    pub hours_per_week: f64,
    pub hours_per_year: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationUpdateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hours_per_day: Option<f64>,
    #[serde(default)]
    pub hours_per_week: Option<f64>,
    #[serde(default)]
    pub hours_per_year: Option<f64>,
}
