use serde::{Deserialize, Serialize};

/// A dated override of a person's employment percentage, effective from the
/// first day of `effective_month` (`YYYY-MM`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentChange {
    pub effective_month: String,
    pub employment_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub id: String,
    pub organisation_id: String,
    pub name: String,
    pub employment_percentage: f64,
    #[serde(default)]
    pub employment_changes: Vec<EmploymentChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonCreateInput {
    pub name: String,
    pub employment_percentage: f64,
    #[serde(default)]
    pub employment_changes: Option<Vec<EmploymentChange>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonUpdateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub employment_percentage: Option<f64>,
    #[serde(default)]
    pub employment_changes: Option<Vec<EmploymentChange>>,
}
