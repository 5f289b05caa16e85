use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub id: String,
    pub organisation_id: String,
    pub name: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

impl TeamRecord {
    pub fn has_member(&self, person_id: &str) -> bool {
        self.member_ids.iter().any(|member| member == person_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamCreateInput {
    pub name: String,
    #[serde(default)]
    pub member_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamUpdateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub member_ids: Option<Vec<String>>,
}
