use std::collections::HashMap;

use crate::models::person::PersonRecord;
use crate::models::snapshot::OrganisationSnapshot;
use crate::models::team::TeamRecord;

/// Borrowed id lookups over an [`OrganisationSnapshot`].
pub struct SnapshotIndex<'a> {
    people: HashMap<&'a str, &'a PersonRecord>,
    teams: HashMap<&'a str, &'a TeamRecord>,
    teams_by_person: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> SnapshotIndex<'a> {
    pub fn new(snapshot: &'a OrganisationSnapshot) -> Self {
        Self::from_parts(&snapshot.people, &snapshot.teams)
    }

    pub fn from_parts(people: &'a [PersonRecord], teams: &'a [TeamRecord]) -> Self {
        let mut teams_by_person: HashMap<&str, Vec<&str>> = HashMap::new();
        for team in teams {
            for member in &team.member_ids {
                let entry = teams_by_person.entry(member.as_str()).or_default();
                if !entry.contains(&team.id.as_str()) {
                    entry.push(team.id.as_str());
                }
            }
        }

        Self {
            people: people
                .iter()
                .map(|person| (person.id.as_str(), person))
                .collect(),
            teams: teams.iter().map(|team| (team.id.as_str(), team)).collect(),
            teams_by_person,
        }
    }

    pub fn person(&self, id: &str) -> Option<&'a PersonRecord> {
        self.people.get(id).copied()
    }

    pub fn team(&self, id: &str) -> Option<&'a TeamRecord> {
        self.teams.get(id).copied()
    }

    pub fn has_person(&self, id: &str) -> bool {
        self.people.contains_key(id)
    }

    pub fn has_team(&self, id: &str) -> bool {
        self.teams.contains_key(id)
    }

    /// Teams listing `person_id` as a member.
    pub fn teams_of(&self, person_id: &str) -> &[&'a str] {
        self.teams_by_person
            .get(person_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Members of `team_id` that exist as people in the snapshot.
    pub fn known_members(&self, team_id: &str) -> Vec<&'a str> {
        let Some(team) = self.team(team_id) else {
            return Vec::new();
        };

        let mut members: Vec<&str> = Vec::with_capacity(team.member_ids.len());
        for member in &team.member_ids {
            if self.has_person(member) && !members.contains(&member.as_str()) {
                members.push(member.as_str());
            }
        }
        members
    }
}
