use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::db::repositories::organisation_repository::OrganisationRepository;
use crate::db::repositories::person_repository::PersonRepository;
use crate::db::repositories::project_repository::ProjectRepository;
use crate::db::repositories::team_repository::TeamRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::organisation::{
    OrganisationCreateInput, OrganisationRecord, OrganisationUpdateInput,
};
use crate::models::person::{PersonCreateInput, PersonRecord, PersonUpdateInput};
use crate::models::project::{ProjectCreateInput, ProjectRecord, ProjectUpdateInput};
use crate::models::team::{TeamCreateInput, TeamRecord, TeamUpdateInput};
use crate::services::employment_timeline::EmploymentTimeline;
use crate::utils::date_range::parse_closed_range;

/// Organisations and the people, teams and projects that belong to them.
#[derive(Clone)]
pub struct DirectoryService {
    db: DbPool,
}

impl DirectoryService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    // Organisations

    pub fn create_organisation(
        &self,
        input: OrganisationCreateInput,
    ) -> AppResult<OrganisationRecord> {
        let record = OrganisationRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            hours_per_day: input.hours_per_day,
            hours_per_week: input.hours_per_week,
            hours_per_year: input.hours_per_year,
        };
        validate_organisation(&record)?;

        self.db
            .with_connection(|conn| OrganisationRepository::insert(conn, &record))?;
        info!(target: "app::directory", organisation_id = %record.id, "organisation created");
        Ok(record)
    }

    pub fn get_organisation(&self, id: &str) -> AppResult<OrganisationRecord> {
        self.db
            .with_connection(|conn| OrganisationRepository::find_by_id(conn, id))?
            .ok_or_else(|| AppError::not_found("organisation", id))
    }

    pub fn list_organisations(&self) -> AppResult<Vec<OrganisationRecord>> {
        self.db.with_connection(OrganisationRepository::list)
    }

    pub fn update_organisation(
        &self,
        id: &str,
        update: OrganisationUpdateInput,
    ) -> AppResult<OrganisationRecord> {
        let mut record = self.get_organisation(id)?;
        if let Some(name) = update.name {
            record.name = name.trim().to_string();
        }
        if let Some(hours) = update.hours_per_day {
            record.hours_per_day = hours;
        }
        if let Some(hours) = update.hours_per_week {
            record.hours_per_week = hours;
        }
        if let Some(hours) = update.hours_per_year {
            record.hours_per_year = hours;
        }
        validate_organisation(&record)?;

        self.db
            .with_connection(|conn| OrganisationRepository::update(conn, &record))?;
        info!(target: "app::directory", organisation_id = %record.id, "organisation updated");
        Ok(record)
    }

    pub fn delete_organisation(&self, id: &str) -> AppResult<()> {
        if !self
            .db
            .with_connection(|conn| OrganisationRepository::delete(conn, id))?
        {
            return Err(AppError::not_found("organisation", id));
        }
        info!(target: "app::directory", organisation_id = %id, "organisation deleted");
        Ok(())
    }

    // People

    pub fn create_person(
        &self,
        organisation_id: &str,
        input: PersonCreateInput,
    ) -> AppResult<PersonRecord> {
        self.get_organisation(organisation_id)?;
        let record = PersonRecord {
            id: uuid::Uuid::new_v4().to_string(),
            organisation_id: organisation_id.to_string(),
            name: input.name.trim().to_string(),
            employment_percentage: input.employment_percentage,
            employment_changes: input.employment_changes.unwrap_or_default(),
        };
        validate_person(&record)?;

        self.db
            .with_connection(|conn| PersonRepository::insert(conn, &record))?;
        info!(target: "app::directory", person_id = %record.id, organisation_id, "person created");
        Ok(record)
    }

    pub fn get_person(&self, organisation_id: &str, id: &str) -> AppResult<PersonRecord> {
        self.db
            .with_connection(|conn| PersonRepository::find_by_id(conn, organisation_id, id))?
            .ok_or_else(|| AppError::not_found("person", id))
    }

    pub fn list_people(&self, organisation_id: &str) -> AppResult<Vec<PersonRecord>> {
        self.db
            .with_connection(|conn| PersonRepository::list_by_organisation(conn, organisation_id))
    }

    pub fn update_person(
        &self,
        organisation_id: &str,
        id: &str,
        update: PersonUpdateInput,
    ) -> AppResult<PersonRecord> {
        let mut record = self.get_person(organisation_id, id)?;
        if let Some(name) = update.name {
            record.name = name.trim().to_string();
        }
        if let Some(percentage) = update.employment_percentage {
            record.employment_percentage = percentage;
        }
        if let Some(changes) = update.employment_changes {
            record.employment_changes = changes;
        }
        validate_person(&record)?;

        self.db
            .with_connection(|conn| PersonRepository::update(conn, &record))?;
        info!(target: "app::directory", person_id = %record.id, "person updated");
        Ok(record)
    }

    /// Commitments and team memberships naming the person are left in place
    /// and are skipped by calculations from now on.
    pub fn delete_person(&self, organisation_id: &str, id: &str) -> AppResult<()> {
        if !self
            .db
            .with_connection(|conn| PersonRepository::delete(conn, organisation_id, id))?
        {
            return Err(AppError::not_found("person", id));
        }
        info!(target: "app::directory", person_id = %id, "person deleted");
        Ok(())
    }

    // Teams

    pub fn create_team(&self, organisation_id: &str, input: TeamCreateInput) -> AppResult<TeamRecord> {
        self.get_organisation(organisation_id)?;
        let record = TeamRecord {
            id: uuid::Uuid::new_v4().to_string(),
            organisation_id: organisation_id.to_string(),
            name: input.name.trim().to_string(),
            member_ids: dedupe(input.member_ids.unwrap_or_default()),
        };
        self.validate_team(&record)?;

        self.db
            .with_connection(|conn| TeamRepository::insert(conn, &record))?;
        info!(
            target: "app::directory",
            team_id = %record.id,
            members = record.member_ids.len(),
            "team created"
        );
        Ok(record)
    }

    pub fn get_team(&self, organisation_id: &str, id: &str) -> AppResult<TeamRecord> {
        self.db
            .with_connection(|conn| TeamRepository::find_by_id(conn, organisation_id, id))?
            .ok_or_else(|| AppError::not_found("team", id))
    }

    pub fn list_teams(&self, organisation_id: &str) -> AppResult<Vec<TeamRecord>> {
        self.db
            .with_connection(|conn| TeamRepository::list_by_organisation(conn, organisation_id))
    }

    pub fn update_team(
        &self,
        organisation_id: &str,
        id: &str,
        update: TeamUpdateInput,
    ) -> AppResult<TeamRecord> {
        let mut record = self.get_team(organisation_id, id)?;
        if let Some(name) = update.name {
            record.name = name.trim().to_string();
        }
        if let Some(member_ids) = update.member_ids {
            record.member_ids = dedupe(member_ids);
        }
        self.validate_team(&record)?;

        self.db
            .with_connection(|conn| TeamRepository::update(conn, &record))?;
        info!(target: "app::directory", team_id = %record.id, "team updated");
        Ok(record)
    }

    pub fn delete_team(&self, organisation_id: &str, id: &str) -> AppResult<()> {
        if !self
            .db
            .with_connection(|conn| TeamRepository::delete(conn, organisation_id, id))?
        {
            return Err(AppError::not_found("team", id));
        }
        info!(target: "app::directory", team_id = %id, "team deleted");
        Ok(())
    }

    /// Adds a person to a team; adding an existing member is a no-op.
    pub fn add_team_member(
        &self,
        organisation_id: &str,
        team_id: &str,
        person_id: &str,
    ) -> AppResult<TeamRecord> {
        let mut team = self.get_team(organisation_id, team_id)?;
        if team.has_member(person_id) {
            debug!(target: "app::directory", team_id, person_id, "already a member");
            return Ok(team);
        }
        self.get_person(organisation_id, person_id)?;
        team.member_ids.push(person_id.to_string());

        self.db
            .with_connection(|conn| TeamRepository::update(conn, &team))?;
        info!(target: "app::directory", team_id, person_id, "team member added");
        Ok(team)
    }

    pub fn remove_team_member(
        &self,
        organisation_id: &str,
        team_id: &str,
        person_id: &str,
    ) -> AppResult<TeamRecord> {
        let mut team = self.get_team(organisation_id, team_id)?;
        if !team.has_member(person_id) {
            return Err(AppError::not_found("team member", person_id));
        }
        team.member_ids.retain(|member| member != person_id);

        self.db
            .with_connection(|conn| TeamRepository::update(conn, &team))?;
        info!(target: "app::directory", team_id, person_id, "team member removed");
        Ok(team)
    }

    fn validate_team(&self, record: &TeamRecord) -> AppResult<()> {
        ensure_name("team", &record.name)?;
        let people = self.list_people(&record.organisation_id)?;
        for member in &record.member_ids {
            if !people.iter().any(|person| &person.id == member) {
                return Err(AppError::not_found("person", member.as_str()));
            }
        }
        Ok(())
    }

    // Projects

    pub fn create_project(
        &self,
        organisation_id: &str,
        input: ProjectCreateInput,
    ) -> AppResult<ProjectRecord> {
        self.get_organisation(organisation_id)?;
        let record = ProjectRecord {
            id: uuid::Uuid::new_v4().to_string(),
            organisation_id: organisation_id.to_string(),
            name: input.name.trim().to_string(),
            start_date: input.start_date,
            end_date: input.end_date,
            estimated_effort_hours: input.estimated_effort_hours,
        };
        validate_project(&record)?;

        self.db
            .with_connection(|conn| ProjectRepository::insert(conn, &record))?;
        info!(target: "app::directory", project_id = %record.id, organisation_id, "project created");
        Ok(record)
    }

    pub fn get_project(&self, organisation_id: &str, id: &str) -> AppResult<ProjectRecord> {
        self.db
            .with_connection(|conn| ProjectRepository::find_by_id(conn, organisation_id, id))?
            .ok_or_else(|| AppError::not_found("project", id))
    }

    pub fn list_projects(&self, organisation_id: &str) -> AppResult<Vec<ProjectRecord>> {
        self.db
            .with_connection(|conn| ProjectRepository::list_by_organisation(conn, organisation_id))
    }

    pub fn update_project(
        &self,
        organisation_id: &str,
        id: &str,
        update: ProjectUpdateInput,
    ) -> AppResult<ProjectRecord> {
        let mut record = self.get_project(organisation_id, id)?;
        if let Some(name) = update.name {
            record.name = name.trim().to_string();
        }
        if let Some(start_date) = update.start_date {
            record.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            record.end_date = end_date;
        }
        if let Some(hours) = update.estimated_effort_hours {
            record.estimated_effort_hours = hours;
        }
        validate_project(&record)?;

        self.db
            .with_connection(|conn| ProjectRepository::update(conn, &record))?;
        info!(target: "app::directory", project_id = %record.id, "project updated");
        Ok(record)
    }

    pub fn delete_project(&self, organisation_id: &str, id: &str) -> AppResult<()> {
        if !self
            .db
            .with_connection(|conn| ProjectRepository::delete(conn, organisation_id, id))?
        {
            return Err(AppError::not_found("project", id));
        }
        info!(target: "app::directory", project_id = %id, "project deleted");
        Ok(())
    }
}

fn validate_organisation(record: &OrganisationRecord) -> AppResult<()> {
    ensure_name("organisation", &record.name)?;
    for (field, value) in [
        ("hoursPerDay", record.hours_per_day),
        ("hoursPerWeek", record.hours_per_week),
        ("hoursPerYear", record.hours_per_year),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(AppError::validation(format!(
                "{field} must be a positive number"
            )));
        }
    }
    Ok(())
}

fn validate_person(record: &PersonRecord) -> AppResult<()> {
    ensure_name("person", &record.name)?;
    EmploymentTimeline::from_person(record).map(|_| ())
}

fn validate_project(record: &ProjectRecord) -> AppResult<()> {
    ensure_name("project", &record.name)?;
    parse_closed_range(&record.start_date, &record.end_date)?;
    if !record.estimated_effort_hours.is_finite() || record.estimated_effort_hours <= 0.0 {
        return Err(AppError::validation(
            "estimatedEffortHours must be a positive number",
        ));
    }
    Ok(())
}

fn ensure_name(entity: &str, name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation(format!("{entity} name is required")));
    }
    Ok(())
}

fn dedupe(ids: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}
