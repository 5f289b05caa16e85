use std::thread;

use capaplan_lib::commands::commitment::{
    commitment_create, commitment_delete, commitment_get, commitment_update, commitments_list,
};
use capaplan_lib::commands::{AppState, CallerContext, Role};
use capaplan_lib::config::AppConfig;
use capaplan_lib::models::commitment::{
    CommitmentCreateInput, CommitmentTarget, CommitmentUpdateInput,
};
use capaplan_lib::models::organisation::OrganisationCreateInput;
use capaplan_lib::models::person::PersonCreateInput;
use capaplan_lib::models::project::ProjectCreateInput;
use capaplan_lib::models::team::TeamCreateInput;
use tempfile::{tempdir, TempDir};

struct Fixture {
    state: AppState,
    planner: CallerContext,
    organisation_id: String,
    people: Vec<String>,
    team_id: String,
    project_id: String,
    _dir: TempDir,
}

fn setup() -> Fixture {
    let dir = tempdir().expect("temp dir");
    let config = AppConfig {
        database_path: dir.path().join("commitments.sqlite"),
        ..AppConfig::default()
    };
    let state = AppState::new(config).expect("app state");
    let directory = state.directory();

    let organisation = directory
        .create_organisation(OrganisationCreateInput {
            name: "Acme".into(),
            hours_per_day: 8.0,
            hours_per_week: 40.0,
            hours_per_year: 1720.0,
        })
        .expect("create organisation");

    let people: Vec<String> = ["Ada", "Grace"]
        .iter()
        .map(|name| {
            directory
                .create_person(
                    &organisation.id,
                    PersonCreateInput {
                        name: name.to_string(),
                        employment_percentage: 100.0,
                        employment_changes: None,
                    },
                )
                .expect("create person")
                .id
        })
        .collect();

    let team = directory
        .create_team(
            &organisation.id,
            TeamCreateInput {
                name: "Core".into(),
                member_ids: Some(people.clone()),
            },
        )
        .expect("create team");

    let project = directory
        .create_project(
            &organisation.id,
            ProjectCreateInput {
                name: "Apollo".into(),
                start_date: "2026-01-01".into(),
                end_date: "2026-12-31".into(),
                estimated_effort_hours: 400.0,
            },
        )
        .expect("create project");

    Fixture {
        planner: CallerContext::new(organisation.id.clone(), vec![Role::Planner]),
        state,
        organisation_id: organisation.id,
        people,
        team_id: team.id,
        project_id: project.id,
        _dir: dir,
    }
}

fn person_input(
    fx: &Fixture,
    person_id: &str,
    start: &str,
    end: &str,
    percentage: f64,
) -> CommitmentCreateInput {
    CommitmentCreateInput {
        target_type: Some("person".into()),
        target_id: Some(person_id.into()),
        person_id: None,
        project_id: fx.project_id.clone(),
        start_date: Some(start.into()),
        end_date: Some(end.into()),
        percentage,
    }
}

#[test]
fn overlapping_commitments_are_checked_against_the_ceiling() {
    let fx = setup();
    let ada = &fx.people[0];

    commitment_create(
        &fx.state,
        &fx.planner,
        &fx.organisation_id,
        person_input(&fx, ada, "2026-01-01", "2026-01-10", 60.0),
    )
    .expect("first commitment");

    commitment_create(
        &fx.state,
        &fx.planner,
        &fx.organisation_id,
        person_input(&fx, ada, "2026-01-05", "2026-01-15", 30.0),
    )
    .expect("within ceiling");

    let error = commitment_create(
        &fx.state,
        &fx.planner,
        &fx.organisation_id,
        person_input(&fx, ada, "2026-01-08", "2026-01-20", 250.0),
    )
    .expect_err("ceiling exceeded");
    assert_eq!(error.code, "VALIDATION_ERROR");
    let details = error.details.expect("breach details");
    assert_eq!(details["personId"], ada.as_str());
    assert_eq!(details["date"], "2026-01-08");
    assert_eq!(details["ceiling"], 300.0);

    let stored = commitments_list(&fx.state, &fx.planner, &fx.organisation_id, None)
        .expect("list commitments");
    assert_eq!(stored.len(), 2);
}

#[test]
fn team_commitments_bind_every_member() {
    let fx = setup();
    let grace = &fx.people[1];

    let team_commitment = commitment_create(
        &fx.state,
        &fx.planner,
        &fx.organisation_id,
        CommitmentCreateInput {
            target_type: Some("team".into()),
            target_id: Some(fx.team_id.clone()),
            person_id: None,
            project_id: fx.project_id.clone(),
            start_date: None,
            end_date: None,
            percentage: 200.0,
        },
    )
    .expect("team commitment");
    assert_eq!(team_commitment.target, CommitmentTarget::Team(fx.team_id.clone()));
    assert_eq!(team_commitment.start_date, "");

    let error = commitment_create(
        &fx.state,
        &fx.planner,
        &fx.organisation_id,
        person_input(&fx, grace, "2026-03-01", "2026-03-01", 150.0),
    )
    .expect_err("member already carries the team load");
    assert_eq!(error.details.expect("details")["personId"], grace.as_str());
}

#[test]
fn legacy_person_id_payload_creates_a_person_target() {
    let fx = setup();
    let ada = fx.people[0].clone();

    let created = commitment_create(
        &fx.state,
        &fx.planner,
        &fx.organisation_id,
        CommitmentCreateInput {
            target_type: None,
            target_id: None,
            person_id: Some(ada.clone()),
            project_id: fx.project_id.clone(),
            start_date: Some("2026-01-01".into()),
            end_date: None,
            percentage: 40.0,
        },
    )
    .expect("legacy commitment");

    let fetched = commitment_get(&fx.state, &fx.planner, &fx.organisation_id, &created.id)
        .expect("fetch commitment");
    assert_eq!(fetched.target, CommitmentTarget::Person(ada));
    assert_eq!(fetched.end_date, "");
}

#[test]
fn update_replaces_the_previous_version_and_delete_removes_it() {
    let fx = setup();
    let ada = &fx.people[0];

    let created = commitment_create(
        &fx.state,
        &fx.planner,
        &fx.organisation_id,
        person_input(&fx, ada, "2026-01-01", "2026-01-31", 250.0),
    )
    .expect("create");

    let updated = commitment_update(
        &fx.state,
        &fx.planner,
        &fx.organisation_id,
        &created.id,
        CommitmentUpdateInput {
            percentage: Some(300.0),
            ..Default::default()
        },
    )
    .expect("update to exactly the ceiling");
    assert_eq!(updated.percentage, 300.0);

    let error = commitment_update(
        &fx.state,
        &fx.planner,
        &fx.organisation_id,
        &created.id,
        CommitmentUpdateInput {
            percentage: Some(300.5),
            ..Default::default()
        },
    )
    .expect_err("above ceiling");
    assert_eq!(error.code, "VALIDATION_ERROR");

    commitment_delete(&fx.state, &fx.planner, &fx.organisation_id, &created.id)
        .expect("delete");
    let error = commitment_delete(&fx.state, &fx.planner, &fx.organisation_id, &created.id)
        .expect_err("already deleted");
    assert_eq!(error.code, "NOT_FOUND");
}

#[test]
fn unknown_references_are_not_found() {
    let fx = setup();

    let mut input = person_input(&fx, "ghost", "2026-01-01", "2026-01-31", 10.0);
    let error = commitment_create(&fx.state, &fx.planner, &fx.organisation_id, input.clone())
        .expect_err("unknown person");
    assert_eq!(error.code, "NOT_FOUND");

    input.target_id = Some(fx.people[0].clone());
    input.project_id = "missing".into();
    let error = commitment_create(&fx.state, &fx.planner, &fx.organisation_id, input)
        .expect_err("unknown project");
    assert_eq!(error.code, "NOT_FOUND");
}

#[test]
fn writes_require_planner_role_in_the_same_organisation() {
    let fx = setup();
    let ada = fx.people[0].clone();

    let viewer = CallerContext::new(fx.organisation_id.clone(), vec![Role::Viewer]);
    let error = commitment_create(
        &fx.state,
        &viewer,
        &fx.organisation_id,
        person_input(&fx, &ada, "2026-01-01", "2026-01-31", 10.0),
    )
    .expect_err("viewer cannot write");
    assert_eq!(error.code, "FORBIDDEN");

    let outsider = CallerContext::new("another-org", vec![Role::Admin]);
    let error = commitments_list(&fx.state, &outsider, &fx.organisation_id, None)
        .expect_err("other organisation");
    assert_eq!(error.code, "FORBIDDEN");

    assert!(commitments_list(&fx.state, &viewer, &fx.organisation_id, None)
        .expect("viewer can read")
        .is_empty());
}

#[test]
fn concurrent_creates_never_exceed_the_ceiling() {
    let fx = setup();
    let ada = fx.people[0].clone();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let state = fx.state.clone();
            let caller = fx.planner.clone();
            let organisation_id = fx.organisation_id.clone();
            let input = person_input(&fx, &ada, "2026-01-01", "2026-01-31", 100.0);
            thread::spawn(move || commitment_create(&state, &caller, &organisation_id, input))
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread"))
        .filter(Result::is_ok)
        .count();
    assert_eq!(accepted, 3);

    let stored = commitments_list(
        &fx.state,
        &fx.planner,
        &fx.organisation_id,
        Some(fx.project_id.as_str()),
    )
    .expect("list");
    let total: f64 = stored.iter().map(|commitment| commitment.percentage).sum();
    assert_eq!(total, 300.0);
}
