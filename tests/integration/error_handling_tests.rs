// Failure paths: corrupt stored data, dangling references, bad requests.

use capaplan_lib::commands::absence::absence_create;
use capaplan_lib::commands::directory::{person_delete, team_create};
use capaplan_lib::commands::report::report_generate;
use capaplan_lib::commands::{AppState, CallerContext, Role};
use capaplan_lib::config::AppConfig;
use capaplan_lib::models::absence::{AbsenceCreateInput, AbsenceScope};
use capaplan_lib::models::commitment::CommitmentCreateInput;
use capaplan_lib::models::organisation::OrganisationCreateInput;
use capaplan_lib::models::person::PersonCreateInput;
use capaplan_lib::models::project::ProjectCreateInput;
use capaplan_lib::models::report::ReportRequest;
use capaplan_lib::models::team::TeamCreateInput;
use tempfile::{tempdir, TempDir};

fn setup_test_environment() -> (AppState, CallerContext, String, Vec<String>, String, TempDir) {
    let dir = tempdir().expect("temp dir");
    let config = AppConfig {
        database_path: dir.path().join("errors.sqlite"),
        max_report_days: 366,
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
        .expect("organisation");
    let people = [("Ada", 100.0), ("Linus", 50.0)]
        .iter()
        .map(|(name, employment)| {
            directory
                .create_person(
                    &organisation.id,
                    PersonCreateInput {
                        name: name.to_string(),
                        employment_percentage: *employment,
                        employment_changes: None,
                    },
                )
                .expect("person")
                .id
        })
        .collect();
    let project = directory
        .create_project(
            &organisation.id,
            ProjectCreateInput {
                name: "Apollo".into(),
                start_date: "2026-01-01".into(),
                end_date: "2026-12-31".into(),
                estimated_effort_hours: 100.0,
            },
        )
        .expect("project");

    let admin = CallerContext::new(organisation.id.clone(), vec![Role::Admin]);
    (state, admin, organisation.id, people, project.id, dir)
}

fn day_request(scope: &str, ids: &[String], from: &str, to: &str) -> ReportRequest {
    ReportRequest {
        scope: scope.into(),
        ids: ids.to_vec(),
        from: from.into(),
        to: to.into(),
        granularity: "day".into(),
    }
}

#[test]
fn corrupt_commitment_dates_abort_the_report() {
    let (state, admin, organisation_id, people, project_id, _dir) = setup_test_environment();
    state
        .db()
        .with_connection(|conn| {
            conn.execute(
                "INSERT INTO commitments (id, organisation_id, target_type, target_id, project_id, start_date, percentage) \
                 VALUES ('broken', ?1, 'person', ?2, ?3, '2026-02-30', 10)",
                (&organisation_id, &people[0], &project_id),
            )?;
            Ok(())
        })
        .expect("insert corrupt row");

    let error = report_generate(
        &state,
        &admin,
        &organisation_id,
        day_request("organisation", &[], "2026-01-01", "2026-01-01"),
    )
    .expect_err("corrupt commitment");
    assert_eq!(error.code, "VALIDATION_ERROR");
    assert_eq!(error.details.expect("details")["commitmentId"], "broken");
}

#[test]
fn commitments_of_deleted_people_are_skipped() {
    let (state, admin, organisation_id, people, project_id, _dir) = setup_test_environment();
    state
        .commitments()
        .create_commitment(
            &organisation_id,
            CommitmentCreateInput {
                target_type: Some("person".into()),
                target_id: Some(people[1].clone()),
                person_id: None,
                project_id,
                start_date: None,
                end_date: None,
                percentage: 50.0,
            },
        )
        .expect("commitment");
    person_delete(&state, &admin, &organisation_id, &people[1]).expect("delete person");

    let report = report_generate(
        &state,
        &admin,
        &organisation_id,
        day_request("organisation", &[], "2026-01-01", "2026-01-01"),
    )
    .expect("report still generated");
    assert_eq!(report.person_ids, vec![people[0].clone()]);
    assert_eq!(report.buckets[0].load_hours, 0.0);
    assert_eq!(report.buckets[0].available_hours, 8.0);
}

#[test]
fn invalid_requests_are_rejected() {
    let (state, admin, organisation_id, people, _project_id, _dir) = setup_test_environment();

    let mut bad_granularity = day_request("person", &people, "2026-01-01", "2026-01-02");
    bad_granularity.granularity = "fortnight".into();
    let reversed = day_request("person", &people, "2026-01-02", "2026-01-01");
    let malformed = day_request("person", &people, "2026-1-1", "2026-01-02");
    let bad_scope = day_request("galaxy", &[], "2026-01-01", "2026-01-02");
    let too_long = day_request("person", &people, "2026-01-01", "2027-12-31");

    for request in [bad_granularity, reversed, malformed, bad_scope, too_long] {
        let error = report_generate(&state, &admin, &organisation_id, request)
            .expect_err("invalid request");
        assert_eq!(error.code, "VALIDATION_ERROR");
    }

    let unknown_person = day_request("person", &["nobody".to_string()], "2026-01-01", "2026-01-01");
    let error = report_generate(&state, &admin, &organisation_id, unknown_person)
        .expect_err("unknown person");
    assert_eq!(error.code, "NOT_FOUND");
}

#[test]
fn unknown_organisation_is_not_found() {
    let (state, _admin, _organisation_id, _people, _project_id, _dir) = setup_test_environment();
    let caller = CallerContext::new("missing", vec![Role::Viewer]);
    let error = report_generate(
        &state,
        &caller,
        "missing",
        day_request("organisation", &[], "2026-01-01", "2026-01-01"),
    )
    .expect_err("missing organisation");
    assert_eq!(error.code, "NOT_FOUND");
}

#[test]
fn person_absences_are_capped_at_capacity() {
    let (state, admin, organisation_id, people, _project_id, _dir) = setup_test_environment();
    let part_timer = &people[1];

    let absence = |hours: f64| AbsenceCreateInput {
        scope: AbsenceScope::Person(part_timer.clone()),
        date: "2026-01-05".into(),
        hours,
    };

    absence_create(&state, &admin, &organisation_id, absence(3.0)).expect("within capacity");
    let error = absence_create(&state, &admin, &organisation_id, absence(1.5))
        .expect_err("exceeds 4h capacity");
    assert_eq!(error.code, "VALIDATION_ERROR");

    for hours in [0.0, -1.0, f64::INFINITY] {
        let error = absence_create(&state, &admin, &organisation_id, absence(hours))
            .expect_err("invalid hours");
        assert_eq!(error.code, "VALIDATION_ERROR");
    }

    let mut bad_date = absence(1.0);
    bad_date.date = "05.01.2026".into();
    assert_eq!(
        absence_create(&state, &admin, &organisation_id, bad_date)
            .expect_err("bad date")
            .code,
        "VALIDATION_ERROR"
    );

    let ghost = AbsenceCreateInput {
        scope: AbsenceScope::Team("ghost".into()),
        date: "2026-01-05".into(),
        hours: 1.0,
    };
    assert_eq!(
        absence_create(&state, &admin, &organisation_id, ghost)
            .expect_err("unknown team")
            .code,
        "NOT_FOUND"
    );
}

#[test]
fn teams_only_accept_known_members() {
    let (state, admin, organisation_id, people, _project_id, _dir) = setup_test_environment();

    let error = team_create(
        &state,
        &admin,
        &organisation_id,
        TeamCreateInput {
            name: "Core".into(),
            member_ids: Some(vec![people[0].clone(), "stranger".into()]),
        },
    )
    .expect_err("unknown member");
    assert_eq!(error.code, "NOT_FOUND");

    let planner = CallerContext::new(organisation_id.clone(), vec![Role::Planner]);
    let error = team_create(
        &state,
        &planner,
        &organisation_id,
        TeamCreateInput {
            name: "Core".into(),
            member_ids: None,
        },
    )
    .expect_err("planner cannot administer");
    assert_eq!(error.code, "FORBIDDEN");
}
