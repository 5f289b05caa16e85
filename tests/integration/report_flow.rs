use std::sync::{Arc, Mutex};

use capaplan_lib::commands::absence::{absence_create, absence_delete};
use capaplan_lib::commands::report::report_generate;
use capaplan_lib::commands::{AppState, CallerContext, Role};
use capaplan_lib::config::AppConfig;
use capaplan_lib::db::DbPool;
use capaplan_lib::models::absence::{AbsenceCreateInput, AbsenceScope};
use capaplan_lib::models::commitment::CommitmentCreateInput;
use capaplan_lib::models::organisation::OrganisationCreateInput;
use capaplan_lib::models::person::{EmploymentChange, PersonCreateInput};
use capaplan_lib::models::project::ProjectCreateInput;
use capaplan_lib::models::report::{ReportBucket, ReportRequest};
use capaplan_lib::models::team::TeamCreateInput;
use capaplan_lib::services::telemetry::{Telemetry, TelemetryEvent};
use tempfile::{tempdir, TempDir};

#[derive(Default)]
struct RecordingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl Telemetry for RecordingTelemetry {
    fn record(&self, event: TelemetryEvent, _attributes: &[(&str, String)]) {
        self.events.lock().expect("telemetry lock").push(event);
    }
}

struct Fixture {
    state: AppState,
    telemetry: Arc<RecordingTelemetry>,
    caller: CallerContext,
    organisation_id: String,
    person_id: String,
    project_id: String,
    _dir: TempDir,
}

fn setup() -> Fixture {
    let dir = tempdir().expect("temp dir");
    let db_path = dir.path().join("capaplan.sqlite");
    let pool = DbPool::new(&db_path).expect("db pool");
    let config = AppConfig {
        database_path: db_path,
        ..AppConfig::default()
    };
    let telemetry = Arc::new(RecordingTelemetry::default());
    let state = AppState::with_telemetry(config, pool, telemetry.clone());

    let directory = state.directory();
    let organisation = directory
        .create_organisation(OrganisationCreateInput {
            name: "Acme".into(),
            hours_per_day: 8.0,
            hours_per_week: 40.0,
            hours_per_year: 1720.0,
        })
        .expect("create organisation");
    let person = directory
        .create_person(
            &organisation.id,
            PersonCreateInput {
                name: "Ada".into(),
                employment_percentage: 100.0,
                employment_changes: None,
            },
        )
        .expect("create person");
    let project = directory
        .create_project(
            &organisation.id,
            ProjectCreateInput {
                name: "Apollo".into(),
                start_date: "2026-01-01".into(),
                end_date: "2026-12-31".into(),
                estimated_effort_hours: 16.0,
            },
        )
        .expect("create project");

    state
        .commitments()
        .create_commitment(
            &organisation.id,
            CommitmentCreateInput {
                target_type: Some("person".into()),
                target_id: Some(person.id.clone()),
                person_id: None,
                project_id: project.id.clone(),
                start_date: Some("2026-01-01".into()),
                end_date: Some("2026-01-30".into()),
                percentage: 50.0,
            },
        )
        .expect("create commitment");

    Fixture {
        caller: CallerContext::new(organisation.id.clone(), vec![Role::Viewer]),
        state,
        telemetry,
        organisation_id: organisation.id,
        person_id: person.id,
        project_id: project.id,
        _dir: dir,
    }
}

fn request(scope: &str, ids: &[&str], from: &str, to: &str, granularity: &str) -> ReportRequest {
    ReportRequest {
        scope: scope.into(),
        ids: ids.iter().map(|id| id.to_string()).collect(),
        from: from.into(),
        to: to.into(),
        granularity: granularity.into(),
    }
}

fn figures(bucket: &ReportBucket) -> (f64, f64, f64, f64) {
    (
        bucket.available_hours,
        bucket.load_hours,
        bucket.free_hours,
        bucket.utilization_percentage,
    )
}

#[test]
fn single_day_person_report_splits_capacity_and_load() {
    let fx = setup();
    let report = report_generate(
        &fx.state,
        &fx.caller,
        &fx.organisation_id,
        request("person", &[&fx.person_id], "2026-01-01", "2026-01-01", "day"),
    )
    .expect("report");

    assert_eq!(report.person_ids, vec![fx.person_id.clone()]);
    assert_eq!(report.buckets.len(), 1);
    assert_eq!(report.buckets[0].period_start, "2026-01-01");
    assert_eq!(figures(&report.buckets[0]), (8.0, 4.0, 4.0, 50.0));
    assert!(report.buckets[0].project_load_hours.is_none());
}

#[test]
fn holiday_zeroes_availability_but_keeps_load() {
    let fx = setup();
    let planner = CallerContext::new(fx.organisation_id.clone(), vec![Role::Planner]);
    absence_create(
        &fx.state,
        &planner,
        &fx.organisation_id,
        AbsenceCreateInput {
            scope: AbsenceScope::Organisation,
            date: "2026-01-02".into(),
            hours: 8.0,
        },
    )
    .expect("create holiday");

    let report = report_generate(
        &fx.state,
        &fx.caller,
        &fx.organisation_id,
        request("person", &[&fx.person_id], "2026-01-01", "2026-01-02", "day"),
    )
    .expect("report");

    assert_eq!(figures(&report.buckets[0]), (8.0, 4.0, 4.0, 50.0));
    assert_eq!(figures(&report.buckets[1]), (0.0, 4.0, -4.0, 0.0));
}

#[test]
fn project_scope_accumulates_load_towards_the_estimate() {
    let fx = setup();
    let report = report_generate(
        &fx.state,
        &fx.caller,
        &fx.organisation_id,
        request("project", &[&fx.project_id], "2026-01-01", "2026-01-02", "day"),
    )
    .expect("report");

    assert_eq!(report.project_ids, Some(vec![fx.project_id.clone()]));
    let cumulative: Vec<(Option<f64>, Option<f64>)> = report
        .buckets
        .iter()
        .map(|bucket| (bucket.project_load_hours, bucket.completion_percentage))
        .collect();
    assert_eq!(
        cumulative,
        vec![(Some(4.0), Some(25.0)), (Some(8.0), Some(50.0))]
    );
    assert_eq!(report.buckets[0].project_estimation_hours, Some(16.0));
}

#[test]
fn team_report_with_employment_change_and_team_absence_by_month() {
    let fx = setup();
    let directory = fx.state.directory();
    let part_timer = directory
        .create_person(
            &fx.organisation_id,
            PersonCreateInput {
                name: "Grace".into(),
                employment_percentage: 100.0,
                employment_changes: Some(vec![EmploymentChange {
                    effective_month: "2026-02".into(),
                    employment_percentage: 50.0,
                }]),
            },
        )
        .expect("create person");
    let team = directory
        .create_team(
            &fx.organisation_id,
            TeamCreateInput {
                name: "Core".into(),
                member_ids: Some(vec![fx.person_id.clone(), part_timer.id.clone()]),
            },
        )
        .expect("create team");
    fx.state
        .absences()
        .create_absence(
            &fx.organisation_id,
            AbsenceCreateInput {
                scope: AbsenceScope::Team(team.id.clone()),
                date: "2026-02-02".into(),
                hours: 2.0,
            },
        )
        .expect("team absence");

    let report = report_generate(
        &fx.state,
        &fx.caller,
        &fx.organisation_id,
        request("team", &[&team.id], "2026-01-31", "2026-02-02", "month"),
    )
    .expect("report");

    assert_eq!(report.buckets.len(), 2);
    assert_eq!(report.buckets[0].period_start, "2026-01-01");
    assert_eq!(report.buckets[1].period_start, "2026-02-01");
    // January 31st: two full-timers, no commitment left.
    assert_eq!(figures(&report.buckets[0]), (16.0, 0.0, 16.0, 0.0));
    // Feb 1st: 8 + 4; Feb 2nd: (8 - 2) + (4 - 2).
    assert_eq!(report.buckets[1].available_hours, 20.0);
    assert_eq!(report.buckets[1].load_hours, 0.0);
}

#[test]
fn weekly_buckets_start_on_monday() {
    let fx = setup();
    let report = report_generate(
        &fx.state,
        &fx.caller,
        &fx.organisation_id,
        request("organisation", &[], "2026-01-01", "2026-01-07", "week"),
    )
    .expect("report");

    let starts: Vec<&str> = report
        .buckets
        .iter()
        .map(|bucket| bucket.period_start.as_str())
        .collect();
    assert_eq!(starts, vec!["2025-12-29", "2026-01-05"]);
    assert_eq!(report.buckets[0].available_hours, 32.0);
    assert_eq!(report.buckets[1].available_hours, 24.0);
    assert_eq!(report.buckets[1].load_hours, 12.0);
}

#[test]
fn report_generation_emits_telemetry() {
    let fx = setup();
    report_generate(
        &fx.state,
        &fx.caller,
        &fx.organisation_id,
        request("organisation", &[], "2026-01-01", "2026-01-01", "day"),
    )
    .expect("report");

    let events = fx.telemetry.events.lock().expect("telemetry lock");
    assert_eq!(
        events.as_slice(),
        &[TelemetryEvent::CommitmentCreated, TelemetryEvent::ReportGenerated]
    );
}

#[test]
fn absence_lifecycle_emits_telemetry() {
    let fx = setup();
    let planner = CallerContext::new(fx.organisation_id.clone(), vec![Role::Planner]);
    let absence = absence_create(
        &fx.state,
        &planner,
        &fx.organisation_id,
        AbsenceCreateInput {
            scope: AbsenceScope::Person(fx.person_id.clone()),
            date: "2026-01-05".into(),
            hours: 2.0,
        },
    )
    .expect("create absence");
    absence_delete(&fx.state, &planner, &fx.organisation_id, &absence.id).expect("delete absence");

    let error = absence_delete(&fx.state, &planner, &fx.organisation_id, &absence.id)
        .expect_err("already deleted");
    assert_eq!(error.code, "NOT_FOUND");

    let events = fx.telemetry.events.lock().expect("telemetry lock");
    assert_eq!(
        events.as_slice(),
        &[
            TelemetryEvent::CommitmentCreated,
            TelemetryEvent::AbsenceCreated,
            TelemetryEvent::AbsenceDeleted,
        ]
    );
}

#[test]
fn cli_prints_the_report_as_json() {
    let fx = setup();
    let dir = tempdir().expect("temp dir");
    let config_path = dir.path().join("capaplan.yaml");
    std::fs::write(
        &config_path,
        format!(
            "databasePath: {}\nmaxReportDays: 31\n",
            fx.state.db().path().display()
        ),
    )
    .expect("write config");
    let request_path = dir.path().join("request.json");
    std::fs::write(
        &request_path,
        r#"{"scope":"person","from":"2026-01-01","to":"2026-01-01","granularity":"day"}"#,
    )
    .expect("write request");

    let args: Vec<String> = vec![
        "--config".into(),
        config_path.display().to_string(),
        "report".into(),
        fx.organisation_id.clone(),
        request_path.display().to_string(),
    ];
    let output = capaplan_lib::cli::execute(&args).expect("cli run");
    let value: serde_json::Value = serde_json::from_str(&output).expect("json output");
    assert_eq!(value["scope"], "person");
    assert_eq!(value["buckets"][0]["loadHours"], 4.0);
    assert_eq!(value["buckets"][0]["utilizationPercentage"], 50.0);
}
