//! Behaviour-driven step definitions driving the ingest CLI scenarios.

use super::helpers::{CliWorld, sample_points, world};
use super::*;
use courseplan_data::IngestError;
use rstest_bdd_macros::{given, scenario, then, when};

const UPLOAD_NAME: &str = "upload.csv";

fn stored_codes(world: &CliWorld) -> Vec<String> {
    world
        .workspace
        .records()
        .into_iter()
        .map(|record| record.point.customer_code)
        .collect()
}

#[given("the database holds last week's deliveries")]
fn database_holds_last_week(#[from(world)] world: &CliWorld) {
    world.workspace.seed(&sample_points());
}

#[given("a CSV upload with two delivery rows")]
fn upload_with_two_rows(#[from(world)] world: &CliWorld) {
    world.workspace.write(
        UPLOAD_NAME,
        "\u{feff}course_number,customer_name,customer_code,address,sales\n\
         4,Kato Bakery,N-100,Nagoya Naka 1-1,1200\r\n\
         \r\n\
         5,Ito Fresh,N-200,Kobe Chuo 2-2,80\r\n",
    );
}

#[given("a CSV upload without the sales header")]
fn upload_without_sales(#[from(world)] world: &CliWorld) {
    world.workspace.write(
        UPLOAD_NAME,
        "course_number,customer_name,customer_code,address\n4,Kato Bakery,N-100,Nagoya",
    );
}

#[when("I run the ingest command")]
fn run_ingest_command(#[from(world)] world: &CliWorld) {
    let upload = world.workspace.root().join(UPLOAD_NAME);
    world.run(&["ingest", upload.as_str()]);
}

#[when("I run the ingest command for a missing file")]
fn run_ingest_missing_file(#[from(world)] world: &CliWorld) {
    let upload = world.workspace.root().join("absent.csv");
    world.run(&["ingest", upload.as_str()]);
}

#[when("I run the ingest command without a file")]
fn run_ingest_without_file(#[from(world)] world: &CliWorld) {
    world.run(&["ingest"]);
}

#[then("the command reports 2 inserted records")]
fn reports_two_inserted(#[from(world)] world: &CliWorld) {
    assert_eq!(world.stdout_json()["inserted"], 2);
}

#[then("the database holds only the uploaded deliveries")]
fn holds_uploaded(#[from(world)] world: &CliWorld) {
    assert_eq!(stored_codes(world), vec!["N-100", "N-200"]);
}

#[then("the command fails with a validation error")]
fn fails_validation(#[from(world)] world: &CliWorld) {
    world.with_error(|error| {
        assert_eq!(error.class(), ErrorClass::Validation);
        assert!(error.to_string().contains("sales"), "{error}");
    });
}

#[then("the command fails because the upload is missing")]
fn fails_missing_upload(#[from(world)] world: &CliWorld) {
    world.with_error(|error| match error {
        CliError::Ingest(IngestError::NoFile { path }) => {
            assert!(path.as_str().ends_with("absent.csv"));
        }
        other => panic!("expected NoFile, found {other:?}"),
    });
}

#[then("the command fails because the file argument is missing")]
fn fails_missing_argument(#[from(world)] world: &CliWorld) {
    world.with_error(|error| match error {
        CliError::MissingArgument { field, env } => {
            assert_eq!(*field, ARG_INGEST_FILE);
            assert_eq!(*env, ENV_INGEST_FILE);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    });
}

#[then("the database still holds last week's deliveries")]
fn still_holds_last_week(#[from(world)] world: &CliWorld) {
    assert_eq!(stored_codes(world), vec!["C-001", "C-002", "C-003"]);
}

macro_rules! register_ingest_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/ingest_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CliWorld) {
            let _ = world;
        }
    };
}

register_ingest_scenario!(ingest_replaces, "importing a CSV replaces the stored deliveries");
register_ingest_scenario!(ingest_missing_header, "rejecting a CSV without the sales header");
register_ingest_scenario!(ingest_missing_file, "rejecting an upload path that does not exist");
register_ingest_scenario!(
    ingest_missing_argument,
    "rejecting an invocation without an upload path"
);
