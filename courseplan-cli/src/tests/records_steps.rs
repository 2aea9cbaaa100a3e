//! Behaviour-driven step definitions for the `assign`, `list` and `courses`
//! commands.

use super::helpers::{CliWorld, sample_points, world};
use super::*;
use courseplan_core::{CourseEditError, DeliveryPoint};
use rstest_bdd_macros::{given, scenario, then, when};

fn course_of_each(world: &CliWorld) -> Vec<(u64, String)> {
    let mut records: Vec<_> = world
        .workspace
        .records()
        .into_iter()
        .map(|record| (record.id, record.point.course_number))
        .collect();
    records.sort();
    records
}

#[given("the database holds ten deliveries on course 1")]
fn ten_on_course_one(#[from(world)] world: &CliWorld) {
    let points: Vec<_> = (1..=10)
        .map(|n| DeliveryPoint::new("1", format!("customer {n}"), format!("K-{n}"), "Sendai", 10.0))
        .collect();
    world.workspace.seed(&points);
}

#[given("the database holds last week's sample deliveries")]
fn sample_deliveries(#[from(world)] world: &CliWorld) {
    world.workspace.seed(&sample_points());
}

#[when("I assign records 2,5,9 to course 3")]
fn assign_selected(#[from(world)] world: &CliWorld) {
    world.run(&["assign", "--ids", "2,5,9", "--course", "3"]);
}

#[when("I assign records 40,41 to course 3")]
fn assign_unknown(#[from(world)] world: &CliWorld) {
    world.run(&["assign", "--ids", "40,41", "--course", "3"]);
}

#[when("I assign records 2 to a blank course")]
fn assign_blank(#[from(world)] world: &CliWorld) {
    world.run(&["assign", "--ids", "2", "--course", "  "]);
}

#[when("I list course 1")]
fn list_course_one(#[from(world)] world: &CliWorld) {
    world.run(&["list", "--course", "1"]);
}

#[when("I list the courses")]
fn list_courses(#[from(world)] world: &CliWorld) {
    world.run(&["courses"]);
}

#[then("the command reports 3 records moved to course 3")]
fn reports_three_moved(#[from(world)] world: &CliWorld) {
    let output = world.stdout_json();
    assert_eq!(output["updated"], 3);
    assert_eq!(output["course_number"], "3");
}

#[then("only records 2, 5 and 9 belong to course 3")]
fn only_selected_moved(#[from(world)] world: &CliWorld) {
    for (id, course) in course_of_each(world) {
        let expected = if [2, 5, 9].contains(&id) { "3" } else { "1" };
        assert_eq!(course, expected, "record {id}");
    }
}

#[then("the command fails because no records matched")]
fn fails_no_match(#[from(world)] world: &CliWorld) {
    world.with_error(|error| {
        match error {
            CliError::CourseEdit(CourseEditError::NoMatchingRecords { ids }) => {
                assert_eq!(ids, &vec![40, 41]);
            }
            other => panic!("expected NoMatchingRecords, found {other:?}"),
        }
        assert_eq!(error.class(), ErrorClass::NotFound);
    });
}

#[then("the command fails with a blank course error")]
fn fails_blank_course(#[from(world)] world: &CliWorld) {
    world.with_error(|error| {
        assert!(matches!(
            error,
            CliError::CourseEdit(CourseEditError::BlankCourse)
        ));
        assert_eq!(error.class(), ErrorClass::Validation);
    });
}

#[then("every delivery remains on course 1")]
fn all_on_course_one(#[from(world)] world: &CliWorld) {
    assert!(
        course_of_each(world)
            .iter()
            .all(|(_, course)| course == "1")
    );
}

#[then("the listing shows 2 deliveries in the course 1 colour without coordinates")]
fn listing_shows_course_one(#[from(world)] world: &CliWorld) {
    let output = world.stdout_json();
    let rows = output.as_array().expect("listing is an array");
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row["course_number"], "1");
        assert_eq!(row["color"], "#f59e0b");
        assert!(row["latitude"].is_null());
        assert!(row["longitude"].is_null());
    }
    assert_eq!(rows[0]["customer_code"], "C-001");
    assert_eq!(rows[1]["customer_code"], "C-002");
}

#[then("the courses are 1 and 2 with their marker colours")]
fn courses_listed(#[from(world)] world: &CliWorld) {
    let output = world.stdout_json();
    assert_eq!(
        output,
        serde_json::json!([
            { "course_number": "1", "color": "#f59e0b" },
            { "course_number": "2", "color": "#10b981" },
        ])
    );
}

macro_rules! register_course_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/course_commands.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CliWorld) {
            let _ = world;
        }
    };
}

register_course_scenario!(assign_moves_selected, "moving selected deliveries to another course");
register_course_scenario!(assign_unknown_ids, "assigning ids that match nothing");
register_course_scenario!(assign_blank_course, "assigning to a blank course");
register_course_scenario!(list_one_course, "listing one course");
register_course_scenario!(list_course_labels, "listing course labels");
