//! Behavioural tests for `ingest_csv`.

use courseplan_core::{DeliveryPoint, test_support::MemoryDeliveryStore};
use courseplan_data::csv::CsvImportError;
use courseplan_data::{IngestError, IngestReport, ingest_csv};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

type StoreCell = RefCell<MemoryDeliveryStore>;
type UploadCell = RefCell<String>;
type OutcomeCell = RefCell<Option<Result<IngestReport, IngestError>>>;

const LAST_WEEK_CODES: [&str; 2] = ["OLD-1", "OLD-2"];

#[fixture]
fn store() -> StoreCell {
    RefCell::new(MemoryDeliveryStore::default())
}

#[fixture]
fn upload() -> UploadCell {
    RefCell::new(String::new())
}

#[fixture]
fn outcome() -> OutcomeCell {
    RefCell::new(None)
}

fn last_week() -> MemoryDeliveryStore {
    MemoryDeliveryStore::with_points(LAST_WEEK_CODES.map(|code| {
        DeliveryPoint::new("5", format!("customer {code}"), code, "Sapporo", 10.0)
    }))
}

fn stored_codes(store: &StoreCell) -> Vec<String> {
    store
        .borrow()
        .records()
        .iter()
        .map(|record| record.point.customer_code.clone())
        .collect()
}

// --- Given steps ---

#[given("a store holding last week's deliveries")]
fn given_last_week(#[from(store)] store: &StoreCell) {
    *store.borrow_mut() = last_week();
}

#[given("a store holding last week's deliveries that fails on the second insert")]
fn given_failing_store(#[from(store)] store: &StoreCell) {
    *store.borrow_mut() = last_week().failing_insert_at(1);
}

#[given("an upload with reordered columns, an extra column and a blank line")]
fn given_reordered_upload(#[from(upload)] upload: &UploadCell) {
    *upload.borrow_mut() = "region,sales,address,customer_code,customer_name,course_number\r\n\
                            east,1200,Tokyo,C-1,Tanaka,3\r\n\
                            \r\n\
                            west,oops,Osaka,C-2,Sato,4\r\n"
        .to_owned();
}

#[given("an upload missing the address and sales headers")]
fn given_missing_headers(#[from(upload)] upload: &UploadCell) {
    *upload.borrow_mut() = "course_number,customer_name,customer_code\n1,a,b".to_owned();
}

#[given("an upload containing only a header row")]
fn given_header_only(#[from(upload)] upload: &UploadCell) {
    *upload.borrow_mut() =
        "course_number,customer_name,customer_code,address,sales\n\n".to_owned();
}

// --- When steps ---

#[when("the upload is ingested")]
fn when_ingested(
    #[from(store)] store: &StoreCell,
    #[from(upload)] upload: &UploadCell,
    #[from(outcome)] outcome: &OutcomeCell,
) {
    let result = ingest_csv(&mut *store.borrow_mut(), &upload.borrow());
    *outcome.borrow_mut() = Some(result);
}

// --- Then steps ---

#[then("two deliveries are reported as inserted")]
fn then_two_inserted(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    let report = borrowed
        .as_ref()
        .expect("ingestion attempted")
        .as_ref()
        .expect("ingestion succeeded");
    assert_eq!(report.inserted, 2);
}

#[then("the store holds exactly the uploaded rows in file order")]
fn then_uploaded_rows(#[from(store)] store: &StoreCell) {
    let borrowed = store.borrow();
    let points: Vec<_> = borrowed.records().iter().map(|record| &record.point).collect();
    assert_eq!(
        points,
        vec![
            &DeliveryPoint::new("3", "Tanaka", "C-1", "Tokyo", 1200.0),
            &DeliveryPoint::new("4", "Sato", "C-2", "Osaka", 0.0),
        ]
    );
}

#[then("ingestion fails naming address and sales")]
fn then_missing_headers(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    match borrowed.as_ref().expect("ingestion attempted") {
        Err(IngestError::Parse(CsvImportError::MissingHeaders { missing })) => {
            assert_eq!(missing, &vec!["address".to_owned(), "sales".to_owned()]);
        }
        other => panic!("expected missing headers, got {other:?}"),
    }
}

#[then("ingestion fails because the file is empty")]
fn then_empty(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    assert!(matches!(
        borrowed.as_ref(),
        Some(Err(IngestError::Parse(CsvImportError::EmptyOrHeaderOnly)))
    ));
}

#[then("ingestion fails with a storage error")]
fn then_storage_error(#[from(outcome)] outcome: &OutcomeCell) {
    let borrowed = outcome.borrow();
    assert!(matches!(
        borrowed.as_ref(),
        Some(Err(IngestError::Storage { .. }))
    ));
}

#[then("last week's deliveries are still stored")]
fn then_unchanged(#[from(store)] store: &StoreCell) {
    assert_eq!(stored_codes(store), LAST_WEEK_CODES);
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/csv_ingestion.feature", name = $title)]
        fn $fn_name(store: StoreCell, upload: UploadCell, outcome: OutcomeCell) {
            let _ = (store, upload, outcome);
        }
    };
}

register_scenario!(
    reordered_upload,
    "uploading a file with reordered and extra columns"
);
register_scenario!(missing_headers, "uploading a file without required headers");
register_scenario!(header_only, "uploading a header-only file");
register_scenario!(failed_final_insert, "a storage failure on the final insert");
