//! Test helpers: a temporary workspace holding the delivery database and a
//! stub geocoder builder.

use super::*;
use crate::geocode::{GeocoderBuilder, run_geocode_with};
use camino::{Utf8Path, Utf8PathBuf};
use courseplan_core::{DeliveryPoint, DeliveryRecord, DeliveryStore, SqliteDeliveryStore};
use courseplan_data::geocoding::test_support::StubAddressResolver;
use courseplan_data::geocoding::{AddressResolver, NominatimConfig};
use geo::Coord;
use std::cell::RefCell;
use std::fs;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("courseplan.db")
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(name);
        fs::write(&path, contents).expect("write workspace file");
        path
    }

    pub(super) fn read(&self, path: &Utf8Path) -> String {
        fs::read_to_string(path).expect("read workspace file")
    }

    pub(super) fn store(&self) -> SqliteDeliveryStore {
        SqliteDeliveryStore::open(self.database().as_std_path()).expect("open database")
    }

    pub(super) fn seed(&self, points: &[DeliveryPoint]) {
        self.store().replace_all(points).expect("seed database");
    }

    pub(super) fn records(&self) -> Vec<DeliveryRecord> {
        self.store().list_all().expect("list records")
    }

    /// Build an argv with the workspace database appended.
    pub(super) fn argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv = vec!["courseplan".to_owned()];
        argv.extend(args.iter().map(|arg| (*arg).to_owned()));
        argv.extend([format!("--{ARG_DATABASE}"), self.database().into_string()]);
        argv
    }
}

/// Three records across two courses, none geocoded.
pub(super) fn sample_points() -> Vec<DeliveryPoint> {
    vec![
        DeliveryPoint::new("1", "Tanaka Shoten", "C-001", "Tokyo Chiyoda 1-1", 100.0),
        DeliveryPoint::new("1", "Sato Foods", "C-002", "Tokyo Minato 2-2", 50.0),
        DeliveryPoint::new("2", "Suzuki Mart", "C-003", "Osaka Kita 3-3", 30.0),
    ]
}

/// Geocoder builder answering from a fixed table.
#[derive(Debug, Default)]
pub(super) struct StubGeocoderBuilder {
    matches: Vec<(String, Coord<f64>)>,
    seen: RefCell<Option<NominatimConfig>>,
}

impl StubGeocoderBuilder {
    pub(super) fn with_match(mut self, address: &str, location: Coord<f64>) -> Self {
        self.matches.push((address.to_owned(), location));
        self
    }

    pub(super) fn seen_config(&self) -> Option<NominatimConfig> {
        self.seen.borrow().clone()
    }
}

impl GeocoderBuilder for StubGeocoderBuilder {
    fn build(&self, config: &NominatimConfig) -> Result<Box<dyn AddressResolver>, CliError> {
        self.seen.replace(Some(config.clone()));
        let resolver = self
            .matches
            .iter()
            .fold(StubAddressResolver::new(), |resolver, (address, location)| {
                resolver.with_match(address.clone(), *location)
            });
        Ok(Box::new(resolver))
    }
}

/// Parse `argv` and run the selected subcommand, capturing stdout.
///
/// `geocode` uses `geocoder` and `cancel` instead of the network resolver.
pub(super) fn execute(
    argv: Vec<String>,
    geocoder: &StubGeocoderBuilder,
    cancel: CancellationToken,
) -> (Result<(), CliError>, Vec<u8>) {
    let mut stdout = Vec::new();
    let parsed = Cli::try_parse_from(argv).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Geocode(args) => run_geocode_with(args, geocoder, cancel, &mut stdout),
        command => dispatch(command, &mut stdout),
    });
    (outcome, stdout)
}

pub(super) fn execute_simple(argv: Vec<String>) -> (Result<(), CliError>, Vec<u8>) {
    execute(argv, &StubGeocoderBuilder::default(), CancellationToken::new())
}

/// Scenario state shared by the behaviour steps.
#[derive(Debug)]
pub(super) struct CliWorld {
    pub(super) workspace: Workspace,
    pub(super) geocoder: RefCell<StubGeocoderBuilder>,
    pub(super) cancel: CancellationToken,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl CliWorld {
    pub(super) fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            geocoder: RefCell::new(StubGeocoderBuilder::default()),
            cancel: CancellationToken::new(),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    /// Run a subcommand against the workspace database.
    pub(super) fn run(&self, args: &[&str]) {
        let argv = self.workspace.argv(args);
        let (outcome, stdout) = execute(argv, &self.geocoder.borrow(), self.cancel.clone());
        self.stdout.replace(stdout);
        self.result.replace(Some(outcome));
    }

    pub(super) fn stdout_json(&self) -> serde_json::Value {
        let borrowed = self.result.borrow();
        let result = borrowed.as_ref().expect("command run");
        if let Err(err) = result {
            panic!("expected success, found {err:?}");
        }
        serde_json::from_slice(&self.stdout.borrow()).expect("stdout is JSON")
    }

    pub(super) fn with_error<T>(&self, inspect: impl FnOnce(&CliError) -> T) -> T {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("command run")
            .as_ref()
            .expect_err("expected failure");
        inspect(error)
    }
}

#[rstest::fixture]
pub(super) fn world() -> CliWorld {
    CliWorld::new()
}
