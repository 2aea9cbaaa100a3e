//! Shared test harness modules for the Courseplan CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod helpers;
mod ingest_steps;
mod records_steps;
