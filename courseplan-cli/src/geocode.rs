//! `geocode` subcommand: resolve coordinates for un-geocoded records.

use camino::Utf8PathBuf;
use clap::Parser;
use courseplan_data::geocoding::{
    AddressResolver, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, NominatimConfig, NominatimResolver,
};
use courseplan_data::{DEFAULT_PACING_INTERVAL, EnrichmentReport, Pacer, enrich_missing_coordinates};
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::database::{database_path, open_store};
use crate::{
    ARG_DATABASE, ARG_GEOCODER_URL, ARG_PACING_MS, ARG_RETRIES, ARG_TIMEOUT_SECS, ARG_USER_AGENT,
    CliError, write_json,
};

/// CLI arguments for the `geocode` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Look up every stored record that lacks a latitude or \
                 longitude through a Nominatim-compatible geocoder, one \
                 request at a time with a fixed pause between requests. \
                 Failed lookups are skipped; re-running picks them up again. \
                 Ctrl-C stops the run after the current request.",
    about = "Resolve coordinates for records that have none"
)]
#[ortho_config(prefix = "COURSEPLAN")]
pub(crate) struct GeocodeArgs {
    /// Path to the SQLite delivery database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Base URL of the geocoding service.
    #[arg(long = ARG_GEOCODER_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_url: Option<String>,
    /// User-Agent header sent with each request.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Pause after each lookup, in milliseconds.
    #[arg(long = ARG_PACING_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) pacing_ms: Option<u64>,
    /// Extra attempts after a timeout, network error or 5xx/429 response.
    #[arg(long = ARG_RETRIES, value_name = "count")]
    #[serde(default)]
    pub(crate) retries: Option<u32>,
}

impl GeocodeArgs {
    pub(crate) fn into_config(self) -> Result<GeocodeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(GeocodeConfig::from(merged))
    }
}

/// Resolved `geocode` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GeocodeConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) geocoder: NominatimConfig,
    pub(crate) pacing: Duration,
}

impl From<GeocodeArgs> for GeocodeConfig {
    fn from(args: GeocodeArgs) -> Self {
        let defaults = NominatimConfig::default();
        let mut geocoder =
            NominatimConfig::new(args.geocoder_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()))
                .with_user_agent(
                    args.user_agent
                        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
                )
                .with_max_retries(args.retries.unwrap_or(defaults.max_retries));
        if let Some(secs) = args.timeout_secs {
            geocoder = geocoder.with_timeout(Duration::from_secs(secs));
        }
        let pacing = args
            .pacing_ms
            .map_or(DEFAULT_PACING_INTERVAL, Duration::from_millis);
        Self {
            database: database_path(args.database),
            geocoder,
            pacing,
        }
    }
}

/// Builds the address resolver for a geocode invocation.
pub(crate) trait GeocoderBuilder {
    fn build(&self, config: &NominatimConfig) -> Result<Box<dyn AddressResolver>, CliError>;
}

pub(crate) struct DefaultGeocoderBuilder;

impl GeocoderBuilder for DefaultGeocoderBuilder {
    fn build(&self, config: &NominatimConfig) -> Result<Box<dyn AddressResolver>, CliError> {
        let resolver = NominatimResolver::with_config(config.clone()).map_err(|source| {
            CliError::BuildGeocoder {
                base_url: config.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(resolver))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeocodeOutput {
    pub(crate) total: usize,
    pub(crate) updated: usize,
    pub(crate) cancelled: bool,
}

impl From<EnrichmentReport> for GeocodeOutput {
    fn from(report: EnrichmentReport) -> Self {
        Self {
            total: report.total,
            updated: report.updated,
            cancelled: report.cancelled,
        }
    }
}

pub(crate) fn run_geocode(args: GeocodeArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    run_geocode_with(args, &DefaultGeocoderBuilder, CancellationToken::new(), writer)
}

pub(crate) fn run_geocode_with(
    args: GeocodeArgs,
    builder: &dyn GeocoderBuilder,
    cancel: CancellationToken,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let mut store = open_store(&config.database)?;
    let resolver = builder.build(&config.geocoder)?;
    let pacer = Pacer::new(config.pacing);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let report = runtime.block_on(async {
        let interrupt = tokio::spawn(cancel_on_interrupt(cancel.clone()));
        let outcome =
            enrich_missing_coordinates(&mut store, resolver.as_ref(), &pacer, &cancel).await;
        interrupt.abort();
        outcome
    })?;

    if report.cancelled {
        warn!(
            "geocoding interrupted with {} of {} records resolved",
            report.updated, report.total
        );
    } else {
        info!("geocoded {} of {} records", report.updated, report.total);
    }
    write_json(writer, &GeocodeOutput::from(report))
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        cancel.cancel();
    }
}
