//! # AppChains
//!
//! Client SDK for the App Chains report-generation service and the
//! beacon lookup service.
//!
//! The high-level flow is: submit a named application job over a data
//! source, poll until the job reaches a terminal status, and normalize
//! the raw result payload into a typed [`Report`] of text values and
//! downloadable files. Beacon lookups are stateless raw-text queries and
//! work without a token.
//!
//! ```no_run
//! use appchains::AppChains;
//!
//! #[tokio::main]
//! async fn main() -> appchains::Result<()> {
//!     let chains = AppChains::new(
//!         "<oauth token>",
//!         "https://api.sequencing.com",
//!         "https://beacon.sequencing.com",
//!     )?;
//!
//!     let report = chains.get_report("Chain9", "FILE:80599").await?;
//!     if report.succeeded {
//!         for result in &report.results {
//!             println!("{}", result.name);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use appchains_core::{BeaconService, ChainsBackend, FileStore, ReportService};
use appchains_infra::{BeaconClient, HttpClient, SqApiClient};
use tokio_util::sync::CancellationToken;

pub use appchains_domain::{
    AppChainsError, ChainsConfig, FileResult, HttpConfig, JobStatus, PollConfig, RawJobResult,
    Report, ReportResult, Result, ResultProperty, ResultValue,
};

/// High-level facade over the chains job service and the beacon
/// endpoints.
///
/// Built with a token for the authenticated job operations, or in
/// token-less, beacon-only mode via [`AppChains::beacon_only`]. Each
/// call owns its job state for its lifetime, so one instance can be
/// shared across tasks.
pub struct AppChains {
    reports: Option<ReportService>,
    beacons: BeaconService,
    transport: Option<HttpClient>,
}

impl AppChains {
    /// Client for authenticated job operations plus beacon lookups.
    pub fn new(
        token: impl Into<String>,
        chains_url: impl Into<String>,
        beacons_url: impl Into<String>,
    ) -> Result<Self> {
        Self::from_config(ChainsConfig::new(token, chains_url, beacons_url))
    }

    /// Token-less client; only the beacon operations are available.
    pub fn beacon_only(beacons_url: impl Into<String>) -> Result<Self> {
        Self::from_config(ChainsConfig::beacon_only(beacons_url))
    }

    /// Build a client from full configuration, e.g. one produced by
    /// `appchains_infra::config::load`.
    pub fn from_config(config: ChainsConfig) -> Result<Self> {
        let beacon_http = HttpClient::from_config(&config.http, None)?;
        let beacon_client = BeaconClient::new(&config.beacons_url, beacon_http)?;
        let beacons = BeaconService::new(Arc::new(beacon_client));

        let authenticated = config.token.is_some() && !config.chains_url.is_empty();
        let (reports, transport) = if authenticated {
            let http = HttpClient::from_config(&config.http, config.token.as_deref())?;
            let backend: Arc<dyn ChainsBackend> =
                Arc::new(SqApiClient::new(&config.chains_url, http.clone())?);
            (Some(ReportService::new(backend, &config.poll)), Some(http))
        } else {
            (None, None)
        };

        Ok(Self { reports, beacons, transport })
    }

    /// Tie every poll loop started by this client to a cancellation
    /// token. Polling is unbounded by default; this (or a configured
    /// deadline) is the way to bound it.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.reports = self.reports.map(|service| service.with_cancellation(cancel));
        self
    }

    /// Submit one job and return its finished report.
    pub async fn get_report(&self, app_code: &str, datasource_id: &str) -> Result<Report> {
        self.reports()?.get_report(app_code, datasource_id).await
    }

    /// Submit a batch of `(app_code, datasource_id)` jobs in one request
    /// and return one report per app code. A job the service cancels
    /// fails only its own slot (`succeeded == false`); the rest of the
    /// batch completes normally.
    pub async fn get_report_batch(
        &self,
        jobs: &[(String, String)],
    ) -> Result<HashMap<String, Report>> {
        self.reports()?.get_report_batch(jobs).await
    }

    /// Submit one job and return the terminal payload untransformed.
    pub async fn get_raw_report(
        &self,
        app_code: &str,
        datasource_id: &str,
    ) -> Result<RawJobResult> {
        self.reports()?.get_raw_report(app_code, datasource_id).await
    }

    /// Query the sequencing beacon for one coordinate/allele.
    pub async fn get_sequencing_beacon(
        &self,
        chrom: i32,
        pos: i64,
        allele: &str,
    ) -> Result<String> {
        self.beacons.sequencing_beacon(chrom, pos, allele).await
    }

    /// Query the public beacon network for one coordinate/allele.
    pub async fn get_public_beacon(&self, chrom: i32, pos: i64, allele: &str) -> Result<String> {
        self.beacons.public_beacon(chrom, pos, allele).await
    }

    /// Low-level lookup against any named beacon endpoint.
    pub async fn get_beacon(
        &self,
        beacon_method: &str,
        chrom: i32,
        pos: i64,
        allele: &str,
    ) -> Result<String> {
        self.beacons.named_beacon(beacon_method, chrom, pos, allele).await
    }

    /// Lookup against any named beacon endpoint with caller-provided
    /// query parameters.
    pub async fn get_beacon_with_query(
        &self,
        beacon_method: &str,
        query: &[(String, String)],
    ) -> Result<String> {
        self.beacons.lookup_with_query(beacon_method, query).await
    }

    /// Download a file result into `dir` under its derived name,
    /// returning the written path. The download is authenticated with
    /// this client's token.
    pub async fn save_result_file(&self, file: &FileResult, dir: &Path) -> Result<PathBuf> {
        let dest = dir.join(&file.name);
        self.save_result_file_as(file, &dest).await?;
        Ok(dest)
    }

    /// Download a file result to an explicit destination path.
    pub async fn save_result_file_as(&self, file: &FileResult, dest: &Path) -> Result<()> {
        let transport = self.transport.as_ref().ok_or_else(Self::token_required)?;
        FileStore::download_to_file(transport, &file.url, dest).await
    }

    fn reports(&self) -> Result<&ReportService> {
        self.reports.as_ref().ok_or_else(Self::token_required)
    }

    fn token_required() -> AppChainsError {
        AppChainsError::Config(
            "this client was built without a token; job operations are unavailable".into(),
        )
    }
}
