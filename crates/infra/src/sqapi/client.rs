//! SQAPI endpoint client
//!
//! Speaks the versioned chains wire protocol: job submission, status
//! queries, and report-file URL construction. Implements the core
//! `ChainsBackend` port.

use appchains_core::ChainsBackend;
use appchains_domain::constants::PROTOCOL_VERSION;
use appchains_domain::{
    AppChainsError, BatchJobIds, BatchStartEntry, BatchStartParams, RawJobResult, Result,
    StartAppParams, StartAppResponse,
};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use crate::http::HttpClient;

const START_APP: &str = "StartApp";
const START_APP_BATCH: &str = "StartAppBatch";
const GET_APP_RESULTS: &str = "GetAppResults";
const GET_APP_RESULTS_BATCH: &str = "GetAppResultsBatch";
const GET_REPORT_FILE: &str = "GetReportFile";

/// Chains-service client rooted at `<chains_url>/v2/`.
pub struct SqApiClient {
    http: HttpClient,
    base_url: Url,
}

impl SqApiClient {
    /// Build a client for the service at `chains_url`; the protocol
    /// version segment is appended here.
    pub fn new(chains_url: &str, http: HttpClient) -> Result<Self> {
        let base_url = parse_base_url(chains_url)?
            .join(&format!("{PROTOCOL_VERSION}/"))
            .map_err(|err| AppChainsError::Config(format!("invalid chains url: {err}")))?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        self.base_url
            .join(name)
            .map_err(|err| AppChainsError::Config(format!("invalid endpoint {name}: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.http.send(self.http.request(Method::GET, url.clone())).await?;
        Self::decode(url, response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        let request = self.http.request(Method::POST, url.clone()).json(body);
        let response = self.http.send(request).await?;
        Self::decode(url, response).await
    }

    /// Turn a response into `T`, mapping non-success statuses to
    /// `Service` and undecodable bodies to `Protocol`.
    async fn decode<T: DeserializeOwned>(url: Url, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppChainsError::Service { status: status.as_u16(), body });
        }

        let body = response
            .text()
            .await
            .map_err(|err| AppChainsError::Network(err.to_string()))?;
        debug!(%url, %status, "decoding chains response");

        serde_json::from_str(&body).map_err(|err| {
            AppChainsError::Protocol(format!("malformed response from {}: {err}", url.path()))
        })
    }
}

#[async_trait]
impl ChainsBackend for SqApiClient {
    #[instrument(skip(self, params), fields(app_code = %params.app_code))]
    async fn start_app(&self, params: &StartAppParams) -> Result<RawJobResult> {
        let response: StartAppResponse =
            self.post_json(self.endpoint(START_APP)?, params).await?;
        Ok(response.into_raw())
    }

    #[instrument(skip(self, params), fields(jobs = params.pars.len()))]
    async fn start_app_batch(
        &self,
        params: &BatchStartParams,
    ) -> Result<Vec<(String, RawJobResult)>> {
        let entries: Vec<BatchStartEntry> =
            self.post_json(self.endpoint(START_APP_BATCH)?, params).await?;
        Ok(entries.into_iter().map(|entry| (entry.key, entry.value)).collect())
    }

    #[instrument(skip(self))]
    async fn get_app_results(&self, id_job: i64) -> Result<RawJobResult> {
        let mut url = self.endpoint(GET_APP_RESULTS)?;
        url.query_pairs_mut().append_pair("idJob", &id_job.to_string());
        self.get_json(url).await
    }

    #[instrument(skip(self, id_jobs), fields(jobs = id_jobs.len()))]
    async fn get_app_results_batch(&self, id_jobs: &[i64]) -> Result<Vec<RawJobResult>> {
        let body = BatchJobIds { job_ids: id_jobs.to_vec() };
        self.post_json(self.endpoint(GET_APP_RESULTS_BATCH)?, &body).await
    }

    // The `idJob` query parameter matches the v2 service generation;
    // older deployments used `id` (see DESIGN.md).
    fn report_file_url(&self, file_ref: &str) -> Result<Url> {
        let mut url = self.endpoint(GET_REPORT_FILE)?;
        url.query_pairs_mut().append_pair("idJob", file_ref);
        Ok(url)
    }
}

/// Parse a base URL, tolerating a missing trailing slash.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut normalized = raw.trim_end_matches('/').to_string();
    normalized.push('/');
    Url::parse(&normalized)
        .map_err(|err| AppChainsError::Config(format!("invalid base url {raw}: {err}")))
}
