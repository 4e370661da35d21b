//! Port interfaces for the report pipeline

use std::path::Path;

use appchains_domain::{BatchStartParams, RawJobResult, Result, StartAppParams};
use async_trait::async_trait;
use url::Url;

/// Trait over the chains job service.
///
/// Adapters normalize the service's response-shape variants (full result
/// holder vs. bare job reference) before handing data to the pipeline,
/// so every method here speaks [`RawJobResult`].
#[async_trait]
pub trait ChainsBackend: Send + Sync {
    /// Start a single report job.
    async fn start_app(&self, params: &StartAppParams) -> Result<RawJobResult>;

    /// Start a batch of jobs in one request; entries come back keyed by
    /// the app code that started them.
    async fn start_app_batch(
        &self,
        params: &BatchStartParams,
    ) -> Result<Vec<(String, RawJobResult)>>;

    /// Fetch the current raw result for one job.
    async fn get_app_results(&self, id_job: i64) -> Result<RawJobResult>;

    /// Fetch current raw results for several jobs in a single request.
    async fn get_app_results_batch(&self, id_jobs: &[i64]) -> Result<Vec<RawJobResult>>;

    /// Build the retrieval URL for a file result reference.
    fn report_file_url(&self, file_ref: &str) -> Result<Url>;
}

/// Trait for streaming a result file's bytes to local storage.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Download `url` to `dest`, creating parent directories as needed.
    async fn download_to_file(&self, url: &Url, dest: &Path) -> Result<()>;
}
