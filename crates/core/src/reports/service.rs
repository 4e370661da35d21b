//! High-level report operations composing submission, polling, and
//! report building

use std::collections::HashMap;
use std::sync::Arc;

use appchains_domain::{BatchStartParams, PollConfig, RawJobResult, Report, Result, StartAppParams};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::builder::build_report;
use super::poller::JobPoller;
use super::ports::ChainsBackend;

/// Orchestrates the submit / poll / transform pipeline over a backend.
///
/// Each call owns its job handles for its full lifetime; the service
/// itself holds no per-job state and can be shared freely.
pub struct ReportService {
    backend: Arc<dyn ChainsBackend>,
    poller: JobPoller,
}

impl ReportService {
    pub fn new(backend: Arc<dyn ChainsBackend>, poll: &PollConfig) -> Self {
        let mut poller = JobPoller::new(Arc::clone(&backend), poll.interval());
        if let Some(deadline) = poll.deadline() {
            poller = poller.with_deadline(deadline);
        }
        Self { backend, poller }
    }

    /// Tie all polling done by this service to a cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.poller = self.poller.with_cancellation(cancel);
        self
    }

    /// Start one report job over a data source.
    pub async fn submit(&self, app_code: &str, datasource_id: &str) -> Result<RawJobResult> {
        let params = StartAppParams::for_datasource(app_code, datasource_id);
        info!(app_code, "starting report job");
        self.backend.start_app(&params).await
    }

    /// Start a batch of jobs in one request, preserving input order on
    /// the wire. The returned map is keyed by app code; a duplicate app
    /// code collapses to the entry the service answered last.
    pub async fn submit_batch(
        &self,
        jobs: &[(String, String)],
    ) -> Result<HashMap<String, RawJobResult>> {
        let params = BatchStartParams {
            pars: jobs
                .iter()
                .map(|(app_code, datasource_id)| {
                    StartAppParams::for_datasource(app_code, datasource_id)
                })
                .collect(),
        };
        info!(jobs = jobs.len(), "starting report job batch");
        let entries = self.backend.start_app_batch(&params).await?;
        Ok(entries.into_iter().collect())
    }

    /// Submit one job and poll it to a terminal status, returning the
    /// untransformed payload.
    pub async fn get_raw_report(&self, app_code: &str, datasource_id: &str) -> Result<RawJobResult> {
        let submitted = self.submit(app_code, datasource_id).await?;
        self.poller.await_completion(submitted).await
    }

    /// Submit one job, poll it to a terminal status, and build the
    /// user-facing report.
    pub async fn get_report(&self, app_code: &str, datasource_id: &str) -> Result<Report> {
        let raw = self.get_raw_report(app_code, datasource_id).await?;
        Ok(self.build(&raw))
    }

    /// Batch variant of [`get_report`](Self::get_report). The output map
    /// keys equal the submitted app codes.
    pub async fn get_report_batch(
        &self,
        jobs: &[(String, String)],
    ) -> Result<HashMap<String, Report>> {
        let submitted = self.submit_batch(jobs).await?;
        let finished = self.poller.await_completion_batch(submitted).await?;
        Ok(finished.into_iter().map(|(key, raw)| (key, self.build(&raw))).collect())
    }

    /// Build a report from a terminal raw result.
    pub fn build(&self, raw: &RawJobResult) -> Report {
        build_report(raw, |file_ref| self.backend.report_file_url(file_ref))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use appchains_domain::{AppChainsError, JobStatus, ResultProperty, ResultValue};
    use async_trait::async_trait;
    use url::Url;

    use super::*;

    fn completed(id_job: i64, props: Vec<ResultProperty>) -> RawJobResult {
        RawJobResult {
            result_props: props,
            status: JobStatus {
                id_job,
                status: "Completed".to_string(),
                completed_successfully: Some(true),
                finish_dt: None,
            },
        }
    }

    /// Backend stub that completes every submission immediately and
    /// records the request bodies it saw.
    #[derive(Default)]
    struct RecordingBackend {
        started: Mutex<Vec<StartAppParams>>,
        batch_started: Mutex<Vec<BatchStartParams>>,
    }

    #[async_trait]
    impl ChainsBackend for RecordingBackend {
        async fn start_app(&self, params: &StartAppParams) -> Result<RawJobResult> {
            self.started.lock().unwrap().push(params.clone());
            Ok(completed(1, vec![ResultProperty::new("summary", "plaintext", "ok")]))
        }

        async fn start_app_batch(
            &self,
            params: &BatchStartParams,
        ) -> Result<Vec<(String, RawJobResult)>> {
            self.batch_started.lock().unwrap().push(params.clone());
            Ok(params
                .pars
                .iter()
                .enumerate()
                .map(|(index, entry)| (entry.app_code.clone(), completed(index as i64 + 1, vec![])))
                .collect())
        }

        async fn get_app_results(&self, id_job: i64) -> Result<RawJobResult> {
            Ok(completed(id_job, vec![]))
        }

        async fn get_app_results_batch(&self, id_jobs: &[i64]) -> Result<Vec<RawJobResult>> {
            Ok(id_jobs.iter().map(|id| completed(*id, vec![])).collect())
        }

        fn report_file_url(&self, file_ref: &str) -> Result<Url> {
            Url::parse(&format!("https://chains.test/v2/GetReportFile?idJob={file_ref}"))
                .map_err(|err| AppChainsError::Config(err.to_string()))
        }
    }

    fn service(backend: &Arc<RecordingBackend>) -> ReportService {
        ReportService::new(
            Arc::clone(backend) as Arc<dyn ChainsBackend>,
            &PollConfig { interval_ms: 1, deadline_ms: None },
        )
    }

    #[tokio::test]
    async fn submit_builds_the_datasource_parameter() {
        let backend = Arc::new(RecordingBackend::default());

        service(&backend).submit("Chain9", "FILE:80599").await.unwrap();

        let started = backend.started.lock().unwrap();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].app_code, "Chain9");
        assert_eq!(started[0].pars.len(), 1);
        assert_eq!(started[0].pars[0].name, "dataSourceId");
        assert_eq!(started[0].pars[0].value, "FILE:80599");
    }

    #[tokio::test]
    async fn get_report_runs_the_full_pipeline() {
        let backend = Arc::new(RecordingBackend::default());

        let report = service(&backend).get_report("Chain9", "FILE:80599").await.unwrap();

        assert!(report.succeeded);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].name, "summary");
        assert_eq!(report.results[0].value, ResultValue::Text("ok".to_string()));
    }

    #[tokio::test]
    async fn batch_submission_preserves_wire_order_and_keys_by_app_code() {
        let backend = Arc::new(RecordingBackend::default());
        let jobs = vec![
            ("Chain91".to_string(), "227680".to_string()),
            ("Chain88".to_string(), "227680".to_string()),
        ];

        let reports = service(&backend).get_report_batch(&jobs).await.unwrap();

        let batch = backend.batch_started.lock().unwrap();
        assert_eq!(batch.len(), 1);
        let codes: Vec<_> = batch[0].pars.iter().map(|p| p.app_code.as_str()).collect();
        assert_eq!(codes, ["Chain91", "Chain88"]);

        assert_eq!(reports.len(), 2);
        assert!(reports.contains_key("Chain91") && reports.contains_key("Chain88"));
    }

    #[tokio::test]
    async fn get_raw_report_skips_the_build_step() {
        let backend = Arc::new(RecordingBackend::default());

        let raw = service(&backend).get_raw_report("Chain9", "FILE:80599").await.unwrap();

        assert_eq!(raw.id_job(), 1);
        assert_eq!(raw.result_props.len(), 1);
        assert_eq!(raw.result_props[0].kind.as_deref(), Some("plaintext"));
    }
}
