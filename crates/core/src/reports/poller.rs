//! Fixed-interval polling until jobs reach a terminal status

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use appchains_domain::{AppChainsError, RawJobResult, Result};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::ports::ChainsBackend;

/// Polls job status until every tracked job is terminal.
///
/// The loop is unbounded by default: job latency is dominated by
/// server-side computation and the only exits are a terminal status or a
/// transport failure. Callers that need a bound opt into a deadline or
/// supply a cancellation token. The retry interval is fixed; there is no
/// backoff between rounds.
pub struct JobPoller {
    backend: Arc<dyn ChainsBackend>,
    interval: Duration,
    deadline: Option<Duration>,
    cancel: CancellationToken,
}

impl JobPoller {
    pub fn new(backend: Arc<dyn ChainsBackend>, interval: Duration) -> Self {
        Self { backend, interval, deadline: None, cancel: CancellationToken::new() }
    }

    /// Bound the total wait for one call; [`AppChainsError::Timeout`] is
    /// returned once it elapses.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Tie the poll loops to an externally owned cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Poll a single job until terminal.
    ///
    /// The tracked result is replaced wholesale on every round. A
    /// transport failure aborts the poll and is wrapped with the job id;
    /// it is not retried here (the transport has its own attempt budget).
    pub async fn await_completion(&self, mut raw: RawJobResult) -> Result<RawJobResult> {
        let started = Instant::now();

        loop {
            if raw.is_terminal() {
                debug!(id_job = raw.id_job(), status = %raw.status.status, "job is terminal");
                return Ok(raw);
            }

            let id_job = raw.id_job();
            debug!(id_job, status = %raw.status.status, "job still in progress");
            self.wait_round(started).await.map_err(|err| err.for_job(id_job))?;

            raw = self
                .backend
                .get_app_results(id_job)
                .await
                .map_err(|err| err.for_job(id_job))?;
        }
    }

    /// Poll a batch of jobs until every entry is terminal.
    ///
    /// Each round issues exactly one status query carrying every
    /// non-terminal job id, so request volume scales with rounds, not
    /// batch size. Response entries are matched back to tracked slots by
    /// job id, never by position; ids absent from a response are left
    /// unchanged and re-polled next round. The output map always holds
    /// exactly the input key set.
    pub async fn await_completion_batch(
        &self,
        mut tracked: HashMap<String, RawJobResult>,
    ) -> Result<HashMap<String, RawJobResult>> {
        let started = Instant::now();

        loop {
            let pending: Vec<i64> = tracked
                .values()
                .filter(|raw| !raw.is_terminal())
                .map(RawJobResult::id_job)
                .collect();

            if pending.is_empty() {
                return Ok(tracked);
            }

            debug!(pending = pending.len(), total = tracked.len(), "waiting for batch jobs");
            self.wait_round(started).await?;

            let updates = self.backend.get_app_results_batch(&pending).await?;
            for update in updates {
                let id_job = update.id_job();
                match tracked.values_mut().find(|slot| slot.id_job() == id_job) {
                    Some(slot) => *slot = update,
                    None => warn!(id_job, "batch status response carried an untracked job id"),
                }
            }
        }
    }

    /// Sleep one retry interval, honoring cancellation and the deadline.
    async fn wait_round(&self, started: Instant) -> Result<()> {
        if let Some(deadline) = self.deadline {
            if started.elapsed() >= deadline {
                return Err(AppChainsError::Timeout(deadline));
            }
        }

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(AppChainsError::Cancelled),
            () = sleep(self.interval) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use appchains_domain::{BatchStartParams, JobStatus, StartAppParams};
    use async_trait::async_trait;
    use url::Url;

    use super::*;

    fn job(id_job: i64, status: &str) -> RawJobResult {
        RawJobResult {
            result_props: Vec::new(),
            status: JobStatus {
                id_job,
                status: status.to_string(),
                completed_successfully: status.eq_ignore_ascii_case("completed").then_some(true),
                finish_dt: None,
            },
        }
    }

    /// Backend stub replaying scripted status sequences per job id.
    #[derive(Default)]
    struct ScriptedBackend {
        single: Mutex<HashMap<i64, VecDeque<RawJobResult>>>,
        batch: Mutex<VecDeque<Vec<RawJobResult>>>,
        single_calls: AtomicUsize,
        batch_calls: AtomicUsize,
        last_batch_query: Mutex<Vec<i64>>,
    }

    impl ScriptedBackend {
        fn script_single(&self, id_job: i64, states: &[&str]) {
            let queue = states.iter().map(|s| job(id_job, s)).collect();
            self.single.lock().unwrap().insert(id_job, queue);
        }

        fn script_batch_round(&self, round: Vec<RawJobResult>) {
            self.batch.lock().unwrap().push_back(round);
        }
    }

    #[async_trait]
    impl ChainsBackend for ScriptedBackend {
        async fn start_app(&self, _params: &StartAppParams) -> Result<RawJobResult> {
            unreachable!("poller tests never submit")
        }

        async fn start_app_batch(
            &self,
            _params: &BatchStartParams,
        ) -> Result<Vec<(String, RawJobResult)>> {
            unreachable!("poller tests never submit")
        }

        async fn get_app_results(&self, id_job: i64) -> Result<RawJobResult> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            let mut scripts = self.single.lock().unwrap();
            let queue = scripts
                .get_mut(&id_job)
                .ok_or_else(|| AppChainsError::Network(format!("unexpected fetch for {id_job}")))?;
            queue
                .pop_front()
                .ok_or_else(|| AppChainsError::Network("script exhausted".to_string()))
        }

        async fn get_app_results_batch(&self, id_jobs: &[i64]) -> Result<Vec<RawJobResult>> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_batch_query.lock().unwrap() = id_jobs.to_vec();
            self.batch
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AppChainsError::Network("batch script exhausted".to_string()))
        }

        fn report_file_url(&self, file_ref: &str) -> Result<Url> {
            Url::parse(&format!("https://chains.test/v2/GetReportFile?idJob={file_ref}"))
                .map_err(|err| AppChainsError::Config(err.to_string()))
        }
    }

    fn poller(backend: &Arc<ScriptedBackend>) -> JobPoller {
        JobPoller::new(Arc::clone(backend) as Arc<dyn ChainsBackend>, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn single_job_polls_until_completed() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.script_single(18043, &["Running", "Completed"]);

        let raw = poller(&backend).await_completion(job(18043, "Running")).await.unwrap();

        assert!(raw.status.is_completed());
        assert_eq!(backend.single_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn already_terminal_job_is_returned_without_a_fetch() {
        let backend = Arc::new(ScriptedBackend::default());

        let raw = poller(&backend).await_completion(job(5, "Completed")).await.unwrap();

        assert_eq!(raw.id_job(), 5);
        assert_eq!(backend.single_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_failure_aborts_and_names_the_job() {
        let backend = Arc::new(ScriptedBackend::default());
        // No script for job 77: the first re-fetch fails.

        let err = poller(&backend).await_completion(job(77, "Running")).await.unwrap_err();

        match err {
            AppChainsError::Job { id_job, source } => {
                assert_eq!(id_job, 77);
                assert!(matches!(*source, AppChainsError::Network(_)));
            }
            other => panic!("expected job-wrapped error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn batch_issues_one_query_per_round_and_keeps_all_keys() {
        let backend = Arc::new(ScriptedBackend::default());
        // Round 1: only job 1 finishes. Round 2: job 2 finishes.
        backend.script_batch_round(vec![job(1, "Completed"), job(2, "Running")]);
        backend.script_batch_round(vec![job(2, "Completed")]);

        let tracked = HashMap::from([
            ("Chain91".to_string(), job(1, "Running")),
            ("Chain88".to_string(), job(2, "Running")),
        ]);

        let done = poller(&backend).await_completion_batch(tracked).await.unwrap();

        assert_eq!(backend.batch_calls.load(Ordering::SeqCst), 2);
        assert_eq!(done.len(), 2);
        assert!(done.contains_key("Chain91") && done.contains_key("Chain88"));
        assert!(done.values().all(|raw| raw.status.is_completed()));
        // The last round only asked about the one job still pending.
        assert_eq!(*backend.last_batch_query.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn batch_updates_match_by_job_id_not_position() {
        let backend = Arc::new(ScriptedBackend::default());
        // Response deliberately reversed relative to the query order.
        backend.script_batch_round(vec![job(2, "Completed"), job(1, "Completed")]);

        let tracked = HashMap::from([
            ("first".to_string(), job(1, "Running")),
            ("second".to_string(), job(2, "Running")),
        ]);

        let done = poller(&backend).await_completion_batch(tracked).await.unwrap();

        assert_eq!(done["first"].id_job(), 1);
        assert_eq!(done["second"].id_job(), 2);
    }

    #[tokio::test]
    async fn ids_absent_from_a_round_are_repolled_unchanged() {
        let backend = Arc::new(ScriptedBackend::default());
        // Round 1 answers for job 1 only; job 2 stays as-is.
        backend.script_batch_round(vec![job(1, "Completed")]);
        backend.script_batch_round(vec![job(2, "Completed")]);

        let tracked = HashMap::from([
            ("a".to_string(), job(1, "Running")),
            ("b".to_string(), job(2, "Running")),
        ]);

        let done = poller(&backend).await_completion_batch(tracked).await.unwrap();

        assert_eq!(backend.batch_calls.load(Ordering::SeqCst), 2);
        assert!(done["b"].status.is_completed());
    }

    #[tokio::test]
    async fn cancelled_status_is_terminal_in_batch_mode() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.script_batch_round(vec![job(1, "Cancelled"), job(2, "Completed")]);

        let tracked = HashMap::from([
            ("doomed".to_string(), job(1, "Running")),
            ("fine".to_string(), job(2, "Running")),
        ]);

        let done = poller(&backend).await_completion_batch(tracked).await.unwrap();

        assert_eq!(backend.batch_calls.load(Ordering::SeqCst), 1);
        assert!(done["doomed"].status.is_cancelled());
        assert!(!done["doomed"].status.succeeded());
        assert!(done["fine"].status.succeeded());
    }

    #[tokio::test]
    async fn deadline_bounds_the_poll() {
        let backend = Arc::new(ScriptedBackend::default());

        let poller = poller(&backend).with_deadline(Duration::ZERO);
        let err = poller.await_completion(job(1, "Running")).await.unwrap_err();

        match err {
            AppChainsError::Job { id_job, source } => {
                assert_eq!(id_job, 1);
                assert!(matches!(*source, AppChainsError::Timeout(_)));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancellation_token_ends_the_poll() {
        let backend = Arc::new(ScriptedBackend::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let poller = poller(&backend).with_cancellation(cancel);
        let tracked = HashMap::from([("only".to_string(), job(1, "Running"))]);
        let err = poller.await_completion_batch(tracked).await.unwrap_err();

        assert!(matches!(err, AppChainsError::Cancelled));
    }
}
