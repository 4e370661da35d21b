//! Job status and raw result payloads as the chains service reports them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Execution state of one server-side report job.
///
/// The wire names are fixed by the service, including the missing second
/// "s" in `CompletedSuccesfully`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(rename = "IdJob")]
    pub id_job: i64,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "CompletedSuccesfully", default)]
    pub completed_successfully: Option<bool>,
    #[serde(rename = "FinishDt", default)]
    pub finish_dt: Option<DateTime<Utc>>,
}

impl JobStatus {
    /// Placeholder status for a job the service has only acknowledged
    /// with an identifier so far.
    pub fn pending(id_job: i64) -> Self {
        Self {
            id_job,
            status: "Pending".to_string(),
            completed_successfully: None,
            finish_dt: None,
        }
    }

    /// Whether the job can change no further. Status tags are compared
    /// case-insensitively; anything unrecognized counts as in-progress.
    pub fn is_terminal(&self) -> bool {
        self.is_completed() || self.is_cancelled() || self.status.eq_ignore_ascii_case("failed")
    }

    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("completed")
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.eq_ignore_ascii_case("cancelled")
    }

    /// Server-reported success flag; an absent or null flag means the
    /// job did not succeed.
    pub fn succeeded(&self) -> bool {
        self.completed_successfully.unwrap_or(false)
    }
}

/// One named, typed field of a job's output payload, prior to
/// normalization. Only `Name`, `Type` and `Value` drive the report
/// builder; the remaining fields are presentation metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultProperty {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "SubTitle", default)]
    pub sub_title: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(rename = "SubType", default)]
    pub sub_type: Option<String>,
    #[serde(rename = "Value", default)]
    pub value: Option<String>,
}

impl ResultProperty {
    /// Shorthand for the three fields normalization cares about.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind.into()),
            value: Some(value.into()),
            ..Self::default()
        }
    }
}

/// Untransformed job payload: the current status plus whatever result
/// properties the service has produced. Replaced wholesale on every poll
/// round; immutable once terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawJobResult {
    #[serde(rename = "ResultProps", default)]
    pub result_props: Vec<ResultProperty>,
    #[serde(rename = "Status")]
    pub status: JobStatus,
}

impl RawJobResult {
    /// Trackable result for a job the service acknowledged by id only.
    pub fn from_job_ref(id_job: i64) -> Self {
        Self { result_props: Vec::new(), status: JobStatus::pending(id_job) }
    }

    pub fn id_job(&self) -> i64 {
        self.status.id_job
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
