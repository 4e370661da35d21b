//! Request and response bodies exchanged with the chains service
//!
//! Field names here are the wire contract and must not drift; every
//! struct round-trips through serde renames to the exact JSON the
//! service expects.

use serde::{Deserialize, Serialize};

use super::job::RawJobResult;
use crate::constants::DATA_SOURCE_PARAMETER;

/// One named job parameter: `{"Name": ..., "Value": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobParameter {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl JobParameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Body of a `StartApp` call:
/// `{"AppCode": ..., "Pars": [{"Name": ..., "Value": ...}, ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartAppParams {
    #[serde(rename = "AppCode")]
    pub app_code: String,
    #[serde(rename = "Pars")]
    pub pars: Vec<JobParameter>,
}

impl StartAppParams {
    /// The conventional single-parameter job: run `app_code` over one
    /// data source.
    pub fn for_datasource(app_code: impl Into<String>, datasource_id: impl Into<String>) -> Self {
        Self {
            app_code: app_code.into(),
            pars: vec![JobParameter::new(DATA_SOURCE_PARAMETER, datasource_id)],
        }
    }
}

/// Body of a `StartAppBatch` call: `{"Pars": [<StartAppParams>, ...]}`,
/// one entry per job, input order preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStartParams {
    #[serde(rename = "Pars")]
    pub pars: Vec<StartAppParams>,
}

/// Body of a `GetAppResultsBatch` call: `{"JobIds": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJobIds {
    #[serde(rename = "JobIds")]
    pub job_ids: Vec<i64>,
}

/// One entry of a `StartAppBatch` response, associating a result holder
/// back to the app code that started it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchStartEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: RawJobResult,
}

/// Response union of a `StartApp` call. Current deployments answer with
/// the full result holder; older ones with just `{"jobId": N}`. Both
/// normalize into a trackable [`RawJobResult`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StartAppResponse {
    Full(RawJobResult),
    JobRef {
        #[serde(rename = "jobId")]
        job_id: i64,
    },
}

impl StartAppResponse {
    /// Normalize either response variant into a raw result. A bare job
    /// reference becomes a pending status with no properties; the first
    /// poll round fills in the real state.
    pub fn into_raw(self) -> RawJobResult {
        match self {
            Self::Full(raw) => raw,
            Self::JobRef { job_id } => RawJobResult::from_job_ref(job_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn start_body_matches_the_wire_shape() {
        let params = StartAppParams::for_datasource("Chain9", "FILE:80599");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            json!({
                "AppCode": "Chain9",
                "Pars": [{"Name": "dataSourceId", "Value": "FILE:80599"}]
            })
        );
    }

    #[test]
    fn batch_start_body_preserves_entry_order() {
        let params = BatchStartParams {
            pars: vec![
                StartAppParams::for_datasource("Chain91", "227680"),
                StartAppParams::for_datasource("Chain88", "227680"),
            ],
        };
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            json!({
                "Pars": [
                    {"AppCode": "Chain91", "Pars": [{"Name": "dataSourceId", "Value": "227680"}]},
                    {"AppCode": "Chain88", "Pars": [{"Name": "dataSourceId", "Value": "227680"}]}
                ]
            })
        );
    }

    #[test]
    fn batch_status_body_uses_job_ids_key() {
        let body = BatchJobIds { job_ids: vec![101, 102] };
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"JobIds": [101, 102]}));
    }

    #[test]
    fn start_response_union_accepts_the_full_holder() {
        let response: StartAppResponse = serde_json::from_value(json!({
            "ResultProps": [],
            "Status": {"IdJob": 12, "Status": "Running"}
        }))
        .unwrap();
        let raw = response.into_raw();
        assert_eq!(raw.id_job(), 12);
        assert_eq!(raw.status.status, "Running");
    }

    #[test]
    fn start_response_union_accepts_a_bare_job_ref() {
        let response: StartAppResponse = serde_json::from_value(json!({"jobId": 977})).unwrap();
        let raw = response.into_raw();
        assert_eq!(raw.id_job(), 977);
        assert!(!raw.is_terminal());
        assert!(raw.result_props.is_empty());
    }

    #[test]
    fn batch_start_entries_carry_key_and_holder() {
        let entry: BatchStartEntry = serde_json::from_value(json!({
            "Key": "Chain88",
            "Value": {"ResultProps": [], "Status": {"IdJob": 31, "Status": "Pending"}}
        }))
        .unwrap();
        assert_eq!(entry.key, "Chain88");
        assert_eq!(entry.value.id_job(), 31);
    }
}
