//! Transformation of terminal raw job results into user-facing reports

use appchains_domain::constants::{PROPERTY_TYPE_PDF, PROPERTY_TYPE_PLAINTEXT};
use appchains_domain::{FileResult, RawJobResult, Report, ReportResult, Result, ResultValue};
use tracing::{debug, warn};
use url::Url;

/// Build a [`Report`] from a terminal raw result.
///
/// This is a strict map/filter and never fails: each property's type tag
/// is matched case-insensitively, `plaintext` becomes a text result,
/// `pdf` becomes a file result named `report_{jobId}.{type}`, and any
/// other or malformed property is skipped. Callers must only pass
/// terminal results; the poller guarantees that on the main paths.
///
/// `file_url` turns a file reference id from the payload into its
/// retrieval URL; the backend knows the base URL, so the closure
/// usually delegates to [`ChainsBackend::report_file_url`].
///
/// [`ChainsBackend::report_file_url`]: super::ports::ChainsBackend::report_file_url
pub fn build_report<F>(raw: &RawJobResult, file_url: F) -> Report
where
    F: Fn(&str) -> Result<Url>,
{
    let mut results = Vec::with_capacity(raw.result_props.len());

    for prop in &raw.result_props {
        let (Some(kind), Some(value)) = (prop.kind.as_deref(), prop.value.as_deref()) else {
            debug!(name = %prop.name, "skipping result property without type or value");
            continue;
        };

        match kind.to_lowercase().as_str() {
            PROPERTY_TYPE_PLAINTEXT => {
                results.push(ReportResult {
                    name: prop.name.clone(),
                    value: ResultValue::Text(value.to_string()),
                });
            }
            PROPERTY_TYPE_PDF => match file_url(value) {
                Ok(url) => {
                    let extension = kind.to_lowercase();
                    let name = format!("report_{}.{}", raw.id_job(), extension);
                    results.push(ReportResult {
                        name: prop.name.clone(),
                        value: ResultValue::File(FileResult { name, extension, url }),
                    });
                }
                Err(err) => {
                    warn!(name = %prop.name, error = %err, "skipping file result with unusable reference");
                }
            },
            other => {
                debug!(name = %prop.name, kind = other, "skipping unrecognized result property type");
            }
        }
    }

    Report { succeeded: raw.status.succeeded(), results }
}
