//! User-facing report model produced from terminal job results

use url::Url;

/// A normalized result value. Consumers match exhaustively instead of
/// downcasting, so adding a variant is a compile-visible change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultValue {
    /// Literal text payload.
    Text(String),
    /// A file the service produced, fetchable over the authenticated
    /// transport.
    File(FileResult),
}

/// Descriptor of a downloadable file result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    /// Derived local file name, `report_{jobId}.{extension}`.
    pub name: String,
    /// Lower-cased type tag doubling as the file extension.
    pub extension: String,
    /// Fully built retrieval URL on the chains service.
    pub url: Url,
}

/// One named entry of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportResult {
    pub name: String,
    pub value: ResultValue,
}

/// The terminal, user-facing artifact of one job. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Mirrors the server's success flag only; unrecognized result
    /// properties never affect it.
    pub succeeded: bool,
    pub results: Vec<ReportResult>,
}

impl Report {
    /// Convenience accessor for text results by name.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.results.iter().find_map(|result| match &result.value {
            ResultValue::Text(content) if result.name == name => Some(content.as_str()),
            _ => None,
        })
    }

    /// Iterate over the file results of this report.
    pub fn files(&self) -> impl Iterator<Item = &FileResult> {
        self.results.iter().filter_map(|result| match &result.value {
            ResultValue::File(file) => Some(file),
            ResultValue::Text(_) => None,
        })
    }
}
