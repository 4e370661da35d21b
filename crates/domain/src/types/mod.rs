//! Domain types and models

pub mod job;
pub mod report;
pub mod wire;

// Re-export the model types for convenience
pub use job::{JobStatus, RawJobResult, ResultProperty};
pub use report::{FileResult, Report, ReportResult, ResultValue};
pub use wire::{
    BatchJobIds, BatchStartEntry, BatchStartParams, JobParameter, StartAppParams, StartAppResponse,
};
