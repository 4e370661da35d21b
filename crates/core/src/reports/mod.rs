//! The report pipeline: submit jobs, poll them to a terminal status,
//! and normalize their raw payloads into typed reports.

pub mod builder;
pub mod poller;
pub mod ports;
pub mod service;

pub use service::ReportService;
