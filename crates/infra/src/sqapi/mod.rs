//! Client for the chains job service (SQAPI)

mod client;

pub use client::SqApiClient;
