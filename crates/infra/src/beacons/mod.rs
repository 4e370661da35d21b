//! Client for the beacon lookup endpoints

mod client;

pub use client::BeaconClient;
