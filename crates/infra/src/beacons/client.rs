//! Beacon endpoint client
//!
//! Beacons are stateless, unauthenticated GET lookups; response bodies
//! are plain text and returned verbatim.

use appchains_core::BeaconLookup;
use appchains_domain::{AppChainsError, Result};
use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::http::HttpClient;

/// Beacon-service client rooted at the beacons base URL.
pub struct BeaconClient {
    http: HttpClient,
    base_url: Url,
}

impl BeaconClient {
    pub fn new(beacons_url: &str, http: HttpClient) -> Result<Self> {
        let mut normalized = beacons_url.trim_end_matches('/').to_string();
        normalized.push('/');
        let base_url = Url::parse(&normalized).map_err(|err| {
            AppChainsError::Config(format!("invalid beacons url {beacons_url}: {err}"))
        })?;
        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl BeaconLookup for BeaconClient {
    async fn lookup(&self, beacon_method: &str, query: &[(String, String)]) -> Result<String> {
        let mut url = self.base_url.join(beacon_method).map_err(|err| {
            AppChainsError::Config(format!("invalid beacon method {beacon_method}: {err}"))
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }

        debug!(%url, "beacon lookup");
        let response = self.http.send(self.http.request(Method::GET, url)).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppChainsError::Service { status: status.as_u16(), body });
        }

        response.text().await.map_err(|err| AppChainsError::Network(err.to_string()))
    }
}
