//! Beacon lookups: stateless raw-text queries keyed by genomic
//! coordinate and allele

use std::sync::Arc;

use appchains_domain::Result;
use async_trait::async_trait;

/// Port over the beacon HTTP endpoints.
#[async_trait]
pub trait BeaconLookup: Send + Sync {
    /// Issue a GET to the named beacon method with the given query
    /// parameters and return the response body verbatim.
    async fn lookup(&self, method: &str, query: &[(String, String)]) -> Result<String>;
}

/// Pass-through service over the beacon endpoints. No polling, no result
/// modeling; bodies are plain text, not JSON.
pub struct BeaconService {
    lookup: Arc<dyn BeaconLookup>,
}

impl BeaconService {
    pub fn new(lookup: Arc<dyn BeaconLookup>) -> Self {
        Self { lookup }
    }

    /// Query the sequencing beacon for one coordinate/allele.
    pub async fn sequencing_beacon(&self, chrom: i32, pos: i64, allele: &str) -> Result<String> {
        self.named_beacon("SequencingBeacon", chrom, pos, allele).await
    }

    /// Query the public beacon network for one coordinate/allele.
    pub async fn public_beacon(&self, chrom: i32, pos: i64, allele: &str) -> Result<String> {
        self.named_beacon("PublicBeacons", chrom, pos, allele).await
    }

    /// Low-level lookup against any beacon method.
    pub async fn named_beacon(
        &self,
        method: &str,
        chrom: i32,
        pos: i64,
        allele: &str,
    ) -> Result<String> {
        let query = vec![
            ("chrom".to_string(), chrom.to_string()),
            ("pos".to_string(), pos.to_string()),
            ("allele".to_string(), allele.to_string()),
        ];
        self.lookup.lookup(method, &query).await
    }

    /// Lookup against any beacon method with caller-provided query
    /// parameters.
    pub async fn lookup_with_query(
        &self,
        method: &str,
        query: &[(String, String)],
    ) -> Result<String> {
        self.lookup.lookup(method, query).await
    }
}
