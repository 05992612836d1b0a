//! OMDb API preflight check.

use super::CheckResult;
use crate::models::config::OmdbConfig;
use crate::services::omdb::OmdbClient;

/// Check if the OMDb API is reachable with the configured key.
pub async fn check(config: &OmdbConfig) -> CheckResult {
    match OmdbClient::new(config.clone()) {
        Ok(client) => match client.verify_api_key().await {
            Ok(true) => CheckResult::ok("OMDb API", "connected"),
            Ok(false) => CheckResult::fail(
                "OMDb API",
                "lookup failed",
                "Check OMDB_API_KEY and your network connection",
            ),
            Err(_) => CheckResult::fail(
                "OMDb API",
                "connection failed",
                "Check your network connection",
            ),
        },
        Err(_) => CheckResult::fail(
            "OMDb API",
            "API key not configured",
            "Set OMDB_API_KEY environment variable",
        ),
    }
}
