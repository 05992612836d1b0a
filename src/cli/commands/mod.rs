//! CLI command implementations.

pub mod details;
pub mod interactive;
pub mod liked;
pub mod output;
pub mod recommend;
pub mod search;

use crate::core::liked::LikedStore;
use crate::core::storage::SessionStorage;
use crate::models::config::Config;
use crate::services::omdb::OmdbClient;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Build the OMDb client from config.
pub fn gateway(config: &Config) -> crate::Result<Arc<OmdbClient>> {
    Ok(Arc::new(OmdbClient::new(config.omdb.clone())?))
}

/// Storage of the configured session.
pub fn session_storage(config: &Config) -> SessionStorage {
    SessionStorage::open(&config.session.dir, &config.session.id)
}

/// Open the liked list of the configured session.
pub fn open_liked(config: &Config) -> LikedStore<SessionStorage> {
    LikedStore::open(session_storage(config))
}

/// Spinner shown while waiting on the network.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
