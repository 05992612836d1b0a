//! Liked list commands.

use super::output;
use crate::cli::args::OutputFormat;
use crate::core::liked::LikedStore;
use crate::core::storage::KeyValueStorage;
use crate::models::config::Config;
use crate::models::media::{DetailResult, MediaItem};
use crate::services::SearchGateway;
use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

/// List liked titles of the session.
pub fn list(config: &Config, format: OutputFormat) -> Result<()> {
    let liked = super::open_liked(config);
    if liked.is_empty() {
        if format == OutputFormat::Json {
            println!("[]");
        } else {
            println!("{}", "No liked titles yet.".yellow());
        }
        return Ok(());
    }

    if format != OutputFormat::Json {
        println!(
            "{}",
            format!("Liked titles ({}):", liked.len()).bold().cyan()
        );
        println!();
    }
    output::print_items(liked.list(), &|_| true, format)
}

/// Like or unlike a title by IMDb ID.
pub async fn toggle(config: &Config, imdb_id: &str) -> Result<()> {
    let mut liked = super::open_liked(config);
    let (item, now_liked) = toggle_by_id(&mut liked, imdb_id, || {
        let gateway: Arc<dyn SearchGateway> = super::gateway(config)?;
        Ok(gateway)
    })
    .await?;

    if now_liked {
        println!("{} {} ({})", "Liked".green(), item.title, item.year);
    } else {
        println!("{} {} ({})", "Unliked".yellow(), item.title, item.year);
    }
    Ok(())
}

/// Toggle `imdb_id`. Unliking needs no lookup, so the gateway is only built
/// for titles not liked yet.
pub async fn toggle_by_id<S, F>(
    liked: &mut LikedStore<S>,
    imdb_id: &str,
    gateway: F,
) -> crate::Result<(MediaItem, bool)>
where
    S: KeyValueStorage,
    F: FnOnce() -> crate::Result<Arc<dyn SearchGateway>>,
{
    let imdb_id = imdb_id.trim();
    let item = match liked.list().iter().find(|i| i.imdb_id == imdb_id) {
        Some(item) => item.clone(),
        None => match gateway()?.fetch_details_by_id(imdb_id).await {
            DetailResult::Found(details) => details.item,
            DetailResult::Failed(message) => {
                return Err(crate::Error::OmdbLookupError(message));
            }
        },
    };

    let now_liked = liked.toggle(&item);
    Ok((item, now_liked))
}

/// Remove all liked titles.
pub fn clear(config: &Config) -> Result<()> {
    let mut liked = super::open_liked(config);
    let count = liked.len();
    liked.clear();
    println!("Removed {} liked title(s)", count);
    Ok(())
}

/// Delete everything stored for the session.
pub fn end_session(config: &Config) -> Result<()> {
    let storage = super::session_storage(config);
    let dir = storage.dir().display().to_string();
    storage.end()?;
    println!("{} Session '{}' ended ({})", "[OK]".green(), config.session.id, dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStorage;
    use crate::testing::{details_for, MockGateway};

    fn gateway_with(id_term: &str) -> Arc<MockGateway> {
        let item = MockGateway::item(id_term, 1);
        Arc::new(MockGateway::new().with_details(details_for(item, "A plot.")))
    }

    #[tokio::test]
    async fn test_toggle_by_id_looks_up_new_titles() {
        let gateway = gateway_with("heat");
        let mut liked = LikedStore::open(MemoryStorage::new());

        let (item, now_liked) = toggle_by_id(&mut liked, " heat-1 ", || {
            let gateway: Arc<dyn SearchGateway> = gateway.clone();
            Ok(gateway)
        })
        .await
        .unwrap();

        assert!(now_liked);
        assert_eq!(item, MockGateway::item("heat", 1));
        assert!(liked.is_liked("heat-1"));
    }

    #[tokio::test]
    async fn test_toggle_by_id_unlikes_without_lookup() {
        let mut liked = LikedStore::open(MemoryStorage::new());
        liked.toggle(&MockGateway::item("heat", 1));

        let (_, now_liked) = toggle_by_id(&mut liked, "heat-1", || {
            Err(crate::Error::OmdbApiKeyMissing)
        })
        .await
        .unwrap();

        assert!(!now_liked);
        assert!(liked.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_by_id_unknown_title_fails() {
        let gateway = gateway_with("heat");
        let mut liked = LikedStore::open(MemoryStorage::new());

        let result = toggle_by_id(&mut liked, "tt0000000", || {
            let gateway: Arc<dyn SearchGateway> = gateway.clone();
            Ok(gateway)
        })
        .await;

        assert!(matches!(result, Err(crate::Error::OmdbLookupError(_))));
        assert!(liked.is_empty());
    }
}
