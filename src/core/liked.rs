//! Liked items, persisted per session.

use super::storage::KeyValueStorage;
use crate::models::media::MediaItem;

/// Storage key of the liked list.
pub const STORAGE_KEY: &str = "likedMovies";

/// Liked items in insertion order, unique by IMDb ID.
///
/// Every mutation rewrites the whole list to storage. Storage failures are
/// logged and otherwise ignored; the in-memory list stays authoritative.
pub struct LikedStore<S: KeyValueStorage> {
    storage: S,
    items: Vec<MediaItem>,
}

impl<S: KeyValueStorage> LikedStore<S> {
    /// Load the persisted list. Anything that does not decode as a list of
    /// items is discarded and the store starts empty.
    pub fn open(mut storage: S) -> Self {
        let items = match storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => match decode(&raw) {
                Some(items) => {
                    tracing::debug!("Loaded {} liked items", items.len());
                    items
                }
                None => {
                    tracing::warn!("Stored liked items are invalid, resetting storage");
                    if let Err(e) = storage.remove(STORAGE_KEY) {
                        tracing::error!("Failed to reset liked items: {}", e);
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Cannot read liked items, resetting storage: {}", e);
                if let Err(e) = storage.remove(STORAGE_KEY) {
                    tracing::error!("Failed to reset liked items: {}", e);
                }
                Vec::new()
            }
        };

        Self { storage, items }
    }

    /// Like the item if it is not liked, unlike it otherwise. Returns whether
    /// the item is liked afterwards.
    pub fn toggle(&mut self, item: &MediaItem) -> bool {
        let liked = match self.items.iter().position(|i| i.imdb_id == item.imdb_id) {
            Some(index) => {
                tracing::debug!("Removing {} from liked items", item.title);
                self.items.remove(index);
                false
            }
            None => {
                tracing::debug!("Adding {} to liked items", item.title);
                self.items.push(item.clone());
                true
            }
        };
        self.persist();
        liked
    }

    pub fn is_liked(&self, imdb_id: &str) -> bool {
        self.items.iter().any(|i| i.imdb_id == imdb_id)
    }

    /// Remove every liked item, including the persisted copy.
    pub fn clear(&mut self) {
        self.items.clear();
        if let Err(e) = self.storage.remove(STORAGE_KEY) {
            tracing::error!("Failed to clear liked items: {}", e);
        }
    }

    pub fn list(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Give the storage back, e.g. to end the session.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.items)
            .map_err(crate::Error::from)
            .and_then(|json| self.storage.set(STORAGE_KEY, &json));
        if let Err(e) = result {
            tracing::error!("Error saving liked items: {}", e);
        }
    }
}

/// Decode a stored list, dropping duplicate IDs.
fn decode(raw: &str) -> Option<Vec<MediaItem>> {
    let items: Vec<MediaItem> = serde_json::from_str(raw).ok()?;
    let mut unique: Vec<MediaItem> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.iter().any(|u| u.imdb_id == item.imdb_id) {
            unique.push(item);
        }
    }
    Some(unique)
}
