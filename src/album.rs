use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use teloxide::types::ChatId;
use tokio::task::JoinHandle;

use crate::types::Photo;

type AlbumKey = (ChatId, String);

struct Pending {
    photos: Vec<Photo>,
    generation: u64,
    timer: JoinHandle<()>,
}

/// Merges the photos of one Telegram media group into a single batch.
///
/// Every photo re-arms a short timer. When it fires without a newer photo in
/// between, `on_ready` is called; the batch stays buffered until somebody
/// takes it, so whoever holds the chat's session first decides what happens
/// to it.
pub struct AlbumCollector {
    window: Duration,
    pending: Mutex<HashMap<AlbumKey, Pending>>,
}

impl AlbumCollector {
    pub fn new(window: Duration) -> Arc<Self> {
        Arc::new(AlbumCollector {
            window,
            pending: Mutex::new(HashMap::new()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AlbumKey, Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push<F, Fut>(self: &Arc<Self>, chat: ChatId, group: String, photo: Photo, on_ready: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let key = (chat, group);
        let mut pending = self.lock();

        // A superseded timer is left running: it may already be waiting on
        // the session, and it turns into a no-op once its generation is stale.
        let (photos, generation) = match pending.remove(&key) {
            Some(mut previous) => {
                previous.photos.push(photo);
                (previous.photos, previous.generation + 1)
            }
            None => (vec![photo], 0),
        };

        log::debug!(
            "Album {:?} in chat {} now has {} photos",
            key.1,
            chat,
            photos.len()
        );

        let collector = Arc::clone(self);
        let timer_key = key.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(collector.window).await;

            let current = matches!(
                collector.lock().get(&timer_key),
                Some(entry) if entry.generation == generation
            );
            if current {
                on_ready().await;
            }
        });

        pending.insert(
            key,
            Pending {
                photos,
                generation,
                timer,
            },
        );
    }

    /// Removes one album. `None` when it was already taken.
    pub fn take(&self, chat: ChatId, group: &str) -> Option<Vec<Photo>> {
        self.lock()
            .remove(&(chat, group.to_owned()))
            .map(|entry| entry.photos)
    }

    /// Removes every album of a chat, oldest first. Must be called with the
    /// chat's session held, so no timer of the chat is past its wait.
    pub fn take_chat(&self, chat: ChatId) -> Vec<Vec<Photo>> {
        let mut pending = self.lock();
        let keys: Vec<AlbumKey> = pending.keys().filter(|(c, _)| *c == chat).cloned().collect();

        let mut albums: Vec<Vec<Photo>> = keys
            .iter()
            .filter_map(|key| pending.remove(key))
            .map(|entry| {
                entry.timer.abort();
                entry.photos
            })
            .collect();
        albums.sort_by_key(|photos| photos.first().map(|p| p.message_id.0));

        if !albums.is_empty() {
            log::debug!("Took {} pending albums in chat {}", albums.len(), chat);
        }
        albums
    }

    #[cfg(test)]
    fn pending_photos(&self, chat: ChatId) -> usize {
        self.lock()
            .iter()
            .filter(|((c, _), _)| *c == chat)
            .map(|(_, entry)| entry.photos.len())
            .sum()
    }
}
