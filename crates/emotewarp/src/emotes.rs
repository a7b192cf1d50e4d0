use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::emote::{EmoteId, EmotePlayer};
use crate::media::network::MediaFetcher;
use crate::media::texture::OutputTexture;
use crate::EmoteConfig;

struct Entry {
    player: EmotePlayer,
    consumers: usize,
}

/// Every emote currently on screen, shared between the consumers
/// displaying it. A player exists while at least one consumer holds it.
pub struct Emotes {
    config: Arc<EmoteConfig>,
    fetcher: Box<dyn MediaFetcher>,
    entries: HashMap<EmoteId, Entry>,
}

impl Emotes {
    pub fn new(config: Arc<EmoteConfig>, fetcher: Box<dyn MediaFetcher>) -> Self {
        Self {
            config,
            fetcher,
            entries: HashMap::new(),
        }
    }

    pub fn config(&self) -> &EmoteConfig {
        &self.config
    }

    /// Register a consumer of `id`, creating its player on first use.
    /// Returns the number of consumers afterwards.
    pub fn acquire(&mut self, id: &EmoteId) -> usize {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.consumers += 1;
            return entry.consumers;
        }

        tracing::debug!("creating player for {id}");
        let player = EmotePlayer::new(id.clone(), self.config.clone(), self.fetcher.as_ref());
        self.entries.insert(
            id.clone(),
            Entry {
                player,
                consumers: 1,
            },
        );
        1
    }

    /// Drop one consumer of `id`. The player is torn down with the last
    /// one. Returns the consumers left.
    pub fn release(&mut self, id: &EmoteId) -> usize {
        let Some(entry) = self.entries.get_mut(id) else {
            tracing::warn!("release of {id}, which is not displayed");
            return 0;
        };

        entry.consumers = entry.consumers.saturating_sub(1);
        if entry.consumers > 0 {
            return entry.consumers;
        }

        if let Some(mut entry) = self.entries.remove(id) {
            entry.player.dispose();
        }
        0
    }

    /// Tick every player. Returns the earliest frame deadline any of
    /// them is waiting for.
    #[profiling::function]
    pub fn update(&mut self, now: Instant) -> Option<Instant> {
        let fetcher = self.fetcher.as_ref();
        self.entries
            .values_mut()
            .filter_map(|entry| entry.player.update(now, fetcher))
            .min()
    }

    pub fn player(&self, id: &EmoteId) -> Option<&EmotePlayer> {
        self.entries.get(id).map(|entry| &entry.player)
    }

    pub fn texture(&self, id: &EmoteId) -> Option<&OutputTexture> {
        self.player(id).map(EmotePlayer::texture)
    }

    pub fn texture_mut(&mut self, id: &EmoteId) -> Option<&mut OutputTexture> {
        self.entries
            .get_mut(id)
            .map(|entry| entry.player.texture_mut())
    }

    pub fn textures_mut(&mut self) -> impl Iterator<Item = (&EmoteId, &mut OutputTexture)> {
        self.entries
            .iter_mut()
            .map(|(id, entry)| (id, entry.player.texture_mut()))
    }

    pub fn contains(&self, id: &EmoteId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn consumers(&self, id: &EmoteId) -> usize {
        self.entries.get(id).map_or(0, |entry| entry.consumers)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
