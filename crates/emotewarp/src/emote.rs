use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::media::animated::AnimatedPlayer;
use crate::media::frame::{sequence_from_metadata, FrameDescriptor};
use crate::media::network::{MediaFetcher, MetadataPromise};
use crate::media::static_img::StaticPlayer;
use crate::media::texture::OutputTexture;
use crate::EmoteConfig;

/// What a consumer asks to display: a picture address or a key the
/// metadata service knows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EmoteId {
    Url(String),
    Key(String),
}

impl EmoteId {
    pub fn parse(s: &str) -> Self {
        match url::Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => EmoteId::Url(s.to_owned()),
            _ => EmoteId::Key(s.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EmoteId::Url(s) | EmoteId::Key(s) => s,
        }
    }
}

impl fmt::Display for EmoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmoteKind {
    Resolving,
    Animated,
    Static,
    Disposed,
}

enum Stage {
    Resolving {
        metadata: MetadataPromise,
        placeholder: OutputTexture,
    },
    Animated(AnimatedPlayer),
    Static(StaticPlayer),
    Disposed(OutputTexture),
}

/// One displayed emote, from identifier to playing texture
pub struct EmotePlayer {
    id: EmoteId,
    config: Arc<EmoteConfig>,
    stage: Stage,
}

impl EmotePlayer {
    pub fn new(id: EmoteId, config: Arc<EmoteConfig>, fetcher: &dyn MediaFetcher) -> Self {
        let edge = config.initial_canvas_size;
        let stage = match &id {
            EmoteId::Url(url) => Stage::Static(StaticPlayer::load(url, &config, fetcher)),
            EmoteId::Key(key) if config.is_denied(key) => {
                tracing::debug!("{key} is deny-listed, using the static picture");
                Stage::Static(StaticPlayer::load(&config.fallback_url(key), &config, fetcher))
            }
            EmoteId::Key(key) => Stage::Resolving {
                metadata: fetcher.fetch_metadata(&config.metadata_url(key)),
                placeholder: OutputTexture::new(edge),
            },
        };

        Self { id, config, stage }
    }

    pub fn id(&self) -> &EmoteId {
        &self.id
    }

    pub fn kind(&self) -> EmoteKind {
        match self.stage {
            Stage::Resolving { .. } => EmoteKind::Resolving,
            Stage::Animated(_) => EmoteKind::Animated,
            Stage::Static(_) => EmoteKind::Static,
            Stage::Disposed(_) => EmoteKind::Disposed,
        }
    }

    pub fn animated(&self) -> Option<&AnimatedPlayer> {
        match &self.stage {
            Stage::Animated(player) => Some(player),
            _ => None,
        }
    }

    pub fn texture(&self) -> &OutputTexture {
        match &self.stage {
            Stage::Resolving { placeholder, .. } => placeholder,
            Stage::Animated(player) => player.texture(),
            Stage::Static(player) => player.texture(),
            Stage::Disposed(texture) => texture,
        }
    }

    pub fn texture_mut(&mut self) -> &mut OutputTexture {
        match &mut self.stage {
            Stage::Resolving { placeholder, .. } => placeholder,
            Stage::Animated(player) => player.texture_mut(),
            Stage::Static(player) => player.texture_mut(),
            Stage::Disposed(texture) => texture,
        }
    }

    /// Drive resolution and playback. Returns the next frame deadline
    /// while an animation is playing.
    pub fn update(&mut self, now: Instant, fetcher: &dyn MediaFetcher) -> Option<Instant> {
        match &mut self.stage {
            Stage::Resolving { metadata, .. } => {
                let resolved = match metadata.ready()? {
                    Ok(meta) => sequence_from_metadata(&self.config, meta),
                    Err(e) => {
                        tracing::warn!("could not resolve {}: {e}", self.id);
                        None
                    }
                };

                self.stage = self.resolve(resolved, fetcher);
                match &mut self.stage {
                    Stage::Animated(player) => player.update(now),
                    Stage::Static(player) => {
                        player.update();
                        None
                    }
                    _ => None,
                }
            }
            Stage::Animated(player) => player.update(now),
            Stage::Static(player) => {
                player.update();
                None
            }
            Stage::Disposed(_) => None,
        }
    }

    fn resolve(
        &self,
        sequence: Option<Vec<FrameDescriptor>>,
        fetcher: &dyn MediaFetcher,
    ) -> Stage {
        let key = self.id.as_str();

        let animated =
            sequence.and_then(|sequence| AnimatedPlayer::load(key, sequence, &self.config, fetcher));

        match animated {
            Some(player) => {
                tracing::debug!("{key}: animated, {} frames", player.frame_count());
                Stage::Animated(player)
            }
            None => {
                tracing::debug!("{key}: no usable frames, using the static picture");
                Stage::Static(StaticPlayer::load(
                    &self.config.fallback_url(key),
                    &self.config,
                    fetcher,
                ))
            }
        }
    }

    /// Release the canvas and stop playback. In-flight loads complete
    /// into dropped promises.
    pub fn dispose(&mut self) {
        match &mut self.stage {
            Stage::Animated(player) => player.dispose(),
            Stage::Static(player) => player.dispose(),
            Stage::Resolving { .. } | Stage::Disposed(_) => {}
        }

        self.stage = Stage::Disposed(OutputTexture::new(0));
        tracing::debug!("{}: disposed", self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::animated::PlaybackState;
    use crate::testing::{metadata, solid, MemoryFetcher};
    use egui::Color32;
    use std::time::Duration;

    fn config() -> Arc<EmoteConfig> {
        Arc::new(EmoteConfig {
            endpoint: "https://emotes.test".to_owned(),
            deny_list: vec!["denied".to_owned()],
            ..Default::default()
        })
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(
            EmoteId::parse("https://cdn.test/a.png"),
            EmoteId::Url("https://cdn.test/a.png".to_owned())
        );
        assert_eq!(
            EmoteId::parse("http://cdn.test/a.png"),
            EmoteId::Url("http://cdn.test/a.png".to_owned())
        );
        assert_eq!(
            EmoteId::parse("5e0ea4610550d42106b8955a"),
            EmoteId::Key("5e0ea4610550d42106b8955a".to_owned())
        );
        assert_eq!(
            EmoteId::parse("ftp://cdn.test/a.png"),
            EmoteId::Key("ftp://cdn.test/a.png".to_owned())
        );
    }

    #[test]
    fn test_key_resolves_to_animation() {
        let fetcher = MemoryFetcher::default();
        let mut player = EmotePlayer::new(EmoteId::parse("wave"), config(), &fetcher);

        assert_eq!(player.kind(), EmoteKind::Resolving);
        assert_eq!(player.texture().canvas().edge(), 128);
        assert_eq!(fetcher.requests(), vec!["https://emotes.test/gif/wave"]);

        let t0 = Instant::now();
        assert_eq!(player.update(t0, &fetcher), None);

        fetcher.complete_metadata(
            "https://emotes.test/gif/wave",
            Ok(metadata(&[(28, 28, 5), (28, 28, 5)])),
        );
        fetcher.complete_picture("https://emotes.test/static/wave/0.png", Ok(solid(28, 28, Color32::RED)));

        // pictures are requested after resolution, so frame 0 is pending
        assert_eq!(
            player.update(t0, &fetcher),
            Some(t0 + Duration::from_millis(50))
        );
        assert_eq!(player.kind(), EmoteKind::Animated);
        assert_eq!(player.texture().canvas().edge(), 32);
        assert_eq!(
            fetcher.requests()[1..],
            [
                "https://emotes.test/static/wave/0.png",
                "https://emotes.test/static/wave/1.png",
            ]
        );

        assert!(fetcher.complete_picture(
            "https://emotes.test/static/wave/1.png",
            Ok(solid(28, 28, Color32::BLUE)),
        ));
        player.update(t0 + Duration::from_millis(50), &fetcher);
        let animated = player.animated().unwrap();
        assert_eq!(animated.state(), PlaybackState::Playing);
        assert_eq!(animated.cursor(), 1);
        assert_eq!(player.texture().canvas().pixel(0, 0), Color32::BLUE);
    }

    #[test]
    fn test_deny_listed_key_skips_metadata() {
        let fetcher = MemoryFetcher::default();
        let mut player = EmotePlayer::new(EmoteId::parse("denied"), config(), &fetcher);

        assert_eq!(player.kind(), EmoteKind::Static);
        assert_eq!(fetcher.requests(), vec!["https://emotes.test/gif/denied.gif"]);

        fetcher.complete_picture(
            "https://emotes.test/gif/denied.gif",
            Ok(solid(64, 32, Color32::GREEN)),
        );
        assert_eq!(player.update(Instant::now(), &fetcher), None);
        assert_eq!(player.texture().canvas().edge(), 64);
        assert!(player.texture().needs_update());
    }

    #[test]
    fn test_oversized_animation_falls_back() {
        let fetcher = MemoryFetcher::default();
        let mut player = EmotePlayer::new(EmoteId::parse("wide"), config(), &fetcher);

        fetcher.complete_metadata(
            "https://emotes.test/gif/wide",
            Ok(metadata(&[(70000, 1, 4), (70000, 1, 4)])),
        );
        player.update(Instant::now(), &fetcher);

        assert_eq!(player.kind(), EmoteKind::Static);
        assert!(player.texture().canvas().edge() <= 2048);
        assert_eq!(
            fetcher.requests().last().map(String::as_str),
            Some("https://emotes.test/gif/wide.gif")
        );
    }

    #[test]
    fn test_zero_frames_falls_back() {
        let fetcher = MemoryFetcher::default();
        let mut player = EmotePlayer::new(EmoteId::parse("flat"), config(), &fetcher);

        fetcher.complete_metadata("https://emotes.test/gif/flat", Ok(metadata(&[])));
        player.update(Instant::now(), &fetcher);

        assert_eq!(player.kind(), EmoteKind::Static);
        assert_eq!(
            fetcher.requests().last().map(String::as_str),
            Some("https://emotes.test/gif/flat.gif")
        );
    }

    #[test]
    fn test_resolution_error_falls_back() {
        let fetcher = MemoryFetcher::default();
        let mut player = EmotePlayer::new(EmoteId::parse("broken"), config(), &fetcher);

        fetcher.complete_metadata(
            "https://emotes.test/gif/broken",
            Err(crate::Error::Http("503".to_owned())),
        );
        player.update(Instant::now(), &fetcher);
        assert_eq!(player.kind(), EmoteKind::Static);
    }

    #[test]
    fn test_url_is_loaded_directly() {
        let fetcher = MemoryFetcher::default();
        let player = EmotePlayer::new(
            EmoteId::parse("https://cdn.test/pic.png"),
            config(),
            &fetcher,
        );

        assert_eq!(player.kind(), EmoteKind::Static);
        assert_eq!(fetcher.requests(), vec!["https://cdn.test/pic.png"]);
    }

    #[test]
    fn test_dispose_ignores_late_loads() {
        let fetcher = MemoryFetcher::default();
        let mut player = EmotePlayer::new(EmoteId::parse("bye"), config(), &fetcher);
        let t0 = Instant::now();

        fetcher.complete_metadata("https://emotes.test/gif/bye", Ok(metadata(&[(8, 8, 10)])));
        player.update(t0, &fetcher);
        assert_eq!(player.kind(), EmoteKind::Animated);

        player.dispose();
        assert_eq!(player.kind(), EmoteKind::Disposed);
        assert_eq!(player.texture().canvas().size(), [0, 0]);

        fetcher.complete_picture(
            "https://emotes.test/static/bye/0.png",
            Ok(solid(8, 8, Color32::RED)),
        );
        assert_eq!(player.update(t0 + Duration::from_secs(1), &fetcher), None);
        assert!(!player.texture().needs_update());
    }
}
