mod config;
mod emote;
mod emotes;
mod error;
pub mod media;
mod result;

#[cfg(test)]
mod testing;

pub use config::EmoteConfig;
pub use emote::{EmoteId, EmoteKind, EmotePlayer};
pub use emotes::Emotes;
pub use error::Error;
pub use media::{
    AnimatedPlayer, DisposalMode, EmoteTextures, FrameDescriptor, HttpFetcher, MediaFetcher,
    OutputTexture, PlaybackState, StaticPlayer,
};
pub use result::Result;
