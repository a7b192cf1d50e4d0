pub mod animated;
pub mod canvas;
pub mod clock;
pub mod compositor;
pub mod frame;
pub mod network;
pub mod picture;
pub mod static_img;
pub mod texture;
pub mod upload;

pub use animated::{AnimatedPlayer, Evaluation, PlaybackState};
pub use canvas::{canvas_edge_for, fit_ratio, Canvas};
pub use clock::FrameClock;
pub use compositor::Compositor;
pub use frame::{
    sequence_from_metadata, DisposalMode, FrameDescriptor, FrameMetadata, SequenceMetadata,
};
pub use network::{decode_picture, HttpFetcher, MediaFetcher, MetadataPromise, PicturePromise};
pub use picture::PictureSlot;
pub use static_img::StaticPlayer;
pub use texture::OutputTexture;
pub use upload::EmoteTextures;
