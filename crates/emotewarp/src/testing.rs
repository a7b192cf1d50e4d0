//! In-memory fetcher for tests. Every request hands out a pending
//! promise; tests complete them by url, in whatever order they like.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use egui::{Color32, ColorImage};
use poll_promise::{Promise, Sender};

use crate::media::frame::{FrameMetadata, SequenceMetadata};
use crate::media::network::{MediaFetcher, MetadataPromise, PicturePromise};
use crate::Result;

#[derive(Default)]
struct Pending {
    metadata: HashMap<String, Sender<Result<SequenceMetadata>>>,
    pictures: HashMap<String, Sender<Result<ColorImage>>>,
    requests: Vec<String>,
}

#[derive(Default, Clone)]
pub struct MemoryFetcher {
    pending: Rc<RefCell<Pending>>,
}

impl MemoryFetcher {
    pub fn requests(&self) -> Vec<String> {
        self.pending.borrow().requests.clone()
    }

    pub fn complete_metadata(&self, url: &str, result: Result<SequenceMetadata>) -> bool {
        let sender = self.pending.borrow_mut().metadata.remove(url);
        sender.map(|s| s.send(result)).is_some()
    }

    pub fn complete_picture(&self, url: &str, result: Result<ColorImage>) -> bool {
        let sender = self.pending.borrow_mut().pictures.remove(url);
        sender.map(|s| s.send(result)).is_some()
    }
}

impl MediaFetcher for MemoryFetcher {
    fn fetch_metadata(&self, url: &str) -> MetadataPromise {
        let (sender, promise) = Promise::new();
        let mut pending = self.pending.borrow_mut();
        pending.requests.push(url.to_owned());
        pending.metadata.insert(url.to_owned(), sender);
        promise
    }

    fn fetch_picture(&self, url: &str) -> PicturePromise {
        let (sender, promise) = Promise::new();
        let mut pending = self.pending.borrow_mut();
        pending.requests.push(url.to_owned());
        pending.pictures.insert(url.to_owned(), sender);
        promise
    }
}

pub fn metadata(frames: &[(u32, u32, u32)]) -> SequenceMetadata {
    SequenceMetadata {
        count: Some(frames.len() as u32),
        frames: frames
            .iter()
            .map(|&(width, height, delay)| FrameMetadata {
                width,
                height,
                delay: Some(delay),
                ..Default::default()
            })
            .collect(),
    }
}

pub fn solid(w: usize, h: usize, color: Color32) -> ColorImage {
    ColorImage::new([w, h], color)
}
