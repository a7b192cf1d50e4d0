use egui::ColorImage;

use crate::media::network::PicturePromise;

/// Load state of one picture. Moves forward only:
/// `Loading -> Ready` or `Loading -> Failed`.
pub enum PictureSlot {
    Loading(PicturePromise),
    Ready(ColorImage),
    Failed,
}

impl PictureSlot {
    /// Pick up a finished load of picture `index` of `label`. Returns
    /// true when the slot just became ready.
    pub fn poll(&mut self, label: &str, index: usize) -> bool {
        if !matches!(self, PictureSlot::Loading(_)) {
            return false;
        }

        let PictureSlot::Loading(promise) = std::mem::replace(self, PictureSlot::Failed) else {
            return false;
        };

        match promise.try_take() {
            Ok(Ok(picture)) => {
                tracing::trace!("picture {label}#{index} ready ({:?})", picture.size);
                *self = PictureSlot::Ready(picture);
                true
            }
            Ok(Err(e)) => {
                tracing::warn!("picture {label}#{index} will not be drawn: {e}");
                false
            }
            Err(promise) => {
                *self = PictureSlot::Loading(promise);
                false
            }
        }
    }

    pub fn ready(&self) -> Option<&ColorImage> {
        match self {
            PictureSlot::Ready(picture) => Some(picture),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready().is_some()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PictureSlot::Failed)
    }
}

impl std::fmt::Debug for PictureSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading(_) => write!(f, "Loading"),
            Self::Ready(picture) => f.debug_tuple("Ready").field(&picture.size).finish(),
            Self::Failed => write!(f, "Failed"),
        }
    }
}
