use std::collections::HashMap;

use egui::{Context, TextureHandle, TextureOptions};

use crate::emote::EmoteId;
use crate::emotes::Emotes;

/// GPU side of the emote textures. Pixels are re-uploaded only for
/// textures that were flagged since the last sync.
#[derive(Default)]
pub struct EmoteTextures {
    handles: HashMap<EmoteId, TextureHandle>,
}

impl EmoteTextures {
    pub fn get(&self, id: &EmoteId) -> Option<&TextureHandle> {
        self.handles.get(id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Upload every dirty texture and forget handles of emotes that left
    /// the registry. Returns how many textures were uploaded.
    #[profiling::function]
    pub fn sync(&mut self, ctx: &Context, emotes: &mut Emotes) -> usize {
        let max_side = ctx.input(|i| i.max_texture_side);
        let mut uploaded = 0;

        for (id, texture) in emotes.textures_mut() {
            if !texture.needs_update() {
                continue;
            }

            // oversized pixels stay flagged so a later sync with a larger
            // limit still picks them up
            let [w, h] = texture.image().size;
            if w > max_side || h > max_side {
                tracing::error!("{id}: texture {w}x{h} exceeds max side {max_side}, not uploading");
                continue;
            }

            let Some(image) = texture.take_update() else {
                continue;
            };

            if w == 0 || h == 0 {
                continue;
            }

            match self.handles.get_mut(id) {
                Some(existing) => existing.set(image.clone(), TextureOptions::LINEAR),
                None => {
                    let handle =
                        ctx.load_texture(format!("emote:{id}"), image.clone(), TextureOptions::LINEAR);
                    self.handles.insert(id.clone(), handle);
                }
            }
            uploaded += 1;
        }

        self.handles.retain(|id, _| emotes.contains(id));
        uploaded
    }
}
