//! Derived, ordered photo sequences and the navigation cursor over them.

use std::collections::HashMap;

use shared::domain::{GalleryId, PhotoId};
use tracing::warn;

use crate::{
    model::{GalleryBundle, Photo},
    store::GalleryStateStore,
};

pub const FALLBACK_IMAGE: &str = "/fallback-image.jpg";
/// Viewports at most this wide are treated as touch devices.
pub const TOUCH_MAX_VIEWPORT_WIDTH: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewSelector {
    #[default]
    All,
    Liked,
    Disliked,
    Custom(GalleryId),
}

impl ViewSelector {
    pub fn title(&self, bundle: &GalleryBundle) -> String {
        match self {
            ViewSelector::All if bundle.name.trim().is_empty() => "Photo Selection".to_string(),
            ViewSelector::All => bundle.name.clone(),
            ViewSelector::Liked => "Liked Photos".to_string(),
            ViewSelector::Disliked => "Disliked Photos".to_string(),
            ViewSelector::Custom(id) => bundle
                .sub_gallery(*id)
                .map(|gallery| gallery.title.clone())
                .filter(|title| !title.trim().is_empty())
                .unwrap_or_else(|| "Gallery".to_string()),
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            ViewSelector::All => "All photos have been rated!",
            ViewSelector::Liked => "No liked photos yet",
            ViewSelector::Disliked => "No disliked photos yet",
            ViewSelector::Custom(_) => "No photos in this gallery",
        }
    }

    /// Swipe categorization only applies to the unsorted queue.
    pub fn accepts_gestures(&self) -> bool {
        matches!(self, ViewSelector::All)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormFactor {
    Touch,
    #[default]
    Pointer,
}

impl FormFactor {
    pub fn from_viewport_width(width: u32) -> Self {
        if width <= TOUCH_MAX_VIEWPORT_WIDTH {
            FormFactor::Touch
        } else {
            FormFactor::Pointer
        }
    }

    pub fn is_touch(self) -> bool {
        self == FormFactor::Touch
    }
}

#[derive(Debug, Default)]
pub struct ViewController {
    selector: ViewSelector,
    current_index: usize,
    form_factor: FormFactor,
    loading: HashMap<PhotoId, bool>,
    image_overrides: HashMap<PhotoId, String>,
    preview: Option<PhotoId>,
}

impl ViewController {
    pub fn new(form_factor: FormFactor) -> Self {
        Self {
            form_factor,
            ..Self::default()
        }
    }

    pub fn selector(&self) -> ViewSelector {
        self.selector
    }

    pub fn form_factor(&self) -> FormFactor {
        self.form_factor
    }

    pub fn set_form_factor(&mut self, form_factor: FormFactor) {
        self.form_factor = form_factor;
    }

    /// Switches view; the cursor always restarts at the first photo.
    pub fn select(&mut self, selector: ViewSelector) {
        self.selector = selector;
        self.current_index = 0;
    }

    pub fn current_photos<'s>(&self, store: &'s GalleryStateStore) -> Vec<&'s Photo> {
        let Some(bundle) = store.bundle() else {
            return Vec::new();
        };
        let photos = match self.selector {
            ViewSelector::All => return store.root_view(),
            ViewSelector::Liked => bundle.sub_gallery_photos(bundle.liked_gallery_id),
            ViewSelector::Disliked => bundle.sub_gallery_photos(bundle.disliked_gallery_id),
            ViewSelector::Custom(id) => bundle.sub_gallery_photos(Some(id)),
        };
        photos.iter().collect()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Photo under the cursor, clamping the cursor to the current sequence.
    pub fn current_photo<'s>(&self, store: &'s GalleryStateStore) -> Option<&'s Photo> {
        let photos = self.current_photos(store);
        let last = photos.len().checked_sub(1)?;
        photos.get(self.current_index.min(last)).copied()
    }

    pub fn advance(&mut self, store: &GalleryStateStore) -> bool {
        let len = self.current_photos(store).len();
        self.advance_within(len)
    }

    /// Moves forward unless the cursor already sits on the last of `len`
    /// photos.
    pub fn advance_within(&mut self, len: usize) -> bool {
        if self.current_index + 1 < len {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    /// Pulls the cursor back onto the last photo when the sequence shrank
    /// underneath it.
    pub fn clamp(&mut self, store: &GalleryStateStore) {
        let len = self.current_photos(store).len();
        self.current_index = self.current_index.min(len.saturating_sub(1));
    }

    pub fn retreat(&mut self) -> bool {
        if self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    /// After a confirmed decision on a touch device the unsorted queue moves
    /// on by one. `len_at_intent` is the queue length when the user decided.
    pub fn auto_advance(&mut self, len_at_intent: usize) -> bool {
        if self.form_factor.is_touch() && self.selector == ViewSelector::All {
            self.advance_within(len_at_intent)
        } else {
            false
        }
    }

    /// Every photo of a fresh bundle starts out loading.
    pub fn on_bundle_loaded(&mut self, bundle: &GalleryBundle) {
        self.loading = bundle.all_photos().map(|photo| (photo.id, true)).collect();
        self.image_overrides.clear();
        if let Some(preview) = self.preview {
            if bundle.find_photo(preview).is_none() {
                self.preview = None;
            }
        }
    }

    pub fn is_loading(&self, photo_id: PhotoId) -> bool {
        self.loading.get(&photo_id).copied().unwrap_or(false)
    }

    pub fn image_loaded(&mut self, photo_id: PhotoId) {
        self.loading.insert(photo_id, false);
    }

    pub fn image_failed(&mut self, photo_id: PhotoId) {
        warn!(photo_id = %photo_id, "failed to load image; using fallback");
        self.image_overrides
            .insert(photo_id, FALLBACK_IMAGE.to_string());
        self.loading.insert(photo_id, false);
    }

    pub fn image_ref<'p>(&'p self, photo: &'p Photo) -> &'p str {
        self.image_overrides
            .get(&photo.id)
            .map(String::as_str)
            .unwrap_or(&photo.image_ref)
    }

    pub fn open_preview(&mut self, photo_id: PhotoId) {
        self.preview = Some(photo_id);
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    pub fn preview(&self) -> Option<PhotoId> {
        self.preview
    }
}
