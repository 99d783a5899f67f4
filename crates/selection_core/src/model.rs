//! Client-side model of a selection bundle.
//!
//! Bucket membership is never stored on a [`Photo`]; it is derived from which
//! collection of the [`GalleryBundle`] currently holds the photo.

use shared::{
    domain::{GalleryId, PhotoId},
    protocol::{PhotoPayload, SelectionResponse, SubGalleryPayload},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: PhotoId,
    pub image_ref: String,
    pub caption: Option<String>,
}

impl Photo {
    pub fn new(id: PhotoId, image_ref: impl Into<String>) -> Self {
        Self {
            id,
            image_ref: image_ref.into(),
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

impl From<PhotoPayload> for Photo {
    fn from(value: PhotoPayload) -> Self {
        Self {
            id: value.id,
            image_ref: value.image,
            caption: value.caption,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubGallery {
    pub id: GalleryId,
    pub title: String,
    pub photos: Vec<Photo>,
}

impl From<SubGalleryPayload> for SubGallery {
    fn from(value: SubGalleryPayload) -> Self {
        Self {
            id: value.id,
            title: value.title,
            photos: value.photos.into_iter().map(Photo::from).collect(),
        }
    }
}

/// The user's verdict on a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Liked,
    Disliked,
}

impl Decision {
    pub fn opposite(self) -> Self {
        match self {
            Decision::Liked => Decision::Disliked,
            Decision::Disliked => Decision::Liked,
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Decision::Liked => "like",
            Decision::Disliked => "dislike",
        }
    }
}

/// Root gallery plus its sub-galleries, exactly as the server last reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryBundle {
    pub id: GalleryId,
    pub name: String,
    pub root_photos: Vec<Photo>,
    /// In the order the server listed them.
    pub sub_galleries: Vec<SubGallery>,
    pub liked_gallery_id: Option<GalleryId>,
    pub disliked_gallery_id: Option<GalleryId>,
}

impl GalleryBundle {
    pub fn new(id: GalleryId, name: impl Into<String>, root_photos: Vec<Photo>) -> Self {
        Self {
            id,
            name: name.into(),
            root_photos,
            sub_galleries: Vec::new(),
            liked_gallery_id: None,
            disliked_gallery_id: None,
        }
    }

    pub fn with_sub_gallery(mut self, gallery: SubGallery) -> Self {
        match self.sub_galleries.iter_mut().find(|existing| existing.id == gallery.id) {
            Some(existing) => *existing = gallery,
            None => self.sub_galleries.push(gallery),
        }
        self
    }

    pub fn with_buckets(mut self, liked: GalleryId, disliked: GalleryId) -> Self {
        self.liked_gallery_id = Some(liked);
        self.disliked_gallery_id = Some(disliked);
        self
    }

    /// Bucket that receives photos for `decision`, if the server resolved one.
    pub fn bucket_for(&self, decision: Decision) -> Option<GalleryId> {
        match decision {
            Decision::Liked => self.liked_gallery_id,
            Decision::Disliked => self.disliked_gallery_id,
        }
    }

    pub fn sub_gallery(&self, id: GalleryId) -> Option<&SubGallery> {
        self.sub_galleries.iter().find(|gallery| gallery.id == id)
    }

    pub fn sub_gallery_photos(&self, id: Option<GalleryId>) -> &[Photo] {
        id.and_then(|id| self.sub_gallery(id))
            .map(|gallery| gallery.photos.as_slice())
            .unwrap_or_default()
    }

    /// User-defined sub-galleries, i.e. everything except the two buckets.
    pub fn custom_galleries(&self) -> impl Iterator<Item = &SubGallery> {
        self.sub_galleries.iter().filter(move |gallery| {
            Some(gallery.id) != self.liked_gallery_id && Some(gallery.id) != self.disliked_gallery_id
        })
    }

    /// Every photo in the bundle, root first, then each sub-gallery.
    pub fn all_photos(&self) -> impl Iterator<Item = &Photo> {
        self.root_photos
            .iter()
            .chain(self.sub_galleries.iter().flat_map(|gallery| gallery.photos.iter()))
    }

    pub fn find_photo(&self, id: PhotoId) -> Option<&Photo> {
        self.all_photos().find(|photo| photo.id == id)
    }
}

impl From<SelectionResponse> for GalleryBundle {
    fn from(value: SelectionResponse) -> Self {
        Self {
            id: value.id,
            name: value.name,
            root_photos: value.photos.into_iter().map(Photo::from).collect(),
            sub_galleries: value
                .sub_galleries
                .into_iter()
                .map(SubGallery::from)
                .collect(),
            liked_gallery_id: value.liked_sub_gallery_id,
            disliked_gallery_id: value.disliked_sub_gallery_id,
        }
    }
}
