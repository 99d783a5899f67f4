use serde::{Deserialize, Serialize};

use crate::domain::{GalleryId, PhotoId};

/// Path segments of `GET /gallery/public-selection/{token}/`, minus the token.
pub const PUBLIC_SELECTION_SEGMENTS: [&str; 2] = ["gallery", "public-selection"];
/// Path segments of `POST /gallery/photo/move/`.
pub const MOVE_PHOTO_SEGMENTS: [&str; 3] = ["gallery", "photo", "move"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoPayload {
    pub id: PhotoId,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGalleryPayload {
    pub id: GalleryId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub photos: Vec<PhotoPayload>,
}

/// Response of `GET /gallery/public-selection/{token}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResponse {
    pub id: GalleryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub photos: Vec<PhotoPayload>,
    #[serde(default)]
    pub sub_galleries: Vec<SubGalleryPayload>,
    #[serde(default)]
    pub liked_sub_gallery_id: Option<GalleryId>,
    #[serde(default)]
    pub disliked_sub_gallery_id: Option<GalleryId>,
}

/// Body of `POST /gallery/photo/move/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePhotoRequest {
    pub photo_id: PhotoId,
    pub target_gallery_id: GalleryId,
}
