//! Canonical in-memory selection state plus the optimistic overlay.
//!
//! All mutation goes through [`GalleryStateStore::apply`] (or the two overlay
//! primitives it is built from); nothing outside this module writes to the
//! bundle or the overlay directly.

use std::collections::{HashMap, HashSet};

use shared::domain::{GalleryId, PhotoId};
use thiserror::Error;
use tracing::debug;

use crate::model::{Decision, GalleryBundle, Photo};

/// Client-only sets hiding photos from the root view before the server
/// confirms a move. A photo id is never in both sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimisticOverlay {
    pending_liked: HashSet<PhotoId>,
    pending_disliked: HashSet<PhotoId>,
}

impl OptimisticOverlay {
    fn set_mut(&mut self, decision: Decision) -> &mut HashSet<PhotoId> {
        match decision {
            Decision::Liked => &mut self.pending_liked,
            Decision::Disliked => &mut self.pending_disliked,
        }
    }

    pub fn pending(&self, decision: Decision) -> &HashSet<PhotoId> {
        match decision {
            Decision::Liked => &self.pending_liked,
            Decision::Disliked => &self.pending_disliked,
        }
    }

    pub fn pending_liked(&self) -> &HashSet<PhotoId> {
        &self.pending_liked
    }

    pub fn pending_disliked(&self) -> &HashSet<PhotoId> {
        &self.pending_disliked
    }

    pub fn decision_of(&self, photo_id: PhotoId) -> Option<Decision> {
        if self.pending_liked.contains(&photo_id) {
            Some(Decision::Liked)
        } else if self.pending_disliked.contains(&photo_id) {
            Some(Decision::Disliked)
        } else {
            None
        }
    }

    pub fn hides(&self, photo_id: PhotoId) -> bool {
        self.decision_of(photo_id).is_some()
    }

    fn mark(&mut self, photo_id: PhotoId, decision: Decision) {
        self.set_mut(decision.opposite()).remove(&photo_id);
        self.set_mut(decision).insert(photo_id);
    }

    fn revert(&mut self, photo_id: PhotoId, decision: Decision) -> bool {
        self.set_mut(decision).remove(&photo_id)
    }
}

/// A move that has been applied optimistically and is awaiting the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOperation {
    pub photo_id: PhotoId,
    pub decision: Decision,
    pub target: GalleryId,
    /// Overlay membership of the photo before this operation marked it.
    pub previous: Option<Decision>,
}

#[derive(Debug, Clone)]
pub enum StoreCommand {
    Loaded(GalleryBundle),
    Like(PhotoId),
    Dislike(PhotoId),
    MoveSucceeded(PhotoId),
    MoveFailed(PhotoId),
}

impl StoreCommand {
    pub fn intent(photo_id: PhotoId, decision: Decision) -> Self {
        match decision {
            Decision::Liked => StoreCommand::Like(photo_id),
            Decision::Disliked => StoreCommand::Dislike(photo_id),
        }
    }
}

/// What the caller must do after a command has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEffect {
    None,
    /// Issue the remote move described by the operation.
    IssueMove(PendingOperation),
    /// The server accepted the move; refetch the bundle.
    Resync { photo_id: PhotoId },
    /// The optimistic mark was rolled back.
    Reverted {
        photo_id: PhotoId,
        decision: Decision,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no gallery has been loaded yet")]
    NotLoaded,
    #[error("Cannot {} photo: {:?} gallery not available.", .0.verb(), .0)]
    BucketUnresolved(Decision),
    #[error("photo {0} is still being moved; wait for it to finish")]
    OperationInFlight(PhotoId),
    #[error("no move in flight for photo {0}")]
    NoPendingOperation(PhotoId),
}

#[derive(Debug, Default)]
pub struct GalleryStateStore {
    bundle: Option<GalleryBundle>,
    overlay: OptimisticOverlay,
    in_flight: HashMap<PhotoId, PendingOperation>,
}

impl GalleryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole bundle. The overlay is left untouched.
    pub fn load(&mut self, bundle: GalleryBundle) {
        debug!(
            gallery_id = %bundle.id,
            root = bundle.root_photos.len(),
            sub_galleries = bundle.sub_galleries.len(),
            "selection bundle loaded"
        );
        self.bundle = Some(bundle);
    }

    pub fn mark_pending(&mut self, photo_id: PhotoId, decision: Decision) {
        self.overlay.mark(photo_id, decision);
    }

    /// Removes `photo_id` from the set named by `decision` if still present.
    pub fn revert_pending(&mut self, photo_id: PhotoId, decision: Decision) -> bool {
        self.overlay.revert(photo_id, decision)
    }

    /// Root photos not hidden by the overlay, in server order.
    pub fn root_view(&self) -> Vec<&Photo> {
        self.bundle
            .as_ref()
            .map(|bundle| {
                bundle
                    .root_photos
                    .iter()
                    .filter(|photo| !self.overlay.hides(photo.id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn bundle(&self) -> Option<&GalleryBundle> {
        self.bundle.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.bundle.is_some()
    }

    pub fn overlay(&self) -> &OptimisticOverlay {
        &self.overlay
    }

    pub fn pending_operation(&self, photo_id: PhotoId) -> Option<&PendingOperation> {
        self.in_flight.get(&photo_id)
    }

    /// True while any move is awaiting the server.
    pub fn processing(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn apply(&mut self, command: StoreCommand) -> Result<StoreEffect, StoreError> {
        match command {
            StoreCommand::Loaded(bundle) => {
                self.load(bundle);
                Ok(StoreEffect::None)
            }
            StoreCommand::Like(photo_id) => self.begin_move(photo_id, Decision::Liked),
            StoreCommand::Dislike(photo_id) => self.begin_move(photo_id, Decision::Disliked),
            StoreCommand::MoveSucceeded(photo_id) => {
                let operation = self
                    .in_flight
                    .remove(&photo_id)
                    .ok_or(StoreError::NoPendingOperation(photo_id))?;
                debug!(
                    photo_id = %photo_id,
                    target_gallery_id = %operation.target,
                    "move confirmed; resync required"
                );
                Ok(StoreEffect::Resync { photo_id })
            }
            StoreCommand::MoveFailed(photo_id) => {
                let operation = self
                    .in_flight
                    .remove(&photo_id)
                    .ok_or(StoreError::NoPendingOperation(photo_id))?;
                self.revert_pending(photo_id, operation.decision);
                if let Some(previous) = operation.previous {
                    self.mark_pending(photo_id, previous);
                }
                debug!(photo_id = %photo_id, restored = ?operation.previous, "optimistic mark rolled back");
                Ok(StoreEffect::Reverted {
                    photo_id,
                    decision: operation.decision,
                })
            }
        }
    }

    fn begin_move(
        &mut self,
        photo_id: PhotoId,
        decision: Decision,
    ) -> Result<StoreEffect, StoreError> {
        let bundle = self.bundle.as_ref().ok_or(StoreError::NotLoaded)?;
        let target = bundle
            .bucket_for(decision)
            .ok_or(StoreError::BucketUnresolved(decision))?;
        if self.in_flight.contains_key(&photo_id) {
            return Err(StoreError::OperationInFlight(photo_id));
        }

        let operation = PendingOperation {
            photo_id,
            decision,
            target,
            previous: self.overlay.decision_of(photo_id),
        };
        self.mark_pending(photo_id, decision);
        self.in_flight.insert(photo_id, operation);
        Ok(StoreEffect::IssueMove(operation))
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
