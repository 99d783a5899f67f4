//! One mounted selection screen: the store, the view cursor, the swipe
//! recognizer and the remote service behind a single intent path.
//!
//! Clicks and swipes both end in [`SelectionSession::decide`]. The optimistic
//! mark is applied synchronously in [`SelectionSession::begin_intent`] before
//! any request is issued; [`SelectionSession::complete_intent`] folds the
//! server's answer back in.

use shared::domain::PhotoId;
use tracing::{debug, info};

use crate::{
    api::{FetchError, GalleryApi, MoveError},
    categorization::CategorizationService,
    gesture::{GestureRecognizer, SwipeDecision},
    model::{Decision, GalleryBundle},
    notice::{Notice, NoticeKind, NotificationSink},
    store::{GalleryStateStore, PendingOperation, StoreCommand, StoreEffect, StoreError},
    view::{FormFactor, ViewController, ViewSelector},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Unmounted,
    Loading,
    Ready,
    /// The initial fetch failed; only an explicit [`SelectionSession::reload`]
    /// leaves this phase.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    /// The server accepted the move and the bundle was refetched.
    Moved,
    /// The server accepted the move but the refetch failed.
    MovedStale,
    /// The move failed and the optimistic mark was rolled back.
    Reverted,
    /// Nothing was attempted.
    Rejected,
}

/// An intent whose optimistic mark is applied and whose move is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveTicket {
    pub operation: PendingOperation,
    /// Length of the visible sequence when the user decided.
    pub queue_len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionSummary {
    pub liked: usize,
    pub disliked: usize,
    pub unrated: usize,
    pub pending_liked: usize,
    pub pending_disliked: usize,
}

pub struct SelectionSession<A, N> {
    token: String,
    service: CategorizationService<A>,
    notices: N,
    store: GalleryStateStore,
    view: ViewController,
    gestures: GestureRecognizer,
    phase: SessionPhase,
}

impl<A: GalleryApi, N: NotificationSink> SelectionSession<A, N> {
    pub fn new(
        token: impl Into<String>,
        service: CategorizationService<A>,
        notices: N,
        form_factor: FormFactor,
    ) -> Self {
        Self {
            token: token.into(),
            service,
            notices,
            store: GalleryStateStore::new(),
            view: ViewController::new(form_factor),
            gestures: GestureRecognizer::new(),
            phase: SessionPhase::Unmounted,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn store(&self) -> &GalleryStateStore {
        &self.store
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn gestures(&self) -> &GestureRecognizer {
        &self.gestures
    }

    pub fn service(&self) -> &CategorizationService<A> {
        &self.service
    }

    pub fn processing(&self) -> bool {
        self.store.processing()
    }

    /// Initial fetch. Failure is fatal for the session and is not retried.
    pub async fn mount(&mut self) -> Result<(), FetchError> {
        self.phase = SessionPhase::Loading;
        match self.service.fetch_bundle(&self.token).await {
            Ok(bundle) => {
                info!(
                    gallery_id = %bundle.id,
                    photos = bundle.root_photos.len(),
                    "selection mounted"
                );
                self.install(bundle);
                self.phase = SessionPhase::Ready;
                Ok(())
            }
            Err(err) => {
                self.phase = SessionPhase::Failed(err.to_string());
                self.notify(NoticeKind::FetchFailed, err.to_string());
                Err(err)
            }
        }
    }

    /// User-triggered refetch. From a failed phase this retries the mount.
    pub async fn reload(&mut self) -> Result<(), FetchError> {
        if !matches!(self.phase, SessionPhase::Ready) {
            return self.mount().await;
        }
        match self.service.fetch_bundle(&self.token).await {
            Ok(bundle) => {
                self.install(bundle);
                Ok(())
            }
            Err(err) => {
                self.notify(NoticeKind::ResyncFailed, format!("Could not refresh gallery: {err}"));
                Err(err)
            }
        }
    }

    pub async fn like(&mut self, photo_id: PhotoId) -> IntentOutcome {
        self.decide(photo_id, Decision::Liked).await
    }

    pub async fn dislike(&mut self, photo_id: PhotoId) -> IntentOutcome {
        self.decide(photo_id, Decision::Disliked).await
    }

    pub async fn decide(&mut self, photo_id: PhotoId, decision: Decision) -> IntentOutcome {
        let Some(ticket) = self.begin_intent(photo_id, decision) else {
            return IntentOutcome::Rejected;
        };
        let operation = ticket.operation;
        let result = self
            .service
            .move_photo(operation.photo_id, Some(operation.target))
            .await;
        self.complete_intent(ticket, result).await
    }

    /// Applies the optimistic mark and registers the outstanding move.
    /// Returns `None` (after notifying) when the intent cannot be attempted.
    pub fn begin_intent(&mut self, photo_id: PhotoId, decision: Decision) -> Option<MoveTicket> {
        let queue_len = self.view.current_photos(&self.store).len();
        match self.store.apply(StoreCommand::intent(photo_id, decision)) {
            Ok(StoreEffect::IssueMove(operation)) => {
                debug!(photo_id = %photo_id, ?decision, "optimistic mark applied");
                Some(MoveTicket {
                    operation,
                    queue_len,
                })
            }
            Ok(effect) => {
                debug!(photo_id = %photo_id, ?effect, "intent produced no move");
                None
            }
            Err(err @ StoreError::OperationInFlight(_)) => {
                self.notify(NoticeKind::Busy, err.to_string());
                None
            }
            Err(err) => {
                self.notify(NoticeKind::Validation, err.to_string());
                None
            }
        }
    }

    /// Folds the result of a move back into the session: resync and
    /// auto-advance on success, rollback and notify on failure.
    pub async fn complete_intent(
        &mut self,
        ticket: MoveTicket,
        result: Result<(), MoveError>,
    ) -> IntentOutcome {
        let MoveTicket {
            operation,
            queue_len,
        } = ticket;
        let photo_id = operation.photo_id;

        if let Err(err) = result {
            if let Err(store_err) = self.store.apply(StoreCommand::MoveFailed(photo_id)) {
                debug!(photo_id = %photo_id, "rollback skipped: {store_err}");
            }
            self.notify(
                NoticeKind::MoveFailed,
                format!(
                    "Failed to {} photo. Please try again. ({err})",
                    operation.decision.verb()
                ),
            );
            self.view.clamp(&self.store);
            return IntentOutcome::Reverted;
        }

        if let Err(store_err) = self.store.apply(StoreCommand::MoveSucceeded(photo_id)) {
            debug!(photo_id = %photo_id, "confirmation without pending operation: {store_err}");
        }
        let outcome = match self.service.fetch_bundle(&self.token).await {
            Ok(bundle) => {
                self.install(bundle);
                IntentOutcome::Moved
            }
            Err(err) => {
                self.notify(
                    NoticeKind::ResyncFailed,
                    format!("Photo moved, but the gallery could not be refreshed: {err}"),
                );
                IntentOutcome::MovedStale
            }
        };
        self.view.auto_advance(queue_len);
        self.view.clamp(&self.store);
        outcome
    }

    pub fn select_view(&mut self, selector: ViewSelector) {
        self.view.select(selector);
        self.gestures.set_enabled(selector.accepts_gestures());
    }

    pub fn back_to_all(&mut self) {
        self.select_view(ViewSelector::All);
    }

    pub fn advance(&mut self) -> bool {
        self.view.advance(&self.store)
    }

    pub fn retreat(&mut self) -> bool {
        self.view.clamp(&self.store);
        self.view.retreat()
    }

    pub fn drag_start(&mut self, x: f64) {
        self.gestures.on_drag_start(x);
    }

    pub fn drag_move(&mut self, x: f64) {
        self.gestures.on_drag_move(x);
    }

    /// Ends the drag and, if it was a decisive swipe, decides the photo under
    /// the cursor through the same path as a click.
    pub async fn drag_end(&mut self) -> (SwipeDecision, Option<IntentOutcome>) {
        let swipe = self.gestures.on_drag_end();
        let Some(decision) = swipe.as_decision() else {
            return (swipe, None);
        };
        let Some(photo_id) = self.view.current_photo(&self.store).map(|photo| photo.id) else {
            return (swipe, None);
        };
        (swipe, Some(self.decide(photo_id, decision).await))
    }

    pub fn open_preview(&mut self, photo_id: PhotoId) {
        self.view.open_preview(photo_id);
    }

    pub fn close_preview(&mut self) {
        self.view.close_preview();
    }

    pub fn image_loaded(&mut self, photo_id: PhotoId) {
        self.view.image_loaded(photo_id);
    }

    pub fn image_failed(&mut self, photo_id: PhotoId) {
        self.view.image_failed(photo_id);
    }

    pub fn summary(&self) -> SelectionSummary {
        let overlay = self.store.overlay();
        let (liked, disliked) = self
            .store
            .bundle()
            .map(|bundle| {
                (
                    bundle.sub_gallery_photos(bundle.liked_gallery_id).len(),
                    bundle.sub_gallery_photos(bundle.disliked_gallery_id).len(),
                )
            })
            .unwrap_or_default();
        SelectionSummary {
            liked,
            disliked,
            unrated: self.store.root_view().len(),
            pending_liked: overlay.pending_liked().len(),
            pending_disliked: overlay.pending_disliked().len(),
        }
    }

    /// "Done" stays unavailable until at least one photo was liked.
    pub fn can_complete(&self) -> bool {
        !self.store.overlay().pending_liked().is_empty()
    }

    /// Counts behind the completion message, or `None` while finishing is
    /// still unavailable.
    pub fn completion(&self) -> Option<SelectionSummary> {
        self.can_complete().then(|| self.summary())
    }

    fn install(&mut self, bundle: GalleryBundle) {
        self.view.on_bundle_loaded(&bundle);
        self.store.load(bundle);
        self.view.clamp(&self.store);
    }

    fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        self.notices.notify(Notice::new(kind, message));
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
