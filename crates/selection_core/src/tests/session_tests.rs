use std::sync::Arc;

use super::*;
use crate::{gesture::GestureState, notice::RecordingNotificationSink};
use async_trait::async_trait;
use shared::{
    domain::GalleryId,
    protocol::{MovePhotoRequest, PhotoPayload, SelectionResponse, SubGalleryPayload},
};
use tokio::sync::Mutex;

const LIKED: GalleryId = GalleryId(10);
const DISLIKED: GalleryId = GalleryId(11);
const A: PhotoId = PhotoId(1);
const B: PhotoId = PhotoId(2);
const C: PhotoId = PhotoId(3);

struct FakeBackend {
    selection: SelectionResponse,
    fail_fetch: Option<FetchError>,
    fail_move: Option<MoveError>,
    moves: Vec<MovePhotoRequest>,
    fetches: usize,
}

/// In-memory gallery server; successful moves repartition its selection the
/// way the real backend does.
#[derive(Clone)]
struct FakeGalleryApi {
    backend: Arc<Mutex<FakeBackend>>,
}

impl FakeGalleryApi {
    fn new(selection: SelectionResponse) -> Self {
        Self {
            backend: Arc::new(Mutex::new(FakeBackend {
                selection,
                fail_fetch: None,
                fail_move: None,
                moves: Vec::new(),
                fetches: 0,
            })),
        }
    }

    async fn fail_next_move(&self, err: MoveError) {
        self.backend.lock().await.fail_move = Some(err);
    }

    async fn fail_fetches(&self, err: Option<FetchError>) {
        self.backend.lock().await.fail_fetch = err;
    }

    async fn move_count(&self) -> usize {
        self.backend.lock().await.moves.len()
    }

    async fn fetch_count(&self) -> usize {
        self.backend.lock().await.fetches
    }
}

#[async_trait]
impl GalleryApi for FakeGalleryApi {
    async fn fetch_selection(&self, _token: &str) -> Result<SelectionResponse, FetchError> {
        let mut backend = self.backend.lock().await;
        backend.fetches += 1;
        match &backend.fail_fetch {
            Some(err) => Err(err.clone()),
            None => Ok(backend.selection.clone()),
        }
    }

    async fn move_photo(&self, request: MovePhotoRequest) -> Result<(), MoveError> {
        let mut backend = self.backend.lock().await;
        backend.moves.push(request);
        if let Some(err) = backend.fail_move.take() {
            return Err(err);
        }

        let selection = &mut backend.selection;
        let mut moved = None;
        if let Some(index) = selection
            .photos
            .iter()
            .position(|photo| photo.id == request.photo_id)
        {
            moved = Some(selection.photos.remove(index));
        }
        for gallery in &mut selection.sub_galleries {
            if let Some(index) = gallery
                .photos
                .iter()
                .position(|photo| photo.id == request.photo_id)
            {
                moved = Some(gallery.photos.remove(index));
            }
        }
        let photo = moved.ok_or_else(|| MoveError::Server {
            status: 404,
            message: "Photo not found.".to_string(),
        })?;
        let target = selection
            .sub_galleries
            .iter_mut()
            .find(|gallery| gallery.id == request.target_gallery_id)
            .ok_or_else(|| MoveError::Server {
                status: 404,
                message: "Gallery not found.".to_string(),
            })?;
        target.photos.push(photo);
        Ok(())
    }
}

fn payload(id: PhotoId) -> PhotoPayload {
    PhotoPayload {
        id,
        image: format!("https://cdn.example/{}.jpg", id.0),
        caption: None,
    }
}

fn selection(root: &[PhotoId]) -> SelectionResponse {
    SelectionResponse {
        id: GalleryId(1),
        name: "Family portraits".to_string(),
        photos: root.iter().copied().map(payload).collect(),
        sub_galleries: vec![
            SubGalleryPayload {
                id: LIKED,
                title: "Liked".to_string(),
                photos: Vec::new(),
            },
            SubGalleryPayload {
                id: DISLIKED,
                title: "Disliked".to_string(),
                photos: Vec::new(),
            },
        ],
        liked_sub_gallery_id: Some(LIKED),
        disliked_sub_gallery_id: Some(DISLIKED),
    }
}

type TestSession = SelectionSession<FakeGalleryApi, RecordingNotificationSink>;

async fn mounted(form_factor: FormFactor) -> (TestSession, FakeGalleryApi, RecordingNotificationSink) {
    let api = FakeGalleryApi::new(selection(&[A, B, C]));
    let notices = RecordingNotificationSink::new();
    let mut session = SelectionSession::new(
        "share-token",
        CategorizationService::new(api.clone()),
        notices.clone(),
        form_factor,
    );
    session.mount().await.expect("mount");
    (session, api, notices)
}

fn visible(session: &TestSession) -> Vec<PhotoId> {
    session
        .view()
        .current_photos(session.store())
        .iter()
        .map(|photo| photo.id)
        .collect()
}

#[tokio::test]
async fn mount_loads_bundle_and_marks_images_loading() {
    let (session, api, notices) = mounted(FormFactor::Pointer).await;

    assert_eq!(session.phase(), &SessionPhase::Ready);
    assert_eq!(visible(&session).len(), 3);
    assert!(session.view().is_loading(B));
    assert_eq!(api.fetch_count().await, 1);
    assert!(notices.drain().is_empty());
}

#[tokio::test]
async fn failed_mount_is_fatal_until_reload() {
    let api = FakeGalleryApi::new(selection(&[A]));
    api.fail_fetches(Some(FetchError::Status {
        status: 404,
        message: "Selection link not found.".to_string(),
    }))
    .await;
    let notices = RecordingNotificationSink::new();
    let mut session = SelectionSession::new(
        "gone",
        CategorizationService::new(api.clone()),
        notices.clone(),
        FormFactor::Pointer,
    );

    session.mount().await.expect_err("must fail");
    assert_eq!(
        session.phase(),
        &SessionPhase::Failed("Selection link not found.".to_string())
    );
    assert_eq!(notices.kinds(), vec![NoticeKind::FetchFailed]);
    assert_eq!(session.like(A).await, IntentOutcome::Rejected);
    assert_eq!(api.move_count().await, 0);

    api.fail_fetches(None).await;
    session.reload().await.expect("retry");
    assert_eq!(session.phase(), &SessionPhase::Ready);
}

#[tokio::test]
async fn liked_photo_leaves_root_after_resync() {
    let (mut session, api, notices) = mounted(FormFactor::Pointer).await;

    assert_eq!(session.like(B).await, IntentOutcome::Moved);

    assert_eq!(visible(&session), vec![A, C]);
    let bundle = session.store().bundle().expect("bundle");
    assert_eq!(bundle.sub_gallery_photos(Some(LIKED))[0].id, B);
    assert!(bundle.root_photos.iter().all(|photo| photo.id != B));
    assert_eq!(api.move_count().await, 1);
    assert_eq!(api.fetch_count().await, 2);
    assert!(!session.processing());
    assert!(notices.drain().is_empty());
}

#[tokio::test]
async fn failed_move_rolls_back_and_notifies() {
    let (mut session, api, notices) = mounted(FormFactor::Touch).await;
    api.fail_next_move(MoveError::Server {
        status: 400,
        message: "Photo is locked.".to_string(),
    })
    .await;

    assert_eq!(session.like(B).await, IntentOutcome::Reverted);

    assert_eq!(visible(&session), vec![A, B, C]);
    assert!(session.store().overlay().pending_liked().is_empty());
    assert_eq!(session.view().current_index(), 0);
    assert_eq!(api.fetch_count().await, 1);
    let raised = notices.drain();
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].kind, NoticeKind::MoveFailed);
    assert!(raised[0].message.contains("Photo is locked."));
}

fn current(session: &TestSession) -> Option<PhotoId> {
    session
        .view()
        .current_photo(session.store())
        .map(|photo| photo.id)
}

#[tokio::test]
async fn touch_decision_advances_unless_on_last_photo() {
    let (mut session, _api, _notices) = mounted(FormFactor::Touch).await;
    session.like(A).await;
    assert_eq!(visible(&session), vec![B, C]);
    assert_eq!(session.view().current_index(), 1);
    assert_eq!(current(&session), Some(C));

    let (mut session, _api, _notices) = mounted(FormFactor::Touch).await;
    session.advance();
    session.advance();
    session.dislike(C).await;
    assert_eq!(visible(&session), vec![A, B]);
    assert_eq!(session.view().current_index(), 1);
    assert_eq!(current(&session), Some(B));
}

#[tokio::test]
async fn cursor_stays_in_range_after_the_queue_shrinks() {
    let (mut session, _api, _notices) = mounted(FormFactor::Touch).await;
    assert!(session.advance());
    session.like(B).await;
    assert_eq!(session.view().current_index(), 1);
    assert_eq!(current(&session), Some(C));

    let (mut session, _api, _notices) = mounted(FormFactor::Touch).await;
    session.advance();
    session.advance();
    session.dislike(C).await;

    let before = current(&session);
    assert!(session.retreat());
    assert_ne!(current(&session), before);
    assert_eq!(current(&session), Some(A));
    assert!(!session.retreat());
}

#[tokio::test]
async fn reload_from_ready_replaces_the_bundle() {
    let (mut session, api, notices) = mounted(FormFactor::Pointer).await;
    session.advance();
    session.advance();
    api.backend.lock().await.selection = selection(&[A]);

    session.reload().await.expect("reload");

    assert_eq!(session.phase(), &SessionPhase::Ready);
    assert_eq!(visible(&session), vec![A]);
    assert_eq!(session.view().current_index(), 0);
    assert!(session.view().is_loading(A));
    assert_eq!(api.fetch_count().await, 2);
    assert!(notices.drain().is_empty());
}

#[tokio::test]
async fn failed_reload_from_ready_keeps_the_loaded_bundle() {
    let (mut session, api, notices) = mounted(FormFactor::Pointer).await;
    api.fail_fetches(Some(FetchError::Network("connection refused".to_string())))
        .await;

    session.reload().await.expect_err("reload must fail");

    assert_eq!(session.phase(), &SessionPhase::Ready);
    assert_eq!(visible(&session), vec![A, B, C]);
    let raised = notices.drain();
    assert_eq!(raised.len(), 1);
    assert_eq!(raised[0].kind, NoticeKind::ResyncFailed);
    assert!(raised[0].message.contains("connection refused"));
}

#[tokio::test]
async fn pointer_decision_keeps_the_cursor() {
    let (mut session, _api, _notices) = mounted(FormFactor::Pointer).await;
    session.like(A).await;
    assert_eq!(session.view().current_index(), 0);
}

#[tokio::test]
async fn decisive_swipe_decides_the_current_photo() {
    let (mut session, api, _notices) = mounted(FormFactor::Touch).await;

    session.drag_start(200.0);
    session.drag_move(300.0);
    assert_eq!(session.drag_end().await, (SwipeDecision::None, None));
    assert_eq!(api.move_count().await, 0);

    session.drag_start(300.0);
    session.drag_move(199.0);
    let (swipe, outcome) = session.drag_end().await;
    assert_eq!(swipe, SwipeDecision::Dislike);
    assert_eq!(outcome, Some(IntentOutcome::Moved));

    let bundle = session.store().bundle().expect("bundle");
    assert_eq!(bundle.sub_gallery_photos(Some(DISLIKED))[0].id, A);
    assert_eq!(session.gestures().state(), GestureState::default());
}

#[tokio::test]
async fn swipes_are_ignored_outside_the_unsorted_queue() {
    let (mut session, api, _notices) = mounted(FormFactor::Touch).await;
    session.like(A).await;

    session.select_view(ViewSelector::Liked);
    session.drag_start(0.0);
    session.drag_move(500.0);
    assert_eq!(session.drag_end().await, (SwipeDecision::None, None));
    assert_eq!(api.move_count().await, 1);

    session.back_to_all();
    assert!(session.gestures().is_enabled());
}

#[tokio::test]
async fn unresolved_bucket_is_a_validation_notice() {
    let mut response = selection(&[A, B]);
    response.disliked_sub_gallery_id = None;
    let api = FakeGalleryApi::new(response);
    let notices = RecordingNotificationSink::new();
    let mut session = SelectionSession::new(
        "token",
        CategorizationService::new(api.clone()),
        notices.clone(),
        FormFactor::Pointer,
    );
    session.mount().await.expect("mount");

    assert_eq!(session.dislike(A).await, IntentOutcome::Rejected);
    assert_eq!(api.move_count().await, 0);
    assert_eq!(visible(&session), vec![A, B]);
    let raised = notices.drain();
    assert_eq!(raised[0].kind, NoticeKind::Validation);
    assert_eq!(
        raised[0].message,
        "Cannot dislike photo: Disliked gallery not available."
    );
}

#[tokio::test]
async fn second_intent_on_an_in_flight_photo_is_rejected() {
    let (mut session, api, notices) = mounted(FormFactor::Pointer).await;

    let ticket = session.begin_intent(B, Decision::Liked).expect("ticket");
    assert!(session.processing());
    assert_eq!(visible(&session), vec![A, C]);

    assert!(session.begin_intent(B, Decision::Disliked).is_none());
    assert_eq!(notices.kinds(), vec![NoticeKind::Busy]);
    assert_eq!(
        session.store().overlay().decision_of(B),
        Some(Decision::Liked)
    );

    let result = session
        .service()
        .move_photo(B, Some(ticket.operation.target))
        .await;
    assert_eq!(
        session.complete_intent(ticket, result).await,
        IntentOutcome::Moved
    );
    assert!(!session.processing());
    assert_eq!(api.move_count().await, 1);
}

#[tokio::test]
async fn failed_resync_keeps_the_photo_hidden() {
    let (mut session, api, notices) = mounted(FormFactor::Pointer).await;
    api.fail_fetches(Some(FetchError::Network("connection reset".to_string())))
        .await;

    assert_eq!(session.like(A).await, IntentOutcome::MovedStale);
    assert_eq!(visible(&session), vec![B, C]);
    assert_eq!(notices.kinds(), vec![NoticeKind::ResyncFailed]);
    assert_eq!(session.phase(), &SessionPhase::Ready);
}

#[tokio::test]
async fn summary_tracks_buckets_and_pending_marks() {
    let (mut session, _api, _notices) = mounted(FormFactor::Pointer).await;
    assert!(!session.can_complete());
    assert_eq!(session.completion(), None);

    session.dislike(C).await;
    assert!(!session.can_complete());
    assert_eq!(session.completion(), None);

    session.like(A).await;
    session.dislike(B).await;

    let expected = SelectionSummary {
        liked: 1,
        disliked: 2,
        unrated: 0,
        pending_liked: 1,
        pending_disliked: 2,
    };
    assert_eq!(session.summary(), expected);
    assert!(session.can_complete());
    assert_eq!(session.completion(), Some(expected));
}

#[tokio::test]
async fn image_failures_fall_back_and_preview_follows_the_bundle() {
    let (mut session, _api, _notices) = mounted(FormFactor::Pointer).await;
    session.image_failed(C);
    assert!(!session.view().is_loading(C));

    session.open_preview(C);
    assert_eq!(session.view().preview(), Some(C));
    session.close_preview();
    assert_eq!(session.view().preview(), None);
}
