//! Client-side photo curation: optimistic like/dislike moves over a remote
//! gallery, the derived views over it, and swipe interpretation.

pub mod api;
pub mod categorization;
pub mod gesture;
pub mod model;
pub mod notice;
pub mod session;
pub mod store;
pub mod view;

pub use api::{FetchError, GalleryApi, HttpGalleryApi, MoveError};
pub use categorization::{CategorizationService, DEFAULT_REQUEST_TIMEOUT};
pub use gesture::{GesturePhase, GestureRecognizer, GestureState, SwipeDecision, SWIPE_THRESHOLD};
pub use model::{Decision, GalleryBundle, Photo, SubGallery};
pub use notice::{
    Notice, NoticeKind, NotificationSink, RecordingNotificationSink, TracingNotificationSink,
};
pub use session::{IntentOutcome, MoveTicket, SelectionSession, SelectionSummary, SessionPhase};
pub use store::{
    GalleryStateStore, OptimisticOverlay, PendingOperation, StoreCommand, StoreEffect, StoreError,
};
pub use view::{FormFactor, ViewController, ViewSelector, FALLBACK_IMAGE};
