//! User-facing notices raised by the selection core.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The intent could not be attempted (e.g. bucket id unresolved).
    Validation,
    /// The move call failed and the optimistic mark was reverted.
    MoveFailed,
    /// The move succeeded but the follow-up fetch did not.
    ResyncFailed,
    /// The selection could not be fetched at all.
    FetchFailed,
    /// The photo already has a move in flight.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}

/// Where the core sends notices; the UI decides how to present them.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice)
    }
}

/// Forwards notices to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::FetchFailed => error!(kind = ?notice.kind, "{}", notice.message),
            NoticeKind::MoveFailed | NoticeKind::ResyncFailed => {
                warn!(kind = ?notice.kind, "{}", notice.message)
            }
            NoticeKind::Validation | NoticeKind::Busy => {
                info!(kind = ?notice.kind, "{}", notice.message)
            }
        }
    }
}

/// Buffers notices until they are drained.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotificationSink {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    pub fn kinds(&self) -> Vec<NoticeKind> {
        match self.notices.lock() {
            Ok(guard) => guard.iter().map(|notice| notice.kind).collect(),
            Err(poisoned) => poisoned.into_inner().iter().map(|notice| notice.kind).collect(),
        }
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn notify(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut guard) => guard.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}
