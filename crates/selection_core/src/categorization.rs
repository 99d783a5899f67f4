//! Single-photo moves against the remote gallery, bounded by a timeout.
//!
//! The service never touches the optimistic overlay; callers feed its result
//! back into the store.

use std::time::Duration;

use shared::{
    domain::{GalleryId, PhotoId},
    protocol::MovePhotoRequest,
};
use tracing::{info, warn};

use crate::{
    api::{FetchError, GalleryApi, MoveError},
    model::GalleryBundle,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct CategorizationService<A> {
    api: A,
    timeout: Duration,
}

impl<A: GalleryApi> CategorizationService<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Moves `photo_id` into `target`. A missing target fails before any
    /// network traffic.
    pub async fn move_photo(
        &self,
        photo_id: PhotoId,
        target: Option<GalleryId>,
    ) -> Result<(), MoveError> {
        let Some(target_gallery_id) = target else {
            warn!(photo_id = %photo_id, "move rejected: target gallery id is missing");
            return Err(MoveError::Validation);
        };

        let request = MovePhotoRequest {
            photo_id,
            target_gallery_id,
        };
        let result = match tokio::time::timeout(self.timeout, self.api.move_photo(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(MoveError::Timeout(self.timeout)),
        };

        match &result {
            Ok(()) => info!(
                photo_id = %photo_id,
                target_gallery_id = %target_gallery_id,
                "photo moved"
            ),
            Err(err) => warn!(
                photo_id = %photo_id,
                target_gallery_id = %target_gallery_id,
                "photo move failed: {err}"
            ),
        }
        result
    }

    /// Fetches the whole selection; used both at mount and for resyncs.
    pub async fn fetch_bundle(&self, token: &str) -> Result<GalleryBundle, FetchError> {
        match tokio::time::timeout(self.timeout, self.api.fetch_selection(token)).await {
            Ok(Ok(selection)) => Ok(GalleryBundle::from(selection)),
            Ok(Err(err)) => {
                warn!(token, "selection fetch failed: {err}");
                Err(err)
            }
            Err(_) => {
                warn!(token, "selection fetch timed out");
                Err(FetchError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use async_trait::async_trait;
    use shared::protocol::SelectionResponse;

    use super::*;

    #[derive(Default, Clone)]
    struct SlowApi {
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl GalleryApi for SlowApi {
        async fn fetch_selection(&self, _token: &str) -> Result<SelectionResponse, FetchError> {
            tokio::time::sleep(self.delay).await;
            Ok(SelectionResponse {
                id: GalleryId(1),
                name: "slow".to_string(),
                photos: Vec::new(),
                sub_galleries: Vec::new(),
                liked_sub_gallery_id: None,
                disliked_sub_gallery_id: None,
            })
        }

        async fn move_photo(&self, _request: MovePhotoRequest) -> Result<(), MoveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn missing_target_fails_without_calling_the_api() {
        let api = SlowApi::default();
        let calls = api.calls.clone();
        let service = CategorizationService::new(api);

        let err = service
            .move_photo(PhotoId(1), None)
            .await
            .expect_err("must fail");
        assert_eq!(err, MoveError::Validation);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn slow_moves_time_out() {
        let api = SlowApi {
            delay: Duration::from_secs(5),
            ..SlowApi::default()
        };
        let service = CategorizationService::new(api).with_timeout(Duration::from_millis(20));

        let err = service
            .move_photo(PhotoId(1), Some(GalleryId(10)))
            .await
            .expect_err("must time out");
        assert_eq!(err, MoveError::Timeout(Duration::from_millis(20)));

        let err = service.fetch_bundle("token").await.expect_err("must time out");
        assert!(matches!(err, FetchError::Timeout(_)));
    }

    #[tokio::test]
    async fn fast_moves_succeed() {
        let service = CategorizationService::new(SlowApi::default());
        service
            .move_photo(PhotoId(1), Some(GalleryId(10)))
            .await
            .expect("move");
        let bundle = service.fetch_bundle("token").await.expect("fetch");
        assert_eq!(bundle.name, "slow");
    }
}
