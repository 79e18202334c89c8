//! ワークフローを非同期の取得元・認識サービス・位置情報とつなぐセッション
//!
//! 非同期処理の結果は必ず `Workflow` を通して反映する。
//! 取得・送信のエラーは通知に変換され、ここより外には返さない。

use crate::acquisition::PhotoSource;
use crate::location::LocationProvider;
use crate::recognition::Recognizer;
use campus_locator_common::{
    Completion, DetectionResult, Error, MapScene, Notification, PhotoDescriptor, SubmissionTicket,
    Transition, UserPosition, Workflow, WorkflowState,
};
use tracing::{debug, info, warn};

/// 送信待ちの1件
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub ticket: SubmissionTicket,
    pub photo: PhotoDescriptor,
}

/// 描画側に渡す画面
#[derive(Debug)]
pub enum View<'a> {
    Camera,
    Preview { photo: &'a PhotoDescriptor, busy: bool },
    Map(MapScene),
}

pub struct Session<R: Recognizer, L: LocationProvider> {
    workflow: Workflow,
    recognizer: R,
    location: L,
    fallback: UserPosition,
    user_position: Option<UserPosition>,
}

impl<R: Recognizer, L: LocationProvider> Session<R, L> {
    pub fn new(recognizer: R, location: L, fallback: UserPosition) -> Self {
        Self {
            workflow: Workflow::new(),
            recognizer,
            location,
            fallback,
            user_position: None,
        }
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn state(&self) -> &WorkflowState {
        self.workflow.state()
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// 地図画面に入ったときに取得した現在地
    pub fn user_position(&self) -> Option<UserPosition> {
        self.user_position
    }

    /// カメラまたはギャラリーから写真を取得
    ///
    /// 撮影画面以外では取得元に触れずに無視する。キャンセルは何も変えない。
    pub async fn acquire(&mut self, source: &mut dyn PhotoSource) -> Option<Notification> {
        if !self.workflow.is_capturing() {
            debug!(source = %source.kind(), "acquisition ignored outside capture screen");
            return None;
        }

        match source.acquire().await {
            Ok(photo) => {
                self.workflow.photo_acquired(photo);
                None
            }
            Err(Error::Cancelled) => {
                debug!(source = %source.kind(), "acquisition cancelled");
                None
            }
            Err(e) => {
                warn!(source = %source.kind(), error = %e, "acquisition failed");
                Notification::from_error(&e)
            }
        }
    }

    pub fn retake(&mut self) -> Transition {
        self.workflow.retake()
    }

    /// 送信を開始（送信中・プレビュー以外ならNone）
    pub fn begin_estimate(&mut self) -> Option<PendingSubmission> {
        self.workflow
            .request_estimate()
            .map(|(ticket, photo)| PendingSubmission { ticket, photo })
    }

    /// 送信結果を反映
    ///
    /// 地図画面へ進んだ場合はここで現在地を1回だけ取得する。
    pub async fn finish_estimate(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<DetectionResult, Error>,
    ) -> Completion {
        let completion = self.workflow.complete_submission(ticket, outcome);
        if completion == Completion::Shown {
            let position = self.locate().await;
            self.user_position = Some(position);
        }
        completion
    }

    /// プレビュー中の写真を送信して結果を反映
    ///
    /// 送信を開始できなかった（送信中の再要求など）場合はNone。
    pub async fn estimate(&mut self) -> Option<Completion> {
        let pending = self.begin_estimate()?;
        let outcome = self.recognizer.recognize(&pending.photo).await;
        Some(self.finish_estimate(pending.ticket, outcome).await)
    }

    /// 地図画面から撮影画面へ
    pub fn restart(&mut self) -> Transition {
        let transition = self.workflow.restart();
        if transition == Transition::Moved {
            self.user_position = None;
        }
        transition
    }

    async fn locate(&self) -> UserPosition {
        match self.location.current_position().await {
            Ok(position) => {
                info!(latitude = position.latitude, longitude = position.longitude, "user position acquired");
                position
            }
            Err(e) => {
                warn!(error = %e, "using fallback position");
                self.fallback
            }
        }
    }

    /// 現在の入力から地図シーンを組み立てる
    pub fn map_scene(&self) -> Option<MapScene> {
        let result = self.workflow.result()?;
        Some(MapScene::build(result, self.user_position.unwrap_or(self.fallback)))
    }

    pub fn view(&self) -> View<'_> {
        match self.workflow.state() {
            WorkflowState::Capturing => View::Camera,
            WorkflowState::Previewing(photo) => View::Preview { photo, busy: false },
            WorkflowState::Submitting { photo, .. } => View::Preview { photo, busy: true },
            WorkflowState::Showing(result) => {
                View::Map(MapScene::build(result, self.user_position.unwrap_or(self.fallback)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::SourceKind;
    use crate::location::ConfiguredLocation;
    use async_trait::async_trait;
    use campus_locator_common::{Capability, Result, FALLBACK_POSITION};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRecognizer {
        response: fn() -> Result<DetectionResult>,
        calls: AtomicUsize,
    }

    impl FixedRecognizer {
        fn new(response: fn() -> Result<DetectionResult>) -> Self {
            Self { response, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Recognizer for FixedRecognizer {
        async fn recognize(&self, _photo: &PhotoDescriptor) -> Result<DetectionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.response)()
        }
    }

    struct ScriptedSource {
        next: Option<Result<PhotoDescriptor>>,
        calls: usize,
    }

    #[async_trait]
    impl PhotoSource for ScriptedSource {
        fn kind(&self) -> SourceKind {
            SourceKind::Camera
        }

        async fn acquire(&mut self) -> Result<PhotoDescriptor> {
            self.calls += 1;
            self.next.take().unwrap_or(Err(Error::Cancelled))
        }
    }

    fn library() -> Result<DetectionResult> {
        Ok(DetectionResult {
            building: "Library".into(),
            latitude: 31.4816,
            longitude: 74.3038,
            distance: Some(12.4),
        })
    }

    fn session(response: fn() -> Result<DetectionResult>) -> Session<FixedRecognizer, ConfiguredLocation> {
        Session::new(FixedRecognizer::new(response), ConfiguredLocation::default(), FALLBACK_POSITION)
    }

    fn source(photo: Result<PhotoDescriptor>) -> ScriptedSource {
        ScriptedSource { next: Some(photo), calls: 0 }
    }

    #[tokio::test]
    async fn test_full_run_uses_fallback_position() {
        let mut s = session(library);
        assert!(s.acquire(&mut source(Ok(PhotoDescriptor::new("file:///tmp/a.jpg")))).await.is_none());
        assert!(matches!(s.view(), View::Preview { busy: false, .. }));

        assert_eq!(s.estimate().await, Some(Completion::Shown));
        assert_eq!(s.user_position(), Some(FALLBACK_POSITION));

        let scene = s.map_scene().unwrap();
        assert_eq!(scene.info.building, "Library");
        assert_eq!(scene.region.center_latitude, (FALLBACK_POSITION.latitude + 31.4816) / 2.0);
    }

    #[tokio::test]
    async fn test_device_position_is_used_when_granted() {
        let mut s = Session::new(
            FixedRecognizer::new(library),
            ConfiguredLocation::new(Some(UserPosition::new(31.47, 74.29))),
            FALLBACK_POSITION,
        );
        s.acquire(&mut source(Ok(PhotoDescriptor::new("file:///tmp/a.jpg")))).await;
        s.estimate().await;
        assert_eq!(s.user_position(), Some(UserPosition::new(31.47, 74.29)));
    }

    #[tokio::test]
    async fn test_cancel_is_silent_and_keeps_state() {
        let mut s = session(library);
        assert!(s.acquire(&mut source(Err(Error::Cancelled))).await.is_none());
        assert!(s.workflow().is_capturing());
    }

    #[tokio::test]
    async fn test_permission_denied_notifies() {
        let mut s = session(library);
        let n = s
            .acquire(&mut source(Err(Error::PermissionDenied(Capability::Gallery))))
            .await
            .unwrap();
        assert_eq!(n.title, "Permission denied");
        assert!(s.workflow().is_capturing());
    }

    #[tokio::test]
    async fn test_source_untouched_outside_capture() {
        let mut s = session(library);
        s.acquire(&mut source(Ok(PhotoDescriptor::new("file:///tmp/a.jpg")))).await;

        let mut second = source(Ok(PhotoDescriptor::new("file:///tmp/b.jpg")));
        assert!(s.acquire(&mut second).await.is_none());
        assert_eq!(second.calls, 0);
        assert_eq!(s.workflow().photo().unwrap().source_uri(), "file:///tmp/a.jpg");
    }

    #[tokio::test]
    async fn test_failure_keeps_photo() {
        let mut s = session(|| Err(Error::EmptyResponse));
        let photo = PhotoDescriptor::new("file:///tmp/a.jpg");
        s.acquire(&mut source(Ok(photo.clone()))).await;

        match s.estimate().await {
            Some(Completion::Failed(n)) => assert!(n.message.contains("Empty response")),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(s.state(), &WorkflowState::Previewing(photo));
        assert!(s.user_position().is_none());
    }

    #[tokio::test]
    async fn test_estimate_while_submitting_is_noop() {
        let mut s = session(library);
        s.acquire(&mut source(Ok(PhotoDescriptor::new("file:///tmp/a.jpg")))).await;
        let pending = s.begin_estimate().unwrap();

        assert_eq!(s.estimate().await, None);
        assert_eq!(s.recognizer().calls.load(Ordering::SeqCst), 0);

        assert_eq!(s.finish_estimate(pending.ticket, library()).await, Completion::Shown);
    }

    #[tokio::test]
    async fn test_stale_completion_after_retake() {
        let mut s = session(library);
        s.acquire(&mut source(Ok(PhotoDescriptor::new("file:///tmp/a.jpg")))).await;
        let pending = s.begin_estimate().unwrap();

        assert_eq!(s.retake(), Transition::Moved);
        assert_eq!(s.finish_estimate(pending.ticket, library()).await, Completion::Stale);
        assert!(matches!(s.view(), View::Camera));
        assert!(s.user_position().is_none());
    }

    #[tokio::test]
    async fn test_restart_clears_position() {
        let mut s = session(library);
        s.acquire(&mut source(Ok(PhotoDescriptor::new("file:///tmp/a.jpg")))).await;
        s.estimate().await;
        assert!(matches!(s.view(), View::Map(_)));

        assert_eq!(s.restart(), Transition::Moved);
        assert!(s.user_position().is_none());
        assert!(s.map_scene().is_none());
    }
}
