//! 撮影 → プレビュー → 送信 → 地図 のワークフロー状態機械
//!
//! 画面の切り替えはすべて `WorkflowState` の1つのmatchに集約する。
//! 非同期処理の完了は `SubmissionTicket` が一致するときだけ適用され、
//! 撮り直し後に届いた古い応答は捨てられる。

use crate::error::{Error, Notification};
use crate::types::{DetectionResult, PhotoDescriptor};
use tracing::{debug, info, warn};

/// 送信1回ごとの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionTicket(u64);

impl SubmissionTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Capturing,
    Previewing(PhotoDescriptor),
    Submitting {
        photo: PhotoDescriptor,
        ticket: SubmissionTicket,
    },
    Showing(DetectionResult),
}

impl WorkflowState {
    fn name(&self) -> &'static str {
        match self {
            WorkflowState::Capturing => "capturing",
            WorkflowState::Previewing(_) => "previewing",
            WorkflowState::Submitting { .. } => "submitting",
            WorkflowState::Showing(_) => "showing",
        }
    }
}

/// 表示する画面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Camera,
    /// `busy` は送信中
    Preview { busy: bool },
    Map,
}

/// イベント適用の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved,
    Ignored,
}

/// 送信完了の適用結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// 地図画面へ遷移した
    Shown,
    /// プレビューへ戻った（写真は保持）
    Failed(Notification),
    /// 現在の送信と一致しない古い応答。破棄した
    Stale,
}

#[derive(Debug)]
pub struct Workflow {
    state: WorkflowState,
    next_ticket: u64,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Capturing,
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        match self.state {
            WorkflowState::Capturing => Screen::Camera,
            WorkflowState::Previewing(_) => Screen::Preview { busy: false },
            WorkflowState::Submitting { .. } => Screen::Preview { busy: true },
            WorkflowState::Showing(_) => Screen::Map,
        }
    }

    /// プレビュー中・送信中の写真
    pub fn photo(&self) -> Option<&PhotoDescriptor> {
        match &self.state {
            WorkflowState::Previewing(photo) | WorkflowState::Submitting { photo, .. } => Some(photo),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        match &self.state {
            WorkflowState::Showing(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.state, WorkflowState::Capturing)
    }

    /// 写真を取得した（撮影/ギャラリー共通）
    pub fn photo_acquired(&mut self, photo: PhotoDescriptor) -> Transition {
        match self.state {
            WorkflowState::Capturing => {
                info!(uri = photo.source_uri(), "photo acquired");
                self.state = WorkflowState::Previewing(photo);
                Transition::Moved
            }
            _ => self.ignore("photo acquired"),
        }
    }

    /// 撮り直し
    ///
    /// 送信中でも受け付ける。その送信の完了は古い応答として捨てられる。
    pub fn retake(&mut self) -> Transition {
        match &self.state {
            WorkflowState::Previewing(_) => {
                info!("retake requested, photo discarded");
                self.state = WorkflowState::Capturing;
                Transition::Moved
            }
            WorkflowState::Submitting { ticket, .. } => {
                info!(ticket = ticket.id(), "retake during submission, pending result will be discarded");
                self.state = WorkflowState::Capturing;
                Transition::Moved
            }
            _ => self.ignore("retake"),
        }
    }

    /// 推定を要求
    ///
    /// プレビュー中のみ送信を開始する。送信中の再要求は何もしない。
    pub fn request_estimate(&mut self) -> Option<(SubmissionTicket, PhotoDescriptor)> {
        match &self.state {
            WorkflowState::Previewing(photo) => {
                let photo = photo.clone();
                let ticket = SubmissionTicket(self.next_ticket);
                self.next_ticket += 1;
                info!(ticket = ticket.id(), uri = photo.source_uri(), "submission started");
                self.state = WorkflowState::Submitting {
                    photo: photo.clone(),
                    ticket,
                };
                Some((ticket, photo))
            }
            WorkflowState::Submitting { ticket, .. } => {
                debug!(ticket = ticket.id(), "estimate requested while submitting, ignored");
                None
            }
            _ => {
                self.ignore("estimate requested");
                None
            }
        }
    }

    /// 送信の完了を適用
    ///
    /// 状態が同じチケットの `Submitting` のときだけ反映する。
    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        outcome: std::result::Result<DetectionResult, Error>,
    ) -> Completion {
        let photo = match &self.state {
            WorkflowState::Submitting { photo, ticket: current } if *current == ticket => photo.clone(),
            other => {
                warn!(ticket = ticket.id(), state = other.name(), "stale submission result discarded");
                return Completion::Stale;
            }
        };

        let outcome = outcome.and_then(|result| {
            if result.is_valid() {
                Ok(result)
            } else {
                Err(Error::IncompleteResult(format!(
                    "invalid detection for '{}'",
                    result.building
                )))
            }
        });

        match outcome {
            Ok(result) => {
                info!(ticket = ticket.id(), building = %result.building, "submission succeeded");
                self.state = WorkflowState::Showing(result);
                Completion::Shown
            }
            Err(error) => {
                warn!(ticket = ticket.id(), error = %error, "submission failed, back to preview");
                self.state = WorkflowState::Previewing(photo);
                let notification = Notification::from_error(&error).unwrap_or_else(|| {
                    Notification::new("Error", error.to_string())
                });
                Completion::Failed(notification)
            }
        }
    }

    /// 地図画面から撮影へ戻る
    pub fn restart(&mut self) -> Transition {
        match self.state {
            WorkflowState::Showing(_) => {
                info!("workflow restarted");
                self.state = WorkflowState::Capturing;
                Transition::Moved
            }
            _ => self.ignore("restart"),
        }
    }

    fn ignore(&self, event: &str) -> Transition {
        debug!(event, state = self.state.name(), "event ignored");
        Transition::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(uri: &str) -> PhotoDescriptor {
        PhotoDescriptor::new(uri)
    }

    fn library() -> DetectionResult {
        DetectionResult {
            building: "Library".to_string(),
            latitude: 31.4816,
            longitude: 74.3038,
            distance: Some(12.4),
        }
    }

    #[test]
    fn test_initial_state() {
        let wf = Workflow::new();
        assert_eq!(wf.state(), &WorkflowState::Capturing);
        assert_eq!(wf.screen(), Screen::Camera);
        assert!(wf.photo().is_none());
    }

    #[test]
    fn test_happy_path() {
        let mut wf = Workflow::new();
        assert_eq!(wf.photo_acquired(photo("file:///tmp/a.jpg")), Transition::Moved);
        assert_eq!(wf.screen(), Screen::Preview { busy: false });

        let (ticket, sent) = wf.request_estimate().unwrap();
        assert_eq!(sent.source_uri(), "file:///tmp/a.jpg");
        assert_eq!(wf.screen(), Screen::Preview { busy: true });

        assert_eq!(wf.complete_submission(ticket, Ok(library())), Completion::Shown);
        assert_eq!(wf.state(), &WorkflowState::Showing(library()));
        assert_eq!(wf.screen(), Screen::Map);
    }

    #[test]
    fn test_retake_discards_photo() {
        let mut wf = Workflow::new();
        wf.photo_acquired(photo("file:///tmp/a.jpg"));
        assert_eq!(wf.retake(), Transition::Moved);
        assert_eq!(wf.state(), &WorkflowState::Capturing);
        assert!(wf.photo().is_none());
    }

    #[test]
    fn test_acquire_only_while_capturing() {
        let mut wf = Workflow::new();
        wf.photo_acquired(photo("file:///tmp/a.jpg"));
        assert_eq!(wf.photo_acquired(photo("file:///tmp/b.jpg")), Transition::Ignored);
        assert_eq!(wf.photo().unwrap().source_uri(), "file:///tmp/a.jpg");
    }

    #[test]
    fn test_second_estimate_is_rejected() {
        let mut wf = Workflow::new();
        wf.photo_acquired(photo("file:///tmp/a.jpg"));
        let (ticket, _) = wf.request_estimate().unwrap();
        assert!(wf.request_estimate().is_none());
        match wf.state() {
            WorkflowState::Submitting { ticket: current, .. } => assert_eq!(*current, ticket),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_failure_returns_to_preview_with_photo() {
        let mut wf = Workflow::new();
        let original = photo("file:///tmp/a.jpg").with_filename("a.jpg");
        wf.photo_acquired(original.clone());
        let (ticket, _) = wf.request_estimate().unwrap();

        let completion = wf.complete_submission(
            ticket,
            Err(Error::ServerError {
                status: 500,
                body: "detector overloaded".into(),
            }),
        );
        match completion {
            Completion::Failed(n) => assert!(n.message.contains("detector overloaded")),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(wf.state(), &WorkflowState::Previewing(original));
    }

    #[test]
    fn test_invalid_result_never_shown() {
        let mut wf = Workflow::new();
        wf.photo_acquired(photo("file:///tmp/a.jpg"));
        let (ticket, _) = wf.request_estimate().unwrap();

        let mut bad = library();
        bad.longitude = f64::INFINITY;
        assert!(matches!(wf.complete_submission(ticket, Ok(bad)), Completion::Failed(_)));
        assert_eq!(wf.screen(), Screen::Preview { busy: false });
    }

    #[test]
    fn test_incomplete_result_never_shown() {
        let mut wf = Workflow::new();
        wf.photo_acquired(photo("file:///tmp/a.jpg"));
        let (ticket, _) = wf.request_estimate().unwrap();
        let completion =
            wf.complete_submission(ticket, Err(Error::IncompleteResult("missing distance".into())));
        assert!(matches!(completion, Completion::Failed(_)));
        assert!(wf.result().is_none());
    }

    #[test]
    fn test_stale_result_after_retake_is_inert() {
        let mut wf = Workflow::new();
        wf.photo_acquired(photo("file:///tmp/a.jpg"));
        let (old_ticket, _) = wf.request_estimate().unwrap();

        wf.retake();
        wf.photo_acquired(photo("file:///tmp/b.jpg"));
        let before = wf.state().clone();

        assert_eq!(wf.complete_submission(old_ticket, Ok(library())), Completion::Stale);
        assert_eq!(wf.state(), &before);
    }

    #[test]
    fn test_stale_result_for_older_submission_of_new_photo() {
        let mut wf = Workflow::new();
        wf.photo_acquired(photo("file:///tmp/a.jpg"));
        let (old_ticket, _) = wf.request_estimate().unwrap();
        wf.retake();
        wf.photo_acquired(photo("file:///tmp/b.jpg"));
        let (new_ticket, _) = wf.request_estimate().unwrap();
        assert_ne!(old_ticket, new_ticket);

        assert_eq!(
            wf.complete_submission(old_ticket, Err(Error::EmptyResponse)),
            Completion::Stale
        );
        assert_eq!(wf.screen(), Screen::Preview { busy: true });
        assert_eq!(wf.complete_submission(new_ticket, Ok(library())), Completion::Shown);
    }

    #[test]
    fn test_duplicate_completion_is_stale() {
        let mut wf = Workflow::new();
        wf.photo_acquired(photo("file:///tmp/a.jpg"));
        let (ticket, _) = wf.request_estimate().unwrap();
        assert_eq!(wf.complete_submission(ticket, Ok(library())), Completion::Shown);
        assert_eq!(wf.complete_submission(ticket, Err(Error::EmptyResponse)), Completion::Stale);
        assert_eq!(wf.result(), Some(&library()));
    }

    #[test]
    fn test_restart_from_map() {
        let mut wf = Workflow::new();
        assert_eq!(wf.restart(), Transition::Ignored);
        wf.photo_acquired(photo("file:///tmp/a.jpg"));
        let (ticket, _) = wf.request_estimate().unwrap();
        wf.complete_submission(ticket, Ok(library()));
        assert_eq!(wf.restart(), Transition::Moved);
        assert!(wf.is_capturing());
    }

    #[test]
    fn test_events_ignored_in_wrong_state() {
        let mut wf = Workflow::new();
        assert_eq!(wf.retake(), Transition::Ignored);
        assert!(wf.request_estimate().is_none());
        assert!(wf.is_capturing());
    }
}
