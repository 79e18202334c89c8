//! エラー型定義
//!
//! 取得・送信系のエラーはワークフローで通知に変換され、それより外には伝播しない。

use thiserror::Error;

/// 権限が必要な端末機能
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Camera,
    Gallery,
    Location,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Camera => write!(f, "camera"),
            Capability::Gallery => write!(f, "gallery"),
            Capability::Location => write!(f, "location"),
        }
    }
}

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Permission denied: {0}")]
    PermissionDenied(Capability),

    /// ユーザー操作による中断（通知しない）
    #[error("Cancelled")]
    Cancelled,

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Gallery not found: {0}")]
    GalleryNotFound(String),

    #[error("Invalid photo: {0}")]
    InvalidPhoto(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Empty response from the server")]
    EmptyResponse,

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Failed to parse JSON response: {0}")]
    MalformedResponse(String),

    #[error("Incomplete result: {0}")]
    IncompleteResult(String),

    #[error("Network error: {0}")]
    Network(String),

    /// フォールバック座標で回復するため通知しない
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// 送信経路（認識サービス呼び出し）のエラーか
    pub fn is_submission_error(&self) -> bool {
        matches!(
            self,
            Error::EmptyResponse
                | Error::ServerError { .. }
                | Error::MalformedResponse(_)
                | Error::IncompleteResult(_)
                | Error::Network(_)
                | Error::InvalidPhoto(_)
                | Error::InvalidUpload(_)
        )
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// ユーザーに表示する通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// エラーを通知に変換
    ///
    /// キャンセルと位置情報取得失敗はNone（表示しない）。
    pub fn from_error(error: &Error) -> Option<Self> {
        match error {
            Error::Cancelled | Error::LocationUnavailable(_) => None,
            Error::PermissionDenied(Capability::Gallery) => Some(Self::new(
                "Permission denied",
                "Sorry, we need access to your gallery to upload photos.",
            )),
            Error::PermissionDenied(Capability::Camera) => Some(Self::new(
                "Permission denied",
                "We need your permission to show the camera.",
            )),
            Error::PermissionDenied(Capability::Location) => None,
            Error::CaptureFailed(_) | Error::GalleryNotFound(_) | Error::Io(_) => {
                Some(Self::new("Error", error.to_string()))
            }
            e if e.is_submission_error() => Some(Self::new(
                "Error",
                format!("Something went wrong while processing the image: {}", e),
            )),
            _ => Some(Self::new("Error", error.to_string())),
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
