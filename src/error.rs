use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    /// 通知として表示済みのワークフロー失敗
    #[error("{0}")]
    Failed(String),

    #[error("HTTPクライアント初期化エラー: {0}")]
    Http(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] campus_locator_common::Error),
}

impl From<dialoguer::Error> for LocatorError {
    fn from(e: dialoguer::Error) -> Self {
        LocatorError::Prompt(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LocatorError>;
