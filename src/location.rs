//! 端末の現在地
//!
//! 地図画面に入るときに1回だけ問い合わせる。失敗時は呼び出し側が
//! フォールバック座標を使う。

use async_trait::async_trait;
use campus_locator_common::{Error, Result, UserPosition};

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<UserPosition>;
}

/// 設定・環境変数・CLI引数で与えられた座標を現在地とする
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    position: Option<UserPosition>,
}

impl ConfiguredLocation {
    pub fn new(position: Option<UserPosition>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for ConfiguredLocation {
    async fn current_position(&self) -> Result<UserPosition> {
        match self.position {
            Some(pos) if pos.coordinate().is_finite() => Ok(pos),
            Some(_) => Err(Error::LocationUnavailable("configured position is not finite".into())),
            None => Err(Error::LocationUnavailable("permission to access location was denied".into())),
        }
    }
}
