use crate::error::{LocatorError, Result};
use campus_locator_common::{UserPosition, FALLBACK_POSITION};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SERVER_ENV: &str = "CAMPUS_LOCATOR_SERVER";
pub const POSITION_ENV: &str = "CAMPUS_LOCATOR_POSITION";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 認識サービスのベースURL（`/detect` はクライアントが付ける）
    pub server_url: String,
    pub timeout_seconds: u64,
    /// 送信前に縮小する長辺px（Noneなら縮小しない）
    pub max_upload_dimension: Option<u32>,
    pub jpeg_quality: u8,
    /// 撮影コマンド。`{output}` `{facing}` を置換する
    pub camera_command: Option<Vec<String>>,
    pub capture_dir: PathBuf,
    pub gallery_dir: Option<PathBuf>,
    /// 端末の現在地（未設定なら位置情報なし扱い）
    pub device_position: Option<UserPosition>,
    pub fallback_position: UserPosition,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5001".into(),
            timeout_seconds: 30,
            max_upload_dimension: None,
            jpeg_quality: 80,
            camera_command: None,
            capture_dir: std::env::temp_dir().join("campus-locator"),
            gallery_dir: dirs::picture_dir(),
            device_position: None,
            fallback_position: FALLBACK_POSITION,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数で上書き
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        config.with_env_overrides()
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LocatorError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("campus-locator").join("config.json"))
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = std::env::var(SERVER_ENV) {
            if !url.trim().is_empty() {
                self.set_server_url(&url)?;
            }
        }
        if let Ok(pos) = std::env::var(POSITION_ENV) {
            if !pos.trim().is_empty() {
                self.device_position = Some(pos.parse().map_err(LocatorError::Config)?);
            }
        }
        Ok(self)
    }

    /// ベースURLを検証して設定
    pub fn set_server_url(&mut self, url: &str) -> Result<()> {
        let url = url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(LocatorError::Config(format!(
                "URLは http:// または https:// で始めてください: {}",
                url
            )));
        }
        self.server_url = url.to_string();
        Ok(())
    }

    pub fn detect_endpoint(&self) -> String {
        format!("{}/detect", self.server_url.trim_end_matches('/'))
    }
}
