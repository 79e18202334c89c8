//! ワークフローで受け渡すデータ型
//!
//! - PhotoDescriptor: 取得した静止画（カメラ/ギャラリー共通）
//! - DetectionResult: 認識サービスの応答
//! - UserPosition: 端末の現在地

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 位置情報が取れない場合の既定座標（キャンパス中央付近）
pub const FALLBACK_POSITION: UserPosition = UserPosition {
    latitude: 31.481370524750606,
    longitude: 74.30352902161547,
};

/// 緯度経度のペア
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// 取得済み静止画の記述子
///
/// 生成後は不変。撮り直しで丸ごと破棄される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoDescriptor {
    source_uri: String,

    #[serde(default)]
    base64: Option<String>,

    #[serde(default)]
    filename: Option<String>,
}

impl PhotoDescriptor {
    pub fn new(source_uri: impl Into<String>) -> Self {
        Self {
            source_uri: source_uri.into(),
            base64: None,
            filename: None,
        }
    }

    /// ローカルファイルから `file://` URIの記述子を作る
    pub fn from_path(path: &Path) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string());
        let uri = format!("file://{}", path.display().to_string().replace('\\', "/"));
        Self {
            source_uri: uri,
            base64: None,
            filename,
        }
    }

    pub fn with_base64(mut self, base64: impl Into<String>) -> Self {
        self.base64 = Some(base64.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    pub fn base64(&self) -> Option<&str> {
        self.base64.as_deref()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// URIが指すローカルパス
    ///
    /// `file://` とスキームなしのパスのみ対応。`content://` などはNone。
    pub fn local_path(&self) -> Option<PathBuf> {
        let uri = self.source_uri.trim();
        if uri.is_empty() {
            return None;
        }
        if let Some(rest) = uri.strip_prefix("file://") {
            return Some(PathBuf::from(rest));
        }
        if uri.contains("://") {
            return None;
        }
        Some(PathBuf::from(uri))
    }
}

/// 認識サービスの判定結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub building: String,
    pub latitude: f64,
    pub longitude: f64,
    /// メートル。サービスが距離を出せないときはnull
    pub distance: Option<f64>,
}

impl DetectionResult {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// 地図画面に昇格できる結果か
    pub fn is_valid(&self) -> bool {
        !self.building.trim().is_empty() && self.coordinate().is_finite()
    }

    /// 情報カード用の距離表記
    pub fn distance_label(&self) -> String {
        match self.distance {
            Some(d) if d != 0.0 && d.is_finite() => format!("{:.2} meters away", d),
            _ => "Unknown meters away".to_string(),
        }
    }
}

/// 端末の現在地
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl UserPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl Default for UserPosition {
    fn default() -> Self {
        FALLBACK_POSITION
    }
}

impl std::str::FromStr for UserPosition {
    type Err = String;

    /// "lat,lon" 形式
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("Invalid position: {}. Use LAT,LON", s))?;
        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("Invalid latitude: {}", lat.trim()))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| format!("Invalid longitude: {}", lon.trim()))?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(format!("Invalid position: {}", s));
        }
        Ok(Self { latitude, longitude })
    }
}
