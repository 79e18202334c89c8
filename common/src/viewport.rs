//! 地図表示範囲の計算

use crate::types::{Coordinate, UserPosition};
use serde::{Deserialize, Serialize};

/// 最小表示幅（度）。2点がほぼ重なるときのズームし過ぎを防ぐ
pub const MIN_DELTA: f64 = 0.005;

/// 2点間の差に対する余白倍率
pub const SPAN_FACTOR: f64 = 2.5;

/// 地図の表示領域
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRegion {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.center_latitude, self.center_longitude)
    }

    /// 座標が表示範囲に入るか
    pub fn contains(&self, point: Coordinate) -> bool {
        (point.latitude - self.center_latitude).abs() <= self.latitude_delta / 2.0
            && (point.longitude - self.center_longitude).abs() <= self.longitude_delta / 2.0
    }
}

/// 現在地と対象地点の両方が余白付きで収まる表示領域を求める
///
/// 中心は2点の中点、各幅は `max(MIN_DELTA, |差| * SPAN_FACTOR)`。
pub fn compute_region(user: UserPosition, target: Coordinate) -> MapRegion {
    MapRegion {
        center_latitude: (user.latitude + target.latitude) / 2.0,
        center_longitude: (user.longitude + target.longitude) / 2.0,
        latitude_delta: MIN_DELTA.max((user.latitude - target.latitude).abs() * SPAN_FACTOR),
        longitude_delta: MIN_DELTA.max((user.longitude - target.longitude).abs() * SPAN_FACTOR),
    }
}
