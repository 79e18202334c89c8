//! 地図描画面に渡すシーン
//!
//! 表示領域・固定ランドマーク・判定地点・現在地・2点を結ぶ線・情報カードをまとめる。
//! 描画自体は外部（端末の地図ビューやCLI出力）に任せる。

use crate::landmarks::{find_landmark, CAMPUS_LANDMARKS, CAMPUS_TITLE};
use crate::types::{Coordinate, DetectionResult, UserPosition};
use crate::viewport::{compute_region, MapRegion};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinColor {
    Blue,
    Yellow,
    Red,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub coordinate: Coordinate,
    pub color: PinColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoCard {
    pub building: String,
    pub distance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScene {
    pub title: String,
    pub region: MapRegion,
    pub landmarks: Vec<Marker>,
    pub target: Marker,
    pub user: Marker,
    /// 現在地 → 判定地点
    pub route: [Coordinate; 2],
    pub info: InfoCard,
}

impl MapScene {
    /// 判定結果と現在地からシーンを組み立てる
    ///
    /// 表示領域は毎回その場で計算し直す。
    pub fn build(result: &DetectionResult, user: UserPosition) -> Self {
        let target = result.coordinate();
        let distance = result.distance_label();
        let matched = find_landmark(&result.building).map(|l| l.name);

        let landmarks = CAMPUS_LANDMARKS
            .iter()
            .map(|l| Marker {
                title: l.name.to_string(),
                description: None,
                coordinate: l.coordinate(),
                color: if Some(l.name) == matched {
                    PinColor::Blue
                } else {
                    PinColor::Yellow
                },
            })
            .collect();

        Self {
            title: CAMPUS_TITLE.to_string(),
            region: compute_region(user, target),
            landmarks,
            target: Marker {
                title: format!("Detected: {}", result.building),
                description: Some(distance.clone()),
                coordinate: target,
                color: PinColor::Blue,
            },
            user: Marker {
                title: "Your Location".to_string(),
                description: None,
                coordinate: user.coordinate(),
                color: PinColor::Red,
            },
            route: [user.coordinate(), target],
            info: InfoCard {
                building: result.building.clone(),
                distance,
            },
        }
    }

    pub fn highlighted(&self) -> impl Iterator<Item = &Marker> {
        self.landmarks.iter().filter(|m| m.color == PinColor::Blue)
    }
}
