//! キャンパス内の固定ランドマーク一覧
//!
//! 地図上に常に表示するピン。判定された建物と名前が一致したものは強調表示する。

use crate::types::Coordinate;
use serde::Serialize;

/// 地図画面のタイトル
pub const CAMPUS_TITLE: &str = "FAST NUCES Lahore Campus";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Landmark {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl Landmark {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

pub const CAMPUS_LANDMARKS: &[Landmark] = &[
    Landmark { name: "Directors Office", latitude: 31.48222964940498, longitude: 74.3035499304804 },
    Landmark { name: "EnM", latitude: 31.48107824241253, longitude: 74.30332310850635 },
    Landmark { name: "Admin Block", latitude: 31.481067391919904, longitude: 74.3030048329072 },
    Landmark { name: "Fast Love Garden", latitude: 31.481850562126183, longitude: 74.30293071206277 },
    Landmark { name: "CS New Building", latitude: 31.4805443557776, longitude: 74.30417136303642 },
    Landmark { name: "CS Old Building", latitude: 31.481178398975324, longitude: 74.30288072461302 },
    Landmark { name: "Fast Cricket Ground", latitude: 31.480388855092567, longitude: 74.30309787666373 },
    Landmark { name: "Fast Library", latitude: 31.481559857421292, longitude: 74.30378519760922 },
    Landmark { name: "Civil", latitude: 31.481982241525063, longitude: 74.30366007617641 },
];

/// 名前が完全一致するランドマーク
pub fn find_landmark(name: &str) -> Option<&'static Landmark> {
    CAMPUS_LANDMARKS.iter().find(|l| l.name == name)
}
