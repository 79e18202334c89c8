//! 端末向けのテキスト描画
//!
//! 状態をそのまま文字列にするだけで、判断はしない。

use crate::session::View;
use campus_locator_common::{Landmark, MapRegion, MapScene, Marker, Notification, PinColor};

pub fn pin(color: PinColor) -> &'static str {
    match color {
        PinColor::Blue => "🔵",
        PinColor::Yellow => "🟡",
        PinColor::Red => "🔴",
    }
}

pub fn region(region: &MapRegion) -> String {
    let center = region.center();
    format!(
        "中心 ({:.6}, {:.6}) / 幅 緯度 {:.6}° 経度 {:.6}°",
        center.latitude, center.longitude, region.latitude_delta, region.longitude_delta
    )
}

fn marker(m: &Marker) -> String {
    let mut line = format!(
        "  {} {} ({:.6}, {:.6})",
        pin(m.color),
        m.title,
        m.coordinate.latitude,
        m.coordinate.longitude
    );
    if let Some(desc) = &m.description {
        line.push_str(&format!(" - {}", desc));
    }
    line
}

pub fn scene(scene: &MapScene) -> String {
    let mut out = Vec::new();
    out.push(format!("🗺  {}", scene.title));
    out.push(format!("🏛  {}", scene.info.building));
    out.push(format!("📏 {}", scene.info.distance));
    out.push(format!("表示範囲: {}", region(&scene.region)));
    out.push(marker(&scene.target));
    out.push(marker(&scene.user));
    out.push("ランドマーク:".to_string());
    out.extend(scene.landmarks.iter().map(marker));
    out.join("\n")
}

pub fn view(view: &View<'_>) -> String {
    match view {
        View::Camera => "📷 撮影画面".to_string(),
        View::Preview { photo, busy } => {
            let name = photo.filename().unwrap_or(photo.source_uri());
            if *busy {
                format!("🖼  プレビュー: {} (送信中...)", name)
            } else {
                format!("🖼  プレビュー: {}", name)
            }
        }
        View::Map(s) => scene(s),
    }
}

pub fn notification(n: &Notification) -> String {
    format!("⚠ {}: {}", n.title, n.message)
}

pub fn landmarks(list: &[Landmark]) -> String {
    list.iter()
        .map(|l| format!("  {:<20} {:.6}, {:.6}", l.name, l.latitude, l.longitude))
        .collect::<Vec<_>>()
        .join("\n")
}
