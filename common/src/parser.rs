//! 認識サービスのレスポンスパーサー
//!
//! 判定順序:
//! 1. 本文が空 → EmptyResponse（ステータスに関係なく）
//! 2. 非2xx → ServerError（本文をそのまま保持）
//! 3. JSONでない → MalformedResponse
//! 4. 必須4項目の欠落・型不正 → IncompleteResult（`distance` のみ明示的なnullを許す）

use crate::error::{Error, Result};
use crate::types::DetectionResult;
use serde_json::{Map, Value};

/// アップロード時のファイル名が決められない場合の既定値
pub const DEFAULT_UPLOAD_FILENAME: &str = "image.jpg";

/// アップロード用のファイル名を決める
///
/// 明示されたファイル名 → URIの最終セグメント → "image.jpg" の順。
///
/// # Examples
/// ```
/// use campus_locator_common::derive_upload_filename;
///
/// assert_eq!(derive_upload_filename("file:///tmp/a.jpg", None), "a.jpg");
/// assert_eq!(derive_upload_filename("file:///tmp/", None), "image.jpg");
/// ```
pub fn derive_upload_filename(source_uri: &str, filename: Option<&str>) -> String {
    if let Some(name) = filename.map(str::trim).filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    source_uri
        .rsplit(['/', '\\'])
        .next()
        .map(|s| s.split(['?', '#']).next().unwrap_or_default())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_UPLOAD_FILENAME.to_string())
}

/// 認識サービスの応答をパース
///
/// # Arguments
/// * `status` - HTTPステータスコード
/// * `body` - レスポンス本文
///
/// # Returns
/// * `Ok(DetectionResult)` - 4項目すべて揃った結果
/// * `Err` - 上記の判定順序に従ったエラー
pub fn parse_detection_response(status: u16, body: &str) -> Result<DetectionResult> {
    if body.trim().is_empty() {
        return Err(Error::EmptyResponse);
    }

    if !(200..300).contains(&status) {
        return Err(Error::ServerError {
            status,
            body: body.to_string(),
        });
    }

    let value: Value = serde_json::from_str(body.trim())
        .map_err(|e| Error::MalformedResponse(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| Error::MalformedResponse("expected a JSON object".into()))?;

    let building = object
        .get("building")
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|b| !b.trim().is_empty());
    let latitude = finite_number(object, "latitude");
    let longitude = finite_number(object, "longitude");
    let distance = nullable_number(object, "distance");

    match (building, latitude, longitude, distance) {
        (Some(building), Some(latitude), Some(longitude), Some(distance)) => Ok(DetectionResult {
            building,
            latitude,
            longitude,
            distance,
        }),
        (building, latitude, longitude, distance) => {
            let missing: Vec<&str> = [
                ("building", building.is_none()),
                ("latitude", latitude.is_none()),
                ("longitude", longitude.is_none()),
                ("distance", distance.is_none()),
            ]
            .iter()
            .filter(|(_, missing)| *missing)
            .map(|(name, _)| *name)
            .collect();
            Err(Error::IncompleteResult(format!(
                "missing or invalid fields: {}",
                missing.join(", ")
            )))
        }
    }
}

fn finite_number(object: &Map<String, Value>, key: &str) -> Option<f64> {
    object
        .get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

/// キーは必須だが値はnullでもよい数値
///
/// 外側のNoneは欠落・型不正、`Some(None)` は明示的なnull。
fn nullable_number(object: &Map<String, Value>, key: &str) -> Option<Option<f64>> {
    match object.get(key)? {
        Value::Null => Some(None),
        value => value.as_f64().filter(|v| v.is_finite()).map(Some),
    }
}
