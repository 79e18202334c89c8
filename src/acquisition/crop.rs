//! ギャラリー選択時の切り抜き

use campus_locator_common::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::path::{Path, PathBuf};

const CROP_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropRegion {
    /// 短辺に合わせた中央の正方形
    CenterSquare,
    Rect {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

impl CropRegion {
    /// 画像サイズ内に収めた (x, y, w, h)
    fn bounds(&self, image_width: u32, image_height: u32) -> Option<(u32, u32, u32, u32)> {
        match *self {
            CropRegion::CenterSquare => {
                let side = image_width.min(image_height);
                if side == 0 {
                    return None;
                }
                Some(((image_width - side) / 2, (image_height - side) / 2, side, side))
            }
            CropRegion::Rect { x, y, width, height } => {
                if x >= image_width || y >= image_height {
                    return None;
                }
                let w = width.min(image_width - x);
                let h = height.min(image_height - y);
                if w == 0 || h == 0 {
                    return None;
                }
                Some((x, y, w, h))
            }
        }
    }
}

/// 切り抜いてJPEGで `output_dir` に保存し、そのパスを返す
pub fn apply_crop(source: &Path, region: CropRegion, output_dir: &Path) -> Result<PathBuf> {
    let img = image::open(source)
        .map_err(|e| Error::InvalidPhoto(format!("{}: {}", source.display(), e)))?;

    let (x, y, w, h) = region
        .bounds(img.width(), img.height())
        .ok_or_else(|| Error::InvalidPhoto(format!("crop region outside image: {:?}", region)))?;

    let cropped = DynamicImage::ImageRgb8(img.crop_imm(x, y, w, h).to_rgb8());

    std::fs::create_dir_all(output_dir)?;
    let output = output_dir.join(cropped_file_name(source));

    let mut buf = Vec::new();
    cropped
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, CROP_JPEG_QUALITY))
        .map_err(|e| Error::InvalidPhoto(e.to_string()))?;
    std::fs::write(&output, buf)?;

    Ok(output)
}

/// 切り抜き後のファイル名
///
/// 元の拡張子を残すので `a.jpg` と `a.png` は別ファイルになる。
fn cropped_file_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    match source.extension() {
        Some(ext) => format!("{}-{}-cropped.jpg", stem, ext.to_string_lossy().to_ascii_lowercase()),
        None => format!("{}-cropped.jpg", stem),
    }
}
