//! 送信する画像バイト列の準備

use base64::Engine;
use campus_locator_common::{Error, PhotoDescriptor, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use tracing::{debug, warn};

/// JPEG化・縮小の設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// 長辺の上限px
    pub max_dimension: Option<u32>,
    pub jpeg_quality: u8,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            max_dimension: None,
            jpeg_quality: 80,
        }
    }
}

/// 写真の中身を読み出す
///
/// base64があればそれを使い、なければURIのファイルを読む。
pub fn read_photo_bytes(photo: &PhotoDescriptor) -> Result<Vec<u8>> {
    if photo.source_uri().trim().is_empty() {
        return Err(Error::InvalidPhoto("source URI is empty".into()));
    }

    if let Some(encoded) = photo.base64().filter(|b| !b.is_empty()) {
        return base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| Error::InvalidPhoto(format!("invalid base64: {}", e)));
    }

    let path = photo.local_path().ok_or_else(|| {
        Error::InvalidPhoto(format!("unsupported URI: {}", photo.source_uri()))
    })?;
    std::fs::read(&path).map_err(|e| Error::InvalidPhoto(format!("{}: {}", path.display(), e)))
}

/// `image/jpeg` として送れる形に整える
///
/// JPEGかつ縮小不要ならそのまま。デコードできない内容は警告して原本を送る。
pub fn prepare_jpeg(bytes: Vec<u8>, options: &UploadOptions) -> Vec<u8> {
    let is_jpeg = matches!(image::guess_format(&bytes), Ok(ImageFormat::Jpeg));
    if is_jpeg && options.max_dimension.is_none() {
        return bytes;
    }

    let img = match image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!(error = %e, "image could not be decoded, sending original bytes");
            return bytes;
        }
    };

    let img = match options.max_dimension {
        Some(max) if img.width().max(img.height()) > max => {
            debug!(width = img.width(), height = img.height(), max, "resizing before upload");
            img.resize(max, max, image::imageops::FilterType::Lanczos3)
        }
        _ => img,
    };

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    match rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, options.jpeg_quality)) {
        Ok(()) => buf,
        Err(e) => {
            warn!(error = %e, "JPEG encoding failed, sending original bytes");
            bytes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(width, height));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_read_from_base64() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(b"hello");
        let photo = PhotoDescriptor::new("content://camera/1").with_base64(encoded);
        assert_eq!(read_photo_bytes(&photo).unwrap(), b"hello");
    }

    #[test]
    fn test_read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, b"bytes").unwrap();
        let photo = PhotoDescriptor::from_path(&path);
        assert_eq!(read_photo_bytes(&photo).unwrap(), b"bytes");
    }

    #[test]
    fn test_read_rejects_empty_and_foreign_uri() {
        assert!(matches!(
            read_photo_bytes(&PhotoDescriptor::new("")),
            Err(Error::InvalidPhoto(_))
        ));
        assert!(matches!(
            read_photo_bytes(&PhotoDescriptor::new("content://media/1")),
            Err(Error::InvalidPhoto(_))
        ));
    }

    #[test]
    fn test_png_is_converted_to_jpeg() {
        let out = prepare_jpeg(png_bytes(8, 8), &UploadOptions::default());
        assert!(matches!(image::guess_format(&out), Ok(ImageFormat::Jpeg)));
    }

    #[test]
    fn test_resize_keeps_aspect() {
        let options = UploadOptions {
            max_dimension: Some(16),
            jpeg_quality: 80,
        };
        let out = prepare_jpeg(png_bytes(64, 32), &options);
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (16, 8));
    }

    #[test]
    fn test_undecodable_bytes_pass_through() {
        let raw = b"definitely not an image".to_vec();
        assert_eq!(prepare_jpeg(raw.clone(), &UploadOptions::default()), raw);
    }
}
