//! 静止画の取得
//!
//! カメラとギャラリーのどちらから取っても同じ `PhotoDescriptor` に揃える。

mod camera;
mod crop;
mod exif;
mod gallery;

pub use camera::{CameraFacing, CommandCamera};
pub use crop::{apply_crop, CropRegion};
pub use gallery::{
    is_image_extension, scan_gallery, FolderGallery, GalleryEntry, GallerySelection,
    SelectionSurface, SingleFile,
};

use async_trait::async_trait;
use campus_locator_common::{PhotoDescriptor, Result};

/// 取得元の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Camera,
    Gallery,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Camera => write!(f, "camera"),
            SourceKind::Gallery => write!(f, "gallery"),
        }
    }
}

/// 写真の取得元
#[async_trait]
pub trait PhotoSource: Send {
    fn kind(&self) -> SourceKind;

    /// 静止画を1枚取得
    ///
    /// # Returns
    /// * `Ok(PhotoDescriptor)` - 取得した写真
    /// * `Err(Cancelled)` - ユーザーが選択を中断した
    /// * `Err(PermissionDenied)` / `Err(CaptureFailed)` - 取得失敗
    async fn acquire(&mut self) -> Result<PhotoDescriptor>;
}
