//! フォルダをギャラリーとして扱う取得元
//!
//! 直下の静止画（jpg/jpeg/png）を一覧にし、選択は `SelectionSurface` に任せる。

use super::crop::{apply_crop, CropRegion};
use super::exif;
use super::{PhotoSource, SourceKind};
use async_trait::async_trait;
use campus_locator_common::{Capability, Error, PhotoDescriptor, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

#[derive(Debug, Clone)]
pub struct GalleryEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub date: Option<String>,
}

/// 選択結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GallerySelection {
    pub index: usize,
    pub crop: Option<CropRegion>,
}

impl GallerySelection {
    pub fn index(index: usize) -> Self {
        Self { index, crop: None }
    }
}

/// ユーザーが画像を選ぶ面
///
/// `None` は選択せずに閉じた（キャンセル）。
pub trait SelectionSurface: Send {
    fn choose(&mut self, entries: &[GalleryEntry]) -> Result<Option<GallerySelection>>;
}

pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

/// ギャラリーフォルダを走査（ファイル名順）
pub fn scan_gallery(folder: &Path) -> Result<Vec<GalleryEntry>> {
    match std::fs::read_dir(folder) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::GalleryNotFound(folder.display().to_string()));
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Error::PermissionDenied(Capability::Gallery));
        }
        Err(e) => return Err(e.into()),
    }

    let mut entries = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_image = path
            .extension()
            .map(|ext| is_image_extension(&ext.to_string_lossy()))
            .unwrap_or(false);
        if !is_image {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        entries.push(GalleryEntry {
            path: path.to_path_buf(),
            file_name,
            date: exif::capture_date(path),
        });
    }

    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(entries)
}

pub struct FolderGallery<S: SelectionSurface> {
    root: PathBuf,
    crop_dir: PathBuf,
    surface: S,
}

impl<S: SelectionSurface> FolderGallery<S> {
    pub fn new(root: impl Into<PathBuf>, crop_dir: impl Into<PathBuf>, surface: S) -> Self {
        Self {
            root: root.into(),
            crop_dir: crop_dir.into(),
            surface,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pick(&mut self) -> Result<PhotoDescriptor> {
        let entries = scan_gallery(&self.root)?;
        if entries.is_empty() {
            debug!(root = %self.root.display(), "gallery is empty");
            return Err(Error::Cancelled);
        }

        let selection = self.surface.choose(&entries)?.ok_or(Error::Cancelled)?;
        let entry = entries
            .get(selection.index)
            .ok_or_else(|| Error::InvalidPhoto(format!("no gallery entry #{}", selection.index)))?;

        let path = match selection.crop {
            Some(region) => apply_crop(&entry.path, region, &self.crop_dir)?,
            None => entry.path.clone(),
        };

        info!(path = %path.display(), cropped = selection.crop.is_some(), "photo picked from gallery");
        Ok(PhotoDescriptor::from_path(&path))
    }
}

#[async_trait]
impl<S: SelectionSurface> PhotoSource for FolderGallery<S> {
    fn kind(&self) -> SourceKind {
        SourceKind::Gallery
    }

    async fn acquire(&mut self) -> Result<PhotoDescriptor> {
        self.pick()
    }
}

/// 既に決まっている1ファイル
#[derive(Debug, Clone)]
pub struct SingleFile {
    path: PathBuf,
}

impl SingleFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PhotoSource for SingleFile {
    fn kind(&self) -> SourceKind {
        SourceKind::Gallery
    }

    async fn acquire(&mut self) -> Result<PhotoDescriptor> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.is_file() => Ok(PhotoDescriptor::from_path(&self.path)),
            Ok(_) => Err(Error::InvalidPhoto(format!("{} is not a file", self.path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(Error::PermissionDenied(Capability::Gallery))
            }
            Err(e) => Err(Error::InvalidPhoto(format!("{}: {}", self.path.display(), e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension("jpg"));
        assert!(is_image_extension("JPG"));
        assert!(is_image_extension("jpeg"));
        assert!(is_image_extension("png"));
        assert!(!is_image_extension("txt"));
        assert!(!is_image_extension("gif"));
        assert!(!is_image_extension("mp4"));
    }

    #[test]
    fn test_scan_gallery_not_found() {
        let result = scan_gallery(Path::new("/nonexistent/gallery/12345"));
        assert!(matches!(result, Err(Error::GalleryNotFound(_))));
    }

    #[test]
    fn test_scan_gallery_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();

        File::create(dir.path().join("c.jpg")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("a.PNG")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("b.jpeg")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("clip.mp4")).unwrap().write_all(b"video").unwrap();
        fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let result = scan_gallery(dir.path()).unwrap();
        let names: Vec<&str> = result.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.PNG", "b.jpeg", "c.jpg"]);
        assert!(result.iter().all(|e| e.date.is_none()));
    }

    #[tokio::test]
    async fn test_single_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        fs::write(&path, b"jpeg").unwrap();

        let photo = SingleFile::new(&path).acquire().await.unwrap();
        assert_eq!(photo.filename(), Some("a.jpg"));
        assert_eq!(photo.local_path(), Some(path));

        let missing = SingleFile::new(dir.path().join("none.jpg")).acquire().await;
        assert!(matches!(missing, Err(Error::InvalidPhoto(_))));
    }
}
