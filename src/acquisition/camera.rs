//! 外部撮影コマンドによるカメラ
//!
//! `fswebcam` や `libcamera-still` などをargvテンプレートで起動し、
//! 書き出されたJPEGを読み込む。

use super::{PhotoSource, SourceKind};
use async_trait::async_trait;
use base64::Engine;
use campus_locator_common::{Capability, Error, PhotoDescriptor, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraFacing {
    #[default]
    Back,
    Front,
}

impl CameraFacing {
    pub fn toggle(self) -> Self {
        match self {
            CameraFacing::Back => CameraFacing::Front,
            CameraFacing::Front => CameraFacing::Back,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraFacing::Back => "back",
            CameraFacing::Front => "front",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommandCamera {
    command: Option<Vec<String>>,
    capture_dir: PathBuf,
    facing: CameraFacing,
}

impl CommandCamera {
    pub fn new(command: Option<Vec<String>>, capture_dir: impl Into<PathBuf>) -> Self {
        Self {
            command,
            capture_dir: capture_dir.into(),
            facing: CameraFacing::default(),
        }
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn toggle_facing(&mut self) -> CameraFacing {
        self.facing = self.facing.toggle();
        debug!(facing = self.facing.as_str(), "camera facing toggled");
        self.facing
    }

    /// 撮影コマンドが設定済みで、保存先に書き込めるか
    pub fn permission_granted(&self) -> bool {
        self.command.as_ref().is_some_and(|c| !c.is_empty()) && capture_dir_writable(&self.capture_dir)
    }

    /// テンプレートの置換済みargv
    fn build_argv(&self, output: &Path) -> Result<Vec<String>> {
        let template = self
            .command
            .as_ref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::CaptureFailed("camera command is not configured".into()))?;

        Ok(template
            .iter()
            .map(|arg| {
                arg.replace("{output}", &output.display().to_string())
                    .replace("{facing}", self.facing.as_str())
            })
            .collect())
    }

    /// 撮影して画像ファイルのバイト列を返す
    pub async fn capture(&self) -> Result<(PathBuf, Vec<u8>)> {
        tokio::fs::create_dir_all(&self.capture_dir)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => Error::PermissionDenied(Capability::Camera),
                _ => Error::CaptureFailed(e.to_string()),
            })?;
        let writable = tokio::fs::metadata(&self.capture_dir)
            .await
            .map(|meta| meta.is_dir() && !meta.permissions().readonly())
            .unwrap_or(false);
        if !writable {
            return Err(Error::PermissionDenied(Capability::Camera));
        }

        let output = self.capture_dir.join(capture_file_name(chrono::Local::now()));
        let argv = self.build_argv(&output)?;

        debug!(command = ?argv, "running camera command");
        let result = Command::new(&argv[0])
            .args(&argv[1..])
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => Error::PermissionDenied(Capability::Camera),
                _ => Error::CaptureFailed(format!("{}: {}", argv[0], e)),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::CaptureFailed(format!(
                "{} exited with {}: {}",
                argv[0],
                result.status,
                stderr.trim()
            )));
        }

        let bytes = tokio::fs::read(&output)
            .await
            .map_err(|e| Error::CaptureFailed(format!("{}: {}", output.display(), e)))?;
        if bytes.is_empty() {
            return Err(Error::CaptureFailed(format!("{} is empty", output.display())));
        }

        Ok((output, bytes))
    }
}

#[async_trait]
impl PhotoSource for CommandCamera {
    fn kind(&self) -> SourceKind {
        SourceKind::Camera
    }

    async fn acquire(&mut self) -> Result<PhotoDescriptor> {
        let (path, bytes) = self.capture().await?;
        info!(path = %path.display(), bytes = bytes.len(), facing = self.facing.as_str(), "photo captured");

        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Ok(PhotoDescriptor::from_path(&path).with_base64(encoded))
    }
}

/// `capture-YYYYMMDD-HHMMSSmmm.jpg`（同じ秒の連続撮影を区別するためミリ秒まで）
fn capture_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("capture-{}.jpg", now.format("%Y%m%d-%H%M%S%3f"))
}

fn capture_dir_writable(dir: &Path) -> bool {
    match std::fs::metadata(dir) {
        Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
        // 未作成なら撮影時に作る
        Err(e) => e.kind() == std::io::ErrorKind::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_toggle() {
        let mut camera = CommandCamera::new(None, std::env::temp_dir());
        assert_eq!(camera.facing(), CameraFacing::Back);
        assert_eq!(camera.toggle_facing(), CameraFacing::Front);
        assert_eq!(camera.toggle_facing(), CameraFacing::Back);
    }

    #[test]
    fn test_build_argv_substitutes_placeholders() {
        let mut camera = CommandCamera::new(
            Some(vec!["snap".into(), "--side={facing}".into(), "-o".into(), "{output}".into()]),
            "/tmp/caps",
        );
        camera.toggle_facing();
        let argv = camera.build_argv(Path::new("/tmp/caps/x.jpg")).unwrap();
        assert_eq!(argv, vec!["snap", "--side=front", "-o", "/tmp/caps/x.jpg"]);
    }

    #[test]
    fn test_unconfigured_camera() {
        let camera = CommandCamera::new(Some(Vec::new()), std::env::temp_dir());
        assert!(!camera.permission_granted());
        assert!(matches!(
            camera.build_argv(Path::new("x.jpg")),
            Err(Error::CaptureFailed(_))
        ));
    }

    #[test]
    fn test_capture_file_name_format() {
        use chrono::TimeZone;
        let now = chrono::Local.with_ymd_and_hms(2026, 3, 7, 9, 5, 4).unwrap()
            + chrono::Duration::milliseconds(42);
        assert_eq!(capture_file_name(now), "capture-20260307-090504042.jpg");
    }

    #[tokio::test]
    async fn test_capture_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let capture_dir = dir.path().join("nested").join("caps");
        let camera = CommandCamera::new(Some(vec!["false".into()]), &capture_dir);

        // コマンドは失敗するが保存先は先に作られる
        let result = camera.capture().await;
        assert!(matches!(result, Err(Error::CaptureFailed(_))));
        assert!(capture_dir.is_dir());
    }
}
