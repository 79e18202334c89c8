//! 対話式ワークフロー
//!
//! 画面ごとにメニューを出し、選ばれた操作をセッションに渡す。
//! 画面の決定は `Screen` の1つのmatchだけで行う。

use crate::acquisition::{
    CommandCamera, CropRegion, FolderGallery, GalleryEntry, GallerySelection, SelectionSurface,
};
use crate::config::Config;
use crate::error::Result;
use crate::location::{ConfiguredLocation, LocationProvider};
use crate::recognition::{RecognitionClient, Recognizer};
use crate::render;
use crate::session::Session;
use campus_locator_common::{Completion, Error, Notification, Screen};
use dialoguer::{Confirm, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// dialoguerによるギャラリー選択
#[derive(Debug, Default)]
pub struct PromptSurface {
    offer_crop: bool,
}

impl PromptSurface {
    pub fn new(offer_crop: bool) -> Self {
        Self { offer_crop }
    }
}

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}

impl SelectionSurface for PromptSurface {
    fn choose(&mut self, entries: &[GalleryEntry]) -> campus_locator_common::Result<Option<GallerySelection>> {
        let items: Vec<String> = entries
            .iter()
            .map(|e| match &e.date {
                Some(date) => format!("{} ({})", e.file_name, date),
                None => e.file_name.clone(),
            })
            .collect();

        let Some(index) = Select::new()
            .with_prompt("写真を選択 (Escでキャンセル)")
            .items(&items)
            .default(0)
            .interact_opt()
            .map_err(prompt_error)?
        else {
            return Ok(None);
        };

        let crop = if self.offer_crop
            && Confirm::new()
                .with_prompt("中央を正方形に切り抜きますか?")
                .default(false)
                .interact()
                .map_err(prompt_error)?
        {
            Some(CropRegion::CenterSquare)
        } else {
            None
        };

        Ok(Some(GallerySelection { index, crop }))
    }
}

pub fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// 推定を実行し、失敗なら通知を返す
pub async fn estimate_with_spinner<R: Recognizer, L: LocationProvider>(
    session: &mut Session<R, L>,
) -> Option<Notification> {
    let pb = spinner("推定中...");
    let completion = session.estimate().await;
    pb.finish_and_clear();

    match completion {
        Some(Completion::Failed(n)) => Some(n),
        _ => None,
    }
}

/// 撮影画面のメニュー項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAction {
    Capture,
    Gallery,
    ToggleFacing,
    Quit,
}

/// 撮影画面で選べる操作
///
/// 撮影コマンドが使えないときは撮影を出さない。
pub fn camera_actions(camera: &CommandCamera, gallery_root: Option<&Path>) -> Vec<(String, CameraAction)> {
    let mut actions = Vec::new();
    if camera.permission_granted() {
        actions.push(("写真を撮る".to_string(), CameraAction::Capture));
    }
    let gallery_label = match gallery_root {
        Some(root) => format!("ギャラリーから選ぶ ({})", root.display()),
        None => "ギャラリーから選ぶ".to_string(),
    };
    actions.push((gallery_label, CameraAction::Gallery));
    actions.push((
        format!("カメラ切り替え (現在: {})", camera.facing().as_str()),
        CameraAction::ToggleFacing,
    ));
    actions.push(("終了".to_string(), CameraAction::Quit));
    actions
}

pub async fn run_interactive(config: &Config, gallery_dir: Option<PathBuf>) -> Result<()> {
    let client = RecognitionClient::from_config(config)?;
    let location = ConfiguredLocation::new(config.device_position);
    let mut session = Session::new(client, location, config.fallback_position);

    let mut camera = CommandCamera::new(config.camera_command.clone(), &config.capture_dir);
    let mut gallery = gallery_dir
        .or_else(|| config.gallery_dir.clone())
        .map(|dir| FolderGallery::new(dir, &config.capture_dir, PromptSurface::new(true)));

    println!("🏛  campus-locator - {}\n", config.detect_endpoint());

    loop {
        println!("{}", render::view(&session.view()));

        let notification = match session.workflow().screen() {
            Screen::Camera => {
                let actions = camera_actions(&camera, gallery.as_ref().map(|g| g.root()));
                let items: Vec<&str> = actions.iter().map(|(label, _)| label.as_str()).collect();
                let chosen = Select::new()
                    .items(&items)
                    .default(0)
                    .interact_opt()?
                    .and_then(|i| actions.get(i))
                    .map(|(_, action)| *action);

                match chosen {
                    Some(CameraAction::Capture) => session.acquire(&mut camera).await,
                    Some(CameraAction::Gallery) => match gallery.as_mut() {
                        Some(g) => session.acquire(g).await,
                        None => Some(Notification::new(
                            "Error",
                            "ギャラリーフォルダが設定されていません (--gallery)",
                        )),
                    },
                    Some(CameraAction::ToggleFacing) => {
                        camera.toggle_facing();
                        None
                    }
                    Some(CameraAction::Quit) | None => break,
                }
            }
            Screen::Preview { .. } => {
                let items = ["推定する", "撮り直す", "終了"];
                match Select::new().items(&items).default(0).interact_opt()? {
                    Some(0) => estimate_with_spinner(&mut session).await,
                    Some(1) => {
                        session.retake();
                        None
                    }
                    _ => break,
                }
            }
            Screen::Map => {
                let items = ["新しい写真", "終了"];
                match Select::new().items(&items).default(0).interact_opt()? {
                    Some(0) => {
                        session.restart();
                        None
                    }
                    _ => break,
                }
            }
        };

        if let Some(n) = notification {
            println!("{}", render::notification(&n));
        }
        println!();
    }

    Ok(())
}
