use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "campus-locator")]
#[command(about = "キャンパス建物の写真から位置を推定して地図に表示", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 認識サービスのベースURL（例: http://192.168.0.100:5001）
    #[arg(long, env = "CAMPUS_LOCATOR_SERVER", global = true)]
    pub server: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像1枚を送信して判定結果を表示
    Detect {
        /// 画像ファイル
        #[arg(required = true)]
        image: PathBuf,

        /// 地図シーンをJSONで出力
        #[arg(long)]
        json: bool,

        /// 現在地の緯度
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// 現在地の経度
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// 撮影 → プレビュー → 地図 を対話的に実行
    Run {
        /// ギャラリーとして使うフォルダ
        #[arg(short, long)]
        gallery: Option<PathBuf>,
    },

    /// 2点から地図の表示範囲を計算
    Region {
        #[arg(long, allow_negative_numbers = true)]
        user_lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        user_lon: f64,

        #[arg(long, allow_negative_numbers = true)]
        target_lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        target_lon: f64,
    },

    /// キャンパスのランドマーク一覧
    Landmarks,

    /// 設定を表示/編集
    Config {
        /// 認識サービスのベースURLを保存
        #[arg(long)]
        set_server: Option<String>,

        /// 端末の現在地を保存（LAT,LON）
        #[arg(long, allow_hyphen_values = true)]
        set_position: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
