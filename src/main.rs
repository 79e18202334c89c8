use campus_locator::acquisition::SingleFile;
use campus_locator::location::ConfiguredLocation;
use campus_locator::recognition::RecognitionClient;
use campus_locator::{cli, config, error, interactive, render, Session};
use campus_locator_common::{compute_region, Coordinate, UserPosition, CAMPUS_LANDMARKS};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::{LocatorError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(verbose: bool) {
    let default = if verbose { "campus_locator=debug,campus_locator_common=debug" } else { "campus_locator=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load()?;
    if let Some(url) = &cli.server {
        config.set_server_url(url)?;
    }

    match cli.command {
        Commands::Detect { image, json, lat, lon } => {
            if !image.exists() {
                return Err(LocatorError::FileNotFound(image.display().to_string()));
            }

            let position = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(UserPosition::new(lat, lon)),
                _ => config.device_position,
            };
            let client = RecognitionClient::from_config(&config)?;
            let mut session = Session::new(client, ConfiguredLocation::new(position), config.fallback_position);

            if !json {
                println!("🏛  campus-locator - 建物判定\n");
                println!("送信先: {}", session.recognizer().endpoint());
            }

            let mut source = SingleFile::new(&image);
            if let Some(n) = session.acquire(&mut source).await {
                eprintln!("{}", render::notification(&n));
                return Err(LocatorError::Failed(n.message));
            }

            if let Some(n) = interactive::estimate_with_spinner(&mut session).await {
                eprintln!("{}", render::notification(&n));
                return Err(LocatorError::Failed(n.message));
            }

            let scene = session
                .map_scene()
                .ok_or_else(|| LocatorError::Failed("判定結果がありません".into()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&scene)?);
            } else {
                println!("{}", render::scene(&scene));
                println!("\n✅ 判定完了");
            }
        }

        Commands::Run { gallery } => {
            interactive::run_interactive(&config, gallery).await?;
        }

        Commands::Region { user_lat, user_lon, target_lat, target_lon } => {
            let region = compute_region(
                UserPosition::new(user_lat, user_lon),
                Coordinate::new(target_lat, target_lon),
            );
            println!("{}", render::region(&region));
        }

        Commands::Landmarks => {
            println!("🗺  {}\n", campus_locator_common::CAMPUS_TITLE);
            println!("{}", render::landmarks(CAMPUS_LANDMARKS));
        }

        Commands::Config { set_server, set_position, show } => {
            let mut changed = false;

            if let Some(url) = set_server {
                config.set_server_url(&url)?;
                println!("✔ サーバーURLを設定しました: {}", config.server_url);
                changed = true;
            }

            if let Some(pos) = set_position {
                let position: UserPosition = pos.parse().map_err(LocatorError::Config)?;
                config.device_position = Some(position);
                println!("✔ 現在地を設定しました: {}, {}", position.latitude, position.longitude);
                changed = true;
            }

            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定ファイル: {}", Config::config_path()?.display());
                println!("サーバーURL: {}", config.server_url);
                println!("送信先: {}", config.detect_endpoint());
                println!("タイムアウト: {}秒", config.timeout_seconds);
                match config.max_upload_dimension {
                    Some(px) => println!("送信時の長辺: {}px (JPEG品質 {})", px, config.jpeg_quality),
                    None => println!("送信時の長辺: 縮小なし"),
                }
                match &config.camera_command {
                    Some(cmd) => println!("撮影コマンド: {}", cmd.join(" ")),
                    None => println!("撮影コマンド: 未設定"),
                }
                match &config.gallery_dir {
                    Some(dir) => println!("ギャラリー: {}", dir.display()),
                    None => println!("ギャラリー: 未設定"),
                }
                match config.device_position {
                    Some(p) => println!("現在地: {}, {}", p.latitude, p.longitude),
                    None => println!("現在地: 未設定"),
                }
                println!(
                    "既定位置: {}, {}",
                    config.fallback_position.latitude, config.fallback_position.longitude
                );
            }
        }
    }

    Ok(())
}
