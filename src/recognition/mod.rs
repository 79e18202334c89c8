//! 認識サービスクライアント
//!
//! 写真を `image` パート1つのmultipartで `POST {base}/detect` に送り、
//! 応答を `DetectionResult` にする。再試行はしない。

mod upload;

pub use upload::{prepare_jpeg, read_photo_bytes, UploadOptions};

use crate::config::Config;
use crate::error::{LocatorError, Result as LocatorResult};
use async_trait::async_trait;
use campus_locator_common::{
    derive_upload_filename, parse_detection_response, DetectionResult, Error, MultipartBody,
    MultipartBuilder, PhotoDescriptor, Result,
};
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("campus-locator/", env!("CARGO_PKG_VERSION"));
pub const IMAGE_FIELD: &str = "image";
pub const IMAGE_MIME: &str = "image/jpeg";

/// 写真から判定結果を得る
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, photo: &PhotoDescriptor) -> Result<DetectionResult>;
}

pub struct RecognitionClient {
    http_client: reqwest::Client,
    endpoint: String,
    options: UploadOptions,
}

impl RecognitionClient {
    pub fn new(base_url: &str, timeout: Duration, options: UploadOptions) -> LocatorResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| LocatorError::Http(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/detect", base_url.trim().trim_end_matches('/')),
            options,
        })
    }

    pub fn from_config(config: &Config) -> LocatorResult<Self> {
        Self::new(
            &config.server_url,
            Duration::from_secs(config.timeout_seconds),
            UploadOptions {
                max_dimension: config.max_upload_dimension,
                jpeg_quality: config.jpeg_quality,
            },
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 写真から送信ボディを組み立てる
    pub fn build_body(&self, photo: &PhotoDescriptor) -> Result<MultipartBody> {
        if photo.source_uri().trim().is_empty() {
            return Err(Error::InvalidPhoto("source URI is empty".into()));
        }
        let filename = derive_upload_filename(photo.source_uri(), photo.filename());
        let content = prepare_jpeg(read_photo_bytes(photo)?, &self.options);

        MultipartBuilder::new()
            .part(IMAGE_FIELD, content, IMAGE_MIME, filename)
            .build()
    }

    /// 1回だけ送信して判定結果を返す
    pub async fn submit(&self, photo: &PhotoDescriptor) -> Result<DetectionResult> {
        let body = self.build_body(photo)?;
        let form = into_form(body)?;

        info!(endpoint = %self.endpoint, uri = photo.source_uri(), "submitting photo");

        // Content-Typeはboundary付きでreqwestが付ける
        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        debug!(status = status.as_u16(), body = %text, "response from server");

        match parse_detection_response(status.as_u16(), &text) {
            Ok(result) => {
                info!(
                    building = %result.building,
                    latitude = result.latitude,
                    longitude = result.longitude,
                    distance = ?result.distance,
                    "detection received"
                );
                Ok(result)
            }
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "detection failed");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Recognizer for RecognitionClient {
    async fn recognize(&self, photo: &PhotoDescriptor) -> Result<DetectionResult> {
        self.submit(photo).await
    }
}

fn into_form(body: MultipartBody) -> Result<Form> {
    body.into_parts().into_iter().try_fold(Form::new(), |form, part| {
        let file_part = Part::bytes(part.content)
            .file_name(part.filename)
            .mime_str(&part.mime_type)
            .map_err(|e| Error::InvalidUpload(e.to_string()))?;
        Ok(form.part(part.field_name, file_part))
    })
}
