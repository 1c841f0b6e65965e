use crate::app::UploadResponse;
use crate::error::ClientError;
use crate::transport::Uploader;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub upload_url: String,
    pub upload_preset: String,
}

pub struct MediaUploader {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl MediaUploader {
    pub fn new(config: &Config) -> Result<MediaUploader, ClientError> {
        let client = reqwest::Client::builder().build()?;

        debug!(
            "Constructing new media uploader for {} with preset {}.",
            &config.upload_url, &config.upload_preset
        );

        Ok(MediaUploader {
            client,
            upload_url: config.upload_url.clone(),
            upload_preset: config.upload_preset.clone(),
        })
    }
}

#[async_trait]
impl Uploader for MediaUploader {
    async fn upload(
        &self,
        file_name: &str,
        image: Vec<u8>,
    ) -> Result<UploadResponse, ClientError> {
        debug!("Uploading {} ({} bytes).", file_name, image.len());

        let file = Part::bytes(image)
            .file_name(file_name.to_string())
            .mime_str("image/*")?;
        let form = Form::new()
            .part("file", file)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Image upload failed with status {}.", status);

            return Err(ClientError::Status {
                status,
                message: None,
            });
        }

        let uploaded: UploadResponse = response.json().await?;

        info!(
            "Uploaded {} as {} ({}x{}).",
            file_name, &uploaded.public_id, uploaded.width, uploaded.height
        );

        Ok(uploaded)
    }
}
