use crate::config::Config;
use crate::error::ClientError;
use crate::http::HttpClient;
use crate::media::MediaUploader;
use crate::model::User;
use crate::repository::{AuthRepository, PostRepository, UserRepository};
use crate::token::{FileTokenStore, TokenStore};
use crate::transport::{Client, Uploader};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub struct App {
    pub auth: Arc<AuthRepository>,
    pub posts: Arc<PostRepository>,
    pub users: Arc<UserRepository>,
}

impl App {
    pub fn new(config: &Config) -> Result<App, ClientError> {
        info!("Constructing new app against {}.", &config.api.base_url);

        let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.session));
        let client: Arc<dyn Client> = Arc::new(HttpClient::new(&config.api, tokens.clone())?);
        let uploader: Arc<dyn Uploader> = Arc::new(MediaUploader::new(&config.media)?);

        Ok(App::with_parts(client, uploader, tokens))
    }

    pub fn with_parts(
        client: Arc<dyn Client>,
        uploader: Arc<dyn Uploader>,
        tokens: Arc<dyn TokenStore>,
    ) -> App {
        App {
            auth: Arc::new(AuthRepository::new(client.clone(), tokens)),
            posts: Arc::new(PostRepository::new(client.clone(), uploader)),
            users: Arc::new(UserRepository::new(client)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// The `{ success, data?, message? }` wrapper around every non-auth response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub secure_url: String,
    pub public_id: String,
    pub width: u32,
    pub height: u32,
}
