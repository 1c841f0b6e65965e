use crate::app::*;
use crate::error::ClientError;
use crate::model::{Post, User};
use async_trait::async_trait;

#[async_trait]
pub trait Client: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ClientError>;
    async fn log_in(&self, request: LogInRequest) -> Result<AuthResponse, ClientError>;
    async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<(), ClientError>;
    async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), ClientError>;

    async fn posts(&self) -> Result<Vec<Post>, ClientError>;
    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, ClientError>;
    async fn delete_post(&self, post_id: &str) -> Result<(), ClientError>;
    async fn like_post(&self, post_id: &str) -> Result<(), ClientError>;
    async fn unlike_post(&self, post_id: &str) -> Result<(), ClientError>;

    async fn current_user(&self) -> Result<User, ClientError>;
    async fn user_posts(&self, user_id: &str) -> Result<Vec<Post>, ClientError>;
    async fn update_profile(&self, request: UpdateProfileRequest) -> Result<User, ClientError>;
}

#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, file_name: &str, image: Vec<u8>)
        -> Result<UploadResponse, ClientError>;
}
