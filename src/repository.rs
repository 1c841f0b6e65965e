use crate::app::*;
use crate::error::Rendering;
use crate::model::{Post, User};
use crate::resource::Resource;
use crate::token::TokenStore;
use crate::transport::{Client, Uploader};
use log::{debug, error, info};
use std::path::Path;
use std::sync::Arc;

pub struct AuthRepository {
    client: Arc<dyn Client>,
    tokens: Arc<dyn TokenStore>,
}

impl AuthRepository {
    pub fn new(client: Arc<dyn Client>, tokens: Arc<dyn TokenStore>) -> AuthRepository {
        info!("Constructing new auth repository.");

        AuthRepository { client, tokens }
    }

    pub async fn login(&self, email: String, password: String) -> Resource<AuthResponse> {
        debug!("Logging in user: {}", &email);

        let result = self.client.log_in(LogInRequest { email, password }).await;
        self.keep_session(Resource::from_result(
            result,
            "Login failed",
            Rendering::Authentication,
        ))
    }

    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Resource<AuthResponse> {
        debug!("Registering user: {}", &email);

        let result = self
            .client
            .register(RegisterRequest {
                username,
                email,
                password,
            })
            .await;
        self.keep_session(Resource::from_result(
            result,
            "Registration failed",
            Rendering::Authentication,
        ))
    }

    pub async fn forgot_password(&self, email: String) -> Resource<()> {
        debug!("Requesting password reset for: {}", &email);

        let result = self
            .client
            .forgot_password(ForgotPasswordRequest { email })
            .await;
        Resource::from_result(result, "Failed to send reset email", Rendering::ServerMessage)
    }

    pub async fn reset_password(&self, token: String, new_password: String) -> Resource<()> {
        debug!("Completing password reset.");

        let result = self
            .client
            .reset_password(ResetPasswordRequest {
                token,
                new_password,
            })
            .await;
        Resource::from_result(result, "Failed to reset password", Rendering::ServerMessage)
    }

    pub fn logout(&self) -> Resource<()> {
        match self.tokens.clear() {
            Ok(()) => {
                info!("Logged out.");
                Resource::Success(())
            }
            Err(err) => {
                error!("Failed to clear session: {}", err);
                Resource::Error(err.to_string())
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.tokens.token().is_some()
    }

    fn keep_session(&self, resource: Resource<AuthResponse>) -> Resource<AuthResponse> {
        let response = match resource {
            Resource::Success(response) => response,
            other => return other,
        };

        let token = match &response.token {
            Some(token) => token,
            None => return Resource::Error(String::from("Response carried no token")),
        };

        if let Err(err) = self.tokens.save_token(token) {
            error!("Failed to store session token: {}", err);
            return Resource::Error(err.to_string());
        }
        if let Some(user) = &response.user {
            if let Err(err) = self.tokens.save_user_id(&user.id) {
                error!("Failed to store user id: {}", err);
                return Resource::Error(err.to_string());
            }
        }

        info!(
            "Authenticated user: {:?}",
            response.user.as_ref().map(|user| &user.username)
        );

        Resource::Success(response)
    }
}

pub struct PostRepository {
    client: Arc<dyn Client>,
    uploader: Arc<dyn Uploader>,
}

impl PostRepository {
    pub fn new(client: Arc<dyn Client>, uploader: Arc<dyn Uploader>) -> PostRepository {
        info!("Constructing new post repository.");

        PostRepository { client, uploader }
    }

    pub async fn posts(&self) -> Resource<Vec<Post>> {
        let resource = Resource::from_result(
            self.client.posts().await,
            "Failed to load posts",
            Rendering::Fallback,
        );

        if let Some(posts) = resource.data() {
            debug!("Fetched {} posts.", posts.len());
        }

        resource
    }

    pub async fn upload_image(&self, path: &Path) -> Resource<String> {
        match self.read_image(path).await {
            Resource::Success((file_name, image)) => self.upload_bytes(&file_name, image).await,
            Resource::Error(message) => Resource::Error(message),
            Resource::Loading => Resource::Loading,
        }
    }

    pub async fn read_image(&self, path: &Path) -> Resource<(String, Vec<u8>)> {
        let image = match tokio::fs::read(path).await {
            Ok(image) => image,
            Err(err) => {
                error!("Failed to read image {}: {}", path.display(), err);
                return Resource::Error(String::from("Failed to process image"));
            }
        };
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("image.jpg"));

        Resource::Success((file_name, image))
    }

    pub async fn upload_bytes(&self, file_name: &str, image: Vec<u8>) -> Resource<String> {
        let result = self.uploader.upload(file_name, image).await;
        Resource::from_result(result, "Image upload failed", Rendering::Fallback)
            .map(|uploaded| uploaded.secure_url)
    }

    pub async fn create_post(&self, image_url: String, caption: Option<String>) -> Resource<Post> {
        debug!("Creating post with image: {}", &image_url);

        let caption = caption.filter(|caption| !caption.trim().is_empty());
        let result = self
            .client
            .create_post(CreatePostRequest { image_url, caption })
            .await;
        let resource = Resource::from_result(result, "Failed to create post", Rendering::Fallback);

        if let Some(post) = resource.data() {
            info!("Created post: {}", &post.id);
        }

        resource
    }

    pub async fn delete_post(&self, post_id: &str) -> Resource<()> {
        debug!("Deleting post: {}", post_id);

        let resource = Resource::from_result(
            self.client.delete_post(post_id).await,
            "Failed to delete post",
            Rendering::Fallback,
        );

        if resource.is_success() {
            info!("Deleted post: {}", post_id);
        }

        resource
    }

    pub async fn toggle_like(&self, post_id: &str, is_liked: bool) -> Resource<()> {
        debug!("Toggling like of post: {}, currently liked: {}", post_id, is_liked);

        let result = if is_liked {
            self.client.unlike_post(post_id).await
        } else {
            self.client.like_post(post_id).await
        };
        Resource::from_result(result, "Failed to update like", Rendering::Fallback)
    }
}

pub struct UserRepository {
    client: Arc<dyn Client>,
}

impl UserRepository {
    pub fn new(client: Arc<dyn Client>) -> UserRepository {
        info!("Constructing new user repository.");

        UserRepository { client }
    }

    pub async fn current_user(&self) -> Resource<User> {
        Resource::from_result(
            self.client.current_user().await,
            "Failed to load user",
            Rendering::Fallback,
        )
    }

    pub async fn user_posts(&self, user_id: &str) -> Resource<Vec<Post>> {
        debug!("Fetching posts of user: {}", user_id);

        Resource::from_result(
            self.client.user_posts(user_id).await,
            "Failed to load posts",
            Rendering::Fallback,
        )
    }

    pub async fn update_profile(
        &self,
        username: Option<String>,
        password: Option<String>,
    ) -> Resource<User> {
        debug!(
            "Updating profile, username: {:?}, password changed: {}",
            &username,
            password.is_some()
        );

        let result = self
            .client
            .update_profile(UpdateProfileRequest { username, password })
            .await;
        Resource::from_result(result, "Failed to update profile", Rendering::Fallback)
    }
}
