use crate::app::*;
use crate::error::ClientError;
use crate::model::{Post, User};
use crate::token::TokenStore;
use crate::transport::Client;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Method, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

enum ApiEndpoint<'a> {
    Register,
    LogIn,
    ForgotPassword,
    ResetPassword,
    Posts,
    Post(&'a str),
    PostLike(&'a str),
    CurrentUser,
    UserPosts(&'a str),
}

impl ApiEndpoint<'_> {
    fn segments(&self) -> Vec<&str> {
        match *self {
            ApiEndpoint::Register => vec!["api", "auth", "register"],
            ApiEndpoint::LogIn => vec!["api", "auth", "login"],
            ApiEndpoint::ForgotPassword => vec!["api", "auth", "forgot-password"],
            ApiEndpoint::ResetPassword => vec!["api", "auth", "reset-password"],
            ApiEndpoint::Posts => vec!["api", "posts"],
            ApiEndpoint::Post(id) => vec!["api", "posts", id],
            ApiEndpoint::PostLike(id) => vec!["api", "posts", id, "like"],
            ApiEndpoint::CurrentUser => vec!["api", "users", "me"],
            ApiEndpoint::UserPosts(id) => vec!["api", "users", id, "posts"],
        }
    }

    fn authenticated(&self) -> bool {
        !matches!(
            self,
            ApiEndpoint::Register
                | ApiEndpoint::LogIn
                | ApiEndpoint::ForgotPassword
                | ApiEndpoint::ResetPassword
        )
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl HttpClient {
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> Result<HttpClient, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| ClientError::BaseUrl(format!("{}: {}", &config.base_url, err)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::BaseUrl(config.base_url.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!("Constructing new http client for {}.", &base_url);

        Ok(HttpClient {
            client,
            base_url,
            tokens,
        })
    }

    fn url(&self, endpoint: &ApiEndpoint<'_>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(endpoint.segments());
        }
        url
    }

    async fn send_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: ApiEndpoint<'_>,
        body: Option<&T>,
    ) -> Result<reqwest::Response, ClientError> {
        let url = self.url(&endpoint);

        debug!("Sending {} {}.", &method, url.path());

        let mut request = self.client.request(method, url);
        if endpoint.authenticated() {
            match self.tokens.token() {
                Some(token) => request = request.bearer_auth(token),
                None => debug!("No session token stored, sending without authorization."),
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.message);

            warn!("Request failed with status {}, message: {:?}", status, message);

            return Err(ClientError::Status { status, message });
        }

        Ok(response)
    }

    async fn envelope<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: ApiEndpoint<'_>,
        body: Option<&B>,
    ) -> Result<Option<T>, ClientError> {
        let response: ApiResponse<T> = self
            .send_request(method, endpoint, body)
            .await?
            .json()
            .await?;

        if !response.success {
            return Err(ClientError::Rejected {
                message: response.message,
            });
        }

        Ok(response.data)
    }

    async fn data<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: ApiEndpoint<'_>,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        self.envelope(method, endpoint, body)
            .await?
            .ok_or(ClientError::MissingData)
    }

    async fn list<T: DeserializeOwned>(
        &self,
        endpoint: ApiEndpoint<'_>,
    ) -> Result<Vec<T>, ClientError> {
        let items = self
            .envelope::<Vec<T>, ()>(Method::GET, endpoint, None)
            .await?;

        Ok(items.unwrap_or_default())
    }

    async fn acknowledge<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: ApiEndpoint<'_>,
        body: Option<&B>,
    ) -> Result<(), ClientError> {
        self.envelope::<IgnoredAny, B>(method, endpoint, body)
            .await?;

        Ok(())
    }

    async fn authenticate<B: Serialize>(
        &self,
        endpoint: ApiEndpoint<'_>,
        body: &B,
    ) -> Result<AuthResponse, ClientError> {
        let response: AuthResponse = self
            .send_request(Method::POST, endpoint, Some(body))
            .await?
            .json()
            .await?;

        if !response.success || response.token.is_none() {
            return Err(ClientError::Rejected {
                message: response.message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Client for HttpClient {
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.authenticate(ApiEndpoint::Register, &request).await
    }

    async fn log_in(&self, request: LogInRequest) -> Result<AuthResponse, ClientError> {
        self.authenticate(ApiEndpoint::LogIn, &request).await
    }

    async fn forgot_password(&self, request: ForgotPasswordRequest) -> Result<(), ClientError> {
        self.acknowledge(Method::POST, ApiEndpoint::ForgotPassword, Some(&request))
            .await
    }

    async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), ClientError> {
        self.acknowledge(Method::POST, ApiEndpoint::ResetPassword, Some(&request))
            .await
    }

    async fn posts(&self) -> Result<Vec<Post>, ClientError> {
        self.list(ApiEndpoint::Posts).await
    }

    async fn create_post(&self, request: CreatePostRequest) -> Result<Post, ClientError> {
        self.data(Method::POST, ApiEndpoint::Posts, Some(&request))
            .await
    }

    async fn delete_post(&self, post_id: &str) -> Result<(), ClientError> {
        self.acknowledge::<()>(Method::DELETE, ApiEndpoint::Post(post_id), None)
            .await
    }

    async fn like_post(&self, post_id: &str) -> Result<(), ClientError> {
        self.acknowledge::<()>(Method::POST, ApiEndpoint::PostLike(post_id), None)
            .await
    }

    async fn unlike_post(&self, post_id: &str) -> Result<(), ClientError> {
        self.acknowledge::<()>(Method::DELETE, ApiEndpoint::PostLike(post_id), None)
            .await
    }

    async fn current_user(&self) -> Result<User, ClientError> {
        self.data::<User, ()>(Method::GET, ApiEndpoint::CurrentUser, None)
            .await
    }

    async fn user_posts(&self, user_id: &str) -> Result<Vec<Post>, ClientError> {
        self.list(ApiEndpoint::UserPosts(user_id)).await
    }

    async fn update_profile(&self, request: UpdateProfileRequest) -> Result<User, ClientError> {
        self.data(Method::PUT, ApiEndpoint::CurrentUser, Some(&request))
            .await
    }
}
