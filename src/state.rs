
use crate::app::AuthResponse;
use crate::model::{Post, User};
use crate::repository::{AuthRepository, PostRepository, UserRepository};
use crate::resource::Resource;
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub is_loading: bool,
    pub is_success: bool,
    pub error: Option<String>,
}

impl AuthState {
    fn loading() -> AuthState {
        AuthState {
            is_loading: true,
            ..AuthState::default()
        }
    }

    fn finished<T>(resource: &Resource<T>) -> AuthState {
        AuthState {
            is_loading: resource.is_loading(),
            is_success: resource.is_success(),
            error: resource.error().map(String::from),
        }
    }
}

pub struct AuthViewModel {
    repository: Arc<AuthRepository>,
    login_state: watch::Sender<AuthState>,
    register_state: watch::Sender<AuthState>,
    forgot_password_state: watch::Sender<AuthState>,
    reset_password_state: watch::Sender<AuthState>,
}

impl AuthViewModel {
    pub fn new(repository: Arc<AuthRepository>) -> AuthViewModel {
        AuthViewModel {
            repository,
            login_state: watch::channel(AuthState::default()).0,
            register_state: watch::channel(AuthState::default()).0,
            forgot_password_state: watch::channel(AuthState::default()).0,
            reset_password_state: watch::channel(AuthState::default()).0,
        }
    }

    pub fn login_state(&self) -> watch::Receiver<AuthState> {
        self.login_state.subscribe()
    }

    pub fn register_state(&self) -> watch::Receiver<AuthState> {
        self.register_state.subscribe()
    }

    pub fn forgot_password_state(&self) -> watch::Receiver<AuthState> {
        self.forgot_password_state.subscribe()
    }

    pub fn reset_password_state(&self) -> watch::Receiver<AuthState> {
        self.reset_password_state.subscribe()
    }

    pub async fn login(&self, email: String, password: String) -> Resource<AuthResponse> {
        self.login_state.send_replace(AuthState::loading());
        let resource = self.repository.login(email, password).await;
        self.login_state.send_replace(AuthState::finished(&resource));
        resource
    }

    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Resource<AuthResponse> {
        self.register_state.send_replace(AuthState::loading());
        let resource = self.repository.register(username, email, password).await;
        self.register_state
            .send_replace(AuthState::finished(&resource));
        resource
    }

    pub async fn forgot_password(&self, email: String) -> Resource<()> {
        self.forgot_password_state
            .send_replace(AuthState::loading());
        let resource = self.repository.forgot_password(email).await;
        self.forgot_password_state
            .send_replace(AuthState::finished(&resource));
        resource
    }

    pub async fn reset_password(&self, token: String, new_password: String) -> Resource<()> {
        self.reset_password_state
            .send_replace(AuthState::loading());
        let resource = self.repository.reset_password(token, new_password).await;
        self.reset_password_state
            .send_replace(AuthState::finished(&resource));
        resource
    }

    pub fn logout(&self) -> Resource<()> {
        let resource = self.repository.logout();
        self.reset_state();
        resource
    }

    pub fn reset_state(&self) {
        self.login_state.send_replace(AuthState::default());
        self.register_state.send_replace(AuthState::default());
        self.forgot_password_state
            .send_replace(AuthState::default());
        self.reset_password_state
            .send_replace(AuthState::default());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeState {
    pub posts: Vec<Post>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct HomeViewModel {
    repository: Arc<PostRepository>,
    state: watch::Sender<HomeState>,
}

impl HomeViewModel {
    pub fn new(repository: Arc<PostRepository>) -> HomeViewModel {
        HomeViewModel {
            repository,
            state: watch::channel(HomeState::default()).0,
        }
    }

    pub fn state(&self) -> HomeState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.state.subscribe()
    }

    pub async fn load_posts(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        match self.repository.posts().await {
            Resource::Success(posts) => self.state.send_modify(|state| {
                state.posts = posts;
                state.is_loading = false;
                state.error = None;
            }),
            Resource::Error(message) => self.state.send_modify(|state| {
                state.is_loading = false;
                state.error = Some(message);
            }),
            Resource::Loading => {}
        }
    }

    /// Flips the like immediately and undoes it if the server refuses.
    pub async fn toggle_like(&self, post_id: &str) -> Resource<()> {
        let original = self
            .state
            .borrow()
            .posts
            .iter()
            .find(|post| post.id == post_id)
            .cloned();
        let original = match original {
            Some(post) => post,
            None => {
                debug!("Ignoring like of unknown post: {}", post_id);
                return Resource::Error(format!("Unknown post: {}", post_id));
            }
        };

        let toggled = original.toggled_like();
        self.state
            .send_modify(|state| replace_post(&mut state.posts, &toggled));

        let resource = self
            .repository
            .toggle_like(post_id, original.is_liked_by_user)
            .await;

        if let Resource::Error(message) = &resource {
            warn!("Reverting like of post {}: {}", post_id, message);

            self.state.send_modify(|state| {
                if let Some(post) = state.posts.iter_mut().find(|post| post.id == post_id) {
                    post.likes = original.likes;
                    post.is_liked_by_user = original.is_liked_by_user;
                }
            });
        }

        resource
    }
}

fn replace_post(posts: &mut [Post], updated: &Post) {
    if let Some(post) = posts.iter_mut().find(|post| post.id == updated.id) {
        *post = updated.clone();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatePostState {
    pub is_loading: bool,
    pub upload_progress: u8,
    pub is_success: bool,
    pub error: Option<String>,
}

pub struct PostViewModel {
    repository: Arc<PostRepository>,
    state: watch::Sender<CreatePostState>,
}

impl PostViewModel {
    pub fn new(repository: Arc<PostRepository>) -> PostViewModel {
        PostViewModel {
            repository,
            state: watch::channel(CreatePostState::default()).0,
        }
    }

    pub fn state(&self) -> CreatePostState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CreatePostState> {
        self.state.subscribe()
    }

    pub async fn create_post(&self, path: &Path, caption: Option<String>) -> Resource<Post> {
        self.state.send_replace(CreatePostState {
            is_loading: true,
            ..CreatePostState::default()
        });

        let (file_name, image) = match self.repository.read_image(path).await {
            Resource::Success(read) => read,
            other => return self.fail(other.error()),
        };

        self.state.send_modify(|state| state.upload_progress = 50);
        let image_url = match self.repository.upload_bytes(&file_name, image).await {
            Resource::Success(image_url) => image_url,
            other => return self.fail(other.error()),
        };

        self.state.send_modify(|state| state.upload_progress = 75);
        let resource = self.repository.create_post(image_url, caption).await;

        if let Resource::Success(post) = &resource {
            info!("Published post: {}", &post.id);
        } else {
            return self.fail(resource.error());
        }

        self.state.send_modify(|state| {
            state.is_loading = false;
            state.upload_progress = 100;
            state.is_success = true;
        });

        resource
    }

    fn fail<T>(&self, message: Option<&str>) -> Resource<T> {
        let message = message.unwrap_or("Failed to create post").to_string();

        self.state.send_modify(|state| {
            state.is_loading = false;
            state.error = Some(message.clone());
        });

        Resource::Error(message)
    }

    pub fn reset_state(&self) {
        self.state.send_replace(CreatePostState::default());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileState {
    pub user: Option<User>,
    pub posts: Vec<Post>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct ProfileViewModel {
    users: Arc<UserRepository>,
    posts: Arc<PostRepository>,
    state: watch::Sender<ProfileState>,
}

impl ProfileViewModel {
    pub fn new(users: Arc<UserRepository>, posts: Arc<PostRepository>) -> ProfileViewModel {
        ProfileViewModel {
            users,
            posts,
            state: watch::channel(ProfileState::default()).0,
        }
    }

    pub fn state(&self) -> ProfileState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProfileState> {
        self.state.subscribe()
    }

    pub async fn load_profile(&self) {
        self.state.send_modify(|state| state.is_loading = true);

        let user = match self.users.current_user().await {
            Resource::Success(user) => user,
            other => {
                let message = other.error().map(String::from);
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.error = message;
                });
                return;
            }
        };

        let user_id = user.id.clone();
        self.state.send_modify(|state| state.user = Some(user));

        match self.users.user_posts(&user_id).await {
            Resource::Success(posts) => self.state.send_modify(|state| {
                state.posts = posts;
                state.is_loading = false;
            }),
            other => {
                let message = other.error().map(String::from);
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.error = message;
                });
            }
        }
    }

    pub async fn delete_post(&self, post_id: &str) -> Resource<()> {
        let resource = self.posts.delete_post(post_id).await;

        match &resource {
            Resource::Success(()) => self
                .state
                .send_modify(|state| state.posts.retain(|post| post.id != post_id)),
            Resource::Error(message) => self
                .state
                .send_modify(|state| state.error = Some(message.clone())),
            Resource::Loading => {}
        }

        resource
    }

    pub async fn update_profile(
        &self,
        username: Option<String>,
        password: Option<String>,
    ) -> Resource<User> {
        let resource = self.users.update_profile(username, password).await;

        match &resource {
            Resource::Success(user) => {
                let user = user.clone();
                self.state.send_modify(|state| state.user = Some(user));
            }
            Resource::Error(message) => self
                .state
                .send_modify(|state| state.error = Some(message.clone())),
            Resource::Loading => {}
        }

        resource
    }
}
