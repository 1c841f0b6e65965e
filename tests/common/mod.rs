#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::extract::{Json, Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use hmac::{Hmac, Mac};
use jwt::{SignWithKey, VerifyWithKey};
use memelords::app::*;
use memelords::http::{self, HttpClient};
use memelords::media::{self, MediaUploader};
use memelords::model::{Post, User};
use memelords::token::MemoryTokenStore;
use serde_json::{json, Value};
use sha2::Sha256;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const UPLOAD_PRESET: &str = "imageviewer";
const CREATED_AT: &str = "2024-05-01T12:00:00Z";

type Shared = Arc<FakeApi>;

pub struct FakeApi {
    key: Hmac<Sha256>,
    store: Mutex<Store>,
    canned: Mutex<VecDeque<Value>>,
}

#[derive(Default)]
struct Store {
    users: Vec<Account>,
    posts: Vec<StoredPost>,
    reset_tokens: Vec<(String, String)>,
    uploads: usize,
}

struct Account {
    user: User,
    password_hash: String,
}

struct StoredPost {
    post: Post,
    liked_by: Vec<String>,
}

impl StoredPost {
    fn seen_by(&self, viewer: &str) -> Post {
        Post {
            likes: self.liked_by.len() as u32,
            is_liked_by_user: self.liked_by.iter().any(|id| id == viewer),
            ..self.post.clone()
        }
    }
}

impl FakeApi {
    fn sign(&self, user_id: &str) -> String {
        let mut claims = BTreeMap::new();
        claims.insert("sub", user_id.to_string());

        claims.sign_with_key(&self.key).expect("signing a token")
    }

    fn viewer(&self, headers: &HeaderMap) -> Option<String> {
        let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let token = header.strip_prefix("Bearer ")?;
        let claims: BTreeMap<String, String> = token.verify_with_key(&self.key).ok()?;

        claims.get("sub").cloned()
    }

    pub fn remove_post(&self, post_id: &str) {
        let mut store = self.store.lock().unwrap();
        store.posts.retain(|stored| stored.post.id != post_id);
    }

    pub fn likes_of(&self, post_id: &str) -> Option<usize> {
        let store = self.store.lock().unwrap();
        store
            .posts
            .iter()
            .find(|stored| stored.post.id == post_id)
            .map(|stored| stored.liked_by.len())
    }

    pub fn uploads(&self) -> usize {
        self.store.lock().unwrap().uploads
    }

    // The next request is answered with `body` and status 200, whatever its route.
    pub fn answer_next(&self, body: Value) {
        self.canned.lock().unwrap().push_back(body);
    }
}

pub struct Server {
    pub api: Shared,
    pub base_url: String,
}

impl Server {
    pub async fn start() -> Result<Server, Box<dyn std::error::Error>> {
        let api = Arc::new(FakeApi {
            key: Hmac::new_from_slice(b"secret")?,
            store: Mutex::new(Store::default()),
            canned: Mutex::new(VecDeque::new()),
        });

        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let address = listener.local_addr()?;
        let server = axum::Server::from_tcp(listener)?.serve(router(api.clone()).into_make_service());
        tokio::spawn(server);

        Ok(Server {
            api,
            base_url: format!("http://{}", address),
        })
    }

    pub fn client(&self) -> Result<(App, Arc<MemoryTokenStore>), Box<dyn std::error::Error>> {
        self.client_with_preset(UPLOAD_PRESET)
    }

    pub fn client_with_preset(
        &self,
        preset: &str,
    ) -> Result<(App, Arc<MemoryTokenStore>), Box<dyn std::error::Error>> {
        let tokens = Arc::new(MemoryTokenStore::new());
        let client = HttpClient::new(&self.api_config(), tokens.clone())?;
        let uploader = MediaUploader::new(&self.media_config(preset))?;

        Ok((
            App::with_parts(Arc::new(client), Arc::new(uploader), tokens.clone()),
            tokens,
        ))
    }

    pub fn api_config(&self) -> http::Config {
        http::Config {
            base_url: self.base_url.clone(),
            timeout_secs: 5,
        }
    }

    pub fn media_config(&self, preset: &str) -> media::Config {
        media::Config {
            upload_url: format!("{}/upload", self.base_url),
            upload_preset: preset.to_string(),
        }
    }
}

fn router(api: Shared) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/:id", delete(delete_post))
        .route("/api/posts/:id/like", post(like_post).delete(unlike_post))
        .route("/api/users/me", get(me).put(update_me))
        .route("/api/users/:id/posts", get(user_posts))
        .route("/upload", post(upload))
        .layer(middleware::from_fn_with_state(api.clone(), canned))
        .with_state(api)
}

async fn canned(State(api): State<Shared>, request: Request<Body>, next: Next<Body>) -> Response {
    let body = api.canned.lock().unwrap().pop_front();

    match body {
        Some(body) => reply(StatusCode::OK, body),
        None => next.run(request).await,
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn ok(data: Value) -> Response {
    reply(StatusCode::OK, json!({ "success": true, "data": data }))
}

fn refuse(status: StatusCode, message: &str) -> Response {
    reply(status, json!({ "success": false, "message": message }))
}

fn unauthorized() -> Response {
    StatusCode::UNAUTHORIZED.into_response()
}

async fn register(State(api): State<Shared>, Json(request): Json<RegisterRequest>) -> Response {
    let mut store = api.store.lock().unwrap();
    if store.users.iter().any(|account| account.user.email == request.email) {
        return refuse(StatusCode::CONFLICT, "Email already registered");
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: request.username,
        email: request.email,
        profile_picture: None,
        created_at: Some(CREATED_AT.to_string()),
    };
    let password_hash = bcrypt::hash(&request.password, 4).unwrap();
    store.users.push(Account {
        user: user.clone(),
        password_hash,
    });

    let token = api.sign(&user.id);
    reply(
        StatusCode::CREATED,
        json!({ "success": true, "token": token, "user": user }),
    )
}

async fn login(State(api): State<Shared>, Json(request): Json<LogInRequest>) -> Response {
    let store = api.store.lock().unwrap();
    let account = store.users.iter().find(|account| {
        account.user.email == request.email
            && bcrypt::verify(&request.password, &account.password_hash).unwrap_or(false)
    });

    match account {
        Some(account) => reply(
            StatusCode::OK,
            json!({ "success": true, "token": api.sign(&account.user.id), "user": account.user }),
        ),
        None => refuse(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn forgot_password(
    State(api): State<Shared>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Response {
    let mut store = api.store.lock().unwrap();
    if store.users.iter().any(|account| account.user.email == request.email) {
        let token = format!("reset-{}", &request.email);
        store.reset_tokens.push((token, request.email));
    }

    reply(
        StatusCode::OK,
        json!({ "success": true, "message": "Reset email sent" }),
    )
}

async fn reset_password(
    State(api): State<Shared>,
    Json(request): Json<ResetPasswordRequest>,
) -> Response {
    let mut store = api.store.lock().unwrap();
    let position = store
        .reset_tokens
        .iter()
        .position(|(token, _)| token == &request.token);
    let email = match position {
        Some(position) => store.reset_tokens.remove(position).1,
        None => return refuse(StatusCode::OK, "Invalid or expired token"),
    };

    let password_hash = bcrypt::hash(&request.new_password, 4).unwrap();
    if let Some(account) = store
        .users
        .iter_mut()
        .find(|account| account.user.email == email)
    {
        account.password_hash = password_hash;
    }

    ok(json!({}))
}

async fn list_posts(State(api): State<Shared>, headers: HeaderMap) -> Response {
    let viewer = match api.viewer(&headers) {
        Some(viewer) => viewer,
        None => return unauthorized(),
    };

    let store = api.store.lock().unwrap();
    let posts: Vec<Post> = store
        .posts
        .iter()
        .rev()
        .map(|stored| stored.seen_by(&viewer))
        .collect();

    ok(json!(posts))
}

async fn create_post(
    State(api): State<Shared>,
    headers: HeaderMap,
    Json(request): Json<CreatePostRequest>,
) -> Response {
    let viewer = match api.viewer(&headers) {
        Some(viewer) => viewer,
        None => return unauthorized(),
    };

    let mut store = api.store.lock().unwrap();
    let author = match store.users.iter().find(|account| account.user.id == viewer) {
        Some(account) => account.user.clone(),
        None => return unauthorized(),
    };

    let post = Post {
        id: Uuid::new_v4().to_string(),
        user_id: author.id,
        username: author.username,
        user_profile_picture: author.profile_picture,
        image_url: request.image_url,
        caption: request.caption,
        likes: 0,
        is_liked_by_user: false,
        created_at: CREATED_AT.to_string(),
    };
    store.posts.push(StoredPost {
        post: post.clone(),
        liked_by: Vec::new(),
    });

    ok(json!(post))
}

async fn delete_post(
    State(api): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let viewer = match api.viewer(&headers) {
        Some(viewer) => viewer,
        None => return unauthorized(),
    };

    let mut store = api.store.lock().unwrap();
    let position = match store.posts.iter().position(|stored| stored.post.id == id) {
        Some(position) => position,
        None => return refuse(StatusCode::NOT_FOUND, "Post not found"),
    };
    if store.posts[position].post.user_id != viewer {
        return refuse(StatusCode::FORBIDDEN, "Not your post");
    }
    store.posts.remove(position);

    ok(Value::Null)
}

async fn like_post(
    State(api): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    set_like(&api, &headers, &id, true)
}

async fn unlike_post(
    State(api): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    set_like(&api, &headers, &id, false)
}

fn set_like(api: &FakeApi, headers: &HeaderMap, post_id: &str, liked: bool) -> Response {
    let viewer = match api.viewer(headers) {
        Some(viewer) => viewer,
        None => return unauthorized(),
    };

    let mut store = api.store.lock().unwrap();
    let stored = match store.posts.iter_mut().find(|stored| stored.post.id == post_id) {
        Some(stored) => stored,
        None => return refuse(StatusCode::NOT_FOUND, "Post not found"),
    };

    stored.liked_by.retain(|id| id != &viewer);
    if liked {
        stored.liked_by.push(viewer);
    }

    ok(Value::Null)
}

async fn me(State(api): State<Shared>, headers: HeaderMap) -> Response {
    let viewer = match api.viewer(&headers) {
        Some(viewer) => viewer,
        None => return unauthorized(),
    };

    let store = api.store.lock().unwrap();
    match store.users.iter().find(|account| account.user.id == viewer) {
        Some(account) => ok(json!(account.user)),
        None => refuse(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn update_me(
    State(api): State<Shared>,
    headers: HeaderMap,
    Json(request): Json<UpdateProfileRequest>,
) -> Response {
    let viewer = match api.viewer(&headers) {
        Some(viewer) => viewer,
        None => return unauthorized(),
    };

    let mut store = api.store.lock().unwrap();
    if let Some(username) = &request.username {
        let taken = store
            .users
            .iter()
            .any(|account| &account.user.username == username && account.user.id != viewer);
        if taken {
            return refuse(StatusCode::OK, "Username already taken");
        }
        for stored in store.posts.iter_mut().filter(|stored| stored.post.user_id == viewer) {
            stored.post.username = username.clone();
        }
    }

    let account = match store.users.iter_mut().find(|account| account.user.id == viewer) {
        Some(account) => account,
        None => return refuse(StatusCode::NOT_FOUND, "User not found"),
    };
    if let Some(username) = request.username {
        account.user.username = username;
    }
    if let Some(password) = request.password {
        account.password_hash = bcrypt::hash(&password, 4).unwrap();
    }

    ok(json!(account.user))
}

async fn user_posts(
    State(api): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let viewer = match api.viewer(&headers) {
        Some(viewer) => viewer,
        None => return unauthorized(),
    };

    let store = api.store.lock().unwrap();
    let posts: Vec<Post> = store
        .posts
        .iter()
        .rev()
        .filter(|stored| stored.post.user_id == id)
        .map(|stored| stored.seen_by(&viewer))
        .collect();

    ok(json!(posts))
}

async fn upload(State(api): State<Shared>, body: Bytes) -> Response {
    let form = String::from_utf8_lossy(&body);
    let has_preset = form.contains("name=\"upload_preset\"")
        && form.contains(&format!("\r\n\r\n{}\r\n", UPLOAD_PRESET));
    if !has_preset {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({ "error": { "message": "Upload preset not found" } }),
        );
    }

    let file_name = form
        .split("filename=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap_or("image")
        .to_string();

    let mut store = api.store.lock().unwrap();
    store.uploads += 1;
    let public_id = format!("{}-{}", store.uploads, file_name);

    reply(
        StatusCode::OK,
        json!({
            "secure_url": format!("https://media.example.com/{}", public_id),
            "public_id": public_id,
            "width": 640,
            "height": 480,
        }),
    )
}
