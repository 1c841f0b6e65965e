use clap::{Parser, Subcommand};
use log::info;
use memelords::app::App;
use memelords::config::load_config_from_file;
use memelords::model::{Post, User};
use memelords::state::{AuthViewModel, HomeViewModel, PostViewModel, ProfileViewModel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "memelords", about = "Share images from the terminal.")]
struct Cli {
    /// Path to the RON configuration file.
    #[arg(short, long, default_value = "config.ron")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and start a session.
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Start a session.
    Login { email: String, password: String },
    /// Forget the stored session.
    Logout,
    /// Ask for a password reset email.
    ForgotPassword { email: String },
    /// Set a new password with the token from the reset email.
    ResetPassword { token: String, new_password: String },
    /// Show the feed.
    Feed,
    /// Like a post, or unlike it if already liked.
    Like { post_id: String },
    /// Upload an image and publish it as a post.
    Post {
        image: PathBuf,
        #[arg(short, long)]
        caption: Option<String>,
    },
    /// Delete one of your posts.
    Delete { post_id: String },
    /// Show your profile and posts.
    Me,
    /// Show the posts of a user.
    Posts { user_id: String },
    /// Change your username and/or password.
    UpdateProfile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config_from_file(&cli.config)?;

    let rust_log = "RUST_LOG";

    std::env::set_var(rust_log, &config.log_level);
    env_logger::init();

    info!("Starting client.");

    let app = App::new(&config)?;

    run(cli.command, app).await
}

async fn run(command: Command, app: App) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = AuthViewModel::new(app.auth);
            let response = auth.register(username, email, password).await.into_result()?;
            match response.user {
                Some(user) => println!("Welcome, {}!", user.username),
                None => println!("Registered."),
            }
        }
        Command::Login { email, password } => {
            let auth = AuthViewModel::new(app.auth);
            let response = auth.login(email, password).await.into_result()?;
            match response.user {
                Some(user) => println!("Logged in as {}.", user.username),
                None => println!("Logged in."),
            }
        }
        Command::Logout => {
            AuthViewModel::new(app.auth).logout().into_result()?;
            println!("Logged out.");
        }
        Command::ForgotPassword { email } => {
            let auth = AuthViewModel::new(app.auth);
            auth.forgot_password(email).await.into_result()?;
            println!("If the address is registered, a reset email is on its way.");
        }
        Command::ResetPassword {
            token,
            new_password,
        } => {
            let auth = AuthViewModel::new(app.auth);
            auth.reset_password(token, new_password)
                .await
                .into_result()?;
            println!("Password changed.");
        }
        Command::Feed => {
            let home = HomeViewModel::new(app.posts);
            home.load_posts().await;
            let state = home.state();
            if let Some(error) = state.error {
                return Err(error.into());
            }
            print_posts(&state.posts);
        }
        Command::Like { post_id } => {
            let home = HomeViewModel::new(app.posts);
            home.load_posts().await;
            if let Some(error) = home.state().error {
                return Err(error.into());
            }
            home.toggle_like(&post_id).await.into_result()?;
            if let Some(post) = home.state().posts.iter().find(|post| post.id == post_id) {
                print_post(post);
            }
        }
        Command::Post { image, caption } => {
            let view_model = PostViewModel::new(app.posts);
            let post = view_model.create_post(&image, caption).await.into_result()?;
            println!("Published:");
            print_post(&post);
        }
        Command::Delete { post_id } => {
            let profile = ProfileViewModel::new(app.users, app.posts);
            profile.delete_post(&post_id).await.into_result()?;
            println!("Deleted {}.", post_id);
        }
        Command::Me => {
            let profile = ProfileViewModel::new(app.users, app.posts);
            profile.load_profile().await;
            let state = profile.state();
            if let Some(error) = state.error {
                return Err(error.into());
            }
            if let Some(user) = &state.user {
                print_user(user);
            }
            print_posts(&state.posts);
        }
        Command::Posts { user_id } => {
            let posts = app.users.user_posts(&user_id).await.into_result()?;
            print_posts(&posts);
        }
        Command::UpdateProfile { username, password } => {
            if username.is_none() && password.is_none() {
                return Err("Nothing to update, pass --username and/or --password.".into());
            }
            let profile = ProfileViewModel::new(app.users, app.posts);
            let user = profile
                .update_profile(username, password)
                .await
                .into_result()?;
            print_user(&user);
        }
    }

    Ok(())
}

fn print_user(user: &User) {
    println!("{} <{}> ({})", user.username, user.email, user.id);
}

fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("No posts yet.");
    }
    for post in posts {
        print_post(post);
    }
}

fn print_post(post: &Post) {
    let heart = if post.is_liked_by_user { "♥" } else { "♡" };
    println!(
        "[{}] {} {} {} by {}",
        post.id, heart, post.likes, post.image_url, post.username
    );
    if let Some(caption) = &post.caption {
        println!("    {}", caption);
    }
}
