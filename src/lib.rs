pub mod app;
pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod model;
pub mod repository;
pub mod resource;
pub mod state;
pub mod token;
pub mod transport;

pub use app::App;
pub use error::ClientError;
pub use resource::Resource;
