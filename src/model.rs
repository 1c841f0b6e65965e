use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub user_profile_picture: Option<String>,
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub is_liked_by_user: bool,
    pub created_at: String,
}

impl Post {
    pub fn toggled_like(&self) -> Post {
        debug!(
            "Toggling like of post: {}, currently liked: {}.",
            &self.id, self.is_liked_by_user
        );

        let likes = if self.is_liked_by_user {
            self.likes.saturating_sub(1)
        } else {
            self.likes.saturating_add(1)
        };

        Post {
            likes,
            is_liked_by_user: !self.is_liked_by_user,
            ..self.clone()
        }
    }
}
