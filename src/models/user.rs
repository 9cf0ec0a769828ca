use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_jti: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// User response (public view)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            image_url: user.image_path.as_deref().map(public_image_url),
            created_at: user.created_at,
        }
    }
}

// Author view embedded in question/answer/comment responses
#[derive(Debug, Serialize)]
pub struct AuthorInfo {
    pub id: Uuid,
    pub username: String,
    pub image_url: Option<String>,
}

impl AuthorInfo {
    pub fn new(id: Uuid, username: String, image_path: Option<String>) -> Self {
        Self {
            id,
            username,
            image_url: image_path.as_deref().map(public_image_url),
        }
    }
}

// Stored image paths are relative to the upload dir, which is served at /uploads.
pub fn public_image_url(image_path: &str) -> String {
    format!("/uploads/{}", image_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_url_is_prefixed_with_uploads() {
        assert_eq!(
            public_image_url("profile_picture/user_1/me.png"),
            "/uploads/profile_picture/user_1/me.png"
        );
    }
}
