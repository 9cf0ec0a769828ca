use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::Result, models::User};

pub async fn create_user(db: &PgPool, username: &str, password_hash: &str) -> Result<User> {
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, password_hash, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(now)
    .bind(now)
    .fetch_one(db)
    .await?;

    Ok(user)
}

pub async fn get_user_by_id(db: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?;

    Ok(user)
}

pub async fn get_user_by_username(db: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(db)
        .await?;

    Ok(user)
}

pub async fn update_image_path(db: &PgPool, user_id: Uuid, image_path: &str) -> Result<()> {
    sqlx::query("UPDATE users SET image_path = $1, updated_at = $2 WHERE id = $3")
        .bind(image_path)
        .bind(Utc::now())
        .bind(user_id)
        .execute(db)
        .await?;

    Ok(())
}
