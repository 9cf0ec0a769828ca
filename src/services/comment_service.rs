use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{AuthorInfo, Comment, CommentResponse},
};

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    answer_id: Option<Uuid>,
    content: String,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
    author_image_path: Option<String>,
}

impl From<CommentRow> for CommentResponse {
    fn from(row: CommentRow) -> Self {
        CommentResponse {
            id: row.id,
            answer_id: row.answer_id,
            content: row.content,
            author: AuthorInfo::new(row.author_id, row.author_username, row.author_image_path),
            created_at: row.created_at,
        }
    }
}

pub async fn create_comment(
    db: &PgPool,
    answer_id: Uuid,
    author_id: Uuid,
    content: &str,
) -> Result<CommentResponse> {
    let comment_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO comments (id, answer_id, author_id, content, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(comment_id)
    .bind(answer_id)
    .bind(author_id)
    .bind(content)
    .bind(Utc::now())
    .execute(db)
    .await?;

    get_comment_response(db, comment_id)
        .await?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created comment".to_string()))
}

pub async fn get_comment(db: &PgPool, comment_id: Uuid) -> Result<Option<Comment>> {
    let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(db)
        .await?;

    Ok(comment)
}

pub async fn get_comment_response(
    db: &PgPool,
    comment_id: Uuid,
) -> Result<Option<CommentResponse>> {
    let row = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.answer_id, c.content, c.created_at,
               u.id AS author_id, u.username AS author_username,
               u.image_path AS author_image_path
        FROM comments c
        JOIN users u ON c.author_id = u.id
        WHERE c.id = $1
        "#,
    )
    .bind(comment_id)
    .fetch_optional(db)
    .await?;

    Ok(row.map(CommentResponse::from))
}

pub async fn update_content(db: &PgPool, comment_id: Uuid, content: &str) -> Result<()> {
    sqlx::query("UPDATE comments SET content = $1 WHERE id = $2")
        .bind(content)
        .bind(comment_id)
        .execute(db)
        .await?;

    Ok(())
}

pub async fn delete_comment(db: &PgPool, comment_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(db)
        .await?;

    Ok(())
}

// Fetch the comments for a set of answers in one round trip, oldest first.
pub async fn comments_for_answers(
    db: &PgPool,
    answer_ids: &[Uuid],
) -> Result<Vec<CommentResponse>> {
    if answer_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT c.id, c.answer_id, c.content, c.created_at,
               u.id AS author_id, u.username AS author_username,
               u.image_path AS author_image_path
        FROM comments c
        JOIN users u ON c.author_id = u.id
        WHERE c.answer_id = ANY($1)
        ORDER BY c.created_at ASC
        "#,
    )
    .bind(answer_ids)
    .fetch_all(db)
    .await?;

    Ok(rows.into_iter().map(CommentResponse::from).collect())
}
