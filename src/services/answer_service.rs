use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Answer, AnswerResponse, AuthorInfo, CommentResponse},
    services::{comment_service, vote_service},
};

#[derive(sqlx::FromRow)]
struct AnswerRow {
    id: Uuid,
    question_id: Uuid,
    content: String,
    is_useful: Option<bool>,
    created_at: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
    author_image_path: Option<String>,
    count_up: i32,
    count_down: i32,
}

impl AnswerRow {
    fn into_response(self, comments: Vec<CommentResponse>) -> AnswerResponse {
        AnswerResponse {
            id: self.id,
            question_id: self.question_id,
            content: self.content,
            author: AuthorInfo::new(self.author_id, self.author_username, self.author_image_path),
            is_useful: self.is_useful,
            count_up: self.count_up,
            count_down: self.count_down,
            total: self.count_up + self.count_down,
            comments,
            created_at: self.created_at,
        }
    }
}

const ANSWER_ROW_QUERY: &str = r#"
    SELECT a.id, a.question_id, a.content, a.is_useful, a.created_at,
           u.id AS author_id, u.username AS author_username,
           u.image_path AS author_image_path,
           COALESCE(v.count_up, 0) AS count_up,
           COALESCE(v.count_down, 0) AS count_down
    FROM answers a
    JOIN users u ON a.author_id = u.id
    LEFT JOIN votings v ON a.voting_id = v.id
"#;

pub async fn create_answer(
    db: &PgPool,
    question_id: Uuid,
    author_id: Uuid,
    content: &str,
) -> Result<AnswerResponse> {
    let mut tx = db.begin().await?;

    // Every answer carries a zeroed voting record from the start.
    let voting_id = vote_service::create_voting(&mut tx).await?;
    let answer_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO answers (id, question_id, author_id, content, voting_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(answer_id)
    .bind(question_id)
    .bind(author_id)
    .bind(content)
    .bind(voting_id)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_answer_response(db, answer_id)
        .await?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created answer".to_string()))
}

pub async fn get_answer(db: &PgPool, answer_id: Uuid) -> Result<Option<Answer>> {
    let answer = sqlx::query_as::<_, Answer>("SELECT * FROM answers WHERE id = $1")
        .bind(answer_id)
        .fetch_optional(db)
        .await?;

    Ok(answer)
}

// Resolve an answer only if it belongs to the given question's thread.
pub async fn get_answer_in_question(
    db: &PgPool,
    answer_id: Uuid,
    question_id: Uuid,
) -> Result<Option<Answer>> {
    let answer =
        sqlx::query_as::<_, Answer>("SELECT * FROM answers WHERE id = $1 AND question_id = $2")
            .bind(answer_id)
            .bind(question_id)
            .fetch_optional(db)
            .await?;

    Ok(answer)
}

pub async fn get_answer_response(db: &PgPool, answer_id: Uuid) -> Result<Option<AnswerResponse>> {
    let query = format!("{ANSWER_ROW_QUERY} WHERE a.id = $1");

    let row = sqlx::query_as::<_, AnswerRow>(&query)
        .bind(answer_id)
        .fetch_optional(db)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let comments = comment_service::comments_for_answers(db, &[row.id]).await?;

    Ok(Some(row.into_response(comments)))
}

// Thread order: marked-useful state first (unset sorts last), then oldest first.
pub async fn answers_for_question(db: &PgPool, question_id: Uuid) -> Result<Vec<AnswerResponse>> {
    let query = format!(
        "{ANSWER_ROW_QUERY} WHERE a.question_id = $1 ORDER BY a.is_useful ASC, a.created_at ASC"
    );

    let rows = sqlx::query_as::<_, AnswerRow>(&query)
        .bind(question_id)
        .fetch_all(db)
        .await?;

    let answer_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut by_answer: HashMap<Uuid, Vec<CommentResponse>> = HashMap::new();

    for comment in comment_service::comments_for_answers(db, &answer_ids).await? {
        if let Some(answer_id) = comment.answer_id {
            by_answer.entry(answer_id).or_default().push(comment);
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let comments = by_answer.remove(&row.id).unwrap_or_default();
            row.into_response(comments)
        })
        .collect())
}

pub async fn set_usefulness(db: &PgPool, answer_id: Uuid, state: Option<bool>) -> Result<()> {
    sqlx::query("UPDATE answers SET is_useful = $1 WHERE id = $2")
        .bind(state)
        .bind(answer_id)
        .execute(db)
        .await?;

    Ok(())
}

pub async fn update_content(db: &PgPool, answer_id: Uuid, content: &str) -> Result<()> {
    sqlx::query("UPDATE answers SET content = $1 WHERE id = $2")
        .bind(content)
        .bind(answer_id)
        .execute(db)
        .await?;

    Ok(())
}

// Removing an answer takes its comments, vote ledger and voting record
// with it, all in one transaction.
pub async fn delete_answer(db: &PgPool, answer_id: Uuid) -> Result<()> {
    let mut tx = db.begin().await?;

    let row: Option<(Option<Uuid>,)> =
        sqlx::query_as("SELECT voting_id FROM answers WHERE id = $1 FOR UPDATE")
            .bind(answer_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((voting_id,)) = row else {
        return Err(AppError::NotFound("Answer not found".to_string()));
    };

    sqlx::query("DELETE FROM comments WHERE answer_id = $1")
        .bind(answer_id)
        .execute(&mut *tx)
        .await?;

    if let Some(voting_id) = voting_id {
        sqlx::query("DELETE FROM user_votings WHERE voting_id = $1")
            .bind(voting_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("DELETE FROM answers WHERE id = $1")
        .bind(answer_id)
        .execute(&mut *tx)
        .await?;

    if let Some(voting_id) = voting_id {
        sqlx::query("DELETE FROM votings WHERE id = $1")
            .bind(voting_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(())
}
