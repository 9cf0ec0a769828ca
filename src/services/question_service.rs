use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{AuthorInfo, Question, QuestionListItem, QuestionResponse, ThreadResponse},
    services::{answer_service, tag_service, vote_service},
};

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: Uuid,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
    author_image_path: Option<String>,
    count_up: i32,
    count_down: i32,
}

#[derive(sqlx::FromRow)]
struct QuestionListRow {
    id: Uuid,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_id: Uuid,
    author_username: String,
    author_image_path: Option<String>,
    count_up: i32,
    count_down: i32,
    answer_count: i64,
}

pub async fn list_questions(db: &PgPool) -> Result<Vec<QuestionListItem>> {
    let rows = sqlx::query_as::<_, QuestionListRow>(
        r#"
        SELECT q.id, q.title, q.content, q.created_at, q.updated_at,
               u.id AS author_id, u.username AS author_username,
               u.image_path AS author_image_path,
               COALESCE(v.count_up, 0) AS count_up,
               COALESCE(v.count_down, 0) AS count_down,
               (SELECT COUNT(*) FROM answers a WHERE a.question_id = q.id) AS answer_count
        FROM questions q
        JOIN users u ON q.author_id = u.id
        LEFT JOIN votings v ON q.voting_id = v.id
        ORDER BY q.created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    let mut items = Vec::with_capacity(rows.len());

    for row in rows {
        let tags = tag_service::tags_for_question(db, row.id).await?;

        items.push(QuestionListItem {
            id: row.id,
            title: row.title,
            content: row.content,
            author: AuthorInfo::new(row.author_id, row.author_username, row.author_image_path),
            tags,
            total: row.count_up + row.count_down,
            answer_count: row.answer_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        });
    }

    Ok(items)
}

pub async fn get_question(db: &PgPool, question_id: Uuid) -> Result<Option<Question>> {
    let question = sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = $1")
        .bind(question_id)
        .fetch_optional(db)
        .await?;

    Ok(question)
}

pub async fn get_question_response(
    db: &PgPool,
    question_id: Uuid,
) -> Result<Option<QuestionResponse>> {
    let row = sqlx::query_as::<_, QuestionRow>(
        r#"
        SELECT q.id, q.title, q.content, q.created_at, q.updated_at,
               u.id AS author_id, u.username AS author_username,
               u.image_path AS author_image_path,
               COALESCE(v.count_up, 0) AS count_up,
               COALESCE(v.count_down, 0) AS count_down
        FROM questions q
        JOIN users u ON q.author_id = u.id
        LEFT JOIN votings v ON q.voting_id = v.id
        WHERE q.id = $1
        "#,
    )
    .bind(question_id)
    .fetch_optional(db)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let tags = tag_service::tags_for_question(db, row.id).await?;

    Ok(Some(QuestionResponse {
        id: row.id,
        title: row.title,
        content: row.content,
        author: AuthorInfo::new(row.author_id, row.author_username, row.author_image_path),
        tags,
        count_up: row.count_up,
        count_down: row.count_down,
        total: row.count_up + row.count_down,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

pub async fn create_question(
    db: &PgPool,
    author_id: Uuid,
    title: &str,
    content: &str,
    tag_ids: &[Uuid],
) -> Result<QuestionResponse> {
    let mut tx = db.begin().await?;

    // Every question carries a zeroed voting record from the start.
    let voting_id = vote_service::create_voting(&mut tx).await?;
    let question_id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO questions (id, title, content, author_id, voting_id, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(question_id)
    .bind(title)
    .bind(content)
    .bind(author_id)
    .bind(voting_id)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    attach_tags(&mut tx, question_id, tag_ids).await?;

    tx.commit().await?;

    get_question_response(db, question_id)
        .await?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created question".to_string()))
}

// Edits replace title and content and swap the tag set wholesale.
pub async fn update_question(
    db: &PgPool,
    question_id: Uuid,
    title: &str,
    content: &str,
    tag_ids: &[Uuid],
) -> Result<QuestionResponse> {
    let mut tx = db.begin().await?;

    sqlx::query("UPDATE questions SET title = $1, content = $2, updated_at = $3 WHERE id = $4")
        .bind(title)
        .bind(content)
        .bind(Utc::now())
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM question_tags WHERE question_id = $1")
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

    attach_tags(&mut tx, question_id, tag_ids).await?;

    tx.commit().await?;

    get_question_response(db, question_id)
        .await?
        .ok_or_else(|| AppError::Internal("Failed to retrieve updated question".to_string()))
}

async fn attach_tags(
    tx: &mut Transaction<'_, Postgres>,
    question_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<()> {
    for tag_id in tag_ids {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tags WHERE id = $1")
            .bind(tag_id)
            .fetch_optional(&mut **tx)
            .await?;

        if exists.is_none() {
            return Err(AppError::NotFound("Tag not found".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO question_tags (question_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(question_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub async fn get_thread(db: &PgPool, question_id: Uuid) -> Result<Option<ThreadResponse>> {
    let Some(question) = get_question_response(db, question_id).await? else {
        return Ok(None);
    };

    let answers = answer_service::answers_for_question(db, question_id).await?;

    Ok(Some(ThreadResponse { question, answers }))
}

// Removing a question takes the whole thread with it: answers, their
// comments, both vote ledgers and voting records, and the tag links.
// All of it happens in one transaction.
pub async fn delete_question(db: &PgPool, question_id: Uuid) -> Result<()> {
    let mut tx = db.begin().await?;

    let row: Option<(Option<Uuid>,)> =
        sqlx::query_as("SELECT voting_id FROM questions WHERE id = $1 FOR UPDATE")
            .bind(question_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((question_voting_id,)) = row else {
        return Err(AppError::NotFound("Question not found".to_string()));
    };

    let answer_rows: Vec<(Uuid, Option<Uuid>)> =
        sqlx::query_as("SELECT id, voting_id FROM answers WHERE question_id = $1")
            .bind(question_id)
            .fetch_all(&mut *tx)
            .await?;

    let answer_ids: Vec<Uuid> = answer_rows.iter().map(|(id, _)| *id).collect();

    let mut voting_ids: Vec<Uuid> = answer_rows
        .iter()
        .filter_map(|(_, voting_id)| *voting_id)
        .collect();
    voting_ids.extend(question_voting_id);

    sqlx::query("DELETE FROM comments WHERE answer_id = ANY($1)")
        .bind(&answer_ids)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM user_votings WHERE voting_id = ANY($1)")
        .bind(&voting_ids)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM question_tags WHERE question_id = $1")
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM answers WHERE question_id = $1")
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM votings WHERE id = ANY($1)")
        .bind(&voting_ids)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}
