use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{VoteResponse, Voting},
};

// One vote per user per voting record, enforced by the ledger's unique
// (user_id, voting_id) pair. There is no change-vote and no unvote.

pub async fn cast_question_vote(
    db: &PgPool,
    user_id: Uuid,
    question_id: Uuid,
    value: i32,
) -> Result<VoteResponse> {
    let mut tx = db.begin().await?;

    let row: Option<(Option<Uuid>,)> =
        sqlx::query_as("SELECT voting_id FROM questions WHERE id = $1 FOR UPDATE")
            .bind(question_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((voting_id,)) = row else {
        return Err(AppError::NotFound("Question not found".to_string()));
    };

    let voting_id = match voting_id {
        Some(id) => id,
        None => attach_voting(&mut tx, "questions", question_id).await?,
    };

    let response = cast(&mut tx, user_id, voting_id, value).await?;
    tx.commit().await?;

    Ok(response)
}

pub async fn cast_answer_vote(
    db: &PgPool,
    user_id: Uuid,
    answer_id: Uuid,
    value: i32,
) -> Result<VoteResponse> {
    let mut tx = db.begin().await?;

    let row: Option<(Option<Uuid>,)> =
        sqlx::query_as("SELECT voting_id FROM answers WHERE id = $1 FOR UPDATE")
            .bind(answer_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((voting_id,)) = row else {
        return Err(AppError::NotFound("Answer not found".to_string()));
    };

    let voting_id = match voting_id {
        Some(id) => id,
        None => attach_voting(&mut tx, "answers", answer_id).await?,
    };

    let response = cast(&mut tx, user_id, voting_id, value).await?;
    tx.commit().await?;

    Ok(response)
}

// Insert a zeroed voting record. Questions and answers get one at creation;
// this also backfills rows that predate that.
pub async fn create_voting(tx: &mut Transaction<'_, Postgres>) -> Result<Uuid> {
    let voting_id = Uuid::new_v4();

    sqlx::query("INSERT INTO votings (id, count_up, count_down) VALUES ($1, 0, 0)")
        .bind(voting_id)
        .execute(&mut **tx)
        .await?;

    Ok(voting_id)
}

async fn attach_voting(
    tx: &mut Transaction<'_, Postgres>,
    owner_table: &str,
    owner_id: Uuid,
) -> Result<Uuid> {
    let voting_id = create_voting(tx).await?;

    sqlx::query(&format!(
        "UPDATE {} SET voting_id = $1 WHERE id = $2",
        owner_table
    ))
    .bind(voting_id)
    .bind(owner_id)
    .execute(&mut **tx)
    .await?;

    Ok(voting_id)
}

async fn cast(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    voting_id: Uuid,
    value: i32,
) -> Result<VoteResponse> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO user_votings (id, user_id, voting_id, value, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(voting_id)
    .bind(value)
    .bind(Utc::now())
    .execute(&mut **tx)
    .await;

    if let Err(err) = inserted {
        if is_unique_violation(&err) {
            return Err(AppError::Conflict(
                "Already voted on this record".to_string(),
            ));
        }
        return Err(err.into());
    }

    // Counters are maintained alongside the ledger, in the same transaction.
    sqlx::query(&format!(
        "UPDATE votings SET {col} = {col} + 1 WHERE id = $1",
        col = counter_column(value)
    ))
    .bind(voting_id)
    .execute(&mut **tx)
    .await?;

    let voting =
        sqlx::query_as::<_, Voting>("SELECT id, count_up, count_down FROM votings WHERE id = $1")
            .bind(voting_id)
            .fetch_one(&mut **tx)
            .await?;

    Ok(VoteResponse::from(voting))
}

fn counter_column(value: i32) -> &'static str {
    if value > 0 { "count_up" } else { "count_down" }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
