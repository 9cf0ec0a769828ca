use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{CastVoteRequest, CreateQuestionRequest, UpdateQuestionRequest},
    services::{answer_service, comment_service, question_service, tag_service, vote_service},
};

// A reply posted into a thread. With `reply_to` set it becomes a comment
// on that answer; without it, a new answer to the question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReplyRequest {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    pub reply_to: Option<Uuid>,
}

pub async fn list_questions(State(state): State<AppState>) -> Result<Json<Value>> {
    let questions = question_service::list_questions(&state.db).await?;

    Ok(Json(json!({
        "questions": questions
    })))
}

pub async fn create_question(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    let question = question_service::create_question(
        &state.db,
        auth_user.user_id,
        &payload.title,
        &payload.content,
        &payload.tags,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Question created successfully",
            "question": question
        })),
    ))
}

pub async fn view_thread(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let thread = question_service::get_thread(&state.db, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(json!({
        "question": thread.question,
        "answers": thread.answers
    })))
}

// Pre-fills the edit form: the question plus the full tag list to pick from.
pub async fn get_question_for_edit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(question_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let question = question_service::get_question_response(&state.db, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    if question.author.id != auth_user.user_id {
        return Err(AppError::Authorization(
            "Only the author can edit this question".to_string(),
        ));
    }

    let tags = tag_service::list_tags(&state.db).await?;

    Ok(Json(json!({
        "question": question,
        "tags": tags
    })))
}

pub async fn update_question(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(question_id): Path<Uuid>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<Json<Value>> {
    payload.validate()?;

    let question = question_service::get_question(&state.db, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    if question.author_id != auth_user.user_id {
        return Err(AppError::Authorization(
            "Only the author can edit this question".to_string(),
        ));
    }

    let question = question_service::update_question(
        &state.db,
        question_id,
        &payload.title,
        &payload.content,
        &payload.tags,
    )
    .await?;

    Ok(Json(json!({
        "message": "Question updated successfully",
        "question": question
    })))
}

pub async fn delete_question(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(question_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let question = question_service::get_question(&state.db, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    if question.author_id != auth_user.user_id {
        return Err(AppError::Authorization(
            "Only the author can delete this question".to_string(),
        ));
    }

    question_service::delete_question(&state.db, question_id).await?;

    Ok(Json(json!({
        "message": "Question deleted successfully"
    })))
}

pub async fn create_reply(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(question_id): Path<Uuid>,
    Json(payload): Json<CreateReplyRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    let question = question_service::get_question(&state.db, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    match payload.reply_to {
        Some(answer_id) => {
            // The target answer has to belong to this thread.
            let answer =
                answer_service::get_answer_in_question(&state.db, answer_id, question.id)
                    .await?
                    .ok_or_else(|| {
                        AppError::NotFound("Answer not found in this thread".to_string())
                    })?;

            let comment = comment_service::create_comment(
                &state.db,
                answer.id,
                auth_user.user_id,
                &payload.content,
            )
            .await?;

            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "message": "Comment posted successfully",
                    "comment": comment
                })),
            ))
        }
        None => {
            let answer = answer_service::create_answer(
                &state.db,
                question.id,
                auth_user.user_id,
                &payload.content,
            )
            .await?;

            Ok((
                StatusCode::CREATED,
                Json(json!({
                    "message": "Answer posted successfully",
                    "answer": answer
                })),
            ))
        }
    }
}

pub async fn vote_question(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(question_id): Path<Uuid>,
    Json(payload): Json<CastVoteRequest>,
) -> Result<Json<Value>> {
    if payload.value == 0 {
        return Err(AppError::BadRequest(
            "Vote value must be nonzero".to_string(),
        ));
    }

    let votes =
        vote_service::cast_question_vote(&state.db, auth_user.user_id, question_id, payload.value)
            .await?;

    Ok(Json(json!({
        "message": "Vote recorded",
        "votes": votes
    })))
}
