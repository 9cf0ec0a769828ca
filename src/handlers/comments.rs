use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{EditTarget, UpdateCommentRequest},
    services::{answer_service, comment_service, question_service},
};

// The edit route addresses comments, but a nil comment id selects the answer
// itself as the editable record (EditTarget::resolve). Both branches share
// the same form shape: one content field.

pub async fn get_comment_for_edit(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((question_id, answer_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<Value>> {
    let _question = question_service::get_question(&state.db, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    match EditTarget::resolve(answer_id, comment_id) {
        EditTarget::Answer(answer_id) => {
            let answer = answer_service::get_answer(&state.db, answer_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Answer not found".to_string()))?;

            if answer.author_id != auth_user.user_id {
                return Err(AppError::Authorization(
                    "Only the author can edit this answer".to_string(),
                ));
            }

            Ok(Json(json!({
                "question_id": question_id,
                "kind": "answer",
                "id": answer.id,
                "content": answer.content
            })))
        }
        EditTarget::Comment(comment_id) => {
            let comment = comment_service::get_comment(&state.db, comment_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

            if comment.author_id != auth_user.user_id {
                return Err(AppError::Authorization(
                    "Only the author can edit this comment".to_string(),
                ));
            }

            Ok(Json(json!({
                "question_id": question_id,
                "kind": "comment",
                "id": comment.id,
                "content": comment.content
            })))
        }
    }
}

pub async fn update_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((question_id, answer_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Value>> {
    payload.validate()?;

    let _question = question_service::get_question(&state.db, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    match EditTarget::resolve(answer_id, comment_id) {
        EditTarget::Answer(answer_id) => {
            let answer = answer_service::get_answer(&state.db, answer_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Answer not found".to_string()))?;

            if answer.author_id != auth_user.user_id {
                return Err(AppError::Authorization(
                    "Only the author can edit this answer".to_string(),
                ));
            }

            answer_service::update_content(&state.db, answer.id, &payload.content).await?;

            Ok(Json(json!({
                "message": "Answer updated successfully",
                "kind": "answer",
                "id": answer.id,
                "content": payload.content
            })))
        }
        EditTarget::Comment(comment_id) => {
            let comment = comment_service::get_comment(&state.db, comment_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

            if comment.author_id != auth_user.user_id {
                return Err(AppError::Authorization(
                    "Only the author can edit this comment".to_string(),
                ));
            }

            comment_service::update_content(&state.db, comment.id, &payload.content).await?;

            Ok(Json(json!({
                "message": "Comment updated successfully",
                "kind": "comment",
                "id": comment.id,
                "content": payload.content
            })))
        }
    }
}

pub async fn delete_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let comment = comment_service::get_comment(&state.db, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    if comment.author_id != auth_user.user_id {
        return Err(AppError::Authorization(
            "Only the author can delete this comment".to_string(),
        ));
    }

    comment_service::delete_comment(&state.db, comment_id).await?;

    Ok(Json(json!({
        "message": "Comment deleted successfully"
    })))
}
