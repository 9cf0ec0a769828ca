use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{CastVoteRequest, toggled_usefulness},
    services::{answer_service, vote_service},
};

// Flips the answer's usefulness mark between unset and marked. Anyone on
// the thread can flip it, so no authorship check here.
pub async fn toggle_useful(
    State(state): State<AppState>,
    Path((question_id, answer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>> {
    let answer = answer_service::get_answer_in_question(&state.db, answer_id, question_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Answer not found".to_string()))?;

    let new_state = toggled_usefulness(answer.is_useful);
    answer_service::set_usefulness(&state.db, answer.id, new_state).await?;

    Ok(Json(json!({
        "answer_id": answer.id,
        "is_useful": new_state
    })))
}

pub async fn delete_answer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(answer_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let answer = answer_service::get_answer(&state.db, answer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Answer not found".to_string()))?;

    if answer.author_id != auth_user.user_id {
        return Err(AppError::Authorization(
            "Only the author can delete this answer".to_string(),
        ));
    }

    answer_service::delete_answer(&state.db, answer_id).await?;

    Ok(Json(json!({
        "message": "Answer deleted successfully"
    })))
}

pub async fn vote_answer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(answer_id): Path<Uuid>,
    Json(payload): Json<CastVoteRequest>,
) -> Result<Json<Value>> {
    if payload.value == 0 {
        return Err(AppError::BadRequest(
            "Vote value must be nonzero".to_string(),
        ));
    }

    let votes =
        vote_service::cast_answer_vote(&state.db, auth_user.user_id, answer_id, payload.value)
            .await?;

    Ok(Json(json!({
        "message": "Vote recorded",
        "votes": votes
    })))
}
