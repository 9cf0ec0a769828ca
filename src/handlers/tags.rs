use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use crate::{AppState, error::Result, services::tag_service};

// The tag list backing the ask and edit forms, name-descending.
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Value>> {
    let tags = tag_service::list_tags(&state.db).await?;

    Ok(Json(json!({
        "tags": tags
    })))
}
