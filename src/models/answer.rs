use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{AuthorInfo, CommentResponse};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub is_useful: Option<bool>,
    pub voting_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub id: Uuid,
    pub question_id: Uuid,
    pub content: String,
    pub author: AuthorInfo,
    pub is_useful: Option<bool>,
    pub count_up: i32,
    pub count_down: i32,
    pub total: i32,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
}

// The usefulness flag is bistable: marked answers drop back to unset, anything
// else (unset, or a stray stored false) becomes marked. An explicit false is
// never written.
pub fn toggled_usefulness(current: Option<bool>) -> Option<bool> {
    match current {
        Some(true) => None,
        _ => Some(true),
    }
}
