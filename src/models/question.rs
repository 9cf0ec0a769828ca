use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::{AnswerResponse, AuthorInfo, Tag};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub voting_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Create question request
#[derive(Debug, Validate, Deserialize)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<Uuid>,
}

// Update question request: edits replace title, content and the whole tag set.
#[derive(Debug, Validate, Deserialize)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: AuthorInfo,
    pub tags: Vec<Tag>,
    pub count_up: i32,
    pub count_down: i32,
    pub total: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Question list response (for the front page, most recent first)
#[derive(Debug, Serialize)]
pub struct QuestionListItem {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: AuthorInfo,
    pub tags: Vec<Tag>,
    pub total: i32,
    pub answer_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// A question with its answers and their comments.
#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub question: QuestionResponse,
    pub answers: Vec<AnswerResponse>,
}
