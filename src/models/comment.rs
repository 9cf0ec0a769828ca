use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::AuthorInfo;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub answer_id: Option<Uuid>,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// Update request shared by comment edits and answer-as-comment edits.
#[derive(Debug, Validate, Deserialize)]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 1000))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub answer_id: Option<Uuid>,
    pub content: String,
    pub author: AuthorInfo,
    pub created_at: DateTime<Utc>,
}

/// What the comment-edit route actually edits. The route carries both an
/// answer id and a comment id; a nil comment id selects the answer itself as
/// the editable record, any other id selects that comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Answer(Uuid),
    Comment(Uuid),
}

impl EditTarget {
    pub fn resolve(answer_id: Uuid, comment_id: Uuid) -> Self {
        if comment_id.is_nil() {
            EditTarget::Answer(answer_id)
        } else {
            EditTarget::Comment(comment_id)
        }
    }
}
