use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Voting {
    pub id: Uuid,
    pub count_up: i32,
    pub count_down: i32,
}

impl Voting {
    // Sum of both counters, not up minus down.
    pub fn total(&self) -> i32 {
        self.count_up + self.count_down
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserVoting {
    pub id: Uuid,
    pub user_id: Uuid,
    pub voting_id: Uuid,
    pub value: i32,
    pub created_at: DateTime<Utc>,
}

// Vote request: positive values count up, negative count down. Zero is rejected.
#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub value: i32,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub count_up: i32,
    pub count_down: i32,
    pub total: i32,
}

impl From<Voting> for VoteResponse {
    fn from(voting: Voting) -> Self {
        Self {
            count_up: voting.count_up,
            count_down: voting.count_down,
            total: voting.total(),
        }
    }
}
