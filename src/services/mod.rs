pub mod answer_service;
pub mod comment_service;
pub mod question_service;
pub mod tag_service;
pub mod upload_service;
pub mod user_service;
pub mod vote_service;
