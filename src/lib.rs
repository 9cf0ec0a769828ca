pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{delete, get, post, put},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .allowed_origins
                .iter()
                .map(|origin| origin.parse::<HeaderValue>().unwrap())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/questions", get(handlers::questions::list_questions))
        .route(
            "/api/questions/{question_id}",
            get(handlers::questions::view_thread),
        )
        // The usefulness toggle carries no auth gate; anyone on the thread
        // can flip it.
        .route(
            "/api/questions/{question_id}/answers/{answer_id}/toggle-useful",
            post(handlers::answers::toggle_useful),
        )
        .route("/api/tags", get(handlers::tags::list_tags));

    // Protected routes
    let protected_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Question routes
        .route("/api/questions", post(handlers::questions::create_question))
        .route(
            "/api/questions/{question_id}/edit",
            get(handlers::questions::get_question_for_edit),
        )
        .route(
            "/api/questions/{question_id}",
            put(handlers::questions::update_question),
        )
        .route(
            "/api/questions/{question_id}",
            delete(handlers::questions::delete_question),
        )
        .route(
            "/api/questions/{question_id}/replies",
            post(handlers::questions::create_reply),
        )
        .route(
            "/api/questions/{question_id}/vote",
            post(handlers::questions::vote_question),
        )
        // Answer routes
        .route(
            "/api/answers/{answer_id}",
            delete(handlers::answers::delete_answer),
        )
        .route(
            "/api/answers/{answer_id}/vote",
            post(handlers::answers::vote_answer),
        )
        // Comment routes
        .route(
            "/api/questions/{question_id}/answers/{answer_id}/comments/{comment_id}/edit",
            get(handlers::comments::get_comment_for_edit),
        )
        .route(
            "/api/questions/{question_id}/answers/{answer_id}/comments/{comment_id}",
            put(handlers::comments::update_comment),
        )
        .route(
            "/api/comments/{comment_id}",
            delete(handlers::comments::delete_comment),
        )
        // User routes
        .route(
            "/api/users/{user_id}/profile",
            get(handlers::users::view_profile),
        )
        .route(
            "/api/users/{user_id}/profile/photo",
            // The photo route has to accept bodies up to the configured
            // maximum; axum's default cap is smaller and would reject them
            // before the upload size check runs.
            post(handlers::users::upload_profile_photo)
                .layer(DefaultBodyLimit::max(state.config.max_file_size)),
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Stored profile images are served straight from the upload root.
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
