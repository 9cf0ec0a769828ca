use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, Claims, hash_password, revoke_session, store_session, verify_password},
    error::{AppError, Result},
    models::UserResponse,
    services::user_service,
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    let existing_user = user_service::get_user_by_username(&state.db, &payload.username).await?;
    if existing_user.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = user_service::create_user(&state.db, &payload.username, &password_hash).await?;

    // Registering logs the new user straight in.
    let (token, claims) = Claims::new(user.id, user.username.clone(), &state.config.jwt_secret)?;
    store_session(&state.db, user.id, &claims).await?;

    tracing::info!(username = %user.username, "new user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "user": UserResponse::from(user)
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let user = user_service::get_user_by_username(&state.db, &payload.username)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Authentication("Invalid credentials".to_string()));
    }

    let (token, claims) = Claims::new(user.id, user.username.clone(), &state.config.jwt_secret)?;
    store_session(&state.db, user.id, &claims).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": UserResponse::from(user)
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>> {
    revoke_session(&state.db, &auth_user.jti).await?;

    Ok(Json(json!({
        "message": "Logout successful"
    })))
}
