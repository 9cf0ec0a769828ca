use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
};

pub const SESSION_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String, // session id for logout
}

impl Claims {
    pub fn new(user_id: Uuid, username: String, jwt_secret: &str) -> Result<(String, Self)> {
        let now = Utc::now();
        let exp = now + Duration::hours(SESSION_HOURS);
        let jti = Uuid::new_v4().to_string();

        let claims = Self {
            sub: user_id.to_string(),
            username,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt_secret.as_ref()),
        )?;

        Ok((token, claims))
    }

    pub fn verify(token: &str, jwt_secret: &str) -> Result<Self> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(jwt_secret.as_ref()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

// Session rows back the tokens: a JWT is only honored while its jti is still
// stored, so logout can kill it before exp.
pub async fn store_session(db: &PgPool, user_id: Uuid, claims: &Claims) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sessions (id, user_id, token_jti, expires_at, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&claims.jti)
    .bind(claims.expires_at())
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(())
}

pub async fn revoke_session(db: &PgPool, jti: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token_jti = $1")
        .bind(jti)
        .execute(db)
        .await?;

    Ok(())
}

async fn session_user(db: &PgPool, jti: &str) -> Result<Option<Uuid>> {
    let user_id: Option<(Uuid,)> =
        sqlx::query_as("SELECT user_id FROM sessions WHERE token_jti = $1 AND expires_at > NOW()")
            .bind(jti)
            .fetch_optional(db)
            .await?;

    Ok(user_id.map(|(id,)| id))
}

#[derive(Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub jti: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Authentication("Missing authorization header".to_string()))?;

        let claims = Claims::verify(bearer.token(), &state.config.jwt_secret)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Authentication("Invalid user ID in token".to_string()))?;

        match session_user(&state.db, &claims.jti).await? {
            Some(stored_user_id) if stored_user_id == user_id => {}
            Some(_) => return Err(AppError::Authentication("Invalid session".to_string())),
            None => return Err(AppError::Authentication("Session expired".to_string())),
        }

        Ok(AuthUser {
            user_id,
            username: claims.username,
            jti: claims.jti,
        })
    }
}

// Password hashing utilities
pub fn hash_password(password: &str) -> Result<String> {
    let cost = 12;
    bcrypt::hash(password, cost).map_err(AppError::from)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_round_trip() {
        let user_id = Uuid::new_v4();
        let (token, claims) =
            Claims::new(user_id, "alice".to_string(), "test-secret").expect("encode");

        let decoded = Claims::verify(&token, "test-secret").expect("decode");
        assert_eq!(decoded.sub, user_id.to_string());
        assert_eq!(decoded.username, "alice");
        assert_eq!(decoded.jti, claims.jti);
        assert!(decoded.exp > decoded.iat);
    }

    #[test]
    fn claims_reject_wrong_secret() {
        let (token, _) =
            Claims::new(Uuid::new_v4(), "alice".to_string(), "test-secret").expect("encode");

        assert!(Claims::verify(&token, "other-secret").is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = bcrypt::hash("hunter22", 4).expect("hash");
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }
}
