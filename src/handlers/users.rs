use axum::{
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{UserResponse, public_image_url},
    services::{upload_service::UploadService, user_service},
};

pub async fn view_profile(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>> {
    let user = user_service::get_user_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn upload_profile_photo(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    // Only the owner may replace their photo.
    if user_id != auth_user.user_id {
        return Err(AppError::Authorization(
            "You can only change your own profile photo".to_string(),
        ));
    }

    let (filename, file_data) = extract_image_from_multipart(&mut multipart).await?;

    tracing::debug!(
        "Storing profile photo for user {}: {} ({} bytes)",
        user_id,
        filename,
        file_data.len()
    );

    let upload_service =
        UploadService::new(state.config.upload_dir.clone(), state.config.max_file_size);
    let image_path = upload_service
        .store_profile_image(user_id, &filename, &file_data)
        .await?;

    user_service::update_image_path(&state.db, user_id, &image_path).await?;

    Ok(Json(json!({
        "message": "Profile photo updated successfully",
        "image_url": public_image_url(&image_path)
    })))
}

async fn extract_image_from_multipart(multipart: &mut Multipart) -> Result<(String, Vec<u8>)> {
    let mut filename = String::new();
    let mut file_data = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("image") => {
                filename = field.file_name().unwrap_or("unknown").to_string();
                file_data = field.bytes().await.map_err(multipart_error)?.to_vec();
            }
            _ => continue,
        }
    }

    if filename.is_empty() || file_data.is_empty() {
        return Err(AppError::BadRequest("No image provided".to_string()));
    }

    Ok((filename, file_data))
}

// A body over the route's limit surfaces mid-read as a 413-status multipart
// error; that is oversize content, not a malformed request.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::ContentTooLarge
    } else {
        AppError::BadRequest(format!("Malformed multipart body: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        extract::DefaultBodyLimit,
        http::{Request, StatusCode},
        routing::post,
    };
    use tower::ServiceExt;

    async fn extract_only(mut multipart: Multipart) -> Result<Json<Value>> {
        let (filename, data) = extract_image_from_multipart(&mut multipart).await?;
        Ok(Json(json!({"filename": filename, "len": data.len()})))
    }

    fn upload_router(body_limit: usize) -> Router {
        Router::new().route(
            "/upload",
            post(extract_only).layer(DefaultBodyLimit::max(body_limit)),
        )
    }

    fn multipart_request(field: &str, filename: &str, data: &[u8]) -> Request<Body> {
        let boundary = "askboard-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; \
                 name=\"{field}\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn image_field_within_the_limit_is_extracted() {
        let router = upload_router(64 * 1024);

        let response = router
            .oneshot(multipart_request("image", "avatar.png", &[7u8; 256]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["filename"], "avatar.png");
        assert_eq!(json["len"], 256);
    }

    #[tokio::test]
    async fn body_over_the_route_limit_is_payload_too_large() {
        let router = upload_router(1024);

        let response = router
            .oneshot(multipart_request("image", "big.png", &[0u8; 4096]))
            .await
            .unwrap();

        // 413, not a masked 500 from the field read.
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn missing_image_field_is_a_bad_request() {
        let router = upload_router(64 * 1024);

        let response = router
            .oneshot(multipart_request("attachment", "notes.txt", b"hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
