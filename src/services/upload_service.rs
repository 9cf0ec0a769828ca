use std::path::{Path, PathBuf};

use tokio::{fs, fs::File, io::AsyncWriteExt};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub struct UploadService {
    upload_dir: String,
    max_file_size: usize,
}

impl UploadService {
    pub fn new(upload_dir: String, max_file_size: usize) -> Self {
        Self {
            upload_dir,
            max_file_size,
        }
    }

    // Validates and stores a profile image, returning the path relative to
    // the upload root. That relative path is what gets persisted on the user.
    pub async fn store_profile_image(
        &self,
        user_id: Uuid,
        filename: &str,
        data: &[u8],
    ) -> Result<String> {
        if data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }

        if data.len() > self.max_file_size {
            return Err(AppError::ContentTooLarge);
        }

        let filename = sanitize_filename(filename)
            .ok_or_else(|| AppError::BadRequest("Invalid file name".to_string()))?;

        let mime = mime_guess::from_path(&filename).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err(AppError::UnsupportedMediaType);
        }

        // Decode before writing anything so a renamed non-image gets rejected.
        image::load_from_memory(data)
            .map_err(|err| AppError::BadRequest(format!("Invalid image data: {}", err)))?;

        let relative_path = user_image_path(user_id, &filename);
        let destination = PathBuf::from(&self.upload_dir).join(&relative_path);

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = File::create(&destination).await?;
        file.write_all(data).await?;
        file.flush().await?;

        Ok(relative_path)
    }
}

// Per-user directory layout, one subtree per account.
fn user_image_path(user_id: Uuid, filename: &str) -> String {
    format!("profile_picture/user_{}/{}", user_id, filename)
}

// Strips any directory components so the client cannot steer the write
// location. Names that reduce to nothing are rejected.
fn sanitize_filename(raw: &str) -> Option<String> {
    let name = Path::new(raw).file_name()?.to_str()?;

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let image = image::DynamicImage::ImageRgba8(image::RgbaImage::new(1, 1));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn sanitize_strips_directory_components() {
        assert_eq!(
            sanitize_filename("../../etc/passwd"),
            Some("passwd".to_string())
        );
        assert_eq!(
            sanitize_filename("photos/me.png"),
            Some("me.png".to_string())
        );
        assert_eq!(sanitize_filename("avatar.png"), Some("avatar.png".to_string()));
    }

    #[test]
    fn sanitize_rejects_names_that_reduce_to_nothing() {
        assert_eq!(sanitize_filename(""), None);
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename("photos/"), Some("photos".to_string()));
    }

    #[test]
    fn image_paths_are_scoped_per_user() {
        let user_id = Uuid::new_v4();
        assert_eq!(
            user_image_path(user_id, "avatar.png"),
            format!("profile_picture/user_{}/avatar.png", user_id)
        );
    }

    #[tokio::test]
    async fn stores_a_valid_png_under_the_user_directory() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(dir.path().to_str().unwrap().to_string(), 1024 * 1024);
        let user_id = Uuid::new_v4();

        let relative = service
            .store_profile_image(user_id, "avatar.png", &png_bytes())
            .await
            .unwrap();

        assert_eq!(
            relative,
            format!("profile_picture/user_{}/avatar.png", user_id)
        );
        assert!(dir.path().join(&relative).exists());
    }

    #[tokio::test]
    async fn rejects_files_over_the_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(dir.path().to_str().unwrap().to_string(), 8);

        let result = service
            .store_profile_image(Uuid::new_v4(), "avatar.png", &png_bytes())
            .await;

        assert!(matches!(result, Err(AppError::ContentTooLarge)));
    }

    #[tokio::test]
    async fn rejects_non_image_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(dir.path().to_str().unwrap().to_string(), 1024 * 1024);

        let result = service
            .store_profile_image(Uuid::new_v4(), "notes.txt", &png_bytes())
            .await;

        assert!(matches!(result, Err(AppError::UnsupportedMediaType)));
    }

    #[tokio::test]
    async fn rejects_bytes_that_do_not_decode_as_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(dir.path().to_str().unwrap().to_string(), 1024 * 1024);

        let result = service
            .store_profile_image(Uuid::new_v4(), "avatar.png", b"not an image")
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
