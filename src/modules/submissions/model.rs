use anyhow::anyhow;
use axum::extract::{Multipart, multipart::MultipartError};
use rand::Rng;

use classhub_core::{AppError, StorageError};

/// A file part received in a multipart submission form.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// Lowercased extension of the client-side file name, if any.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// Fields of the create/resubmit form. Unknown fields are ignored.
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub assignment: Option<String>,
    pub student: Option<String>,
    pub submission_text: Option<String>,
    pub file: Option<FileUpload>,
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::new(err.status(), anyhow!(err.body_text()))
}

impl SubmissionForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "assignment" => {
                    form.assignment = Some(field.text().await.map_err(multipart_error)?)
                }
                "student" => form.student = Some(field.text().await.map_err(multipart_error)?),
                "submission_text" => {
                    form.submission_text = Some(field.text().await.map_err(multipart_error)?)
                }
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    // An empty file part means no file was chosen.
                    if !bytes.is_empty() {
                        form.file = Some(FileUpload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                other => tracing::debug!(field = %other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

/// Validator for submission uploads: size, extension and MIME type.
pub struct SubmissionFileValidator;

impl SubmissionFileValidator {
    pub const ALLOWED_EXTENSIONS: &'static [&'static str] =
        &["jpeg", "jpg", "png", "gif", "pdf", "doc", "docx", "txt", "rtf"];

    pub const ALLOWED_MIME_TYPES: &'static [&'static str] = &[
        "image/jpeg",
        "image/png",
        "image/gif",
        "application/pdf",
        "application/msword",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "text/plain",
        "application/rtf",
        "text/rtf",
    ];

    /// Returns the extension the stored file will carry.
    pub fn validate(upload: &FileUpload, max_bytes: usize) -> Result<String, AppError> {
        if upload.bytes.len() > max_bytes {
            return Err(StorageError::InvalidFileSize { max_bytes }.into());
        }

        let extension = upload.extension().unwrap_or_default();
        if !Self::ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(StorageError::InvalidExtension {
                received: extension,
                allowed: Self::ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            }
            .into());
        }

        let mime = upload.content_type.to_ascii_lowercase();
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if !Self::ALLOWED_MIME_TYPES.contains(&essence) {
            return Err(StorageError::InvalidMimeType {
                received: upload.content_type.clone(),
                allowed: Self::ALLOWED_MIME_TYPES.iter().map(|s| s.to_string()).collect(),
            }
            .into());
        }

        Ok(extension)
    }

    /// `submissions/submission-<millis>-<random>.<ext>`
    pub fn storage_key(extension: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        format!("submissions/submission-{}-{}.{}", millis, suffix, extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 10 * 1024 * 1024;

    fn upload(name: &str, content_type: &str, size: usize) -> FileUpload {
        FileUpload {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn test_accepts_documents_and_images() {
        let pdf = upload("essay.PDF", "application/pdf", 1024);
        assert_eq!(SubmissionFileValidator::validate(&pdf, MAX).unwrap(), "pdf");
        let text = upload("notes.txt", "text/plain; charset=utf-8", 10);
        assert!(SubmissionFileValidator::validate(&text, MAX).is_ok());
        let photo = upload("photo.jpg", "image/jpeg", 10);
        assert!(SubmissionFileValidator::validate(&photo, MAX).is_ok());
    }

    #[test]
    fn test_rejects_disallowed_extension() {
        let file = upload("script.exe", "application/pdf", 10);
        let err = SubmissionFileValidator::validate(&file, MAX).unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
        assert!(err.error.to_string().contains("exe"));
    }

    #[test]
    fn test_rejects_disallowed_mime_type() {
        let file = upload("essay.pdf", "application/x-msdownload", 10);
        let err = SubmissionFileValidator::validate(&file, MAX).unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
    }

    #[test]
    fn test_rejects_oversized_file() {
        let file = upload("big.pdf", "application/pdf", 11);
        let err = SubmissionFileValidator::validate(&file, 10).unwrap_err();
        assert_eq!(err.status.as_u16(), 400);
    }

    #[test]
    fn test_storage_key_shape() {
        let key = SubmissionFileValidator::storage_key("pdf");
        assert!(key.starts_with("submissions/submission-"));
        assert!(key.ends_with(".pdf"));
        assert_eq!(key.matches('-').count(), 2);
    }
}
