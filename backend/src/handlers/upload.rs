//! Multipart form parsing for the create endpoints that accept images

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::config::UploadConfig;
use crate::error::{AppError, AppResult};
use crate::external::UploadedFile;

/// Most files accepted in a single request
pub const MAX_FILES_PER_REQUEST: usize = 10;

/// Text fields and files from a multipart body. Files are checked against
/// the upload limits while reading, before anything is stored.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart, limits: &UploadConfig) -> AppResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation("form", e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            let Some(file_name) = field.file_name().map(str::to_string) else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(name.clone(), e.body_text()))?;
                form.fields.insert(name, value);
                continue;
            };

            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(name.clone(), e.body_text()))?;

            // Browsers send an empty part for an untouched file input
            if bytes.is_empty() && file_name.is_empty() {
                continue;
            }

            form.push_file(
                &name,
                UploadedFile {
                    original_name: file_name,
                    mime_type,
                    bytes,
                },
                limits,
            )?;
        }

        Ok(form)
    }

    fn push_file(&mut self, field: &str, file: UploadedFile, limits: &UploadConfig) -> AppResult<()> {
        if !limits.allowed_mime_types.iter().any(|m| m == &file.mime_type) {
            return Err(AppError::validation(
                field,
                format!("{} is not an accepted image type", file.mime_type),
            ));
        }
        if file.bytes.len() > limits.max_file_bytes {
            return Err(AppError::validation(
                field,
                format!(
                    "{} is larger than the {} byte limit",
                    file.original_name, limits.max_file_bytes
                ),
            ));
        }
        if self.files.len() >= MAX_FILES_PER_REQUEST {
            return Err(AppError::validation(
                field,
                format!("at most {} images per request", MAX_FILES_PER_REQUEST),
            ));
        }

        self.files.push(file);
        Ok(())
    }

    /// Raw text field, if present
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Text field, treating a blank value as absent
    pub fn non_blank(&self, name: &str) -> Option<&str> {
        self.text(name).filter(|value| !value.trim().is_empty())
    }

    /// Text field that must be present
    pub fn required(&self, name: &str) -> AppResult<&str> {
        self.text(name)
            .ok_or_else(|| AppError::validation(name, format!("{} is required", name)))
    }
}
