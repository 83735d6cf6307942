//! Multipart form collection.

use std::collections::HashMap;

use axum::extract::Multipart;

use yv_models::Privacy;

use crate::error::{ApiError, ApiResult};

/// An uploaded file part.
#[derive(Debug, Clone)]
pub struct FormFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Text fields and file parts of one multipart body.
#[derive(Debug, Default)]
pub struct Form {
    text: HashMap<String, String>,
    files: HashMap<String, FormFile>,
}

impl Form {
    /// Buffer every part. Parts with a file name are files; a file part
    /// without content is dropped.
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Form::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await?.to_vec();
                    if data.is_empty() {
                        continue;
                    }
                    form.files.insert(name, FormFile { file_name, data });
                }
                None => {
                    let value = field.text().await?;
                    form.text.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<FormFile> {
        self.files.remove(name)
    }

    /// Required file part.
    pub fn require_file(&mut self, name: &str) -> ApiResult<FormFile> {
        self.take_file(name)
            .ok_or_else(|| ApiError::validation(format!("Missing file field '{}'", name)))
    }

    /// `privacy` as a name or code. Absent means public.
    pub fn privacy(&self) -> ApiResult<Privacy> {
        match self.text("privacy").filter(|p| !p.trim().is_empty()) {
            Some(raw) => raw.parse().map_err(ApiError::validation),
            None => Ok(Privacy::Public),
        }
    }
}
