use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::{Error, Result};
use crate::services::storage_service::Upload;

pub mod applications;
pub mod auth;
pub mod chats;
pub mod coach;
pub mod health;
pub mod interviews;
pub mod jobs;
pub mod moderation;
pub mod notifications;
pub mod saved;
pub mod translate;

/// Text fields of a multipart form plus its file part, if one was sent.
#[derive(Debug, Default)]
pub(crate) struct Form {
    fields: HashMap<String, String>,
    pub file: Option<Upload>,
}

impl Form {
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> Result<String> {
        self.text(name)
            .ok_or_else(|| Error::BadRequest(format!("{} is required", name)))
    }
}

/// Reads every part. Only the part named `file_field` is treated as a file;
/// an empty file part counts as no file.
pub(crate) async fn read_form(mut multipart: Multipart, file_field: &str) -> Result<Form> {
    let mut form = Form::default();
    while let Some(field) = multipart.next_field().await.map_err(Error::Multipart)? {
        let name = field.name().unwrap_or("").to_string();
        if name == file_field {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(Error::Multipart)?;
            if !data.is_empty() {
                form.file = Some(Upload {
                    file_name,
                    content_type,
                    data,
                });
            }
        } else {
            let value = field.text().await.map_err(Error::Multipart)?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}
