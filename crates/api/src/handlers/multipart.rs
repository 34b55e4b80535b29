//! Buffered reading of multipart item forms.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::{AppError, AppResult};
use crate::storage::ImageStore;

/// An uploaded file part held in memory until validation passes.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// All parts of a multipart form: text fields by name and file parts in
/// arrival order.
#[derive(Debug, Default)]
pub struct ItemForm {
    fields: HashMap<String, String>,
    files: Vec<(String, UploadedFile)>,
}

impl ItemForm {
    /// Drain `multipart` into memory. A part with a filename is a file,
    /// everything else is a text field. Empty file parts are skipped.
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = ItemForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    if !bytes.is_empty() {
                        form.files.push((
                            name,
                            UploadedFile {
                                file_name,
                                bytes: bytes.to_vec(),
                            },
                        ));
                    }
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// A text field, trimmed; `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// A boolean flag field. Accepts `true`/`1`/`on`/`yes`.
    pub fn flag(&self, name: &str) -> bool {
        self.text(name).is_some_and(|v| {
            matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "on" | "yes")
        })
    }

    /// Take every file part whose field name is in `names`.
    pub fn take_files(&mut self, names: &[&str]) -> Vec<UploadedFile> {
        let (taken, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(name, _)| names.contains(&name.as_str()));
        self.files = rest;
        taken.into_iter().map(|(_, file)| file).collect()
    }
}

/// Store each file in order. If any store fails, the files already written
/// by this call are removed before the error is returned.
pub async fn store_all(store: &ImageStore, files: &[UploadedFile]) -> AppResult<Vec<String>> {
    let mut stored = Vec::with_capacity(files.len());
    for file in files {
        match store.store(&file.file_name, &file.bytes).await {
            Ok(path) => stored.push(path),
            Err(e) => {
                store.delete_all(&stored).await;
                return Err(e.into());
            }
        }
    }
    Ok(stored)
}
