use reqwest::multipart::{Form, Part};

use super::SubmissionError;
use crate::models::{Action, FileHandle, ManifestItem};

/// Everything one submission sends, in wire order.
///
/// `files[n]` and `relpaths[n]` always describe the same manifest item.
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub action: Action,
    pub password: String,
    pub files: Vec<FileHandle>,
    pub relpaths: Vec<String>,
}

impl SubmissionPayload {
    /// Capture the manifest as it stands, in manifest order.
    pub fn build(items: &[ManifestItem], action: Action, password: impl Into<String>) -> Self {
        let (files, relpaths) = items
            .iter()
            .map(|item| (item.content.clone(), item.relative_path.clone()))
            .unzip();
        Self {
            action,
            password: password.into(),
            files,
            relpaths,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Load every file's content and lay the payload out as a multipart form.
    ///
    /// Each `files` part is immediately followed by its `relpaths` part. Fails
    /// without sending anything if any content cannot be read.
    pub async fn into_form(self) -> Result<Form, SubmissionError> {
        let mut form = Form::new()
            .text("action", self.action.as_str())
            .text("password", self.password);

        for (file, relpath) in self.files.into_iter().zip(self.relpaths) {
            let content = file
                .read()
                .await
                .map_err(|source| SubmissionError::ContentUnavailable {
                    path: relpath.clone(),
                    source,
                })?;
            let part = Part::bytes(content).file_name(file.name);
            form = form.part("files", part).text("relpaths", relpath);
        }

        Ok(form)
    }
}
