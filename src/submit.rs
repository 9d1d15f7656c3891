//! Entry submission payloads.
//!
//! A submission maps field ids to either plain text or a file
//! attachment. Plain-only submissions go out as an ordinary form body;
//! as soon as one attachment is present the whole payload is encoded as
//! multipart instead. Multipart framing carries real overhead, so it is
//! never used without attachments.

use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};

use crate::error::Result;

/// A single submitted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitValue {
    /// A plain value, passed through unmodified.
    Text(String),
    /// A file attachment, streamed from the given path.
    File(PathBuf),
}

impl From<&str> for SubmitValue {
    fn from(value: &str) -> Self {
        SubmitValue::Text(value.to_string())
    }
}

impl From<String> for SubmitValue {
    fn from(value: String) -> Self {
        SubmitValue::Text(value)
    }
}

impl From<PathBuf> for SubmitValue {
    fn from(path: PathBuf) -> Self {
        SubmitValue::File(path)
    }
}

/// Entry data for [`Form::submit`].
///
/// Field order is preserved on the wire.
///
/// ```
/// use formhive::Submission;
///
/// let data = Submission::new()
///     .field("Field1", "Tim")
///     .field("Field2", "Morgan")
///     .file("Field8", "/tmp/resume.pdf");
/// ```
///
/// [`Form::submit`]: crate::Form::submit
#[derive(Debug, Clone, Default)]
pub struct Submission {
    fields: Vec<(String, SubmitValue)>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a plain field value.
    pub fn field(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((id.into(), SubmitValue::Text(value.into())));
        self
    }

    /// Attach a file to a field.
    pub fn file(mut self, id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.fields.push((id.into(), SubmitValue::File(path.into())));
        self
    }

    /// Whether any value is a file attachment.
    pub fn has_attachments(&self) -> bool {
        self.fields
            .iter()
            .any(|(_, value)| matches!(value, SubmitValue::File(_)))
    }

    /// Split into plain body pairs and attachment pairs.
    pub(crate) fn into_parts(self) -> (Vec<(String, String)>, Vec<(String, PathBuf)>) {
        let mut body = Vec::new();
        let mut files = Vec::new();
        for (id, value) in self.fields {
            match value {
                SubmitValue::Text(text) => body.push((id, text)),
                SubmitValue::File(path) => files.push((id, path)),
            }
        }
        (body, files)
    }
}

/// Declared content type for an attachment, from the path's extension.
pub(crate) fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Assemble the multipart form for a submission with attachments. File
/// contents are read here, inside the submit call, and dropped with the
/// request on every exit path.
pub(crate) async fn build_multipart(
    body: Vec<(String, String)>,
    files: Vec<(String, PathBuf)>,
) -> Result<Form> {
    let mut form = Form::new();
    for (id, text) in body {
        form = form.text(id, text);
    }
    for (id, path) in files {
        let content_type = content_type_for(&path);
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = tokio::fs::read(&path).await?;
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&content_type)?;
        form = form.part(id, part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_text_and_files() {
        let submission = Submission::new()
            .field("Field1", "Tim")
            .file("Field8", "/tmp/photo.jpg");
        assert!(submission.has_attachments());

        let (body, files) = submission.into_parts();
        assert_eq!(body, vec![("Field1".to_string(), "Tim".to_string())]);
        assert_eq!(
            files,
            vec![("Field8".to_string(), PathBuf::from("/tmp/photo.jpg"))]
        );
    }

    #[test]
    fn plain_submission_has_no_attachments() {
        let submission = Submission::new()
            .field("Field1", "Tim")
            .field("Field2", "Morgan");
        assert!(!submission.has_attachments());

        let (body, files) = submission.into_parts();
        assert_eq!(body.len(), 2);
        assert!(files.is_empty());
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("a.png")), "image/png");
        assert_eq!(content_type_for(Path::new("a.pdf")), "application/pdf");
    }

    #[test]
    fn content_type_falls_back_to_octet_stream() {
        assert_eq!(
            content_type_for(Path::new("archive.xyzzy")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(Path::new("no-extension")),
            "application/octet-stream"
        );
    }
}
