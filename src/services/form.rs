use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::BytesRejection;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use bytes::{Bytes, BytesMut};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Request is not a multipart form: {0}")]
    Rejected(#[from] MultipartRejection),

    #[error("Malformed multipart body: {0}")]
    Malformed(#[from] MultipartError),

    #[error("File '{field}' exceeds the maximum allowed size of {max_size} bytes")]
    FileTooLarge { field: String, max_size: usize },

    #[error("File '{field}' is empty")]
    EmptyFile { field: String },

    #[error("Could not read request body: {0}")]
    Body(#[from] BytesRejection),

    #[error("Malformed urlencoded body: {0}")]
    Urlencoded(#[from] serde_urlencoded::de::Error),

    #[error("Malformed JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON body must be an object")]
    JsonNotObject,
}

/// Body encodings the upload endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Multipart,
    Urlencoded,
    Json,
}

impl BodyKind {
    /// Anything unrecognised is handed to the multipart extractor, which rejects it
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(mime) = content_type.and_then(|v| v.parse::<mime::Mime>().ok()) else {
            return BodyKind::Multipart;
        };

        if mime.type_() != mime::APPLICATION {
            BodyKind::Multipart
        } else if mime.subtype() == mime::WWW_FORM_URLENCODED {
            BodyKind::Urlencoded
        } else if mime.subtype() == mime::JSON {
            BodyKind::Json
        } else {
            BodyKind::Multipart
        }
    }
}

/// A file part held in memory for the lifetime of the request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Decoded form: every value of a repeated name is kept, in arrival order
#[derive(Debug, Default)]
pub struct ParsedForm {
    pub fields: HashMap<String, Vec<String>>,
    pub files: HashMap<String, Vec<UploadedFile>>,
}

impl ParsedForm {
    pub fn first_field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn first_file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name).and_then(|files| files.first())
    }
}

/// Decodes the upload body by its `Content-Type`.
///
/// Urlencoded and JSON bodies carry fields only, so they yield a form without
/// files. The multipart path is the only one that can produce photos.
pub async fn parse_request(
    request: Request,
    max_file_size: usize,
) -> Result<ParsedForm, FormError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match BodyKind::from_content_type(content_type) {
        BodyKind::Multipart => {
            let multipart = Multipart::from_request(request, &()).await?;
            parse_multipart(multipart, max_file_size).await
        }
        BodyKind::Urlencoded => {
            let body = Bytes::from_request(request, &()).await?;
            parse_urlencoded(&body)
        }
        BodyKind::Json => {
            let body = Bytes::from_request(request, &()).await?;
            parse_json_fields(&body)
        }
    }
}

pub fn parse_urlencoded(body: &[u8]) -> Result<ParsedForm, FormError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;

    let mut form = ParsedForm::default();
    for (name, value) in pairs {
        form.fields.entry(name).or_default().push(value);
    }
    Ok(form)
}

/// Top-level keys of a JSON object become fields; non-string values keep their JSON text
pub fn parse_json_fields(body: &[u8]) -> Result<ParsedForm, FormError> {
    let Value::Object(object) = serde_json::from_slice::<Value>(body)? else {
        return Err(FormError::JsonNotObject);
    };

    let mut form = ParsedForm::default();
    for (name, value) in object {
        let text = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        form.fields.entry(name).or_default().push(text);
    }
    Ok(form)
}

/// Reads the whole multipart stream, enforcing `max_file_size` on every file part.
///
/// Parts carrying a `filename` are files, everything else is a text field. A file
/// part with an empty filename and no bytes is what browsers send for an
/// unselected input, so it is skipped rather than rejected.
pub async fn parse_multipart(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<ParsedForm, FormError> {
    let result = collect_parts(&mut multipart, max_file_size).await;

    if let Err(e) = &result {
        // Consume what is left so the client reads our response instead of a reset
        tracing::warn!("Upload form rejected: {}. Consuming remaining stream...", e);
        while let Ok(Some(mut field)) = multipart.next_field().await {
            while let Ok(Some(_)) = field.chunk().await {}
        }
    }

    result
}

async fn collect_parts(
    multipart: &mut Multipart,
    max_file_size: usize,
) -> Result<ParsedForm, FormError> {
    let mut form = ParsedForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(file_name) = field.file_name().map(str::to_string) else {
            let text = field.text().await?;
            form.fields.entry(name).or_default().push(text);
            continue;
        };
        let content_type = field.content_type().map(str::to_string);

        let mut buffer = BytesMut::new();
        while let Some(chunk) = field.chunk().await? {
            if buffer.len() + chunk.len() > max_file_size {
                return Err(FormError::FileTooLarge {
                    field: name,
                    max_size: max_file_size,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        if buffer.is_empty() {
            if file_name.is_empty() {
                tracing::debug!("Skipping unselected file input '{}'", name);
                continue;
            }
            return Err(FormError::EmptyFile { field: name });
        }

        tracing::debug!(
            field = %name,
            file_name = %file_name,
            size = buffer.len(),
            "Received file part"
        );

        form.files.entry(name.clone()).or_default().push(UploadedFile {
            field_name: name,
            file_name: (!file_name.is_empty()).then_some(file_name),
            content_type,
            data: buffer.freeze(),
        });
    }

    Ok(form)
}
