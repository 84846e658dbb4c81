//! HTTP handlers, one module per service.
//!
//! Every handler returns `ApiResult<ApiResponse<T>>`: the success envelope on the happy
//! path, an `ApiError` (rendered as the error envelope) otherwise. Ids arrive as raw
//! path strings and are parsed here, so a malformed id is answered with the API's own
//! `InvalidInput` instead of axum's plain-text rejection.

use axum::{
    Json,
    extract::{Multipart, multipart::Field, rejection::JsonRejection},
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{ContentRequest, PageRequest, Video},
    repository::RepositoryState,
};

pub mod comment;
pub mod like;
pub mod subscription;
pub mod tweet;
pub mod video;

/// PageQuery
///
/// `?page=&limit=` for paginated listings.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number (default 1).
    pub page: Option<u32>,
    /// Page size (default 10, max 100).
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn to_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

/// Parses a path id; `what` names the entity in the error message.
pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::invalid_input(format!("Invalid {} id", what)))
}

/// Loads a video the caller may interact with. Someone else's draft is reported
/// exactly like a missing video.
pub(crate) async fn visible_video(
    repo: &RepositoryState,
    video_id: Uuid,
    viewer_id: Uuid,
) -> ApiResult<Video> {
    repo.get_video(video_id)
        .await?
        .filter(|video| video.is_visible_to(viewer_id))
        .ok_or_else(|| ApiError::not_found("Video not found"))
}

/// Trims `value`; a missing or blank value is reported as `"<field> is required"`.
pub(crate) fn required_text(value: Option<&str>, field: &str) -> ApiResult<String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(ApiError::invalid_input(format!("{} is required", field))),
    }
}

/// Unpacks the `{content}` body of comment and tweet calls.
pub(crate) fn required_content(
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> ApiResult<String> {
    let Json(request) =
        payload.map_err(|e| ApiError::invalid_input(format!("Invalid request body: {}", e)))?;
    required_text(Some(&request.content), "Content")
}

// --- Multipart ---

/// An uploaded file part of a multipart form.
#[derive(Debug, Clone)]
pub(crate) struct FilePart {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Extension for the object key: taken from the client file name, alphanumeric only.
    pub fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.len() <= 8)
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Text fields and files of the publish/update video form.
#[derive(Debug, Default)]
pub(crate) struct VideoFormData {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_file: Option<FilePart>,
    pub thumbnail: Option<FilePart>,
}

fn multipart_error(e: impl std::fmt::Display) -> ApiError {
    ApiError::invalid_input(format!("Malformed multipart body: {}", e))
}

async fn read_file(field: Field<'_>) -> ApiResult<Option<FilePart>> {
    let file_name = field.file_name().map(str::to_owned);
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_owned();
    let bytes = field.bytes().await.map_err(multipart_error)?;

    // An empty file part counts as a missing file.
    if bytes.is_empty() {
        return Ok(None);
    }

    Ok(Some(FilePart {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

/// Reads the whole form. Unknown parts are skipped; nothing is uploaded here.
pub(crate) async fn read_video_form(mut multipart: Multipart) -> ApiResult<VideoFormData> {
    let mut form = VideoFormData::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "title" => form.title = Some(field.text().await.map_err(multipart_error)?),
            "description" => form.description = Some(field.text().await.map_err(multipart_error)?),
            "videoFile" => form.video_file = read_file(field).await?,
            "thumbnail" => form.thumbnail = read_file(field).await?,
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    Ok(form)
}

/// Object key of an upload: `<prefix>/<owner>/<random>.<ext>`.
pub(crate) fn object_key(prefix: &str, owner_id: Uuid, file: &FilePart) -> String {
    format!("{}/{}/{}.{}", prefix, owner_id, Uuid::new_v4(), file.extension())
}
