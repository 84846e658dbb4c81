use axum::extract::{Multipart, Path, Query, State};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{object_key, parse_id, read_video_form, required_text};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    models::{
        DeleteStatus, NewVideo, Page, PageRequest, PublishStatus, SortDirection, Video,
        VideoDetails, VideoFilter, VideoForm, VideoSort, VideoSummary, VideoUpdate,
    },
    response::ApiResponse,
};

/// VideoListQuery
///
/// Query parameters of `GET /videos`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct VideoListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Case-insensitive match on title or description.
    pub query: Option<String>,
    /// createdAt | views | duration | title
    pub sort_by: Option<String>,
    /// asc | desc
    pub sort_type: Option<String>,
    /// Only videos of this channel.
    pub user_id: Option<String>,
}

impl VideoListQuery {
    /// Validates the raw parameters against the caller's identity.
    fn into_filter(self, caller_id: uuid::Uuid) -> ApiResult<VideoFilter> {
        let sort = match self.sort_by.as_deref() {
            None => VideoSort::default(),
            Some(raw) => VideoSort::parse(raw)
                .ok_or_else(|| ApiError::invalid_input(format!("Invalid sortBy: {}", raw)))?,
        };
        let direction = match self.sort_type.as_deref() {
            None => SortDirection::default(),
            Some(raw) => SortDirection::parse(raw)
                .ok_or_else(|| ApiError::invalid_input(format!("Invalid sortType: {}", raw)))?,
        };
        let owner_id = self
            .user_id
            .as_deref()
            .map(|raw| parse_id(raw, "user"))
            .transpose()?;
        let search = self
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());

        Ok(VideoFilter {
            page: PageRequest::new(self.page, self.limit),
            search,
            sort,
            direction,
            owner_id,
            include_unpublished: owner_id == Some(caller_id),
        })
    }
}

/// get_all_videos
///
/// Published videos, optionally filtered by channel and search text. A caller listing
/// their own channel also sees their unpublished videos.
#[utoipa::path(
    get,
    path = "/videos",
    params(VideoListQuery),
    responses(
        (status = 200, description = "Page of video summaries", body = Page<VideoSummary>),
        (status = 400, description = "Invalid query parameter")
    )
)]
pub async fn get_all_videos(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<VideoListQuery>,
) -> ApiResult<ApiResponse<Page<VideoSummary>>> {
    let filter = query.into_filter(user_id)?;
    let (items, total) = state.repo.list_videos(&filter).await?;

    Ok(ApiResponse::ok(
        Page::new(items, filter.page, total),
        "Videos fetched successfully",
    ))
}

/// publish_a_video
///
/// Validates the whole form before uploading anything, then uploads the video file
/// and the thumbnail (in that order) and stores the video unpublished.
#[utoipa::path(
    post,
    path = "/videos",
    request_body(content = VideoForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Video created", body = Video),
        (status = 400, description = "Missing field or file"),
        (status = 502, description = "Media upload failed")
    )
)]
pub async fn publish_a_video(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<ApiResponse<Video>> {
    let form = read_video_form(multipart).await?;

    let title = required_text(form.title.as_deref(), "Title")?;
    let description = required_text(form.description.as_deref(), "Description")?;
    let video_file = form
        .video_file
        .ok_or_else(|| ApiError::invalid_input("Video file is required"))?;
    let thumbnail = form
        .thumbnail
        .ok_or_else(|| ApiError::invalid_input("Thumbnail is required"))?;

    let video_key = object_key("videos", user_id, &video_file);
    let uploaded_video = state
        .storage
        .upload_media(&video_key, &video_file.content_type, video_file.bytes)
        .await?;

    let thumbnail_key = object_key("thumbnails", user_id, &thumbnail);
    let uploaded_thumbnail = state
        .storage
        .upload_media(&thumbnail_key, &thumbnail.content_type, thumbnail.bytes)
        .await?;

    let video = state
        .repo
        .create_video(NewVideo {
            title,
            description,
            video_file: uploaded_video.url,
            thumbnail: uploaded_thumbnail.url,
            duration: uploaded_video.duration,
            owner_id: user_id,
        })
        .await?;

    tracing::info!(video_id = %video.id, owner_id = %user_id, "video published");

    Ok(ApiResponse::created(video, "Video uploaded successfully"))
}

/// get_video_by_id
///
/// Returns the joined video view. Counting the view and recording the watch history
/// happens afterwards and is best-effort: a failure there is logged, never surfaced.
#[utoipa::path(
    get,
    path = "/videos/{videoId}",
    params(("videoId" = String, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video details", body = VideoDetails),
        (status = 400, description = "Invalid video id"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn get_video_by_id(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<VideoDetails>> {
    let video_id = parse_id(&video_id, "video")?;

    let details = state
        .repo
        .get_video_details(video_id, user_id)
        .await?
        .filter(|details| details.is_visible_to(user_id))
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    if let Err(e) = state.repo.record_view(video_id, user_id).await {
        tracing::warn!(video_id = %video_id, "failed to record view: {:?}", e);
    }

    Ok(ApiResponse::ok(details, "Video fetched successfully"))
}

/// update_video
///
/// Owner-only. Title, description and a new thumbnail are all required.
#[utoipa::path(
    patch,
    path = "/videos/{videoId}",
    params(("videoId" = String, Path, description = "Video id")),
    request_body(content = VideoForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video updated", body = Video),
        (status = 400, description = "Missing field or file"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found"),
        (status = 502, description = "Media upload failed")
    )
)]
pub async fn update_video(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<ApiResponse<Video>> {
    let video_id = parse_id(&video_id, "video")?;
    let form = read_video_form(multipart).await?;

    let title = required_text(form.title.as_deref(), "Title")?;
    let description = required_text(form.description.as_deref(), "Description")?;
    let thumbnail = form
        .thumbnail
        .ok_or_else(|| ApiError::invalid_input("Thumbnail is required"))?;

    let video = state
        .repo
        .get_video(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;
    if video.owner_id != user_id {
        return Err(ApiError::permission_denied(
            "You do not have permission to update this video",
        ));
    }

    let thumbnail_key = object_key("thumbnails", user_id, &thumbnail);
    let uploaded = state
        .storage
        .upload_media(&thumbnail_key, &thumbnail.content_type, thumbnail.bytes)
        .await?;

    // Deleted between the ownership check and the write.
    let updated = state
        .repo
        .update_video(
            video_id,
            user_id,
            VideoUpdate {
                title,
                description,
                thumbnail: uploaded.url,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    Ok(ApiResponse::ok(updated, "Video updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/videos/{videoId}",
    params(("videoId" = String, Path, description = "Video id")),
    responses(
        (status = 200, description = "Video deleted", body = DeleteStatus),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn delete_video(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<DeleteStatus>> {
    let video_id = parse_id(&video_id, "video")?;

    let video = state
        .repo
        .get_video(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;
    if video.owner_id != user_id {
        return Err(ApiError::permission_denied(
            "You do not have permission to delete this video",
        ));
    }

    if !state.repo.delete_video(video_id, user_id).await? {
        return Err(ApiError::not_found("Video not found"));
    }

    tracing::info!(video_id = %video_id, "video deleted");

    Ok(ApiResponse::ok(
        DeleteStatus { is_deleted: true },
        "Video deleted successfully",
    ))
}

#[utoipa::path(
    patch,
    path = "/videos/toggle/publish/{videoId}",
    params(("videoId" = String, Path, description = "Video id")),
    responses(
        (status = 200, description = "Publish status toggled", body = PublishStatus),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn toggle_publish_status(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<PublishStatus>> {
    let video_id = parse_id(&video_id, "video")?;

    let video = state
        .repo
        .get_video(video_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;
    if video.owner_id != user_id {
        return Err(ApiError::permission_denied(
            "You do not have permission to change this video",
        ));
    }

    let toggled = state
        .repo
        .toggle_publish_status(video_id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    Ok(ApiResponse::ok(
        PublishStatus {
            is_published: toggled.is_published,
        },
        "Publish status toggled successfully",
    ))
}

/// get_watch_history
///
/// The caller's watched videos, oldest first watch first.
#[utoipa::path(
    get,
    path = "/history",
    responses((status = 200, description = "Watch history", body = [VideoSummary]))
)]
pub async fn get_watch_history(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<Vec<VideoSummary>>> {
    let history = state.repo.get_watch_history(user_id).await?;
    Ok(ApiResponse::ok(history, "Watch history fetched successfully"))
}
