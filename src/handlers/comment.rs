use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};

use super::{PageQuery, parse_id, required_content, visible_video};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    models::{Comment, CommentView, ContentRequest, DeleteStatus, Page},
    response::ApiResponse,
};

/// get_video_comments
///
/// Newest first, each with owner profile and like count.
#[utoipa::path(
    get,
    path = "/comments/{videoId}",
    params(("videoId" = String, Path, description = "Video id"), PageQuery),
    responses(
        (status = 200, description = "Page of comments", body = Page<CommentView>),
        (status = 400, description = "Invalid video id"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn get_video_comments(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<ApiResponse<Page<CommentView>>> {
    let video_id = parse_id(&video_id, "video")?;
    let page = query.to_request();

    visible_video(&state.repo, video_id, user_id).await?;

    let (comments, total) = state.repo.list_comments(video_id, page).await?;

    Ok(ApiResponse::ok(
        Page::new(comments, page, total),
        "Comments fetched successfully",
    ))
}

#[utoipa::path(
    post,
    path = "/comments/{videoId}",
    params(("videoId" = String, Path, description = "Video id")),
    request_body = ContentRequest,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 400, description = "Invalid id or empty content"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn add_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Comment>> {
    let video_id = parse_id(&video_id, "video")?;
    let content = required_content(payload)?;

    visible_video(&state.repo, video_id, user_id).await?;

    // The video can still vanish before the insert.
    let comment = state
        .repo
        .create_comment(video_id, user_id, content)
        .await
        .map_err(|e| ApiError::from_db(e, "Video not found"))?;

    Ok(ApiResponse::created(comment, "Comment added successfully"))
}

/// update_comment
///
/// Existence and ownership are checked separately so the two failures stay distinct;
/// the write itself is owner-scoped, so a concurrent delete surfaces as NotFound.
#[utoipa::path(
    patch,
    path = "/comments/c/{commentId}",
    params(("commentId" = String, Path, description = "Comment id")),
    request_body = ContentRequest,
    responses(
        (status = 200, description = "Comment updated", body = Comment),
        (status = 400, description = "Invalid id or empty content"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn update_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Comment>> {
    let comment_id = parse_id(&comment_id, "comment")?;
    let content = required_content(payload)?;

    let comment = state
        .repo
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    if comment.owner_id != user_id {
        return Err(ApiError::permission_denied(
            "You do not have permission to update this comment",
        ));
    }

    let updated = state
        .repo
        .update_comment(comment_id, user_id, content)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(ApiResponse::ok(updated, "Comment updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/comments/c/{commentId}",
    params(("commentId" = String, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment deleted", body = DeleteStatus),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn delete_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> ApiResult<ApiResponse<DeleteStatus>> {
    let comment_id = parse_id(&comment_id, "comment")?;

    let comment = state
        .repo
        .get_comment(comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    if comment.owner_id != user_id {
        return Err(ApiError::permission_denied(
            "You do not have permission to delete this comment",
        ));
    }

    if !state.repo.delete_comment(comment_id, user_id).await? {
        return Err(ApiError::not_found("Comment not found"));
    }

    Ok(ApiResponse::ok(
        DeleteStatus { is_deleted: true },
        "Comment deleted successfully",
    ))
}
