use axum::extract::{Path, State};
use uuid::Uuid;

use super::parse_id;
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    models::{LikeStatus, LikeTarget, LikedVideo},
    response::ApiResponse,
};

/// Checks that the target exists (a draft only for its owner), then flips the
/// caller's like in one atomic step.
async fn toggle(state: &AppState, user_id: Uuid, target: LikeTarget) -> ApiResult<LikeStatus> {
    let missing = match target {
        LikeTarget::Video(_) => "Video not found",
        LikeTarget::Comment(_) => "Comment not found",
        LikeTarget::Tweet(_) => "Tweet not found",
    };
    let exists = match target {
        LikeTarget::Video(id) => state
            .repo
            .get_video(id)
            .await?
            .is_some_and(|video| video.is_visible_to(user_id)),
        LikeTarget::Comment(id) => state.repo.get_comment(id).await?.is_some(),
        LikeTarget::Tweet(id) => state.repo.get_tweet(id).await?.is_some(),
    };
    if !exists {
        return Err(ApiError::not_found(missing));
    }

    let is_liked = state
        .repo
        .toggle_like(target, user_id)
        .await
        .map_err(|e| ApiError::from_db(e, missing))?;
    tracing::debug!(?target, user_id = %user_id, is_liked, "like toggled");

    Ok(LikeStatus { is_liked })
}

fn toggled_message(status: LikeStatus) -> &'static str {
    if status.is_liked {
        "Liked successfully"
    } else {
        "Unliked successfully"
    }
}

#[utoipa::path(
    post,
    path = "/likes/toggle/v/{videoId}",
    params(("videoId" = String, Path, description = "Video id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeStatus),
        (status = 400, description = "Invalid video id"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn toggle_video_like(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<LikeStatus>> {
    let target = LikeTarget::Video(parse_id(&video_id, "video")?);
    let status = toggle(&state, user_id, target).await?;
    Ok(ApiResponse::ok(status, toggled_message(status)))
}

#[utoipa::path(
    post,
    path = "/likes/toggle/c/{commentId}",
    params(("commentId" = String, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeStatus),
        (status = 400, description = "Invalid comment id"),
        (status = 404, description = "Comment not found")
    )
)]
pub async fn toggle_comment_like(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> ApiResult<ApiResponse<LikeStatus>> {
    let target = LikeTarget::Comment(parse_id(&comment_id, "comment")?);
    let status = toggle(&state, user_id, target).await?;
    Ok(ApiResponse::ok(status, toggled_message(status)))
}

#[utoipa::path(
    post,
    path = "/likes/toggle/t/{tweetId}",
    params(("tweetId" = String, Path, description = "Tweet id")),
    responses(
        (status = 200, description = "Like toggled", body = LikeStatus),
        (status = 400, description = "Invalid tweet id"),
        (status = 404, description = "Tweet not found")
    )
)]
pub async fn toggle_tweet_like(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
) -> ApiResult<ApiResponse<LikeStatus>> {
    let target = LikeTarget::Tweet(parse_id(&tweet_id, "tweet")?);
    let status = toggle(&state, user_id, target).await?;
    Ok(ApiResponse::ok(status, toggled_message(status)))
}

/// get_liked_videos
///
/// Videos the caller liked, most recent like first.
#[utoipa::path(
    get,
    path = "/likes/videos",
    responses((status = 200, description = "Liked videos", body = [LikedVideo]))
)]
pub async fn get_liked_videos(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<ApiResponse<Vec<LikedVideo>>> {
    let videos = state.repo.get_liked_videos(user_id).await?;
    Ok(ApiResponse::ok(videos, "Liked videos fetched successfully"))
}
