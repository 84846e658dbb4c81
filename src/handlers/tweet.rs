use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use super::{parse_id, required_content};
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    models::{ContentRequest, DeleteStatus, Tweet, TweetView},
    response::ApiResponse,
};

#[utoipa::path(
    post,
    path = "/tweets",
    request_body = ContentRequest,
    responses(
        (status = 201, description = "Tweet created", body = Tweet),
        (status = 400, description = "Empty content")
    )
)]
pub async fn create_tweet(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Tweet>> {
    let content = required_content(payload)?;
    let tweet = state.repo.create_tweet(user_id, content).await?;
    Ok(ApiResponse::created(tweet, "Tweet created successfully"))
}

/// get_user_tweets
///
/// Newest first; `isLiked` is relative to the caller.
#[utoipa::path(
    get,
    path = "/tweets/user/{userId}",
    params(("userId" = String, Path, description = "Author id")),
    responses(
        (status = 200, description = "Tweets", body = [TweetView]),
        (status = 400, description = "Invalid user id"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_tweets(
    AuthUser { id: viewer_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<TweetView>>> {
    let user_id = parse_id(&user_id, "user")?;

    if state.repo.get_user(user_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }

    let tweets = state.repo.list_user_tweets(user_id, viewer_id).await?;
    Ok(ApiResponse::ok(tweets, "Tweets fetched successfully"))
}

#[utoipa::path(
    patch,
    path = "/tweets/{tweetId}",
    params(("tweetId" = String, Path, description = "Tweet id")),
    request_body = ContentRequest,
    responses(
        (status = 200, description = "Tweet updated", body = Tweet),
        (status = 400, description = "Invalid id or empty content"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tweet not found")
    )
)]
pub async fn update_tweet(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
    payload: Result<Json<ContentRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<Tweet>> {
    let tweet_id = parse_id(&tweet_id, "tweet")?;
    let content = required_content(payload)?;

    let tweet = state
        .repo
        .get_tweet(tweet_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;
    if tweet.owner_id != user_id {
        return Err(ApiError::permission_denied(
            "You do not have permission to update this tweet",
        ));
    }

    let updated = state
        .repo
        .update_tweet(tweet_id, user_id, content)
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

    Ok(ApiResponse::ok(updated, "Tweet updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/tweets/{tweetId}",
    params(("tweetId" = String, Path, description = "Tweet id")),
    responses(
        (status = 200, description = "Tweet deleted", body = DeleteStatus),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Tweet not found")
    )
)]
pub async fn delete_tweet(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
) -> ApiResult<ApiResponse<DeleteStatus>> {
    let tweet_id = parse_id(&tweet_id, "tweet")?;

    let tweet = state
        .repo
        .get_tweet(tweet_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;
    if tweet.owner_id != user_id {
        return Err(ApiError::permission_denied(
            "You do not have permission to delete this tweet",
        ));
    }

    if !state.repo.delete_tweet(tweet_id, user_id).await? {
        return Err(ApiError::not_found("Tweet not found"));
    }

    Ok(ApiResponse::ok(
        DeleteStatus { is_deleted: true },
        "Tweet deleted successfully",
    ))
}
