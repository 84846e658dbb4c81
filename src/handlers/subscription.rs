use axum::extract::{Path, State};
use uuid::Uuid;

use super::parse_id;
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    models::{ChannelSubscriber, SubscribedChannel, SubscriptionStatus},
    response::ApiResponse,
};

async fn ensure_user_exists(state: &AppState, id: Uuid, what: &str) -> ApiResult<()> {
    match state.repo.get_user(id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found(format!("{} not found", what))),
    }
}

/// toggle_subscription
///
/// Subscribes the caller to the channel, or unsubscribes if already subscribed.
#[utoipa::path(
    post,
    path = "/subscriptions/c/{channelId}",
    params(("channelId" = String, Path, description = "Channel (user) id")),
    responses(
        (status = 200, description = "Subscription toggled", body = SubscriptionStatus),
        (status = 400, description = "Invalid id or own channel"),
        (status = 404, description = "Channel not found")
    )
)]
pub async fn toggle_subscription(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<SubscriptionStatus>> {
    let channel_id = parse_id(&channel_id, "channel")?;
    if channel_id == user_id {
        return Err(ApiError::invalid_input(
            "You cannot subscribe to your own channel",
        ));
    }
    ensure_user_exists(&state, channel_id, "Channel").await?;

    let is_subscribed = state.repo.toggle_subscription(user_id, channel_id).await?;
    let message = if is_subscribed {
        "Subscribed successfully"
    } else {
        "Unsubscribed successfully"
    };

    Ok(ApiResponse::ok(SubscriptionStatus { is_subscribed }, message))
}

/// get_user_channel_subscribers
///
/// Each subscriber with their own subscriber count and whether the channel follows
/// them back.
#[utoipa::path(
    get,
    path = "/subscriptions/c/{channelId}",
    params(("channelId" = String, Path, description = "Channel (user) id")),
    responses(
        (status = 200, description = "Subscribers", body = [ChannelSubscriber]),
        (status = 404, description = "Channel not found")
    )
)]
pub async fn get_user_channel_subscribers(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<ChannelSubscriber>>> {
    let channel_id = parse_id(&channel_id, "channel")?;
    ensure_user_exists(&state, channel_id, "Channel").await?;

    let subscribers = state.repo.get_channel_subscribers(channel_id).await?;
    Ok(ApiResponse::ok(subscribers, "Subscribers fetched successfully"))
}

#[utoipa::path(
    get,
    path = "/subscriptions/u/{subscriberId}",
    params(("subscriberId" = String, Path, description = "Subscriber (user) id")),
    responses(
        (status = 200, description = "Subscribed channels", body = [SubscribedChannel]),
        (status = 404, description = "Subscriber not found")
    )
)]
pub async fn get_subscribed_channels(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<SubscribedChannel>>> {
    let subscriber_id = parse_id(&subscriber_id, "subscriber")?;
    ensure_user_exists(&state, subscriber_id, "Subscriber").await?;

    let channels = state.repo.get_subscribed_channels(subscriber_id).await?;
    Ok(ApiResponse::ok(
        channels,
        "Subscribed channels fetched successfully",
    ))
}
