use crate::{
    AppState,
    handlers::{comment, like, subscription, tweet, video},
};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Authenticated Router Module
///
/// Every endpoint of the video, comment, like, subscription and tweet services. The
/// `auth_middleware` route layer added in `create_router` guarantees that handlers only
/// run for a resolved `AuthUser`; ownership checks happen inside the handlers.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Videos ---
        // GET /videos?page&limit&query&sortBy&sortType&userId
        // POST /videos (multipart: title, description, videoFile, thumbnail)
        .route(
            "/videos",
            get(video::get_all_videos).post(video::publish_a_video),
        )
        // GET/PATCH/DELETE /videos/{videoId}
        // GET also counts the view and records the caller's watch history.
        .route(
            "/videos/{video_id}",
            get(video::get_video_by_id)
                .patch(video::update_video)
                .delete(video::delete_video),
        )
        .route(
            "/videos/toggle/publish/{video_id}",
            patch(video::toggle_publish_status),
        )
        // GET /history
        .route("/history", get(video::get_watch_history))
        // --- Comments ---
        .route(
            "/comments/{video_id}",
            get(comment::get_video_comments).post(comment::add_comment),
        )
        .route(
            "/comments/c/{comment_id}",
            patch(comment::update_comment).delete(comment::delete_comment),
        )
        // --- Likes ---
        // POST /likes/toggle/{v|c|t}/{id}
        .route("/likes/toggle/v/{video_id}", post(like::toggle_video_like))
        .route(
            "/likes/toggle/c/{comment_id}",
            post(like::toggle_comment_like),
        )
        .route("/likes/toggle/t/{tweet_id}", post(like::toggle_tweet_like))
        .route("/likes/videos", get(like::get_liked_videos))
        // --- Subscriptions ---
        .route(
            "/subscriptions/c/{channel_id}",
            get(subscription::get_user_channel_subscribers)
                .post(subscription::toggle_subscription),
        )
        .route(
            "/subscriptions/u/{subscriber_id}",
            get(subscription::get_subscribed_channels),
        )
        // --- Tweets ---
        .route("/tweets", post(tweet::create_tweet))
        .route("/tweets/user/{user_id}", get(tweet::get_user_tweets))
        .route(
            "/tweets/{tweet_id}",
            patch(tweet::update_tweet).delete(tweet::delete_tweet),
        )
}
