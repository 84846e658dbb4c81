use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    ChannelSubscriber, Comment, CommentView, LikeTarget, LikedVideo, NewVideo, PageRequest,
    SubscribedChannel, Tweet, TweetView, User, Video, VideoDetails, VideoFilter, VideoSummary,
    VideoUpdate,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

pub type RepoResult<T> = Result<T, sqlx::Error>;

/// Repository Trait
///
/// The persistence contract used by every handler. Implementations must honour:
///
/// - Owner-scoped writes (`update_*`, `delete_*`, `toggle_publish_status`) are single
///   conditional operations that only touch a row whose owner is `owner_id`; they
///   report "no row" with `None`/`false` instead of an error.
/// - Toggles (`toggle_like`, `toggle_subscription`) are atomic: concurrent calls for
///   the same pair never leave more than one record. They return the resulting
///   membership state.
/// - `record_view` increments the counter on every call but adds to the watch
///   history only once per (user, video).
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;

    // --- Videos ---
    async fn list_videos(&self, filter: &VideoFilter) -> RepoResult<(Vec<VideoSummary>, i64)>;
    async fn create_video(&self, video: NewVideo) -> RepoResult<Video>;
    async fn get_video(&self, id: Uuid) -> RepoResult<Option<Video>>;
    // Joined view: channel profile, subscription and like data relative to `viewer_id`.
    async fn get_video_details(
        &self,
        id: Uuid,
        viewer_id: Uuid,
    ) -> RepoResult<Option<VideoDetails>>;
    async fn record_view(&self, video_id: Uuid, user_id: Uuid) -> RepoResult<()>;
    async fn get_watch_history(&self, user_id: Uuid) -> RepoResult<Vec<VideoSummary>>;
    async fn update_video(
        &self,
        id: Uuid,
        owner_id: Uuid,
        update: VideoUpdate,
    ) -> RepoResult<Option<Video>>;
    async fn toggle_publish_status(&self, id: Uuid, owner_id: Uuid) -> RepoResult<Option<Video>>;
    // Comments, likes and history entries of the video are left in place.
    async fn delete_video(&self, id: Uuid, owner_id: Uuid) -> RepoResult<bool>;

    // --- Comments ---
    async fn list_comments(
        &self,
        video_id: Uuid,
        page: PageRequest,
    ) -> RepoResult<(Vec<CommentView>, i64)>;
    // `RowNotFound` if the video no longer exists.
    async fn create_comment(
        &self,
        video_id: Uuid,
        owner_id: Uuid,
        content: String,
    ) -> RepoResult<Comment>;
    async fn get_comment(&self, id: Uuid) -> RepoResult<Option<Comment>>;
    async fn update_comment(
        &self,
        id: Uuid,
        owner_id: Uuid,
        content: String,
    ) -> RepoResult<Option<Comment>>;
    async fn delete_comment(&self, id: Uuid, owner_id: Uuid) -> RepoResult<bool>;

    // --- Likes ---
    // `RowNotFound` if there is nothing to unlike and the target no longer exists.
    async fn toggle_like(&self, target: LikeTarget, user_id: Uuid) -> RepoResult<bool>;
    // Newest like first.
    async fn get_liked_videos(&self, user_id: Uuid) -> RepoResult<Vec<LikedVideo>>;

    // --- Subscriptions ---
    async fn toggle_subscription(&self, subscriber_id: Uuid, channel_id: Uuid)
    -> RepoResult<bool>;
    async fn get_channel_subscribers(&self, channel_id: Uuid)
    -> RepoResult<Vec<ChannelSubscriber>>;
    async fn get_subscribed_channels(
        &self,
        subscriber_id: Uuid,
    ) -> RepoResult<Vec<SubscribedChannel>>;

    // --- Tweets ---
    async fn create_tweet(&self, owner_id: Uuid, content: String) -> RepoResult<Tweet>;
    async fn get_tweet(&self, id: Uuid) -> RepoResult<Option<Tweet>>;
    async fn list_user_tweets(&self, owner_id: Uuid, viewer_id: Uuid)
    -> RepoResult<Vec<TweetView>>;
    async fn update_tweet(
        &self,
        id: Uuid,
        owner_id: Uuid,
        content: String,
    ) -> RepoResult<Option<Tweet>>;
    async fn delete_tweet(&self, id: Uuid, owner_id: Uuid) -> RepoResult<bool>;
}

/// RepositoryState
///
/// The shared persistence handle held by `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
