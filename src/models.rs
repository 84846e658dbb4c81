use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Records (Mapped to Database) ---

/// User
///
/// A row of the `users` table. Accounts are provisioned by the identity provider;
/// this service only reads them (authentication, owner profiles, channel lookups).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub avatar: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Video
///
/// A row of the `videos` table. `owner_id` never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Video {
    pub id: Uuid,
    // Public URL of the uploaded media file.
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    // Seconds; 0 when the container did not declare a duration.
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Drafts are visible to their owner only.
    pub fn is_visible_to(&self, viewer_id: Uuid) -> bool {
        self.is_published || self.owner_id == viewer_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub video_id: Uuid,
    pub owner_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Tweet {
    pub id: Uuid,
    pub content: String,
    pub owner_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// LikeTarget
///
/// The single entity a like points at. The `likes` table stores it as three nullable
/// columns guarded by a CHECK constraint; in Rust the "exactly one" rule is the enum itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    /// Column of the `likes` table holding this kind of target.
    pub fn column(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video_id",
            LikeTarget::Comment(_) => "comment_id",
            LikeTarget::Tweet(_) => "tweet_id",
        }
    }

    /// Table holding the liked entity.
    pub fn table(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "videos",
            LikeTarget::Comment(_) => "comments",
            LikeTarget::Tweet(_) => "tweets",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => *id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Like {
    pub id: Uuid,
    pub target: LikeTarget,
    pub liked_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub channel_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// --- Joined Views (Output) ---

/// OwnerProfile
///
/// The public part of a user attached to videos, comments and tweets.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OwnerProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
}

impl From<&User> for OwnerProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

/// ChannelProfile
///
/// Owner profile enriched with subscription data relative to the viewer.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChannelProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub subscribers_count: i64,
    pub is_subscribed: bool,
}

/// VideoDetails
///
/// The single-video view: video fields, channel profile, like count and the viewer's
/// like flag.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VideoDetails {
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub owner: ChannelProfile,
    pub likes_count: i64,
    pub is_liked: bool,
}

impl VideoDetails {
    pub fn is_visible_to(&self, viewer_id: Uuid) -> bool {
        self.is_published || self.owner.id == viewer_id
    }
}

/// VideoSummary
///
/// Listing entry for videos (search results, liked videos, watch history).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct VideoSummary {
    pub id: Uuid,
    pub video_file: String,
    pub thumbnail: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub owner: OwnerProfile,
}

impl VideoSummary {
    pub fn from_parts(video: &Video, owner: OwnerProfile) -> Self {
        Self {
            id: video.id,
            video_file: video.video_file.clone(),
            thumbnail: video.thumbnail.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            owner,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LikedVideo {
    #[ts(type = "string")]
    pub liked_at: DateTime<Utc>,
    pub liked_video: VideoSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub video_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub owner: OwnerProfile,
    pub likes_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TweetView {
    pub id: Uuid,
    pub content: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    pub owner: OwnerProfile,
    pub likes_count: i64,
    pub is_liked: bool,
}

/// ChannelSubscriber
///
/// One subscriber S of a channel C: S's profile, whether C subscribes back to S,
/// and S's own subscriber count.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChannelSubscriber {
    pub subscriber: OwnerProfile,
    pub subscribed_to_subscriber: bool,
    pub subscribers_count: i64,
    #[ts(type = "string")]
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SubscribedChannel {
    pub channel: OwnerProfile,
    // Most recent published video of the channel.
    pub latest_video: Option<Video>,
    #[ts(type = "string")]
    pub subscribed_at: DateTime<Utc>,
}

/// Page
///
/// A page of a larger result set.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let limit = i64::from(request.limit);
        Self {
            items,
            page: request.page,
            limit: request.limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

// --- Toggle / Status Payloads ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LikeStatus {
    pub is_liked: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SubscriptionStatus {
    pub is_subscribed: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PublishStatus {
    pub is_published: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeleteStatus {
    pub is_deleted: bool,
}

// --- Request Payloads (Input Schemas) ---

/// ContentRequest
///
/// Body of comment and tweet create/update calls. A missing field deserializes to an
/// empty string so the handler can answer with the API's own validation error.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ContentRequest {
    #[serde(default)]
    pub content: String,
}

/// VideoForm
///
/// Documentation-only description of the multipart form accepted by publish/update.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoForm {
    pub title: String,
    pub description: String,
    #[schema(value_type = String, format = Binary)]
    pub video_file: Option<Vec<u8>>,
    #[schema(value_type = String, format = Binary)]
    pub thumbnail: Vec<u8>,
}

// --- Repository Inputs ---

#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct VideoUpdate {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
}

/// PageRequest
///
/// Validated pagination: `page` starts at 1, `limit` is clamped to `MAX_PAGE_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSort {
    #[default]
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl VideoSort {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "createdAt" => Some(VideoSort::CreatedAt),
            "views" => Some(VideoSort::Views),
            "duration" => Some(VideoSort::Duration),
            "title" => Some(VideoSort::Title),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            VideoSort::CreatedAt => "v.created_at",
            VideoSort::Views => "v.views",
            VideoSort::Duration => "v.duration",
            VideoSort::Title => "v.title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// VideoFilter
///
/// Fully validated listing request handed to the repository.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    pub page: PageRequest,
    pub search: Option<String>,
    pub sort: VideoSort,
    pub direction: SortDirection,
    pub owner_id: Option<Uuid>,
    // True only when the caller lists their own channel.
    pub include_unpublished: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_input() {
        let req = PageRequest::new(Some(0), Some(1_000));
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, MAX_PAGE_LIMIT);
        assert_eq!(PageRequest::new(Some(3), Some(20)).offset(), 40);
    }

    #[test]
    fn page_counts_partial_pages() {
        let page: Page<u8> = Page::new(vec![], PageRequest::new(Some(1), Some(10)), 21);
        assert_eq!(page.total_pages, 3);
        let empty: Page<u8> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn drafts_are_visible_to_owner_only() {
        let owner = Uuid::new_v4();
        let mut video = Video {
            owner_id: owner,
            ..Video::default()
        };
        assert!(video.is_visible_to(owner));
        assert!(!video.is_visible_to(Uuid::new_v4()));

        video.is_published = true;
        assert!(video.is_visible_to(Uuid::new_v4()));
    }

    #[test]
    fn sort_keys_use_api_names() {
        assert_eq!(VideoSort::parse("views"), Some(VideoSort::Views));
        assert_eq!(VideoSort::parse("created_at"), None);
        assert_eq!(SortDirection::parse("ASC"), Some(SortDirection::Asc));
        assert_eq!(SortDirection::parse("sideways"), None);
    }

    #[test]
    fn like_status_serializes_camel_case() {
        let json = serde_json::to_string(&LikeStatus { is_liked: true }).unwrap();
        assert_eq!(json, r#"{"isLiked":true}"#);
    }
}
