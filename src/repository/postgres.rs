use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, query_builder::QueryBuilder};
use uuid::Uuid;

use super::{RepoResult, Repository};
use crate::models::{
    ChannelProfile, ChannelSubscriber, Comment, CommentView, LikeTarget, LikedVideo, NewVideo,
    OwnerProfile, PageRequest, SubscribedChannel, Tweet, TweetView, User, Video, VideoDetails,
    VideoFilter, VideoSummary, VideoUpdate,
};

const VIDEO_COLUMNS: &str = "id, video_file, thumbnail, title, description, duration, views, \
     is_published, owner_id, created_at, updated_at";

// Columns of a video joined with its owner (`v` = videos, `u` = users).
const VIDEO_SUMMARY_COLUMNS: &str = "v.id, v.video_file, v.thumbnail, v.title, v.description, \
     v.duration, v.views, v.is_published, v.created_at, \
     u.id AS owner_id, u.username AS owner_username, u.full_name AS owner_full_name, \
     u.avatar AS owner_avatar";

// --- Flat Rows (joined queries) ---

#[derive(FromRow)]
struct VideoSummaryRow {
    id: Uuid,
    video_file: String,
    thumbnail: String,
    title: String,
    description: String,
    duration: f64,
    views: i64,
    is_published: bool,
    created_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_username: String,
    owner_full_name: String,
    owner_avatar: Option<String>,
}

impl From<VideoSummaryRow> for VideoSummary {
    fn from(row: VideoSummaryRow) -> Self {
        Self {
            id: row.id,
            video_file: row.video_file,
            thumbnail: row.thumbnail,
            title: row.title,
            description: row.description,
            duration: row.duration,
            views: row.views,
            is_published: row.is_published,
            created_at: row.created_at,
            owner: OwnerProfile {
                id: row.owner_id,
                username: row.owner_username,
                full_name: row.owner_full_name,
                avatar: row.owner_avatar,
            },
        }
    }
}

#[derive(FromRow)]
struct LikedVideoRow {
    liked_at: DateTime<Utc>,
    #[sqlx(flatten)]
    video: VideoSummaryRow,
}

#[derive(FromRow)]
struct VideoDetailsRow {
    id: Uuid,
    video_file: String,
    thumbnail: String,
    title: String,
    description: String,
    duration: f64,
    views: i64,
    is_published: bool,
    created_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_username: String,
    owner_full_name: String,
    owner_avatar: Option<String>,
    subscribers_count: i64,
    is_subscribed: bool,
    likes_count: i64,
    is_liked: bool,
}

impl From<VideoDetailsRow> for VideoDetails {
    fn from(row: VideoDetailsRow) -> Self {
        Self {
            id: row.id,
            video_file: row.video_file,
            thumbnail: row.thumbnail,
            title: row.title,
            description: row.description,
            duration: row.duration,
            views: row.views,
            is_published: row.is_published,
            created_at: row.created_at,
            owner: ChannelProfile {
                id: row.owner_id,
                username: row.owner_username,
                full_name: row.owner_full_name,
                avatar: row.owner_avatar,
                subscribers_count: row.subscribers_count,
                is_subscribed: row.is_subscribed,
            },
            likes_count: row.likes_count,
            is_liked: row.is_liked,
        }
    }
}

#[derive(FromRow)]
struct CommentViewRow {
    id: Uuid,
    content: String,
    video_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_username: String,
    owner_full_name: String,
    owner_avatar: Option<String>,
    likes_count: i64,
}

impl From<CommentViewRow> for CommentView {
    fn from(row: CommentViewRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            video_id: row.video_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            owner: OwnerProfile {
                id: row.owner_id,
                username: row.owner_username,
                full_name: row.owner_full_name,
                avatar: row.owner_avatar,
            },
            likes_count: row.likes_count,
        }
    }
}

#[derive(FromRow)]
struct TweetViewRow {
    id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_id: Uuid,
    owner_username: String,
    owner_full_name: String,
    owner_avatar: Option<String>,
    likes_count: i64,
    is_liked: bool,
}

impl From<TweetViewRow> for TweetView {
    fn from(row: TweetViewRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
            owner: OwnerProfile {
                id: row.owner_id,
                username: row.owner_username,
                full_name: row.owner_full_name,
                avatar: row.owner_avatar,
            },
            likes_count: row.likes_count,
            is_liked: row.is_liked,
        }
    }
}

#[derive(FromRow)]
struct ChannelSubscriberRow {
    id: Uuid,
    username: String,
    full_name: String,
    avatar: Option<String>,
    subscribed_at: DateTime<Utc>,
    subscribed_to_subscriber: bool,
    subscribers_count: i64,
}

#[derive(FromRow)]
struct SubscribedChannelRow {
    id: Uuid,
    username: String,
    full_name: String,
    avatar: Option<String>,
    subscribed_at: DateTime<Utc>,
    video_id: Option<Uuid>,
    video_file: Option<String>,
    thumbnail: Option<String>,
    title: Option<String>,
    description: Option<String>,
    duration: Option<f64>,
    views: Option<i64>,
    video_created_at: Option<DateTime<Utc>>,
    video_updated_at: Option<DateTime<Utc>>,
}

impl From<SubscribedChannelRow> for SubscribedChannel {
    fn from(row: SubscribedChannelRow) -> Self {
        // LEFT JOIN LATERAL: all video columns are NULL together when there is no video.
        let latest_video = row.video_id.map(|video_id| Video {
            id: video_id,
            video_file: row.video_file.unwrap_or_default(),
            thumbnail: row.thumbnail.unwrap_or_default(),
            title: row.title.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            duration: row.duration.unwrap_or_default(),
            views: row.views.unwrap_or_default(),
            is_published: true,
            owner_id: row.id,
            created_at: row.video_created_at.unwrap_or_default(),
            updated_at: row.video_updated_at.unwrap_or_default(),
        });

        Self {
            channel: OwnerProfile {
                id: row.id,
                username: row.username,
                full_name: row.full_name,
                avatar: row.avatar,
            },
            latest_video,
            subscribed_at: row.subscribed_at,
        }
    }
}

/// Escapes LIKE wildcards so user input only ever matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Appends the WHERE clause shared by the listing and counting queries.
fn push_video_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &VideoFilter) {
    builder.push(" WHERE TRUE");
    if !filter.include_unpublished {
        builder.push(" AND v.is_published = TRUE");
    }
    if let Some(owner_id) = filter.owner_id {
        builder.push(" AND v.owner_id = ").push_bind(owner_id);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (v.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR v.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Queries are built at runtime
/// (`query_as` + `FromRow`), so the crate compiles without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, full_name, email, avatar, created_at, updated_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    // --- VIDEOS ---

    /// list_videos
    ///
    /// Filtering, search and pagination through QueryBuilder; only the ORDER BY column
    /// and direction are spliced in, and both come from closed enums.
    async fn list_videos(&self, filter: &VideoFilter) -> RepoResult<(Vec<VideoSummary>, i64)> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM videos v");
        push_video_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM videos v JOIN users u ON u.id = v.owner_id",
            VIDEO_SUMMARY_COLUMNS
        ));
        push_video_filter(&mut builder, filter);
        builder.push(format!(
            " ORDER BY {} {}, v.id",
            filter.sort.column(),
            filter.direction.keyword()
        ));
        builder
            .push(" LIMIT ")
            .push_bind(i64::from(filter.page.limit))
            .push(" OFFSET ")
            .push_bind(filter.page.offset());

        let rows = builder
            .build_query_as::<VideoSummaryRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(VideoSummary::from).collect(), total))
    }

    /// create_video
    ///
    /// New videos always start unpublished.
    async fn create_video(&self, video: NewVideo) -> RepoResult<Video> {
        let sql = format!(
            "INSERT INTO videos \
             (id, video_file, thumbnail, title, description, duration, owner_id, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE) RETURNING {}",
            VIDEO_COLUMNS
        );
        sqlx::query_as::<_, Video>(&sql)
            .bind(Uuid::new_v4())
            .bind(video.video_file)
            .bind(video.thumbnail)
            .bind(video.title)
            .bind(video.description)
            .bind(video.duration)
            .bind(video.owner_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_video(&self, id: Uuid) -> RepoResult<Option<Video>> {
        let sql = format!("SELECT {} FROM videos WHERE id = $1", VIDEO_COLUMNS);
        sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// get_video_details
    ///
    /// One round trip: the owner join plus correlated subqueries for the subscriber
    /// count, the viewer's subscription, the like count and the viewer's like.
    async fn get_video_details(
        &self,
        id: Uuid,
        viewer_id: Uuid,
    ) -> RepoResult<Option<VideoDetails>> {
        let sql = format!(
            r#"
            SELECT {},
                (
                    SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = v.owner_id
                ) AS subscribers_count,
                EXISTS (
                    SELECT 1 FROM subscriptions s
                    WHERE s.channel_id = v.owner_id AND s.subscriber_id = $2
                ) AS is_subscribed,
                (SELECT COUNT(*) FROM likes l WHERE l.video_id = v.id) AS likes_count,
                EXISTS (
                    SELECT 1 FROM likes l WHERE l.video_id = v.id AND l.liked_by = $2
                ) AS is_liked
            FROM videos v
            JOIN users u ON u.id = v.owner_id
            WHERE v.id = $1
            "#,
            VIDEO_SUMMARY_COLUMNS
        );

        let row = sqlx::query_as::<_, VideoDetailsRow>(&sql)
            .bind(id)
            .bind(viewer_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(VideoDetails::from))
    }

    /// record_view
    ///
    /// Bumps the counter and adds the history entry in one statement; the history
    /// insert only happens if the video still exists.
    async fn record_view(&self, video_id: Uuid, user_id: Uuid) -> RepoResult<()> {
        sqlx::query(
            r#"
            WITH bumped AS (
                UPDATE videos SET views = views + 1 WHERE id = $1 RETURNING id
            )
            INSERT INTO watch_history (user_id, video_id)
            SELECT $2, id FROM bumped
            ON CONFLICT (user_id, video_id) DO NOTHING
            "#,
        )
        .bind(video_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_watch_history(&self, user_id: Uuid) -> RepoResult<Vec<VideoSummary>> {
        let sql = format!(
            "SELECT {} FROM watch_history wh \
             JOIN videos v ON v.id = wh.video_id \
             JOIN users u ON u.id = v.owner_id \
             WHERE wh.user_id = $1 \
             ORDER BY wh.watched_at ASC",
            VIDEO_SUMMARY_COLUMNS
        );
        let rows = sqlx::query_as::<_, VideoSummaryRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(VideoSummary::from).collect())
    }

    async fn update_video(
        &self,
        id: Uuid,
        owner_id: Uuid,
        update: VideoUpdate,
    ) -> RepoResult<Option<Video>> {
        let sql = format!(
            "UPDATE videos SET title = $3, description = $4, thumbnail = $5, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING {}",
            VIDEO_COLUMNS
        );
        sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .bind(owner_id)
            .bind(update.title)
            .bind(update.description)
            .bind(update.thumbnail)
            .fetch_optional(&self.pool)
            .await
    }

    async fn toggle_publish_status(&self, id: Uuid, owner_id: Uuid) -> RepoResult<Option<Video>> {
        let sql = format!(
            "UPDATE videos SET is_published = NOT is_published, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING {}",
            VIDEO_COLUMNS
        );
        sqlx::query_as::<_, Video>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_video(&self, id: Uuid, owner_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- COMMENTS ---

    async fn list_comments(
        &self,
        video_id: Uuid,
        page: PageRequest,
    ) -> RepoResult<(Vec<CommentView>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE video_id = $1")
            .bind(video_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, CommentViewRow>(
            r#"
            SELECT
                c.id, c.content, c.video_id, c.created_at, c.updated_at,
                u.id AS owner_id, u.username AS owner_username,
                u.full_name AS owner_full_name, u.avatar AS owner_avatar,
                (SELECT COUNT(*) FROM likes l WHERE l.comment_id = c.id) AS likes_count
            FROM comments c
            JOIN users u ON u.id = c.owner_id
            WHERE c.video_id = $1
            ORDER BY c.created_at DESC, c.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(video_id)
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows.into_iter().map(CommentView::from).collect(), total))
    }

    async fn create_comment(
        &self,
        video_id: Uuid,
        owner_id: Uuid,
        content: String,
    ) -> RepoResult<Comment> {
        // The key-share lock keeps the video from being deleted under the insert.
        sqlx::query_as::<_, Comment>(
            r#"
            WITH target AS (
                SELECT id FROM videos WHERE id = $3 FOR KEY SHARE
            )
            INSERT INTO comments (id, content, video_id, owner_id)
            SELECT $1, $2, target.id, $4 FROM target
            RETURNING id, content, video_id, owner_id, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(content)
        .bind(video_id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_comment(&self, id: Uuid) -> RepoResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT id, content, video_id, owner_id, created_at, updated_at \
             FROM comments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// update_comment
    ///
    /// Conditional write: only a row owned by `owner_id` is touched.
    async fn update_comment(
        &self,
        id: Uuid,
        owner_id: Uuid,
        content: String,
    ) -> RepoResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET content = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING id, content, video_id, owner_id, created_at, updated_at",
        )
        .bind(id)
        .bind(owner_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_comment(&self, id: Uuid, owner_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- LIKES ---

    /// toggle_like
    ///
    /// Delete-or-insert in one statement. If a like was removed the insert is skipped;
    /// otherwise the insert runs against the key-share-locked target row and the
    /// partial unique indexes turn a concurrent duplicate into a no-op.
    async fn toggle_like(&self, target: LikeTarget, user_id: Uuid) -> RepoResult<bool> {
        let column = target.column();
        let table = target.table();
        let sql = format!(
            r#"
            WITH target AS (
                SELECT id FROM {table} WHERE id = $1 FOR KEY SHARE
            ), removed AS (
                DELETE FROM likes WHERE {column} = $1 AND liked_by = $2 RETURNING id
            ), added AS (
                INSERT INTO likes (id, {column}, liked_by)
                SELECT $3, target.id, $2 FROM target
                WHERE NOT EXISTS (SELECT 1 FROM removed)
                ON CONFLICT DO NOTHING
                RETURNING id
            )
            SELECT
                EXISTS (SELECT 1 FROM removed) AS removed,
                EXISTS (SELECT 1 FROM target) AS target_found
            "#
        );

        let (removed, target_found) = sqlx::query_as::<_, (bool, bool)>(&sql)
            .bind(target.id())
            .bind(user_id)
            .bind(Uuid::new_v4())
            .fetch_one(&self.pool)
            .await?;

        match (removed, target_found) {
            (true, _) => Ok(false),
            (false, true) => Ok(true),
            (false, false) => Err(sqlx::Error::RowNotFound),
        }
    }

    async fn get_liked_videos(&self, user_id: Uuid) -> RepoResult<Vec<LikedVideo>> {
        let sql = format!(
            "SELECT l.created_at AS liked_at, {} FROM likes l \
             JOIN videos v ON v.id = l.video_id \
             JOIN users u ON u.id = v.owner_id \
             WHERE l.liked_by = $1 \
             ORDER BY l.created_at DESC, l.id",
            VIDEO_SUMMARY_COLUMNS
        );
        let rows = sqlx::query_as::<_, LikedVideoRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| LikedVideo {
                liked_at: row.liked_at,
                liked_video: VideoSummary::from(row.video),
            })
            .collect())
    }

    // --- SUBSCRIPTIONS ---

    async fn toggle_subscription(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            WITH removed AS (
                DELETE FROM subscriptions
                WHERE subscriber_id = $1 AND channel_id = $2
                RETURNING id
            ), added AS (
                INSERT INTO subscriptions (id, subscriber_id, channel_id)
                SELECT $3, $1, $2 WHERE NOT EXISTS (SELECT 1 FROM removed)
                ON CONFLICT (subscriber_id, channel_id) DO NOTHING
                RETURNING id
            )
            SELECT NOT EXISTS (SELECT 1 FROM removed) AS is_subscribed
            "#,
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .bind(Uuid::new_v4())
        .fetch_one(&self.pool)
        .await
    }

    /// get_channel_subscribers
    ///
    /// For each subscriber S of channel $1: whether $1 subscribes back to S and how
    /// many subscribers S has.
    async fn get_channel_subscribers(
        &self,
        channel_id: Uuid,
    ) -> RepoResult<Vec<ChannelSubscriber>> {
        let rows = sqlx::query_as::<_, ChannelSubscriberRow>(
            r#"
            SELECT
                u.id, u.username, u.full_name, u.avatar,
                s.created_at AS subscribed_at,
                EXISTS (
                    SELECT 1 FROM subscriptions back
                    WHERE back.subscriber_id = $1 AND back.channel_id = u.id
                ) AS subscribed_to_subscriber,
                (
                    SELECT COUNT(*) FROM subscriptions c WHERE c.channel_id = u.id
                ) AS subscribers_count
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = $1
            ORDER BY s.created_at DESC, s.id
            "#,
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ChannelSubscriber {
                subscriber: OwnerProfile {
                    id: row.id,
                    username: row.username,
                    full_name: row.full_name,
                    avatar: row.avatar,
                },
                subscribed_to_subscriber: row.subscribed_to_subscriber,
                subscribers_count: row.subscribers_count,
                subscribed_at: row.subscribed_at,
            })
            .collect())
    }

    async fn get_subscribed_channels(
        &self,
        subscriber_id: Uuid,
    ) -> RepoResult<Vec<SubscribedChannel>> {
        let rows = sqlx::query_as::<_, SubscribedChannelRow>(
            r#"
            SELECT
                u.id, u.username, u.full_name, u.avatar,
                s.created_at AS subscribed_at,
                lv.id AS video_id, lv.video_file, lv.thumbnail, lv.title, lv.description,
                lv.duration, lv.views,
                lv.created_at AS video_created_at, lv.updated_at AS video_updated_at
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            LEFT JOIN LATERAL (
                SELECT * FROM videos v
                WHERE v.owner_id = u.id AND v.is_published = TRUE
                ORDER BY v.created_at DESC
                LIMIT 1
            ) lv ON TRUE
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC, s.id
            "#,
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SubscribedChannel::from).collect())
    }

    // --- TWEETS ---

    async fn create_tweet(&self, owner_id: Uuid, content: String) -> RepoResult<Tweet> {
        sqlx::query_as::<_, Tweet>(
            "INSERT INTO tweets (id, content, owner_id) VALUES ($1, $2, $3) \
             RETURNING id, content, owner_id, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(content)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_tweet(&self, id: Uuid) -> RepoResult<Option<Tweet>> {
        sqlx::query_as::<_, Tweet>(
            "SELECT id, content, owner_id, created_at, updated_at FROM tweets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_user_tweets(
        &self,
        owner_id: Uuid,
        viewer_id: Uuid,
    ) -> RepoResult<Vec<TweetView>> {
        let rows = sqlx::query_as::<_, TweetViewRow>(
            r#"
            SELECT
                t.id, t.content, t.created_at, t.updated_at,
                u.id AS owner_id, u.username AS owner_username,
                u.full_name AS owner_full_name, u.avatar AS owner_avatar,
                (SELECT COUNT(*) FROM likes l WHERE l.tweet_id = t.id) AS likes_count,
                EXISTS (
                    SELECT 1 FROM likes l WHERE l.tweet_id = t.id AND l.liked_by = $2
                ) AS is_liked
            FROM tweets t
            JOIN users u ON u.id = t.owner_id
            WHERE t.owner_id = $1
            ORDER BY t.created_at DESC, t.id
            "#,
        )
        .bind(owner_id)
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TweetView::from).collect())
    }

    async fn update_tweet(
        &self,
        id: Uuid,
        owner_id: Uuid,
        content: String,
    ) -> RepoResult<Option<Tweet>> {
        sqlx::query_as::<_, Tweet>(
            "UPDATE tweets SET content = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING id, content, owner_id, created_at, updated_at",
        )
        .bind(id)
        .bind(owner_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_tweet(&self, id: Uuid, owner_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
