use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::{RepoResult, Repository};
use crate::models::{
    ChannelProfile, ChannelSubscriber, Comment, CommentView, Like, LikeTarget, LikedVideo,
    NewVideo, OwnerProfile, PageRequest, SortDirection, SubscribedChannel, Subscription, Tweet,
    TweetView, User, Video, VideoDetails, VideoFilter, VideoSort, VideoSummary, VideoUpdate,
};

struct WatchEntry {
    user_id: Uuid,
    video_id: Uuid,
    watched_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    videos: HashMap<Uuid, Video>,
    comments: HashMap<Uuid, Comment>,
    tweets: HashMap<Uuid, Tweet>,
    likes: Vec<Like>,
    subscriptions: Vec<Subscription>,
    watch_history: Vec<WatchEntry>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    /// Strictly increasing clock, so "newest first" orderings never tie.
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn owner(&self, id: Uuid) -> Option<OwnerProfile> {
        self.users.get(&id).map(OwnerProfile::from)
    }

    fn summary(&self, video: &Video) -> Option<VideoSummary> {
        self.owner(video.owner_id)
            .map(|owner| VideoSummary::from_parts(video, owner))
    }

    fn subscribers_count(&self, channel_id: Uuid) -> i64 {
        self.subscriptions
            .iter()
            .filter(|s| s.channel_id == channel_id)
            .count() as i64
    }

    fn is_subscribed(&self, subscriber_id: Uuid, channel_id: Uuid) -> bool {
        self.subscriptions
            .iter()
            .any(|s| s.subscriber_id == subscriber_id && s.channel_id == channel_id)
    }

    fn likes_count(&self, target: LikeTarget) -> i64 {
        self.likes.iter().filter(|l| l.target == target).count() as i64
    }

    fn is_liked(&self, target: LikeTarget, user_id: Uuid) -> bool {
        self.likes
            .iter()
            .any(|l| l.target == target && l.liked_by == user_id)
    }

    fn target_exists(&self, target: LikeTarget) -> bool {
        match target {
            LikeTarget::Video(id) => self.videos.contains_key(&id),
            LikeTarget::Comment(id) => self.comments.contains_key(&id),
            LikeTarget::Tweet(id) => self.tweets.contains_key(&id),
        }
    }
}

fn compare_videos(a: &Video, b: &Video, sort: VideoSort) -> Ordering {
    match sort {
        VideoSort::CreatedAt => a.created_at.cmp(&b.created_at),
        VideoSort::Views => a.views.cmp(&b.views),
        VideoSort::Duration => a.duration.total_cmp(&b.duration),
        VideoSort::Title => a.title.cmp(&b.title),
    }
}

fn matches_search(video: &Video, search: &str) -> bool {
    let needle = search.to_lowercase();
    video.title.to_lowercase().contains(&needle)
        || video.description.to_lowercase().contains(&needle)
}

fn paginate<T>(items: Vec<T>, page: PageRequest) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect()
}

/// MemoryRepository
///
/// In-process `Repository` with the same observable semantics as the Postgres one
/// (owner-scoped writes, atomic toggles, no cleanup on delete). A single mutex guards
/// the whole state, which makes every operation atomic. Used by the handler tests.
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an account, standing in for the identity provider.
    pub fn insert_user(&self, user: User) {
        self.state().users.insert(user.id, user);
    }

    /// Total number of like records, across all targets.
    pub fn like_count(&self) -> usize {
        self.state().likes.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.state().subscriptions.len()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.state().users.get(&id).cloned())
    }

    async fn list_videos(&self, filter: &VideoFilter) -> RepoResult<(Vec<VideoSummary>, i64)> {
        let state = self.state();

        let mut videos: Vec<&Video> = state
            .videos
            .values()
            .filter(|v| filter.include_unpublished || v.is_published)
            .filter(|v| filter.owner_id.is_none_or(|owner| v.owner_id == owner))
            .filter(|v| {
                filter
                    .search
                    .as_deref()
                    .is_none_or(|search| matches_search(v, search))
            })
            .collect();

        videos.sort_by(|a, b| {
            let ordering = compare_videos(a, b, filter.sort);
            let ordering = match filter.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            ordering.then_with(|| a.id.cmp(&b.id))
        });

        let total = videos.len() as i64;
        let items = paginate(videos, filter.page)
            .into_iter()
            .filter_map(|v| state.summary(v))
            .collect();

        Ok((items, total))
    }

    async fn create_video(&self, video: NewVideo) -> RepoResult<Video> {
        let mut state = self.state();
        let now = state.now();
        let record = Video {
            id: Uuid::new_v4(),
            video_file: video.video_file,
            thumbnail: video.thumbnail,
            title: video.title,
            description: video.description,
            duration: video.duration,
            views: 0,
            is_published: false,
            owner_id: video.owner_id,
            created_at: now,
            updated_at: now,
        };
        state.videos.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_video(&self, id: Uuid) -> RepoResult<Option<Video>> {
        Ok(self.state().videos.get(&id).cloned())
    }

    async fn get_video_details(
        &self,
        id: Uuid,
        viewer_id: Uuid,
    ) -> RepoResult<Option<VideoDetails>> {
        let state = self.state();
        let Some(video) = state.videos.get(&id) else {
            return Ok(None);
        };
        let Some(owner) = state.users.get(&video.owner_id) else {
            return Ok(None);
        };

        let target = LikeTarget::Video(video.id);
        Ok(Some(VideoDetails {
            id: video.id,
            video_file: video.video_file.clone(),
            thumbnail: video.thumbnail.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            duration: video.duration,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            owner: ChannelProfile {
                id: owner.id,
                username: owner.username.clone(),
                full_name: owner.full_name.clone(),
                avatar: owner.avatar.clone(),
                subscribers_count: state.subscribers_count(owner.id),
                is_subscribed: state.is_subscribed(viewer_id, owner.id),
            },
            likes_count: state.likes_count(target),
            is_liked: state.is_liked(target, viewer_id),
        }))
    }

    async fn record_view(&self, video_id: Uuid, user_id: Uuid) -> RepoResult<()> {
        let mut state = self.state();
        let Some(video) = state.videos.get_mut(&video_id) else {
            return Ok(());
        };
        video.views += 1;

        let seen = state
            .watch_history
            .iter()
            .any(|w| w.user_id == user_id && w.video_id == video_id);
        if !seen {
            let watched_at = state.now();
            state.watch_history.push(WatchEntry {
                user_id,
                video_id,
                watched_at,
            });
        }
        Ok(())
    }

    async fn get_watch_history(&self, user_id: Uuid) -> RepoResult<Vec<VideoSummary>> {
        let state = self.state();
        let mut entries: Vec<&WatchEntry> = state
            .watch_history
            .iter()
            .filter(|w| w.user_id == user_id)
            .collect();
        entries.sort_by_key(|w| w.watched_at);

        Ok(entries
            .into_iter()
            .filter_map(|w| state.videos.get(&w.video_id))
            .filter_map(|v| state.summary(v))
            .collect())
    }

    async fn update_video(
        &self,
        id: Uuid,
        owner_id: Uuid,
        update: VideoUpdate,
    ) -> RepoResult<Option<Video>> {
        let mut state = self.state();
        let now = state.now();
        let Some(video) = state
            .videos
            .get_mut(&id)
            .filter(|v| v.owner_id == owner_id)
        else {
            return Ok(None);
        };

        video.title = update.title;
        video.description = update.description;
        video.thumbnail = update.thumbnail;
        video.updated_at = now;
        Ok(Some(video.clone()))
    }

    async fn toggle_publish_status(&self, id: Uuid, owner_id: Uuid) -> RepoResult<Option<Video>> {
        let mut state = self.state();
        let now = state.now();
        let Some(video) = state
            .videos
            .get_mut(&id)
            .filter(|v| v.owner_id == owner_id)
        else {
            return Ok(None);
        };

        video.is_published = !video.is_published;
        video.updated_at = now;
        Ok(Some(video.clone()))
    }

    async fn delete_video(&self, id: Uuid, owner_id: Uuid) -> RepoResult<bool> {
        let mut state = self.state();
        let owned = state
            .videos
            .get(&id)
            .is_some_and(|v| v.owner_id == owner_id);
        if owned {
            state.videos.remove(&id);
        }
        Ok(owned)
    }

    async fn list_comments(
        &self,
        video_id: Uuid,
        page: PageRequest,
    ) -> RepoResult<(Vec<CommentView>, i64)> {
        let state = self.state();
        let mut comments: Vec<&Comment> = state
            .comments
            .values()
            .filter(|c| c.video_id == video_id)
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let total = comments.len() as i64;
        let items = paginate(comments, page)
            .into_iter()
            .filter_map(|c| {
                let owner = state.owner(c.owner_id)?;
                Some(CommentView {
                    id: c.id,
                    content: c.content.clone(),
                    video_id: c.video_id,
                    created_at: c.created_at,
                    updated_at: c.updated_at,
                    owner,
                    likes_count: state.likes_count(LikeTarget::Comment(c.id)),
                })
            })
            .collect();

        Ok((items, total))
    }

    async fn create_comment(
        &self,
        video_id: Uuid,
        owner_id: Uuid,
        content: String,
    ) -> RepoResult<Comment> {
        let mut state = self.state();
        if !state.videos.contains_key(&video_id) {
            return Err(sqlx::Error::RowNotFound);
        }
        let now = state.now();
        let comment = Comment {
            id: Uuid::new_v4(),
            content,
            video_id,
            owner_id,
            created_at: now,
            updated_at: now,
        };
        state.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> RepoResult<Option<Comment>> {
        Ok(self.state().comments.get(&id).cloned())
    }

    async fn update_comment(
        &self,
        id: Uuid,
        owner_id: Uuid,
        content: String,
    ) -> RepoResult<Option<Comment>> {
        let mut state = self.state();
        let now = state.now();
        let Some(comment) = state
            .comments
            .get_mut(&id)
            .filter(|c| c.owner_id == owner_id)
        else {
            return Ok(None);
        };

        comment.content = content;
        comment.updated_at = now;
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: Uuid, owner_id: Uuid) -> RepoResult<bool> {
        let mut state = self.state();
        let owned = state
            .comments
            .get(&id)
            .is_some_and(|c| c.owner_id == owner_id);
        if owned {
            state.comments.remove(&id);
        }
        Ok(owned)
    }

    async fn toggle_like(&self, target: LikeTarget, user_id: Uuid) -> RepoResult<bool> {
        let mut state = self.state();
        if let Some(index) = state
            .likes
            .iter()
            .position(|l| l.target == target && l.liked_by == user_id)
        {
            state.likes.remove(index);
            return Ok(false);
        }
        if !state.target_exists(target) {
            return Err(sqlx::Error::RowNotFound);
        }

        let created_at = state.now();
        state.likes.push(Like {
            id: Uuid::new_v4(),
            target,
            liked_by: user_id,
            created_at,
        });
        Ok(true)
    }

    async fn get_liked_videos(&self, user_id: Uuid) -> RepoResult<Vec<LikedVideo>> {
        let state = self.state();
        let mut likes: Vec<&Like> = state
            .likes
            .iter()
            .filter(|l| l.liked_by == user_id)
            .collect();
        likes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(likes
            .into_iter()
            .filter_map(|like| {
                let LikeTarget::Video(video_id) = like.target else {
                    return None;
                };
                let video = state.videos.get(&video_id)?;
                Some(LikedVideo {
                    liked_at: like.created_at,
                    liked_video: state.summary(video)?,
                })
            })
            .collect())
    }

    async fn toggle_subscription(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
    ) -> RepoResult<bool> {
        let mut state = self.state();
        if let Some(index) = state
            .subscriptions
            .iter()
            .position(|s| s.subscriber_id == subscriber_id && s.channel_id == channel_id)
        {
            state.subscriptions.remove(index);
            return Ok(false);
        }

        let created_at = state.now();
        state.subscriptions.push(Subscription {
            id: Uuid::new_v4(),
            subscriber_id,
            channel_id,
            created_at,
        });
        Ok(true)
    }

    async fn get_channel_subscribers(
        &self,
        channel_id: Uuid,
    ) -> RepoResult<Vec<ChannelSubscriber>> {
        let state = self.state();
        let mut subscriptions: Vec<&Subscription> = state
            .subscriptions
            .iter()
            .filter(|s| s.channel_id == channel_id)
            .collect();
        subscriptions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(subscriptions
            .into_iter()
            .filter_map(|s| {
                let subscriber = state.owner(s.subscriber_id)?;
                Some(ChannelSubscriber {
                    subscribed_to_subscriber: state.is_subscribed(channel_id, subscriber.id),
                    subscribers_count: state.subscribers_count(subscriber.id),
                    subscriber,
                    subscribed_at: s.created_at,
                })
            })
            .collect())
    }

    async fn get_subscribed_channels(
        &self,
        subscriber_id: Uuid,
    ) -> RepoResult<Vec<SubscribedChannel>> {
        let state = self.state();
        let mut subscriptions: Vec<&Subscription> = state
            .subscriptions
            .iter()
            .filter(|s| s.subscriber_id == subscriber_id)
            .collect();
        subscriptions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(subscriptions
            .into_iter()
            .filter_map(|s| {
                let channel = state.owner(s.channel_id)?;
                let latest_video = state
                    .videos
                    .values()
                    .filter(|v| v.owner_id == channel.id && v.is_published)
                    .max_by_key(|v| v.created_at)
                    .cloned();
                Some(SubscribedChannel {
                    channel,
                    latest_video,
                    subscribed_at: s.created_at,
                })
            })
            .collect())
    }

    async fn create_tweet(&self, owner_id: Uuid, content: String) -> RepoResult<Tweet> {
        let mut state = self.state();
        let now = state.now();
        let tweet = Tweet {
            id: Uuid::new_v4(),
            content,
            owner_id,
            created_at: now,
            updated_at: now,
        };
        state.tweets.insert(tweet.id, tweet.clone());
        Ok(tweet)
    }

    async fn get_tweet(&self, id: Uuid) -> RepoResult<Option<Tweet>> {
        Ok(self.state().tweets.get(&id).cloned())
    }

    async fn list_user_tweets(
        &self,
        owner_id: Uuid,
        viewer_id: Uuid,
    ) -> RepoResult<Vec<TweetView>> {
        let state = self.state();
        let Some(owner) = state.owner(owner_id) else {
            return Ok(Vec::new());
        };

        let mut tweets: Vec<&Tweet> = state
            .tweets
            .values()
            .filter(|t| t.owner_id == owner_id)
            .collect();
        tweets.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(tweets
            .into_iter()
            .map(|t| {
                let target = LikeTarget::Tweet(t.id);
                TweetView {
                    id: t.id,
                    content: t.content.clone(),
                    created_at: t.created_at,
                    updated_at: t.updated_at,
                    owner: owner.clone(),
                    likes_count: state.likes_count(target),
                    is_liked: state.is_liked(target, viewer_id),
                }
            })
            .collect())
    }

    async fn update_tweet(
        &self,
        id: Uuid,
        owner_id: Uuid,
        content: String,
    ) -> RepoResult<Option<Tweet>> {
        let mut state = self.state();
        let now = state.now();
        let Some(tweet) = state
            .tweets
            .get_mut(&id)
            .filter(|t| t.owner_id == owner_id)
        else {
            return Ok(None);
        };

        tweet.content = content;
        tweet.updated_at = now;
        Ok(Some(tweet.clone()))
    }

    async fn delete_tweet(&self, id: Uuid, owner_id: Uuid) -> RepoResult<bool> {
        let mut state = self.state();
        let owned = state
            .tweets
            .get(&id)
            .is_some_and(|t| t.owner_id == owner_id);
        if owned {
            state.tweets.remove(&id);
        }
        Ok(owned)
    }
}
