mod common;

use axum::{
    Json,
    extract::{Path, State},
};
use common::create_test_state;
use uuid::Uuid;
use vidtube::{
    error::ApiError,
    handlers::{like, subscription, tweet},
    models::{ContentRequest, LikeTarget},
    repository::Repository,
};

fn content(text: &str) -> Result<Json<ContentRequest>, axum::extract::rejection::JsonRejection> {
    Ok(Json(ContentRequest {
        content: text.to_string(),
    }))
}

// --- LIKES ---

#[tokio::test]
async fn test_like_toggle_alternates() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let video = ctx.seed_video(&alice, "clip", true).await;

    let first = like::toggle_video_like(
        alice.clone(),
        State(ctx.state.clone()),
        Path(video.id.to_string()),
    )
    .await
    .unwrap();
    assert!(first.data.is_liked);
    assert_eq!(first.message, "Liked successfully");

    let second =
        like::toggle_video_like(alice, State(ctx.state.clone()), Path(video.id.to_string()))
            .await
            .unwrap();
    assert!(!second.data.is_liked);
    assert_eq!(ctx.repo.like_count(), 0);
}

#[tokio::test]
async fn test_comment_like_toggle_alternates() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let bob = ctx.seed_user("bob");
    let video = ctx.seed_video(&alice, "clip", true).await;
    let comment = ctx
        .repo
        .create_comment(video.id, alice.id, "first".to_string())
        .await
        .unwrap();

    let first = like::toggle_comment_like(
        bob.clone(),
        State(ctx.state.clone()),
        Path(comment.id.to_string()),
    )
    .await
    .unwrap();
    assert!(first.data.is_liked);
    assert_eq!(first.message, "Liked successfully");
    assert_eq!(ctx.repo.like_count(), 1);

    let (comments, _) = ctx
        .repo
        .list_comments(video.id, Default::default())
        .await
        .unwrap();
    assert_eq!(comments[0].likes_count, 1);

    let second = like::toggle_comment_like(
        bob,
        State(ctx.state.clone()),
        Path(comment.id.to_string()),
    )
    .await
    .unwrap();
    assert!(!second.data.is_liked);
    assert_eq!(second.message, "Unliked successfully");
    assert_eq!(ctx.repo.like_count(), 0);
}

#[tokio::test]
async fn test_tweet_like_toggle_alternates() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let bob = ctx.seed_user("bob");
    let post = ctx
        .repo
        .create_tweet(alice.id, "hello".to_string())
        .await
        .unwrap();

    let first = like::toggle_tweet_like(
        bob.clone(),
        State(ctx.state.clone()),
        Path(post.id.to_string()),
    )
    .await
    .unwrap();
    assert!(first.data.is_liked);
    assert_eq!(ctx.repo.like_count(), 1);

    let second = like::toggle_tweet_like(bob, State(ctx.state.clone()), Path(post.id.to_string()))
        .await
        .unwrap();
    assert!(!second.data.is_liked);
    assert_eq!(ctx.repo.like_count(), 0);
}

#[tokio::test]
async fn test_concurrent_like_toggles_leave_at_most_one_like() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let video = ctx.seed_video(&alice, "clip", true).await;

    let handles: Vec<_> = (0..9)
        .map(|_| {
            let state = ctx.state.clone();
            let user = alice.clone();
            let id = video.id.to_string();
            tokio::spawn(async move { like::toggle_video_like(user, State(state), Path(id)).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Nine toggles on one (target, user): an odd count ends liked, with a single record.
    assert_eq!(ctx.repo.like_count(), 1);
}

#[tokio::test]
async fn test_like_targets_must_exist() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let missing = Uuid::new_v4().to_string();

    let err = like::toggle_comment_like(
        alice.clone(),
        State(ctx.state.clone()),
        Path(missing.clone()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(msg) if msg == "Comment not found"));

    let err = like::toggle_tweet_like(alice.clone(), State(ctx.state.clone()), Path(missing))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = like::toggle_video_like(alice, State(ctx.state.clone()), Path("v-123".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
    assert_eq!(ctx.repo.like_count(), 0);
}

#[tokio::test]
async fn test_writes_against_vanished_targets_are_rejected() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let gone = Uuid::new_v4();

    // What a handler sees when the target is deleted between its check and the write.
    let err = ctx
        .repo
        .toggle_like(LikeTarget::Tweet(gone), alice.id)
        .await
        .unwrap_err();
    assert!(matches!(
        ApiError::from_db(err, "Tweet not found"),
        ApiError::NotFound(msg) if msg == "Tweet not found"
    ));

    let err = ctx
        .repo
        .create_comment(gone, alice.id, "late".to_string())
        .await
        .unwrap_err();
    assert!(matches!(
        ApiError::from_db(err, "Video not found"),
        ApiError::NotFound(_)
    ));
    assert_eq!(ctx.repo.like_count(), 0);
}

#[tokio::test]
async fn test_liked_videos_newest_first() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let bob = ctx.seed_user("bob");
    let v1 = ctx.seed_video(&alice, "v1", true).await;
    let v2 = ctx.seed_video(&alice, "v2", true).await;

    for video in [&v1, &v2] {
        like::toggle_video_like(
            bob.clone(),
            State(ctx.state.clone()),
            Path(video.id.to_string()),
        )
        .await
        .unwrap();
    }

    // Likes on other targets do not show up in the video listing.
    let tweet = ctx
        .repo
        .create_tweet(alice.id, "hi".to_string())
        .await
        .unwrap();
    like::toggle_tweet_like(bob.clone(), State(ctx.state.clone()), Path(tweet.id.to_string()))
        .await
        .unwrap();

    let liked = like::get_liked_videos(bob, State(ctx.state.clone()))
        .await
        .unwrap()
        .data;
    let ids: Vec<_> = liked.iter().map(|l| l.liked_video.id).collect();
    assert_eq!(ids, vec![v2.id, v1.id]);
    assert_eq!(liked[0].liked_video.owner.username, "alice");
}

// --- SUBSCRIPTIONS ---

#[tokio::test]
async fn test_subscription_toggle_alternates() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let bob = ctx.seed_user("bob");

    let on = subscription::toggle_subscription(
        bob.clone(),
        State(ctx.state.clone()),
        Path(alice.id.to_string()),
    )
    .await
    .unwrap();
    assert!(on.data.is_subscribed);

    let off = subscription::toggle_subscription(
        bob,
        State(ctx.state.clone()),
        Path(alice.id.to_string()),
    )
    .await
    .unwrap();
    assert!(!off.data.is_subscribed);
    assert_eq!(ctx.repo.subscription_count(), 0);
}

#[tokio::test]
async fn test_cannot_subscribe_to_self_or_missing_channel() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");

    let err = subscription::toggle_subscription(
        alice.clone(),
        State(ctx.state.clone()),
        Path(alice.id.to_string()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let err = subscription::toggle_subscription(
        alice,
        State(ctx.state.clone()),
        Path(Uuid::new_v4().to_string()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(ctx.repo.subscription_count(), 0);
}

#[tokio::test]
async fn test_concurrent_subscription_toggles_leave_at_most_one() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let bob = ctx.seed_user("bob");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = ctx.state.clone();
            let user = bob.clone();
            let channel = alice.id.to_string();
            tokio::spawn(async move {
                subscription::toggle_subscription(user, State(state), Path(channel)).await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert!(ctx.repo.subscription_count() <= 1);
}

#[tokio::test]
async fn test_channel_subscribers_report_follow_back() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let bob = ctx.seed_user("bob");
    let carol = ctx.seed_user("carol");

    // Bob and Carol follow Alice; Alice follows Bob back; Carol follows Bob too.
    ctx.repo
        .toggle_subscription(bob.id, alice.id)
        .await
        .unwrap();
    ctx.repo
        .toggle_subscription(carol.id, alice.id)
        .await
        .unwrap();
    ctx.repo
        .toggle_subscription(alice.id, bob.id)
        .await
        .unwrap();
    ctx.repo
        .toggle_subscription(carol.id, bob.id)
        .await
        .unwrap();

    let subscribers = subscription::get_user_channel_subscribers(
        alice.clone(),
        State(ctx.state.clone()),
        Path(alice.id.to_string()),
    )
    .await
    .unwrap()
    .data;

    assert_eq!(subscribers.len(), 2);
    // Newest subscription first.
    assert_eq!(subscribers[0].subscriber.username, "carol");
    assert!(!subscribers[0].subscribed_to_subscriber);
    assert_eq!(subscribers[0].subscribers_count, 0);
    assert_eq!(subscribers[1].subscriber.username, "bob");
    assert!(subscribers[1].subscribed_to_subscriber);
    assert_eq!(subscribers[1].subscribers_count, 2);
}

#[tokio::test]
async fn test_subscribed_channels_carry_latest_published_video() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let bob = ctx.seed_user("bob");
    let carol = ctx.seed_user("carol");

    ctx.seed_video(&alice, "older", true).await;
    let newest_published = ctx.seed_video(&alice, "newer", true).await;
    ctx.seed_video(&alice, "draft", false).await;

    ctx.repo
        .toggle_subscription(bob.id, alice.id)
        .await
        .unwrap();
    ctx.repo
        .toggle_subscription(bob.id, carol.id)
        .await
        .unwrap();

    let channels = subscription::get_subscribed_channels(
        bob.clone(),
        State(ctx.state.clone()),
        Path(bob.id.to_string()),
    )
    .await
    .unwrap()
    .data;

    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].channel.username, "carol");
    assert!(channels[0].latest_video.is_none());
    assert_eq!(channels[1].channel.username, "alice");
    assert_eq!(
        channels[1].latest_video.as_ref().map(|v| v.id),
        Some(newest_published.id)
    );

    // Listing is read-only.
    assert_eq!(ctx.repo.subscription_count(), 2);
}

#[tokio::test]
async fn test_subscription_listings_of_unknown_user() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let missing = Uuid::new_v4().to_string();

    let err = subscription::get_subscribed_channels(
        alice.clone(),
        State(ctx.state.clone()),
        Path(missing.clone()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = subscription::get_user_channel_subscribers(
        alice,
        State(ctx.state.clone()),
        Path(missing),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// --- TWEETS ---

#[tokio::test]
async fn test_tweet_lifecycle() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let bob = ctx.seed_user("bob");

    let created = tweet::create_tweet(
        alice.clone(),
        State(ctx.state.clone()),
        content("  hello  "),
    )
    .await
    .unwrap();
    assert_eq!(created.status, 201);
    assert_eq!(created.data.content, "hello");
    assert_eq!(created.data.owner_id, alice.id);
    let tweet_id = created.data.id.to_string();

    let err = tweet::update_tweet(
        bob.clone(),
        State(ctx.state.clone()),
        Path(tweet_id.clone()),
        content("mine now"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied(_)));

    let updated = tweet::update_tweet(
        alice.clone(),
        State(ctx.state.clone()),
        Path(tweet_id.clone()),
        content("edited"),
    )
    .await
    .unwrap();
    assert_eq!(updated.data.content, "edited");

    let err = tweet::delete_tweet(bob, State(ctx.state.clone()), Path(tweet_id.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::PermissionDenied(_)));

    let deleted = tweet::delete_tweet(
        alice.clone(),
        State(ctx.state.clone()),
        Path(tweet_id.clone()),
    )
    .await
    .unwrap();
    assert!(deleted.data.is_deleted);

    let err = tweet::update_tweet(
        alice,
        State(ctx.state.clone()),
        Path(tweet_id),
        content("gone"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_create_tweet_requires_content() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");

    let err = tweet::create_tweet(alice.clone(), State(ctx.state.clone()), content(""))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));

    let tweets = tweet::get_user_tweets(
        alice.clone(),
        State(ctx.state.clone()),
        Path(alice.id.to_string()),
    )
    .await
    .unwrap();
    assert!(tweets.data.is_empty());
}

#[tokio::test]
async fn test_user_tweets_newest_first_with_viewer_likes() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let bob = ctx.seed_user("bob");

    let first = ctx
        .repo
        .create_tweet(alice.id, "first".to_string())
        .await
        .unwrap();
    ctx.repo
        .create_tweet(alice.id, "second".to_string())
        .await
        .unwrap();
    ctx.repo
        .toggle_like(LikeTarget::Tweet(first.id), bob.id)
        .await
        .unwrap();

    let tweets = tweet::get_user_tweets(bob, State(ctx.state.clone()), Path(alice.id.to_string()))
        .await
        .unwrap()
        .data;
    assert_eq!(tweets.len(), 2);
    assert_eq!(tweets[0].content, "second");
    assert!(!tweets[0].is_liked);
    assert_eq!(tweets[1].content, "first");
    assert!(tweets[1].is_liked);
    assert_eq!(tweets[1].likes_count, 1);
    assert_eq!(tweets[1].owner.username, "alice");

    let err = tweet::get_user_tweets(
        alice,
        State(ctx.state.clone()),
        Path(Uuid::new_v4().to_string()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_deleted_tweet_keeps_likes_but_takes_no_new_ones() {
    let ctx = create_test_state();
    let alice = ctx.seed_user("alice");
    let bob = ctx.seed_user("bob");
    let post = ctx
        .repo
        .create_tweet(alice.id, "bye".to_string())
        .await
        .unwrap();
    ctx.repo
        .toggle_like(LikeTarget::Tweet(post.id), alice.id)
        .await
        .unwrap();

    tweet::delete_tweet(alice, State(ctx.state.clone()), Path(post.id.to_string()))
        .await
        .unwrap();
    assert_eq!(ctx.repo.like_count(), 1);

    let err = like::toggle_tweet_like(bob, State(ctx.state.clone()), Path(post.id.to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(msg) if msg == "Tweet not found"));
    assert_eq!(ctx.repo.like_count(), 1);
}
