use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod media;
pub mod models;
pub mod repository;
pub mod response;
pub mod retry;
pub mod storage;

// Access-level segregated routers (public, authenticated).
pub mod routes;
use auth::AuthUser;
use handlers::{comment, like, subscription, tweet, video};
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// OpenAPI document for every handler annotated with `#[utoipa::path]`, served at
/// `/api-docs/openapi.json` and browsable through Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        video::get_all_videos, video::publish_a_video, video::get_video_by_id,
        video::update_video, video::delete_video, video::toggle_publish_status,
        video::get_watch_history,
        comment::get_video_comments, comment::add_comment, comment::update_comment,
        comment::delete_comment,
        like::toggle_video_like, like::toggle_comment_like, like::toggle_tweet_like,
        like::get_liked_videos,
        subscription::toggle_subscription, subscription::get_user_channel_subscribers,
        subscription::get_subscribed_channels,
        tweet::create_tweet, tweet::get_user_tweets, tweet::update_tweet, tweet::delete_tweet,
    ),
    components(
        schemas(
            models::User, models::Video, models::Comment, models::Tweet,
            models::OwnerProfile, models::ChannelProfile, models::VideoDetails,
            models::VideoSummary, models::LikedVideo, models::CommentView, models::TweetView,
            models::ChannelSubscriber, models::SubscribedChannel,
            models::LikeStatus, models::SubscriptionStatus, models::PublishStatus,
            models::DeleteStatus, models::ContentRequest, models::VideoForm,
            models::Page<models::VideoSummary>, models::Page<models::CommentView>,
        )
    ),
    tags(
        (name = "vidtube", description = "Video sharing platform API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single container of shared services handed to every request: persistence,
/// media storage and configuration. Cloning is cheap (two `Arc`s and the config).
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub storage: StorageState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors (AuthUser) pull single components out of AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects the request with 401 unless `AuthUser` can be extracted (token or local
/// bypass header valid, user known).
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles routes, documentation, authentication and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");
    let body_limit = state.config.max_upload_bytes;

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Multipart uploads are bounded by the configured size instead of axum's 2 MB default.
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                // Generate an id for every incoming request...
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // ...record it on the request span...
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // ...and echo it back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Request span carrying method, URI and the `x-request-id`, so all log lines of one
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
