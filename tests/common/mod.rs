#![allow(dead_code)]

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use vidtube::{
    AppState, MemoryRepository, MockStorageService,
    auth::AuthUser,
    config::AppConfig,
    models::{NewVideo, User, Video},
    repository::Repository,
};

/// Shared state for handler tests plus typed handles on the in-memory collaborators.
pub struct TestContext {
    pub state: AppState,
    pub repo: Arc<MemoryRepository>,
    pub storage: Arc<MockStorageService>,
}

pub fn create_test_state() -> TestContext {
    with_storage(MockStorageService::new())
}

pub fn create_failing_storage_state() -> TestContext {
    with_storage(MockStorageService::new_failing())
}

fn with_storage(storage: MockStorageService) -> TestContext {
    let repo = Arc::new(MemoryRepository::new());
    let storage = Arc::new(storage);
    let state = AppState {
        repo: repo.clone(),
        storage: storage.clone(),
        config: AppConfig::default(),
    };
    TestContext {
        state,
        repo,
        storage,
    }
}

impl TestContext {
    /// Registers a user and returns the identity handlers receive for them.
    pub fn seed_user(&self, username: &str) -> AuthUser {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            full_name: format!("{} Test", username),
            email: format!("{}@example.com", username),
            avatar: Some(format!("http://localhost:9000/avatars/{}.png", username)),
            created_at: now,
            updated_at: now,
        };
        self.repo.insert_user(user.clone());
        AuthUser::from(user)
    }

    /// Creates a video directly in the repository, optionally published.
    pub async fn seed_video(&self, owner: &AuthUser, title: &str, published: bool) -> Video {
        let video = self
            .repo
            .create_video(NewVideo {
                title: title.to_string(),
                description: format!("About {}", title),
                video_file: format!("http://localhost:9000/mock-bucket/videos/{}.mp4", title),
                thumbnail: format!("http://localhost:9000/mock-bucket/thumbnails/{}.png", title),
                duration: 10.0,
                owner_id: owner.id,
            })
            .await
            .unwrap();

        if published {
            self.repo
                .toggle_publish_status(video.id, owner.id)
                .await
                .unwrap()
                .unwrap()
        } else {
            video
        }
    }
}

fn mp4_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

/// Minimal MP4 (`ftyp` + `moov/mvhd` version 0) declaring `units / timescale` seconds.
pub fn mp4_with_duration(timescale: u32, units: u32) -> Vec<u8> {
    let mut mvhd = vec![0u8; 4]; // version 0, flags
    mvhd.extend_from_slice(&0u32.to_be_bytes()); // creation time
    mvhd.extend_from_slice(&0u32.to_be_bytes()); // modification time
    mvhd.extend_from_slice(&timescale.to_be_bytes());
    mvhd.extend_from_slice(&units.to_be_bytes());
    mvhd.extend_from_slice(&[0u8; 80]);

    let mut file = mp4_box(b"ftyp", b"isom\0\0\0\0isomiso2");
    file.extend(mp4_box(b"moov", &mp4_box(b"mvhd", &mvhd)));
    file
}
