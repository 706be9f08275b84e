use std::sync::Arc;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    config::Config,
    models::{Comment, Role, Thread, ThreadCounters, User},
    repositories::{
        CategoryRegistry,
        memory::{MemoryCommentRepository, MemoryThreadRepository, MemoryUserRepository},
    },
};

pub const CATEGORY: &str = "misc";

/// App state wired to in-memory repositories, with handles kept for assertions and
/// failure injection.
pub struct TestContext {
    pub state: AppState,
    pub threads: Arc<MemoryThreadRepository>,
    pub comments: Arc<MemoryCommentRepository>,
    pub users: Arc<MemoryUserRepository>,
}

impl TestContext {
    pub fn new() -> Self {
        let threads = Arc::new(MemoryThreadRepository::new(CATEGORY));
        let comments = Arc::new(MemoryCommentRepository::new());
        let users = Arc::new(MemoryUserRepository::new());

        let mut registry = CategoryRegistry::new();
        registry.register(threads.clone());

        let state = AppState {
            config: Arc::new(Config::for_tests()),
            users: users.clone(),
            comments: comments.clone(),
            threads: Arc::new(registry),
        };

        Self {
            state,
            threads,
            comments,
            users,
        }
    }

    /// Stores a user directly, bypassing signup hashing.
    pub async fn seed_user(&self, username: &str, role: Role) -> AuthUser {
        use crate::repositories::UserRepository;

        let user = User::new(username.to_string(), role, "not-a-hash".to_string(), None);
        let principal = AuthUser {
            user_id: user.id,
            username: user.username.clone(),
            role,
        };
        self.users.create(&user).await.unwrap();
        principal
    }

    pub async fn seed_thread(&self, author: &AuthUser, slug_id: &str) -> Thread {
        use crate::repositories::ThreadRepository;

        let thread = Thread {
            id: Uuid::new_v4(),
            user_id: author.user_id,
            username: author.username.clone(),
            slug_id: slug_id.to_string(),
            slug_title: "a_thread".to_string(),
            category: CATEGORY.to_string(),
            title: "a thread".to_string(),
            url: None,
            content: "body".to_string(),
            counters: ThreadCounters::default(),
            created: chrono::Utc::now(),
            updated: None,
        };
        self.threads.create(&thread).await.unwrap();
        thread
    }

    pub async fn seed_comment(&self, author: &AuthUser, thread: &Thread, slug_id: &str) -> Comment {
        use crate::repositories::CommentRepository;

        let comment = Comment {
            id: Uuid::new_v4(),
            thread_id: thread.id,
            slug_id: slug_id.to_string(),
            user_id: author.user_id,
            username: author.username.clone(),
            content: "a comment".to_string(),
            votes: 0,
            created: chrono::Utc::now(),
            updated: None,
        };
        self.comments.create(&comment).await.unwrap();
        comment
    }

    pub fn token_for(&self, principal: &AuthUser) -> String {
        let (token, _) = crate::auth::Claims::new(
            principal.user_id,
            principal.username.clone(),
            principal.role,
            &self.state.config.jwt_secret,
        )
        .unwrap();
        token
    }
}
