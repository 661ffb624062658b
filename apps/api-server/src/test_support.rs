//! Shared fixtures for handler tests.

use std::sync::Arc;

use quill_core::domain::User;
use quill_infra::{Argon2PasswordService, JwtConfig, JwtTokenService, LocalMediaStore};
use tempfile::TempDir;

use crate::config::UPLOADS_PATH;
use crate::state::AppState;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// In-memory state plus a scratch upload directory that lives as long as the context.
pub struct TestContext {
    pub state: AppState,
    pub upload_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let upload_dir = tempfile::tempdir().expect("create temp upload dir");
        let state = AppState::in_memory(
            Arc::new(JwtTokenService::new(JwtConfig::new("test-secret"))),
            Arc::new(Argon2PasswordService::new()),
            Arc::new(LocalMediaStore::new(upload_dir.path().join("uploads"), UPLOADS_PATH)),
        );
        Self { state, upload_dir }
    }

    /// Insert a user directly and return it with a valid bearer token.
    pub async fn seed_user(&self, username: &str) -> (User, String) {
        let hash = self.state.passwords.hash(TEST_PASSWORD).unwrap();
        let user = User::new(username.to_string(), format!("{username}@example.com"), hash);
        let user = self.state.users.insert(user).await.unwrap();
        let token = self.state.tokens.issue_token(&user).unwrap();
        (user, token)
    }
}

/// Build a test service with the full route table over the given state.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(crate::handlers::configure_routes),
        )
        .await
    };
}

pub(crate) use test_app;
