//! Application state - shared across all handlers.
//!
//! Every collaborator is an immutable, thread-safe handle built once at
//! startup; handlers receive it through `web::Data<AppState>`.

use std::sync::Arc;

use quill_core::ports::{MediaStore, PasswordService, PostRepository, TokenService, UserRepository};
use quill_infra::database::DatabaseConnections;
use quill_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, JwtConfig,
    JwtTokenService, LocalMediaStore,
};

use crate::config::{AppConfig, UPLOADS_PATH};

#[cfg(feature = "postgres")]
use quill_infra::database::{PostgresPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub media: Arc<dyn MediaStore>,
    pub db: Option<Arc<DatabaseConnections>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let tokens: Arc<dyn TokenService> =
            Arc::new(JwtTokenService::new(JwtConfig::new(config.jwt_secret.clone())));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let media: Arc<dyn MediaStore> =
            Arc::new(LocalMediaStore::new(config.upload_dir.clone(), UPLOADS_PATH));

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            use anyhow::Context;
            use migration::{Migrator, MigratorTrait};

            let connections = DatabaseConnections::init(db_config)
                .await
                .context("failed to connect to database")?;

            if config.run_migrations {
                Migrator::up(connections.main.as_ref(), None)
                    .await
                    .context("failed to apply migrations")?;
                tracing::info!("Database migrations applied");
            }

            let state = Self {
                users: Arc::new(PostgresUserRepository::new(connections.main.clone())),
                posts: Arc::new(PostgresPostRepository::new(connections.main.clone())),
                tokens,
                passwords,
                media,
                db: Some(Arc::new(connections)),
            };
            tracing::info!("Application state initialized (postgres)");
            return Ok(state);
        }

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            tracing::warn!("Database configured but the postgres feature is disabled");
        }

        tracing::warn!("No database configured. Running with in-memory repositories.");

        Ok(Self::in_memory(tokens, passwords, media))
    }

    /// State backed by in-memory repositories.
    pub fn in_memory(
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new(users.clone()));

        Self {
            users,
            posts,
            tokens,
            passwords,
            media,
            db: None,
        }
    }
}
