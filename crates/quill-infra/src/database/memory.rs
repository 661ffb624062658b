//! In-memory repositories - used when no database is configured, and in tests.
//!
//! They enforce the same uniqueness and author-reference rules the schema does,
//! so callers see identical `RepoError`s. Data is lost on process restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Post, PostWithAuthor, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

/// In-memory user store.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        let taken = store.values().any(|u| {
            u.id == user.id || u.username == user.username || u.email == user.email
        });
        if taken {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        let taken = store.values().any(|u| {
            u.id != user.id && (u.username == user.username || u.email == user.email)
        });
        if taken {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        match store.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }

    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .values()
            .any(|u| u.username == username || u.email == email))
    }
}

/// In-memory post store. Authors are resolved against the shared user store.
pub struct InMemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
    users: Arc<InMemoryUserRepository>,
}

impl InMemoryPostRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            users,
        }
    }

    async fn resolve(&self, post: Post) -> Result<PostWithAuthor, RepoError> {
        let author = self.users.find_by_id(post.author_id).await?.ok_or_else(|| {
            RepoError::Query(format!("post {} references a missing author", post.id))
        })?;
        Ok(PostWithAuthor { post, author })
    }

    async fn ensure_author(&self, author_id: Uuid) -> Result<(), RepoError> {
        match self.users.find_by_id(author_id).await? {
            Some(_) => Ok(()),
            None => Err(RepoError::MissingReference(format!(
                "author {author_id} does not exist"
            ))),
        }
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.ensure_author(post.author_id).await?;

        let mut store = self.store.write().await;
        if store.contains_key(&post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        self.ensure_author(post.author_id).await?;

        let mut store = self.store.write().await;
        match store.get_mut(&post.id) {
            Some(existing) => {
                *existing = post.clone();
                Ok(post)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.store
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_recent(&self, offset: u64, limit: u64) -> Result<Vec<PostWithAuthor>, RepoError> {
        let mut posts: Vec<Post> = self.store.read().await.values().cloned().collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let page = posts
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX));

        let mut resolved = Vec::new();
        for post in page {
            resolved.push(self.resolve(post).await?);
        }
        Ok(resolved)
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let post = self.store.read().await.get(&id).cloned();
        match post {
            Some(post) => self.resolve(post).await.map(Some),
            None => Ok(None),
        }
    }
}
