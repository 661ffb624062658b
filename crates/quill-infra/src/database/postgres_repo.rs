//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use quill_core::domain::{PostWithAuthor, User};
use quill_core::error::RepoError;
use quill_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, read_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => match local.chars().next() {
            Some(first) if local.chars().count() > 1 => format!("{first}***@{domain}"),
            _ => format!("***@{domain}"),
        },
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(read_error)?;

        Ok(result.map(Into::into))
    }

    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, RepoError> {
        tracing::debug!(%username, user_email = %mask_email(email), "Checking user uniqueness");

        let result = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(username))
                    .add(user::Column::Email.eq(email)),
            )
            .one(self.db.as_ref())
            .await
            .map_err(read_error)?;

        Ok(result.is_some())
    }
}

fn with_author(
    (post, author): (post::Model, Option<user::Model>),
) -> Result<PostWithAuthor, RepoError> {
    let author = author.ok_or_else(|| {
        RepoError::Query(format!("post {} references a missing author", post.id))
    })?;

    Ok(PostWithAuthor {
        post: post.into(),
        author: author.into(),
    })
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_recent(&self, offset: u64, limit: u64) -> Result<Vec<PostWithAuthor>, RepoError> {
        let rows = PostEntity::find()
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(read_error)?;

        rows.into_iter().map(with_author).collect()
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<PostWithAuthor>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(self.db.as_ref())
            .await
            .map_err(read_error)?;

        row.map(with_author).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("nonsense"), "***");
    }
}
