use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;
use crate::error::DomainError;

/// Post entity - a blog post written by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `author_id`.
    pub fn new(author_id: Uuid, draft: PostDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: draft.title,
            content: draft.content,
            cover_image_url: draft.cover_image_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace title, content and cover image wholesale.
    pub fn revise(&mut self, draft: PostDraft) {
        self.title = draft.title;
        self.content = draft.content;
        self.cover_image_url = draft.cover_image_url;
        self.updated_at = Utc::now();
    }
}

/// Ownership check shared by every mutating post operation.
pub fn subject_owns(post: &Post, subject_id: Uuid) -> bool {
    post.author_id == subject_id
}

/// A post paired with its author, resolved at read time.
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: Post,
    pub author: User,
}

/// Validated title/content/cover triple used for create and full replace.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub cover_image_url: Option<String>,
}

impl PostDraft {
    pub fn parse(
        title: &str,
        content: &str,
        cover_image_url: Option<&str>,
    ) -> Result<Self, DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::validation("Title is required"));
        }
        if content.trim().is_empty() {
            return Err(DomainError::validation("Content is required"));
        }

        let cover_image_url = cover_image_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(String::from);

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
            cover_image_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> PostDraft {
        PostDraft::parse(title, "body", None).unwrap()
    }

    #[test]
    fn test_subject_owns() {
        let author = Uuid::new_v4();
        let post = Post::new(author, draft("Hello"));

        assert!(subject_owns(&post, author));
        assert!(!subject_owns(&post, Uuid::new_v4()));
    }

    #[test]
    fn test_revise_replaces_all_fields() {
        let mut post = Post::new(
            Uuid::new_v4(),
            PostDraft::parse("Old", "old", Some("/uploads/a.png")).unwrap(),
        );
        let created = post.created_at;

        post.revise(draft("New"));

        assert_eq!(post.title, "New");
        assert_eq!(post.content, "body");
        assert_eq!(post.cover_image_url, None);
        assert_eq!(post.created_at, created);
        assert!(post.updated_at >= created);
    }

    #[test]
    fn test_draft_requires_title_and_content() {
        assert!(PostDraft::parse("", "body", None).is_err());
        assert!(PostDraft::parse("Title", "   ", None).is_err());
    }

    #[test]
    fn test_draft_drops_blank_cover() {
        let draft = PostDraft::parse("Title", "body", Some("  ")).unwrap();
        assert_eq!(draft.cover_image_url, None);
    }
}
