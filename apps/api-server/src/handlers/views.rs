//! Domain → response DTO mapping.

use quill_core::domain::{PostWithAuthor, User};
use quill_shared::dto::{AuthorResponse, PostResponse};

pub fn author_response(user: User) -> AuthorResponse {
    AuthorResponse {
        id: user.id,
        username: user.username,
        bio: user.bio,
        avatar_url: user.avatar_url,
        created_at: user.created_at,
    }
}

pub fn post_response(PostWithAuthor { post, author }: PostWithAuthor) -> PostResponse {
    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        cover_image_url: post.cover_image_url,
        author_id: post.author_id,
        author: author_response(author),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}
