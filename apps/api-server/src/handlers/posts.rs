//! Post handlers: public reads, owner-only writes.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::{PageRequest, Post, PostDraft, PostWithAuthor, subject_owns};
use quill_core::ports::AuthError;
use quill_shared::MessageResponse;
use quill_shared::dto::{ListPostsQuery, PostRequest, PostResponse};

use super::views::post_response;
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

fn draft_from(req: &PostRequest) -> Result<PostDraft, AppError> {
    Ok(PostDraft::parse(
        &req.title,
        &req.content,
        req.cover_image_url.as_deref(),
    )?)
}

/// Load a post for modification, enforcing existence before ownership.
async fn owned_post(state: &AppState, id: Uuid, user: &AuthenticatedUser) -> AppResult<Post> {
    let post = state.posts.find_by_id(id).await?.ok_or_else(post_not_found)?;

    if !subject_owns(&post, user.user_id) {
        tracing::debug!(post_id = %id, user_id = %user.user_id, "Rejected write by non-owner");
        return Err(AppError::Forbidden(
            "You do not have permission to modify this post".to_string(),
        ));
    }

    Ok(post)
}

async fn reload(state: &AppState, id: Uuid) -> AppResult<PostWithAuthor> {
    state
        .posts
        .find_with_author(id)
        .await?
        .ok_or_else(post_not_found)
}

/// GET /api/v1/posts?page=&limit=
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::parse(query.page.as_deref(), query.limit.as_deref())?;

    let posts: Vec<PostResponse> = state
        .posts
        .list_recent(page.offset(), page.limit)
        .await?
        .into_iter()
        .map(post_response)
        .collect();

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = reload(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/v1/posts
pub async fn create_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let draft = draft_from(&body)?;

    // A well-signed token can outlive its user (account removed, store reset).
    if state.users.find_by_id(user.user_id).await?.is_none() {
        tracing::debug!(user_id = %user.user_id, "Token subject no longer exists");
        return Err(AuthError::InvalidToken("unknown subject".to_string()).into());
    }

    let post = state.posts.insert(Post::new(user.user_id, draft)).await?;
    tracing::info!(post_id = %post.id, author_id = %user.user_id, "Post created");

    let post = reload(&state, post.id).await?;
    Ok(HttpResponse::Created().json(post_response(post)))
}

/// PUT /api/v1/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut post = owned_post(&state, id, &user).await?;

    post.revise(draft_from(&body)?);
    state.posts.update(post).await?;
    tracing::info!(post_id = %id, "Post updated");

    let post = reload(&state, id).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    owned_post(&state, id, &user).await?;

    state.posts.delete(id).await?;
    tracing::info!(post_id = %id, "Post deleted");

    Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")))
}
