//! Public author profiles.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use super::views::author_response;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/v1/author/{id}
pub async fn get_author(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Author not found".to_string()))?;

    Ok(HttpResponse::Ok().json(author_response(user)))
}
