//! Signup and login.

use actix_web::{HttpResponse, web};

use quill_core::domain::{NewUser, User};
use quill_core::error::RepoError;
use quill_core::ports::AuthError;
use quill_shared::MessageResponse;
use quill_shared::dto::{LoginRequest, SignupRequest, TokenResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const DUPLICATE_ACCOUNT: &str = "Username or email already exists";

/// POST /api/v1/auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let new_user = NewUser::parse(&req.username, &req.email, &req.password)?;

    if state
        .users
        .exists_by_username_or_email(&new_user.username, &new_user.email)
        .await?
    {
        return Err(AppError::Conflict(DUPLICATE_ACCOUNT.to_string()));
    }

    // Argon2 is CPU-bound; keep it off the async workers.
    let passwords = state.passwords.clone();
    let password = new_user.password;
    let password_hash = web::block(move || passwords.hash(&password)).await??;

    let user = User::new(new_user.username, new_user.email, password_hash);
    match state.users.insert(user).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User signed up");
            Ok(HttpResponse::Created().json(MessageResponse::new("User created successfully")))
        }
        // Lost a race with a concurrent signup for the same name or email.
        Err(RepoError::Constraint(_)) => Err(AppError::Conflict(DUPLICATE_ACCOUNT.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// POST /api/v1/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    let Some(user) = state.users.find_by_username(username).await? else {
        tracing::debug!("Login attempt for unknown username");
        return Err(AuthError::InvalidCredentials.into());
    };

    let passwords = state.passwords.clone();
    let password = req.password;
    let hash = user.password_hash.clone();
    let valid = web::block(move || passwords.verify(&password, &hash)).await??;

    if !valid {
        tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.issue_token(&user)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, http::header, test};
    use serde_json::json;

    use crate::test_support::{TEST_PASSWORD, TestContext, test_app};

    #[actix_web::test]
    async fn test_signup_then_login_issues_usable_token() {
        let ctx = TestContext::new();
        let app = test_app!(ctx.state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/signup")
            .set_json(json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "hunter2hunter2"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body.get("message").is_some());
        assert!(body.get("password_hash").is_none());

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": "alice", "password": "hunter2hunter2" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        let token = body["token"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri("/api/v1/posts")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .set_json(json!({ "title": "Hello", "content": "First post" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn test_duplicate_username_or_email_conflicts() {
        let ctx = TestContext::new();
        ctx.seed_user("alice").await;
        let app = test_app!(ctx.state);

        let attempts = [
            json!({ "username": "alice", "email": "other@example.com", "password": "password123" }),
            json!({ "username": "bob", "email": "alice@example.com", "password": "password123" }),
        ];
        let mut messages = Vec::new();
        for payload in attempts {
            let req = test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CONFLICT);
            let body: serde_json::Value = test::read_body_json(resp).await;
            messages.push(body["error"].clone());
        }

        assert_eq!(messages[0], messages[1]);
    }

    #[actix_web::test]
    async fn test_signup_validation() {
        let ctx = TestContext::new();
        let app = test_app!(ctx.state);

        let payloads = [
            json!({ "username": "carol", "email": "carol@example.com", "password": "short" }),
            json!({ "username": "", "email": "carol@example.com", "password": "password123" }),
            json!({ "username": "carol", "email": "not-an-email", "password": "password123" }),
            json!({ "username": "carol" }),
        ];
        for payload in payloads {
            let req = test::TestRequest::post()
                .uri("/api/v1/auth/signup")
                .set_json(&payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{payload}");
        }
    }

    #[actix_web::test]
    async fn test_login_failures_look_the_same() {
        let ctx = TestContext::new();
        ctx.seed_user("alice").await;
        let app = test_app!(ctx.state);

        let mut bodies = Vec::new();
        for payload in [
            json!({ "username": "alice", "password": "wrong-password" }),
            json!({ "username": "nobody", "password": TEST_PASSWORD }),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let body: serde_json::Value = test::read_body_json(resp).await;
            bodies.push(body);
        }

        assert_eq!(bodies[0], bodies[1]);
        assert_eq!(bodies[0]["error"], "Invalid username or password");
    }

    #[actix_web::test]
    async fn test_login_requires_fields() {
        let ctx = TestContext::new();
        let app = test_app!(ctx.state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "username": "", "password": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let ctx = TestContext::new();
        let app = test_app!(ctx.state);

        let req = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}
