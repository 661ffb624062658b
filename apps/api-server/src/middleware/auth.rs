//! Authentication gate and the authenticated-user extractor.
//!
//! [`RequireAuth`] wraps protected routes: it checks the `Authorization:
//! Bearer <token>` header, verifies the token and stores an
//! [`AuthenticatedUser`] in the request extensions. Handlers read it back
//! through the [`AuthenticatedUser`] extractor.

use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
    web,
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use uuid::Uuid;

use quill_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// The verified subject of the current request.
///
/// ```ignore
/// async fn protected_route(user: AuthenticatedUser) -> impl Responder {
///     format!("Hello, {}!", user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();

        ready(user.ok_or_else(|| {
            AppError::Internal(format!(
                "authentication gate not configured for {} {}",
                req.method(),
                req.path()
            ))
        }))
    }
}

/// Check the bearer token on a request and resolve its subject.
fn authenticate(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("AppState not found in app data".to_string()))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;

    let token = header_value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

    let claims = state.tokens.verify_token(token)?;

    Ok(AuthenticatedUser {
        user_id: claims.user_id,
        username: claims.username,
    })
}

/// Middleware factory for protected routes and scopes.
pub struct RequireAuth;

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthService { service }))
    }
}

pub struct RequireAuthService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(user) => {
                tracing::debug!(
                    user_id = %user.user_id,
                    username = %user.username,
                    "Request authenticated"
                );
                req.extensions_mut().insert(user);

                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res.map_into_left_body())
                })
            }
            Err(err) => {
                tracing::debug!(path = %req.path(), error = %err, "Rejected request");

                let (http_req, _payload) = req.into_parts();
                let response = ServiceResponse::new(http_req, err.error_response());

                Box::pin(async move { Ok(response.map_into_right_body()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test};
    use quill_core::domain::User;

    use crate::test_support::TestContext;

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().body(user.user_id.to_string())
    }

    #[actix_web::test]
    async fn test_gate_rejects_missing_and_malformed_headers() {
        let ctx = TestContext::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state.clone()))
                .route("/me", web::get().to(whoami).wrap(RequireAuth)),
        )
        .await;

        let cases = [None, Some("Token abc"), Some("Bearer "), Some("bearer abc")];
        for header_value in cases {
            let mut req = test::TestRequest::get().uri("/me");
            if let Some(value) = header_value {
                req = req.insert_header((header::AUTHORIZATION, value));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{header_value:?}");
        }

        let resp = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing Authorization header");
    }

    #[actix_web::test]
    async fn test_gate_injects_subject() {
        let ctx = TestContext::new();
        let (user, token) = ctx.seed_user("alice").await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state.clone()))
                .route("/me", web::get().to(whoami).wrap(RequireAuth)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;

        assert_eq!(body, user.id.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn test_gate_rejects_token_from_other_secret() {
        use quill_core::ports::TokenService;
        use quill_infra::{JwtConfig, JwtTokenService};

        let ctx = TestContext::new();
        let foreign = JwtTokenService::new(JwtConfig::new("some-other-secret"))
            .issue_token(&User::new("mallory".into(), "m@example.com".into(), "h".into()))
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state.clone()))
                .route("/me", web::get().to(whoami).wrap(RequireAuth)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {foreign}")))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_extractor_without_gate_fails_loudly() {
        let ctx = TestContext::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.state.clone()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
