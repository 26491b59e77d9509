//! Account handlers.
//!
//! ```text
//! POST /api/register {"username":"Alice","phone":"+1...","email":"a@x","password":"..."}
//! POST /api/login    {"email":"a@x","password":"..."}
//! POST /api/logout
//! ```

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::ports::{LoginError, NewProfile};
use crate::domain::Error;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request body for `POST /api/register`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /api/login`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn map_login_error(error: LoginError) -> Error {
    match error {
        // Duplicate email is a state conflict, same as a violated guard.
        LoginError::EmailTaken { email } => {
            Error::guard(format!("email {email} is already registered"))
        }
        LoginError::Backend { message } => Error::persistence(message),
    }
}

#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    if payload.email.trim().is_empty() {
        return Err(Error::invalid_request("email must not be empty"));
    }
    if payload.password.is_empty() {
        return Err(Error::invalid_request("password must not be empty"));
    }
    let user = state
        .login
        .register(NewProfile {
            username: payload.username,
            phone: payload.phone,
            email: payload.email,
            password: payload.password,
        })
        .await
        .map_err(map_login_error)?;
    Ok(HttpResponse::Created().json(json!({"userId": user.id})))
}

#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let user = state
        .login
        .authenticate(&payload.email, &payload.password)
        .await
        .map_err(map_login_error)?
        .ok_or(Error::Unauthorized)?;
    session.persist_caller(&user)?;
    info!(user = %user.id, "signed in");
    Ok(HttpResponse::Ok().json(json!({"userId": user.id, "role": user.role})))
}

#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test as actix_test, web, App};
    use serde_json::Value;

    use crate::domain::lifecycle::{LifecycleEngine, SiblingPolicy};
    use crate::domain::ports::MarketplaceViews;
    use crate::domain::views::ViewAssembler;
    use crate::inbound::ws::broadcast::Broadcaster;
    use crate::outbound::persistence::{MemoryStore, Sha256LoginService};

    fn state() -> HttpState {
        let store = Arc::new(MemoryStore::new());
        let views: Arc<dyn MarketplaceViews> = Arc::new(ViewAssembler::new(Arc::clone(&store)));
        HttpState::new(
            Arc::new(Sha256LoginService::new(Arc::clone(&store))),
            Arc::new(LifecycleEngine::new(store, SiblingPolicy::Retain)),
            Broadcaster::new(views),
        )
    }

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(web::scope("/api").service(register).service(login).service(logout))
    }

    fn register_body(email: &str) -> RegisterRequest {
        RegisterRequest {
            username: "Alice".into(),
            phone: "+10000000000".into(),
            email: email.into(),
            password: "hunter2".into(),
        }
    }

    #[actix_web::test]
    async fn register_then_login_sets_a_session_cookie() {
        let app = actix_test::init_service(test_app(state())).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/register")
                .set_json(register_body("a@example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/login")
                .set_json(LoginRequest {
                    email: "a@example.com".into(),
                    password: "hunter2".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res
            .response()
            .cookies()
            .any(|cookie| cookie.name() == "session"));
        let body = actix_test::read_body(res).await;
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["role"], "client");
    }

    #[actix_web::test]
    async fn duplicate_email_conflicts() {
        let app = actix_test::init_service(test_app(state())).await;
        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/api/register")
                    .set_json(register_body("a@example.com"))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), expected);
        }
    }

    #[actix_web::test]
    async fn blank_credentials_are_rejected() {
        let app = actix_test::init_service(test_app(state())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/register")
                .set_json(register_body("  "))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = actix_test::read_body(res).await;
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let app = actix_test::init_service(test_app(state())).await;
        actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/register")
                .set_json(register_body("a@example.com"))
                .to_request(),
        )
        .await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/login")
                .set_json(LoginRequest {
                    email: "a@example.com".into(),
                    password: "wrong".into(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_clears_the_session() {
        let app = actix_test::init_service(test_app(state())).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post().uri("/api/logout").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
