/*
 * Responsibility
 * - Load Config → build dependencies → assemble the Router
 * - Apply middleware (request gate on /api/v1, CORS, transport layers)
 * - Start axum::serve() with graceful shutdown
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api::{self, v1::handlers::health::health},
    config::Config,
    middleware::{self as mw, auth::RequestGate},
    repos::{ExpenseRepo, ExpenseStore, ProfileRepo, ProfileStore},
    services::{
        ExpenseService, ProfileService,
        auth::{
            AuthService, CredentialVerifier, IdentityStore, RevocationStore, TokenService,
            factory,
        },
    },
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG wins when set, e.g. RUST_LOG=info,expense_api=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Panics go through tracing too so they show up wherever the logs go
        tracing::error!(?info, "panic");

        // Development: crash the process so it gets noticed. Production: log and keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    info!(?config, "starting expense-api in {:?} mode on {}", config.app_env, config.addr);

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to apply migrations")?;
        info!("migrations applied");
    }

    let tokens = factory::build_token_service(&config);
    let revocations = factory::build_revocation_store(&config).await?;
    let profiles = Arc::new(ProfileRepo::new(pool.clone()));
    let expenses = Arc::new(ExpenseRepo::new(pool));

    let (state, gate) = build_state(tokens, revocations, profiles.clone(), profiles, expenses);
    let app = build_router(state, gate, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

/// Wire services together. The signing key and the revocation store are shared, never global.
fn build_state(
    tokens: Arc<TokenService>,
    revocations: Arc<dyn RevocationStore>,
    identities: Arc<dyn IdentityStore>,
    profiles: Arc<dyn ProfileStore>,
    expenses: Arc<dyn ExpenseStore>,
) -> (AppState, RequestGate) {
    let gate = RequestGate::new(tokens.clone(), revocations.clone(), identities.clone());

    let auth = AuthService::new(tokens, CredentialVerifier::new(identities), revocations);
    let profiles = ProfileService::new(profiles);
    let expenses = ExpenseService::new(expenses);

    let state = AppState::new(Arc::new(auth), Arc::new(profiles), Arc::new(expenses));
    (state, gate)
}

fn build_router(state: AppState, gate: RequestGate, config: &Config) -> Router {
    let v1 = mw::auth::access::apply(api::v1::routes(), gate);

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", v1)
        .with_state(state);

    let router = mw::cors::apply(router, config);
    mw::http::apply(router, config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppEnv;
    use crate::repos::testing::{InMemoryExpenseStore, InMemoryProfileStore};
    use crate::services::auth::revocation::InMemoryRevocationStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const EMAIL: &str = "alice@example.com";
    const PASSWORD: &str = "correct horse";

    fn test_config() -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            app_env: AppEnv::Development,
            database_url: "postgres://postgres@localhost/expense_api_test".into(),
            database_max_connections: 1,
            run_migrations: false,
            jwt_secret: "router-test-secret".into(),
            access_token_ttl_seconds: 3600,
            valkey_url: None,
            revocation_key_prefix: "test:revoked".into(),
            cors_allowed_origins: Vec::new(),
            request_body_limit_bytes: 64 * 1024,
            request_timeout_seconds: 5,
        }
    }

    // Profiles double as the identity store, so a fresh registration can log in
    fn test_app() -> Router {
        let config = test_config();
        let profiles = Arc::new(InMemoryProfileStore::new().with_profile("Alice", EMAIL, PASSWORD));

        let (state, gate) = build_state(
            factory::build_token_service(&config),
            Arc::new(InMemoryRevocationStore::new()),
            profiles.clone(),
            profiles,
            Arc::new(InMemoryExpenseStore::new()),
        );
        build_router(state, gate, &config)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn login_request(email: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"email": email, "password": password}).to_string(),
            ))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn login(app: &Router) -> String {
        let (status, body) = send(app, login_request(EMAIL, PASSWORD)).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_outside_the_gate() {
        let app = test_app();

        let (status, body) = send(&app, authed("GET", "/health", "garbage")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let app = test_app();
        let res = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(res.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn login_returns_bearer_token() {
        let app = test_app();

        let (status, body) = send(&app, login_request(EMAIL, PASSWORD)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], EMAIL);
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["expires_in"], 3600);
        assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
    }

    #[tokio::test]
    async fn login_with_bad_credentials_is_401() {
        let app = test_app();

        let (status, body) = send(&app, login_request(EMAIL, "wrong password")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (status, _) = send(&app, login_request("nobody@example.com", PASSWORD)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_with_blank_email_is_400() {
        let app = test_app();

        let (status, body) = send(&app, login_request("", PASSWORD)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn protected_routes_reject_anonymous_callers() {
        let app = test_app();

        for (method, uri) in [
            ("GET", "/api/v1/expenses"),
            ("GET", "/api/v1/profile"),
            ("DELETE", "/api/v1/expenses/8d1f6f0c-1b7e-4c5f-9a55-0d7c2f7f3a10"),
            ("POST", "/api/v1/logout"),
        ] {
            let req = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_by_the_gate() {
        let app = test_app();

        let (status, _) = send(&app, authed("GET", "/api/v1/expenses", "not-a-token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_revokes_the_token() {
        let app = test_app();
        let token = login(&app).await;

        let (status, _) = send(&app, authed("POST", "/api/v1/logout", &token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        // Same token again: the gate refuses it before any handler runs
        let (status, body) = send(&app, authed("POST", "/api/v1/logout", &token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        // Logging in again right away gets a distinct, usable token
        let fresh = login(&app).await;
        assert_ne!(fresh, token);
        let (status, _) = send(&app, authed("POST", "/api/v1/logout", &fresh)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn body_missing_a_field_is_a_validation_error() {
        let app = test_app();

        let req = json_request("POST", "/api/v1/login", None, json!({"email": "a@b.c"}));
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
        assert_eq!(body["error"]["status_code"], 400);

        let req = json_request("POST", "/api/v1/register", None, json!({"name": "Bob"}));
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    }

    #[tokio::test]
    async fn mistyped_expense_fields_are_validation_errors() {
        let app = test_app();
        let token = login(&app).await;

        for bad in [
            json!({"name": "Lunch", "category": "Food", "date": "01/03/2024", "amount": 12}),
            json!({"name": "Lunch", "category": "Food", "date": "2024-03-01", "amount": "lots"}),
        ] {
            let req = json_request("POST", "/api/v1/expenses", Some(&token), bad);
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
        }
    }

    #[tokio::test]
    async fn register_then_login_and_duplicate_is_409() {
        let app = test_app();
        let body = json!({"name": "Bob", "email": "bob@example.com", "password": "hunter22"});

        let (status, profile) =
            send(&app, json_request("POST", "/api/v1/register", None, body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(profile["email"], "bob@example.com");
        assert!(profile.get("password_hash").is_none());

        let (status, dup) = send(&app, json_request("POST", "/api/v1/register", None, body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(dup["error"]["code"], "DATA_EXISTS");
        assert_eq!(dup["error"]["message"], "Profile already exists bob@example.com");

        let (status, login) = send(&app, login_request("bob@example.com", "hunter22")).await;
        assert_eq!(status, StatusCode::OK);
        let token = login["token"].as_str().unwrap();

        let (status, me) = send(&app, authed("GET", "/api/v1/profile", token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["profile_id"], profile["profile_id"]);
    }

    #[tokio::test]
    async fn expense_crud_round() {
        let app = test_app();
        let token = login(&app).await;

        let (status, created) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/expenses",
                Some(&token),
                json!({"name": "Lunch", "category": "Food", "date": "2024-03-01", "amount": 12.5}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["expense_id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/expenses/{id}");

        let (status, updated) = send(
            &app,
            json_request(
                "PUT",
                &uri,
                Some(&token),
                json!({"name": "Dinner", "category": "Food", "date": "2024-03-02", "amount": 30}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["expense_id"], created["expense_id"]);
        assert_eq!(updated["created_at"], created["created_at"]);
        assert_eq!(updated["name"], "Dinner");

        let (status, list) = send(&app, authed("GET", "/api/v1/expenses", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().map(Vec::len), Some(1));

        let (status, _) = send(&app, authed("DELETE", &uri, &token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, gone) = send(&app, authed("GET", &uri, &token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(gone["error"]["code"], "DATA_NOT_FOUND");
        assert_eq!(
            gone["error"]["message"],
            format!("Expense not found for the id {id}")
        );
    }
}
