// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        auth_handlers, catalog_handlers, mw_auth, mw_role, registration_handlers,
        schedule_handlers, session_handlers, user_handlers,
    },
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Public ---
    let public_routes = Router::new()
        .route("/auth/login", post(auth_handlers::handle_login))
        .route("/auth/logout", post(auth_handlers::handle_logout));

    // --- Coordinator ---
    let coordinator_routes = Router::new()
        .route("/subjects", post(catalog_handlers::create_subject))
        .route("/users", post(user_handlers::create_user))
        .route_layer(middleware::from_fn(mw_role::require_coordinator));

    // --- Tutor or coordinator ---
    let class_manager_routes = Router::new()
        .route("/classes", post(session_handlers::create_class))
        .route(
            "/classes/{class_id}/sessions/{session_id}/complete",
            post(session_handlers::complete_session),
        )
        .route(
            "/classes/{class_id}/sessions/{session_id}/cancel",
            post(session_handlers::cancel_session),
        )
        .route(
            "/registrations/class/{class_id}/mentees",
            get(registration_handlers::class_mentees),
        )
        .route_layer(middleware::from_fn(mw_role::require_tutor_or_coordinator));

    // --- Any signed-in user ---
    let registration_routes = Router::new()
        .route("/register", post(registration_handlers::register))
        .route("/cancel", post(registration_handlers::cancel))
        .route("/reschedule", post(registration_handlers::reschedule))
        .route("/check-conflict", get(registration_handlers::check_conflict))
        .route("/mentee/{mentee_id}", get(registration_handlers::mentee_registrations));

    // Role layers above run after require_auth, which is applied to everything here
    let authenticated_routes = Router::new()
        .route("/auth/me", get(auth_handlers::handle_me))
        .route("/subjects", get(catalog_handlers::list_subjects))
        .route("/subjects/{id}", get(catalog_handlers::get_subject))
        .route("/classes", get(catalog_handlers::list_classes))
        .route("/classes/grouped", get(catalog_handlers::grouped_classes))
        .route("/classes/{class_id}/sessions", get(catalog_handlers::class_sessions))
        .route("/schedule", get(schedule_handlers::schedule_page))
        .nest("/registrations", registration_routes)
        .merge(class_manager_routes)
        .merge(coordinator_routes)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::test_support::{insert_subject, test_pool, ClassSeed},
        models::user::Role,
        services::user_service,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use sqlx::SqlitePool;
    use tower::ServiceExt;
    use tower_sessions::SessionManagerLayer;
    use tower_sessions_sqlx_store::SqliteStore;

    async fn test_app(pool: &SqlitePool) -> Router {
        let store = SqliteStore::new(pool.clone());
        store.migrate().await.unwrap();
        create_router(AppState { db_pool: pool.clone() })
            .layer(SessionManagerLayer::new(store).with_secure(false))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response: Response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, cookie, body)
    }

    fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login(app: &Router, email: &str, password: &str) -> String {
        let (status, cookie, body) = send(
            app,
            json_request("POST", "/auth/login", None, json!({ "email": email, "password": password })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        cookie.expect("session cookie")
    }

    #[tokio::test]
    async fn unauthenticated_requests_get_401() {
        let pool = test_pool().await;
        let app = test_app(&pool).await;

        let (status, _, body) = send(&app, get_request("/subjects", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let pool = test_pool().await;
        let app = test_app(&pool).await;
        user_service::create_user(&pool, "ana@uni.edu", "Ana", "correct-horse", &[Role::Mentee])
            .await
            .unwrap();

        let (status, cookie, body) = send(
            &app,
            json_request("POST", "/auth/login", None, json!({ "email": "ana@uni.edu", "password": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(cookie.is_none());
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn conflicting_registration_reports_conflicts() {
        let pool = test_pool().await;
        let app = test_app(&pool).await;
        let mentee = user_service::create_user(&pool, "ana@uni.edu", "Ana", "correct-horse", &[Role::Mentee])
            .await
            .unwrap();
        let tutor = user_service::create_user(&pool, "tom@uni.edu", "Tom", "correct-horse", &[Role::Tutor])
            .await
            .unwrap();
        let cs = insert_subject(&pool, "CS101").await;
        let ma = insert_subject(&pool, "MA101").await;
        let first = ClassSeed::new(cs, &tutor, 2, 1, 3).insert(&pool).await;
        let second = ClassSeed::new(ma, &tutor, 2, 2, 4).insert(&pool).await;

        let cookie = login(&app, "ana@uni.edu", "correct-horse").await;

        let (status, _, body) = send(
            &app,
            json_request(
                "POST",
                "/registrations/register",
                Some(&cookie),
                json!({ "class_id": first, "mentee_id": mentee }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["class_id"], json!(first));

        let (status, _, body) = send(
            &app,
            json_request(
                "POST",
                "/registrations/register",
                Some(&cookie),
                json!({ "class_id": second, "mentee_id": mentee }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["success"], json!(false));
        let conflicts = body["conflicts"].as_array().expect("conflicts array");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0]["conflicting_class_id"], json!(first));

        let (status, _, body) = send(
            &app,
            get_request(
                &format!("/registrations/check-conflict?mentee_id={mentee}&class_id={second}"),
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["has_conflict"], json!(true));
    }

    #[tokio::test]
    async fn roles_gate_routes() {
        let pool = test_pool().await;
        let app = test_app(&pool).await;
        let mentee = user_service::create_user(&pool, "ana@uni.edu", "Ana", "correct-horse", &[Role::Mentee])
            .await
            .unwrap();
        let other = user_service::create_user(&pool, "bob@uni.edu", "Bob", "correct-horse", &[Role::Mentee])
            .await
            .unwrap();
        user_service::create_user(&pool, "boss@uni.edu", "Boss", "correct-horse", &[Role::Coordinator])
            .await
            .unwrap();

        let mentee_cookie = login(&app, "ana@uni.edu", "correct-horse").await;
        let (status, _, _) = send(
            &app,
            json_request("POST", "/subjects", Some(&mentee_cookie), json!({ "name": "Algebra", "code": "MA1" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(
            &app,
            get_request(&format!("/registrations/mentee/{other}"), Some(&mentee_cookie)),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, body) = send(
            &app,
            get_request(&format!("/registrations/mentee/{mentee}"), Some(&mentee_cookie)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));

        let boss_cookie = login(&app, "boss@uni.edu", "correct-horse").await;
        let (status, _, body) = send(
            &app,
            json_request("POST", "/subjects", Some(&boss_cookie), json!({ "name": "Algebra", "code": "MA1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["code"], json!("MA1"));

        let (status, _, body) = send(&app, get_request("/auth/me", Some(&boss_cookie))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["roles"], json!(["coordinator"]));
    }
}
