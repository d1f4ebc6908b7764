use std::sync::{Arc, Mutex};

use anima::{
    config::AppConfig,
    http::{
        ApiService,
        error::{ApiError, CONNECTION_MESSAGE, FALLBACK_MESSAGE},
        models::UserProfile,
        traits::{AuthApi, RecoveryApi},
    },
    session::Session,
};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Seen {
    bodies: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Seen {
    fn record(&self, path: &str, body: Value) {
        self.bodies.lock().unwrap().push((path.to_string(), body));
    }

    fn body(&self, path: &str) -> Value {
        self.bodies
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, b)| b.clone())
            .unwrap_or(Value::Null)
    }
}

async fn login(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    seen.record("/auth/login", body.clone());
    if body["password"] == "secreto" {
        (
            StatusCode::OK,
            Json(json!({
                "token": "abc.def.ghi",
                "user": { "id": "1", "name": "Ana", "email": body["email"] },
                "message": "ok",
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Credenciales inválidas" })),
        )
    }
}

async fn me(headers: HeaderMap) -> impl IntoResponse {
    match headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        Some("Bearer abc.def.ghi") => (
            StatusCode::OK,
            Json(json!({ "user": { "id": "1", "name": "Ana Pérez", "is_active": true } })),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Token requerido" })),
        ),
    }
}

async fn request_reset(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    seen.record("/auth/password/request-reset", body);
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "No existe una cuenta con ese correo" })),
    )
}

async fn verify_code(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    seen.record("/auth/password/verify-code", body);
    (StatusCode::BAD_GATEWAY, "upstream exploded")
}

async fn reset_password(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    seen.record("/auth/password/reset-password", body);
    Json(json!({ "success": true, "message": "Contraseña actualizada" }))
}

async fn resend_code(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    seen.record("/auth/password/resend-code", body);
    (StatusCode::OK, "sent")
}

async fn spawn_server() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/password/request-reset", post(request_reset))
        .route("/auth/password/verify-code", post(verify_code))
        .route("/auth/password/reset-password", post(reset_password))
        .route("/auth/password/resend-code", post(resend_code))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

fn client(base_url: &str, session: Session) -> ApiService {
    let config = AppConfig {
        api_url: base_url.to_string(),
        ..AppConfig::default()
    };
    ApiService::new(&config, session).unwrap()
}

#[tokio::test]
async fn login_posts_json_and_decodes_the_session() {
    let (url, seen) = spawn_server().await;
    let api = client(&url, Session::in_memory());

    let response = api.login("  ana@x.io ", "secreto").await.unwrap();
    assert_eq!(response.token, "abc.def.ghi");
    assert_eq!(response.user.display_name(), "Ana");
    assert_eq!(
        seen.body("/auth/login"),
        json!({ "email": "ana@x.io", "password": "secreto" })
    );
}

#[tokio::test]
async fn rejection_carries_the_server_message() {
    let (url, _seen) = spawn_server().await;
    let api = client(&url, Session::in_memory());

    let err = api.login("ana@x.io", "otra").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Service {
            status: 401,
            message: "Credenciales inválidas".into()
        }
    );
    assert!(err.is_unauthorized());

    let err = api.request_password_reset("nadie@x.io").await.unwrap_err();
    assert_eq!(err.user_message(), "No existe una cuenta con ese correo");
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_the_generic_message() {
    let (url, seen) = spawn_server().await;
    let api = client(&url, Session::in_memory());

    let err = api.verify_reset_code("ana@x.io", "123456").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Service {
            status: 502,
            message: FALLBACK_MESSAGE.into()
        }
    );
    assert_eq!(
        seen.body("/auth/password/verify-code"),
        json!({ "email": "ana@x.io", "code": "123456" })
    );
}

#[tokio::test]
async fn non_json_success_body_is_an_empty_ack() {
    let (url, _seen) = spawn_server().await;
    let api = client(&url, Session::in_memory());

    let ack = api.resend_reset_code("ana@x.io").await.unwrap();
    assert_eq!(ack.success, None);
    assert_eq!(ack.message, None);
}

#[tokio::test]
async fn reset_sends_the_new_password_field() {
    let (url, seen) = spawn_server().await;
    let api = client(&url, Session::in_memory());

    let ack = api
        .reset_password("ana@x.io", "123456", "nueva-clave")
        .await
        .unwrap();
    assert_eq!(ack.success, Some(true));
    assert_eq!(
        seen.body("/auth/password/reset-password"),
        json!({ "email": "ana@x.io", "code": "123456", "new_password": "nueva-clave" })
    );
}

#[tokio::test]
async fn current_user_sends_the_stored_bearer_token() {
    let (url, _seen) = spawn_server().await;
    let session = Session::in_memory();
    let api = client(&url, session.clone());

    let err = api.current_user().await.unwrap_err();
    assert!(err.is_unauthorized());

    session
        .save("abc.def.ghi", &UserProfile::default())
        .unwrap();
    let user = api.current_user().await.unwrap();
    assert_eq!(user.display_name(), "Ana Pérez");
    assert_eq!(user.is_active, Some(true));
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{addr}"), Session::in_memory());
    let err = api.request_password_reset("ana@x.io").await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.user_message(), CONNECTION_MESSAGE);
}
