//! End-to-end page flows through the real router: sign-in, dashboard gating,
//! role-specific copy and sign-out.

use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use researchable::config::{ServerConfig, ServiceConfig};
use researchable::server::{build_router, AppState, SESSION_COOKIE};

async fn spawn_app(service: ServiceConfig) -> String {
    let server = ServerConfig { secure_cookies: false, ..Default::default() };
    let app = build_router(AppState::new(server, service));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn no_redirects() -> reqwest::Client {
    reqwest::Client::builder().redirect(Policy::none()).build().expect("client")
}

fn session_cookie(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|nv| nv.starts_with(&format!("{SESSION_COOKIE}=")))
        .map(str::to_string)
}

async fn mount_user(server: &MockServer, meta: serde_json::Value) {
    let user = json!({
        "id": "u-1",
        "email": "someone@school.org",
        "user_metadata": meta,
        "created_at": "2024-09-01T10:00:00Z"
    });
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-1", "refresh_token": "rt-1", "expires_in": 3600, "user": user.clone()
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user))
        .mount(server)
        .await;
}

async fn sign_in(http: &reqwest::Client, base: &str) -> String {
    let resp = http
        .post(format!("{base}/auth/signin"))
        .form(&[("email", "someone@school.org"), ("password", "secret1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/dashboard");
    session_cookie(&resp).expect("session cookie")
}

#[tokio::test]
async fn dashboard_without_session_redirects_to_sign_in() {
    let server = MockServer::start().await;
    let base = spawn_app(ServiceConfig::new(Some(server.uri()), Some("anon-key".into()))).await;

    let resp = no_redirects().get(format!("{base}/dashboard")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/auth/signin");
    let body = resp.text().await.unwrap();
    assert!(!body.contains("Welcome"));
    assert!(!body.contains("Dashboard"));
}

#[tokio::test]
async fn dashboard_with_unknown_cookie_redirects() {
    let base = spawn_app(ServiceConfig::default()).await;
    let resp = no_redirects()
        .get(format!("{base}/dashboard"))
        .header(COOKIE, format!("{SESSION_COOKIE}=forged"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/auth/signin");
}

#[tokio::test]
async fn teacher_sees_teacher_dashboard() {
    let server = MockServer::start().await;
    mount_user(&server, json!({"full_name": "Ana", "role": "teacher"})).await;
    let base = spawn_app(ServiceConfig::new(Some(server.uri()), Some("anon-key".into()))).await;
    let http = no_redirects();

    let cookie = sign_in(&http, &base).await;
    let resp = http.get(format!("{base}/dashboard")).header(COOKIE, cookie).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Welcome, Ana"));
    assert!(body.contains("Teacher Dashboard"));
    assert!(body.contains("Create Competition"));
}

#[tokio::test]
async fn empty_metadata_sees_student_defaults() {
    let server = MockServer::start().await;
    mount_user(&server, json!({})).await;
    let base = spawn_app(ServiceConfig::new(Some(server.uri()), Some("anon-key".into()))).await;
    let http = no_redirects();

    let cookie = sign_in(&http, &base).await;
    let body = http
        .get(format!("{base}/dashboard"))
        .header(COOKIE, cookie)
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Welcome, User"));
    assert!(body.contains("Student Dashboard"));
}

#[tokio::test]
async fn dashboard_redirects_when_user_lookup_fails_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-9", "refresh_token": "rt-9", "expires_in": 3600,
            "user": {"id": "u-9", "user_metadata": {"full_name": "Ana"}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "upstream unavailable"})))
        .mount(&server)
        .await;
    let base = spawn_app(ServiceConfig::new(Some(server.uri()), Some("anon-key".into()))).await;
    let http = no_redirects();

    let cookie = sign_in(&http, &base).await;
    let resp = http.get(format!("{base}/dashboard")).header(COOKIE, cookie).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/auth/signin");
    assert!(!resp.text().await.unwrap().contains("Welcome"));
}

#[tokio::test]
async fn failed_sign_in_renders_inline_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error_description": "Invalid login credentials"})))
        .mount(&server)
        .await;
    let base = spawn_app(ServiceConfig::new(Some(server.uri()), Some("anon-key".into()))).await;

    let resp = no_redirects()
        .post(format!("{base}/auth/signin"))
        .form(&[("email", "someone@school.org"), ("password", "nope")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&resp).is_none());
    let body = resp.text().await.unwrap();
    assert!(body.contains("Invalid login credentials"));
    assert!(body.contains("value=\"someone@school.org\""));
}

#[tokio::test]
async fn sign_out_without_session_still_goes_home() {
    let base = spawn_app(ServiceConfig::default()).await;
    let resp = no_redirects().post(format!("{base}/auth/signout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn sign_out_ignores_upstream_failure_and_ends_session() {
    let server = MockServer::start().await;
    mount_user(&server, json!({"full_name": "Ana"})).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"msg": "boom"})))
        .expect(1)
        .mount(&server)
        .await;
    let base = spawn_app(ServiceConfig::new(Some(server.uri()), Some("anon-key".into()))).await;
    let http = no_redirects();

    let cookie = sign_in(&http, &base).await;
    let resp = http.post(format!("{base}/auth/signout")).header(COOKIE, cookie.clone()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(LOCATION).unwrap(), "/");
    let cleared = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
    assert!(cleared.contains("Max-Age=0"));

    let again = http.get(format!("{base}/dashboard")).header(COOKIE, cookie).send().await.unwrap();
    assert_eq!(again.headers().get(LOCATION).unwrap(), "/auth/signin");
}

#[tokio::test]
async fn sign_up_form_preselects_role_from_query() {
    let base = spawn_app(ServiceConfig::default()).await;
    let body = reqwest::get(format!("{base}/auth/signup?role=teacher")).await.unwrap().text().await.unwrap();
    assert!(body.contains("<option value=\"teacher\" selected>"));
}

#[tokio::test]
async fn sign_up_pending_confirmation_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-7", "email": "new@school.org", "user_metadata": {"role": "student"}, "created_at": "2024-09-01T10:00:00Z"
        })))
        .mount(&server)
        .await;
    let base = spawn_app(ServiceConfig::new(Some(server.uri()), Some("anon-key".into()))).await;

    let resp = no_redirects()
        .post(format!("{base}/auth/signup"))
        .form(&[("email", "new@school.org"), ("password", "secret1"), ("full_name", "Nia"), ("role", "student"), ("grade_level", "4")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(session_cookie(&resp).is_none());
    assert!(resp.text().await.unwrap().contains("Check your email"));
}

#[tokio::test]
async fn static_routes_render() {
    let base = spawn_app(ServiceConfig::default()).await;
    let home = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(home.status(), StatusCode::OK);
    assert!(home.text().await.unwrap().contains("Making Research Skills"));

    let health = reqwest::get(format!("{base}/healthz")).await.unwrap().text().await.unwrap();
    assert_eq!(health, "researchable ok");

    let missing = reqwest::get(format!("{base}/nowhere")).await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
