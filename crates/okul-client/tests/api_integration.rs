//! Integration tests for the API client
//!
//! These tests run the client against a wiremock server and cover token
//! attachment, the refresh-and-retry path and the endpoint wrappers.

use async_trait::async_trait;
use okul_client::models::{AttendanceQuery, AttendanceRecord};
use okul_client::{
    ApiClient, ApiClientConfig, ApiError, ApiRequest, AttendanceStatus, AuthFailureHandler,
    PhotoResolver, SchoolApi,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storage::TokenStore;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct CountingHandler {
    calls: AtomicUsize,
}

#[async_trait]
impl AuthFailureHandler for CountingHandler {
    async fn on_auth_failure(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

struct Fixture {
    client: Arc<ApiClient>,
    tokens: Arc<TokenStore>,
    handler: Arc<CountingHandler>,
}

async fn fixture(server: &MockServer, token: Option<&str>, refresh: Option<&str>) -> Fixture {
    let tokens = Arc::new(TokenStore::in_memory());
    tokens.set_token(token).await;
    tokens.set_refresh_token(refresh).await;

    let handler = Arc::new(CountingHandler::default());
    let client = ApiClient::new(
        ApiClientConfig::new(server.uri()),
        Arc::clone(&tokens),
        handler.clone(),
    )
    .unwrap();

    Fixture { client: Arc::new(client), tokens, handler }
}

async fn mount_refresh(server: &MockServer, new_token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "accessToken": new_token })),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

// =============================================================================
// Token attachment
// =============================================================================

#[tokio::test]
async fn test_missing_token_sends_without_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/student/classall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let fx = fixture(&server, None, None).await;
    let classes = SchoolApi::new(fx.client).all_classes().await.unwrap();
    assert!(classes.is_empty());

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_stored_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/info"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"AdSoyad": "Yönetici"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("abc"), None).await;
    let info = SchoolApi::new(fx.client).user_info().await.unwrap();
    assert_eq!(info.full_name.as_deref(), Some("Yönetici"));
}

// =============================================================================
// Refresh and retry
// =============================================================================

#[tokio::test]
async fn test_401_refreshes_once_and_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/info"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/info"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"OgretmenID": 7})))
        .mount(&server)
        .await;
    mount_refresh(&server, "new", 1).await;

    let fx = fixture(&server, Some("old"), Some("r1")).await;
    let info = SchoolApi::new(fx.client).user_info().await.unwrap();

    assert_eq!(info.teacher_id, Some(7));
    assert_eq!(fx.tokens.get_token().await.as_deref(), Some("new"));
    assert_eq!(fx.handler.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_second_401_does_not_refresh_again() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/info"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(&server, "new", 1).await;

    let fx = fixture(&server, Some("old"), Some("r1")).await;
    let err = SchoolApi::new(fx.client).user_info().await.unwrap_err();

    assert_eq!(err, ApiError::Unauthorized);
    assert_eq!(fx.handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_token_invalid_message_triggers_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/student/all"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(serde_json::json!({"message": "Token geçersiz veya süresi dolmuş"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/student/all"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"OgrenciId": 34, "AdSoyad": "Ali Yılmaz"}
        ])))
        .mount(&server)
        .await;
    mount_refresh(&server, "new", 1).await;

    let fx = fixture(&server, Some("old"), Some("r1")).await;
    let students = SchoolApi::new(fx.client).all_students().await.unwrap();
    assert_eq!(students[0].id, 34);
}

#[tokio::test]
async fn test_missing_refresh_token_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/info"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_refresh(&server, "unused", 0).await;

    let fx = fixture(&server, Some("old"), None).await;
    let err = fx.client.execute(&ApiRequest::post("/user/info")).await.unwrap_err();

    assert_eq!(err, ApiError::Unauthorized);
    assert_eq!(fx.handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    for endpoint in ["/user/info", "/student/classall"] {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(header("Authorization", "Bearer old"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .and(path("/user/info"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/student/classall"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    mount_refresh(&server, "new", 1).await;

    let fx = fixture(&server, Some("old"), Some("r1")).await;
    let api = SchoolApi::new(fx.client);

    let (info, classes) = tokio::join!(api.user_info(), api.all_classes());
    assert!(info.is_ok());
    assert!(classes.is_ok());
    assert_eq!(fx.handler.calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Endpoints
// =============================================================================

#[tokio::test]
async fn test_roster_and_attendance_add() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/teacher/attendance"))
        .and(body_json(serde_json::json!({
            "Sinif": "5-A", "Tarih": "2025-09-02", "DersSaati": "08:30-09:10", "ProgramID": 5
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"OgrenciId": 34, "OgrenciNumara": "12", "AdSoyad": "Ali Yılmaz"},
            {"OgrenciId": 35, "OgrenciNumara": "13", "AdSoyad": "Ayşe Demir", "durum": 1}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/teacher/attendanceadd"))
        .and(body_json(serde_json::json!({
            "tarih": "2025-09-02", "OgrenciID": 34, "ProgramID": 5, "durum": 0
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("t"), None).await;
    let api = SchoolApi::new(fx.client);

    let roster = api
        .attendance_roster(&AttendanceQuery {
            class_name: "5-A".into(),
            date: "2025-09-02".into(),
            lesson_time: "08:30-09:10".into(),
            program_id: 5,
        })
        .await
        .unwrap();
    assert_eq!(roster.len(), 2);
    assert_eq!(roster[1].status, Some(AttendanceStatus::Present));

    api.add_attendance(&AttendanceRecord {
        date: "2025-09-02".into(),
        student_id: 34,
        program_id: 5,
        status: AttendanceStatus::Absent,
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_http_error_carries_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/teacher/allteacher"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({"message": "Sunucu hatası"})),
        )
        .mount(&server)
        .await;

    let fx = fixture(&server, Some("t"), None).await;
    let err = SchoolApi::new(fx.client).teachers(1, 20).await.unwrap_err();
    assert_eq!(err, ApiError::Http { status: 500, message: "Sunucu hatası".into() });
}

#[test]
fn test_photo_resolution() {
    let resolver = PhotoResolver::new("https://okul.example/uploads", "https://randomuser.me/api/portraits");
    assert_eq!(
        resolver.resolve(Some("ogrenci_42.jpg")).as_deref(),
        Some("https://randomuser.me/api/portraits/children/42.jpg")
    );
    assert_eq!(
        resolver.resolve(Some("1690000000_photo.png")).as_deref(),
        Some("https://okul.example/uploads/1690000000_photo.png")
    );
}
