//! services/api/tests/http_api.rs
//!
//! Drives the real router end to end over the in-memory database, with the
//! model and the mail server replaced by local stubs.

use api_lib::{
    adapters::{Argon2JwtCredentials, DocumentExporter, FileTextExtractor},
    config::Config,
    web::{build_router, upload::MAX_UPLOAD_BYTES, Adapters, AppState},
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use recap_core::{
    domain::OutgoingEmail,
    memory::InMemoryDatabase,
    ports::{NotificationService, PortResult, SummaryGenerationService},
    Tone,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const BOUNDARY: &str = "recap-test-boundary";

struct ThirtyWords;

#[async_trait]
impl SummaryGenerationService for ThirtyWords {
    async fn generate_summary(&self, _: &str, _: &str, _: Tone) -> PortResult<String> {
        Ok(vec!["decision action"; 15].join(" "))
    }
}

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl NotificationService for Outbox {
    async fn send_email(&self, email: OutgoingEmail) -> PortResult<()> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

struct TestApp {
    router: Router,
    db: Arc<InMemoryDatabase>,
    outbox: Arc<Outbox>,
}

fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [
        ("DATABASE_URL", "postgres://unused"),
        ("OPENAI_API_KEY", "sk-test"),
        ("JWT_SECRET", "integration-secret"),
        ("SMTP_HOST", "localhost"),
        ("SMTP_USERNAME", "recap@example.com"),
        ("SMTP_PASSWORD", "unused"),
    ]
    .into_iter()
    .collect();
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

fn spawn_app() -> TestApp {
    let config = test_config();
    let db = Arc::new(InMemoryDatabase::new());
    let outbox = Arc::new(Outbox::default());
    let adapters = Adapters {
        db: db.clone(),
        credentials: Arc::new(Argon2JwtCredentials::new(
            "integration-secret",
            chrono::Duration::hours(1),
        )),
        generator: Arc::new(ThirtyWords),
        renderer: Arc::new(
            DocumentExporter::from_font_files(&config.pdf_fonts.regular, &config.pdf_fonts.bold)
                .unwrap(),
        ),
        notifier: outbox.clone(),
        extractor: Arc::new(FileTextExtractor::new()),
    };
    let state = Arc::new(AppState::new(Arc::new(config), adapters));
    TestApp {
        router: build_router(state),
        db,
        outbox,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    async fn json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, _, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .json(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({"email": email, "password": "hunter2hunter2", "fullName": "Test User"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_summary(&self, token: &str) -> String {
        let (status, body) = self
            .json(
                "POST",
                "/api/summaries",
                Some(token),
                Some(json!({
                    "title": "Weekly Sync",
                    "originalContent": "Alice: ship Friday. Bob: agreed.",
                    "prompt": "Summarize decisions",
                    "tone": "concise"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    async fn upload(&self, token: &str, filename: &str, contents: &[u8]) -> (StatusCode, Value) {
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = BOUNDARY,
            f = filename,
        )
        .into_bytes();
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, _, bytes) = self.send(request).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

#[tokio::test]
async fn health_check_is_public() {
    let app = spawn_app();
    let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let (status, _, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn full_summary_lifecycle() {
    let app = spawn_app();
    let token = app.register("owner@example.com").await;

    let (status, me) = app.json("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["email"], "owner@example.com");
    assert_eq!(me["user"]["theme"], "light");

    let id = app.create_summary(&token).await;
    let (_, created) = app
        .json("GET", &format!("/api/summaries/{}", id), Some(&token), None)
        .await;
    assert_eq!(created["status"], "draft");
    assert_eq!(created["tone"], "concise");
    assert_eq!(created["summaryContent"], "");
    assert_eq!(created["wordCount"], 0);

    let (status, generated) = app
        .json("POST", &format!("/api/summaries/{}/generate", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", generated);
    assert_eq!(generated["wordCount"], 30);
    assert_eq!(generated["status"], "draft");

    let (status, edited) = app
        .json(
            "PATCH",
            &format!("/api/summaries/{}", id),
            Some(&token),
            Some(json!({"summaryContent": "Ship on Friday", "autoSaved": true, "wordCount": 999})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["wordCount"], 3);
    assert_eq!(edited["autoSaved"], true);

    let (status, approved) = app
        .json("POST", &format!("/api/summaries/{}/approve", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let request = Request::builder()
        .uri(format!("/api/summaries/{}/export/pdf", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, headers, pdf) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"weekly-sync.pdf\""
    );
    assert!(pdf.starts_with(b"%PDF-"));

    let (status, sent) = app
        .json(
            "POST",
            &format!("/api/summaries/{}/email", id),
            Some(&token),
            Some(json!({"recipients": ["team@example.com"], "format": "both", "ccSelf": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent, json!({"success": true}));
    {
        let outbox = app.outbox.sent.lock().unwrap();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].subject, "Meeting Summary: Weekly Sync");
        assert_eq!(outbox[0].cc, vec!["owner@example.com".to_string()]);
        assert!(outbox[0].attachment.is_some());
    }

    let (status, logs) = app
        .json("GET", &format!("/api/summaries/{}/emails", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["format"], "both");
    assert_eq!(logs[0]["status"], "sent");

    // Sharing never moves the summary out of the approved state.
    let (_, after) = app
        .json("GET", &format!("/api/summaries/{}", id), Some(&token), None)
        .await;
    assert_eq!(after["status"], "approved");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = spawn_app();

    let (status, body) = app.json("GET", "/api/summaries", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app
        .json("GET", "/api/summaries", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_checks_the_password() {
    let app = spawn_app();
    app.register("owner@example.com").await;

    let (status, body) = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "Owner@Example.com", "password": "hunter2hunter2"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, _) = app
        .json(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "owner@example.com", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = spawn_app();
    app.register("owner@example.com").await;

    let (status, body) = app
        .json(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"email": "owner@example.com", "password": "another-password", "fullName": "Twin"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn other_users_summaries_are_not_found() {
    let app = spawn_app();
    let owner = app.register("owner@example.com").await;
    let intruder = app.register("intruder@example.com").await;
    let id = app.create_summary(&owner).await;

    let (status, body) = app
        .json("GET", &format!("/api/summaries/{}", id), Some(&intruder), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Summary not found");

    let (status, _) = app
        .json(
            "PATCH",
            &format!("/api/summaries/{}", id),
            Some(&intruder),
            Some(json!({"summaryContent": "hijacked"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = app.json("GET", "/api/summaries", Some(&intruder), None).await;
    assert_eq!(listed, json!([]));

    let (_, untouched) = app
        .json("GET", &format!("/api/summaries/{}", id), Some(&owner), None)
        .await;
    assert_eq!(untouched["summaryContent"], "");
}

#[tokio::test]
async fn invalid_share_requests_send_nothing() {
    let app = spawn_app();
    let token = app.register("owner@example.com").await;
    let id = app.create_summary(&token).await;
    let uri = format!("/api/summaries/{}/email", id);

    let (status, _) = app
        .json("POST", &uri, Some(&token), Some(json!({"recipients": []})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .json(
            "POST",
            &uri,
            Some(&token),
            Some(json!({"recipients": ["ok@example.com", "not-an-email"]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not-an-email"));

    let (status, _) = app
        .json(
            "POST",
            &uri,
            Some(&token),
            Some(json!({"recipients": ["ok@example.com"], "format": "fax"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.outbox.sent.lock().unwrap().is_empty());
    assert_eq!(app.db.email_log_count(), 0);
}

#[tokio::test]
async fn rejects_bad_payloads() {
    let app = spawn_app();
    let token = app.register("owner@example.com").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/summaries")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            "POST",
            "/api/summaries",
            Some(&token),
            Some(json!({"originalContent": "   ", "prompt": "Summarize"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json("GET", "/api/summaries/not-a-uuid", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = app.create_summary(&token).await;
    let (status, _) = app
        .json(
            "PATCH",
            &format!("/api/summaries/{}", id),
            Some(&token),
            Some(json!({"status": "archived"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json("GET", &format!("/api/summaries/{}/export/rtf", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .json(
            "PATCH",
            "/api/auth/theme",
            Some(&token),
            Some(json!({"theme": "sepia"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn theme_preference_is_saved() {
    let app = spawn_app();
    let token = app.register("owner@example.com").await;

    let (status, body) = app
        .json("PATCH", "/api/auth/theme", Some(&token), Some(json!({"theme": "dark"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (_, me) = app.json("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(me["user"]["theme"], "dark");
}

#[tokio::test]
async fn uploads_extract_text() {
    let app = spawn_app();
    let token = app.register("owner@example.com").await;

    let (status, body) = app
        .upload(&token, "standup.TXT", b"\n  Alice: blocked on review.  \n")
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["text"], "Alice: blocked on review.");
    assert_eq!(body["filename"], "standup.TXT");
    assert_eq!(body["size"], 31);

    let (status, _) = app.upload(&token, "malware.exe", b"MZ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.upload(&token, "blank.txt", b"   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn uploads_read_docx_transcripts() {
    let app = spawn_app();
    let token = app.register("owner@example.com").await;

    let mut docx = docx_rust::Docx::default();
    docx.document
        .push(docx_rust::document::Paragraph::default().push_text("Alice: ship Friday."));
    docx.document
        .push(docx_rust::document::Paragraph::default().push_text("Bob: agreed."));
    let mut bytes = std::io::Cursor::new(Vec::new());
    docx.write(&mut bytes).unwrap();
    let bytes = bytes.into_inner();

    let (status, body) = app.upload(&token, "sync.docx", &bytes).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["text"], "Alice: ship Friday.\nBob: agreed.");
    assert_eq!(body["filename"], "sync.docx");
    assert_eq!(body["size"], bytes.len());
}

#[tokio::test]
async fn oversized_uploads_are_rejected() {
    let app = spawn_app();
    let token = app.register("owner@example.com").await;

    // One byte over the file limit, still inside the request body limit.
    let just_over = vec![b'a'; MAX_UPLOAD_BYTES + 1];
    let (status, body) = app.upload(&token, "long.txt", &just_over).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File is too large. The limit is 10 MB");

    // Past the request body limit the stream is cut off mid-read.
    let far_over = vec![b'a'; 12 * 1024 * 1024];
    let (status, body) = app.upload(&token, "huge.txt", &far_over).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn deleting_a_summary_removes_its_history() {
    let app = spawn_app();
    let token = app.register("owner@example.com").await;
    let id = app.create_summary(&token).await;
    let (status, _) = app
        .json(
            "POST",
            &format!("/api/summaries/{}/email", id),
            Some(&token),
            Some(json!({"recipients": ["team@example.com"]})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.db.email_log_count(), 1);

    let (status, body) = app
        .json("DELETE", &format!("/api/summaries/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    assert_eq!(app.db.email_log_count(), 0);

    let (status, _) = app
        .json("GET", &format!("/api/summaries/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
