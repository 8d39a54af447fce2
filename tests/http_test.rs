//! HTTP tests: the chat pages, the question API and the admin endpoints,
//! served by the real route table over in-memory stores.

mod common;

use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use regex::Regex;
use serde_json::Value;

use careerdesk::auth::{admin::AdminSecret, rate_limit::RateLimiter};
use careerdesk::handlers;
use careerdesk::intake::{ConversationRegistry, IntakeController};
use careerdesk::models::question::QuestionStatus;
use careerdesk::services::{AdminService, SubmissionService, TopicFilter};
use common::*;

struct Harness {
    store: Arc<MemoryQuestionStore>,
    blobs: Arc<MemoryBlobStore>,
    submissions: Arc<SubmissionService>,
    admin: web::Data<AdminService>,
    registry: web::Data<ConversationRegistry>,
    limiter: web::Data<RateLimiter>,
}

impl Harness {
    fn new() -> Self {
        let store = MemoryQuestionStore::new();
        let blobs = MemoryBlobStore::new();
        let submissions = Arc::new(SubmissionService::new(
            store.clone(),
            blobs.clone(),
            TopicFilter::disabled(),
        ));
        let secret = AdminSecret::new(ADMIN_PASS).expect("hash secret");
        Harness {
            admin: web::Data::new(AdminService::new(store.clone(), secret)),
            registry: web::Data::new(ConversationRegistry::new()),
            limiter: web::Data::new(RateLimiter::new()),
            store,
            blobs,
            submissions,
        }
    }
}

/// Build the app exactly as `main` wires it, minus static file mounts.
macro_rules! app {
    ($h:expr) => {{
        let controller = IntakeController::new($h.submissions.clone(), Duration::ZERO);
        test::init_service(
            App::new()
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_secure(false)
                        .build(),
                )
                .app_data(web::Data::new(controller))
                .app_data($h.registry.clone())
                .app_data(web::Data::from($h.submissions.clone()))
                .app_data($h.admin.clone())
                .app_data($h.limiter.clone())
                .configure(handlers::configure)
                .default_service(web::to(handlers::pages::not_found)),
        )
        .await
    }};
}

/// Send a request carrying the jar's session cookie and keep whatever
/// cookie comes back. Yields `(status, location, body)`.
macro_rules! send {
    ($app:expr, $jar:expr, $req:expr) => {{
        let mut req = $req;
        if let Some(cookie) = $jar.clone() {
            req = req.cookie(cookie);
        }
        let resp = test::call_service(&$app, req.to_request()).await;
        if let Some(cookie) = resp.response().cookies().find(|c| c.name() == "id") {
            $jar = Some(cookie.into_owned());
        }
        let status = resp.status();
        let location = resp
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = String::from_utf8(test::read_body(resp).await.to_vec()).expect("utf8 body");
        (status, location, body)
    }};
}

fn csrf_token(html: &str) -> String {
    let re = Regex::new(r#"name="csrf_token" value="([^"]+)""#).expect("regex");
    re.captures(html).expect("csrf token in page")[1].to_string()
}

const BOUNDARY: &str = "----careerdesk-test-boundary";

/// Build a multipart/form-data body from text fields and an optional file.
fn multipart(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    if let Some((file_name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

fn multipart_post(uri: &str, fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> test::TestRequest {
    let (content_type, body) = multipart(fields, file);
    test::TestRequest::post()
        .uri(uri)
        .insert_header(("content-type", content_type))
        .set_payload(body)
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_landing_and_not_found() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;

    let (status, _, body) = send!(app, jar, test::TestRequest::get().uri("/"));
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("LucidAI Career"));
    assert!(body.contains("How to negotiate salary?"));

    let (status, _, _) = send!(app, jar, test::TestRequest::get().uri("/nowhere"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Chat flow
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_chat_flow_submits_one_question() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;

    let (status, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Step 1 of 4: Your Name"));
    let token = csrf_token(&body);

    for message in ["Jane Doe", TEST_EMAIL, "Software Engineer", "Product Manager", "5 years"] {
        let (status, location, _) = send!(
            app,
            jar,
            test::TestRequest::post()
                .uri("/ask")
                .set_form([("message", message), ("csrf_token", token.as_str())])
        );
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/ask"));
    }

    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    assert!(body.contains("Step 4 of 4: Ask Question"));
    assert!(body.contains("Profile complete!"));

    // Stage a file, then send the question
    let (status, _, _) = send!(
        app,
        jar,
        multipart_post(
            "/ask/attachment",
            &[("csrf_token", token.as_str())],
            Some(("resume.pdf", "application/pdf", &b"%PDF-1.4 test"[..])),
        )
    );
    assert_eq!(status, StatusCode::SEE_OTHER);
    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    assert!(body.contains("Attached file: resume.pdf"));

    send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/ask")
            .set_form([("message", TEST_QUESTION), ("csrf_token", token.as_str())])
    );

    let stored = h.store.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Jane Doe");
    assert_eq!(stored[0].question, TEST_QUESTION);
    assert!(stored[0].session_id.as_deref().is_some_and(|s| s.starts_with("session_")));
    assert_eq!(stored[0].attachment.as_ref().expect("attachment").file_name, "resume.pdf");
    assert_eq!(h.blobs.stored().len(), 1);

    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    assert!(body.contains("Reference ID: #1"));
    assert!(body.contains("LIMIT EXCEEDED"));

    // A second question from the same browser is refused
    send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/ask")
            .set_form([("message", "Another one?"), ("csrf_token", token.as_str())])
    );
    assert_eq!(h.store.all().len(), 1);
}

#[actix_rt::test]
async fn test_profile_survives_a_lost_conversation() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;

    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    let token = csrf_token(&body);
    for message in ["Jane Doe", TEST_EMAIL, "Teacher", "Developer", "10+ years"] {
        send!(
            app,
            jar,
            test::TestRequest::post()
                .uri("/ask")
                .set_form([("message", message), ("csrf_token", token.as_str())])
        );
    }

    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    assert!(body.contains("Profile complete!"));

    // Live conversations are dropped (restart, idle sweep); the cookie remains
    assert_eq!(h.registry.sweep_idle(Duration::ZERO), 1);

    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    assert!(body.contains("Welcome back!"));
    assert!(body.contains("Step 4 of 4: Ask Question"));
}

#[actix_rt::test]
async fn test_reset_starts_a_new_session() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;

    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    let token = csrf_token(&body);
    send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/ask")
            .set_form([("message", "Jane Doe"), ("csrf_token", token.as_str())])
    );
    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    assert!(body.contains("Step 2 of 4: Email"));

    let (status, _, _) = send!(
        app,
        jar,
        test::TestRequest::post().uri("/ask/reset").set_form([("csrf_token", token.as_str())])
    );
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    assert!(body.contains("Step 1 of 4: Your Name"));
    assert!(!body.contains("Jane Doe"));
}

#[actix_rt::test]
async fn test_chat_post_without_csrf_token_is_forbidden() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;

    send!(app, jar, test::TestRequest::get().uri("/ask"));
    let (status, _, _) = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/ask")
            .set_form([("message", "Jane Doe"), ("csrf_token", "forged")])
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_viewing_the_chat_keeps_no_live_conversation() {
    let h = Harness::new();
    let app = app!(h);

    for _ in 0..25 {
        let mut jar: Option<Cookie<'static>> = None;
        let (status, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Step 1 of 4: Your Name"));
    }
    assert!(h.registry.is_empty());

    // The first chat input is what makes a conversation live
    let mut jar: Option<Cookie<'static>> = None;
    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    let token = csrf_token(&body);
    send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/ask")
            .set_form([("message", "Jane Doe"), ("csrf_token", token.as_str())])
    );
    assert_eq!(h.registry.len(), 1);
}

#[actix_rt::test]
async fn test_oversized_chat_attachment_is_refused_in_the_chat() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;

    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    let token = csrf_token(&body);

    let big = vec![0u8; 11 * 1024 * 1024];
    let (content_type, payload) = multipart(
        &[("csrf_token", token.as_str())],
        Some(("huge.pdf", "application/pdf", &big[..])),
    );
    let (status, location, _) = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/ask/attachment")
            .insert_header(("content-type", content_type))
            .insert_header(("content-length", payload.len().to_string()))
            .set_payload(payload)
    );
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/ask"));

    let (status, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Maximum file size is 10MB."));
    assert!(!body.contains("huge.pdf"));

    // The notice is shown once
    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/ask"));
    assert_eq!(body.matches("Maximum file size is 10MB.").count(), 1);
}

// ---------------------------------------------------------------------------
// Question API
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_api_submit_with_file() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;

    let (status, _, body) = send!(
        app,
        jar,
        multipart_post(
            "/api/questions",
            &[
                ("name", "Jane Doe"),
                ("email", "Jane@Example.com"),
                ("question", TEST_QUESTION),
                ("current_role_field", "Software Engineer"),
                ("target_role", "Product Manager"),
                ("years_experience", "5"),
                ("session_id", "session_1_abcdefghi"),
            ],
            Some(("cv.pdf", "application/pdf", &b"%PDF"[..])),
        )
    );

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["success"], true);
    assert_eq!(json["id"], 1);
    assert_eq!(json["hasFile"], true);
    assert!(json["fileUrl"].as_str().is_some_and(|u| u.starts_with("http://files.test/files/1/")));
    assert_eq!(h.store.get(1).expect("row").email, TEST_EMAIL);
}

#[actix_rt::test]
async fn test_api_submit_with_empty_file() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;

    let (status, _, body) = send!(
        app,
        jar,
        multipart_post(
            "/api/questions",
            &[("name", "Jane Doe"), ("email", TEST_EMAIL), ("question", TEST_QUESTION)],
            Some(("empty.pdf", "application/pdf", &b""[..])),
        )
    );

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["hasFile"], true);
    assert!(json["fileUrl"].is_null());
    assert!(h.blobs.stored().is_empty());
    assert!(h.store.get(1).expect("row").attachment.is_none());
}

#[actix_rt::test]
async fn test_api_submit_errors() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;

    // Invalid email
    let (status, _, body) = send!(
        app,
        jar,
        multipart_post(
            "/api/questions",
            &[("name", "Jane Doe"), ("email", "jane"), ("question", TEST_QUESTION)],
            None,
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["error"], "invalid_submission");

    // Missing required field
    let (status, _, _) = send!(
        app,
        jar,
        multipart_post("/api/questions", &[("name", "Jane Doe")], None)
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Second question from the same session
    let fields = [
        ("name", "Jane Doe"),
        ("email", TEST_EMAIL),
        ("question", TEST_QUESTION),
        ("session_id", "session_1_abcdefghi"),
    ];
    let (status, _, _) = send!(app, jar, multipart_post("/api/questions", &fields, None));
    assert_eq!(status, StatusCode::OK);
    let (status, _, body) = send!(app, jar, multipart_post("/api/questions", &fields, None));
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["error"], "session_limit_exceeded");
}

// ---------------------------------------------------------------------------
// Admin API
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_admin_api_list_and_respond() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;
    send!(
        app,
        jar,
        multipart_post(
            "/api/questions",
            &[("name", "Jane Doe"), ("email", TEST_EMAIL), ("question", TEST_QUESTION)],
            None,
        )
    );

    let (status, _, body) = send!(app, jar, test::TestRequest::get().uri("/api/admin?password=wrong"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(serde_json::from_str::<Value>(&body).expect("json")["error"], "Unauthorized");

    let (status, _, body) = send!(
        app,
        jar,
        test::TestRequest::get().uri(&format!("/api/admin?password={ADMIN_PASS}"))
    );
    assert_eq!(status, StatusCode::OK);
    let list: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(list.as_array().expect("array").len(), 1);
    assert_eq!(list[0]["status"], "pending");
    assert_eq!(list[0]["question"], TEST_QUESTION);

    let (status, _, body) = send!(
        app,
        jar,
        test::TestRequest::post().uri("/api/admin/response").set_json(serde_json::json!({
            "questionId": 1,
            "response": "Shadow a PM for a quarter.",
            "password": ADMIN_PASS,
        }))
    );
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).expect("json");
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Response saved successfully");
    assert_eq!(h.store.get(1).expect("row").status, QuestionStatus::Answered);
}

#[actix_rt::test]
async fn test_admin_api_respond_errors() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;

    let (status, _, _) = send!(
        app,
        jar,
        test::TestRequest::post().uri("/api/admin/response").set_json(serde_json::json!({
            "questionId": 1, "response": "Hi", "password": "wrong",
        }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, body) = send!(
        app,
        jar,
        test::TestRequest::post().uri("/api/admin/response").set_json(serde_json::json!({
            "questionId": 77, "response": "Hi", "password": ADMIN_PASS,
        }))
    );
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(serde_json::from_str::<Value>(&body).expect("json")["error"], "Failed to save response");

    // Form-encoded bodies are refused before any handler runs
    let (status, _, _) = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/api/admin/response")
            .set_form([("questionId", "1"), ("response", "Hi"), ("password", ADMIN_PASS)])
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_admin_api_is_rate_limited() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;

    for _ in 0..5 {
        let (status, _, _) = send!(app, jar, test::TestRequest::get().uri("/api/admin?password=guess"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, _, _) = send!(
        app,
        jar,
        test::TestRequest::get().uri(&format!("/api/admin?password={ADMIN_PASS}"))
    );
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

// ---------------------------------------------------------------------------
// Admin pages
// ---------------------------------------------------------------------------

#[actix_rt::test]
async fn test_admin_pages_login_and_respond() {
    let h = Harness::new();
    let app = app!(h);
    let mut jar: Option<Cookie<'static>> = None;
    send!(
        app,
        jar,
        multipart_post(
            "/api/questions",
            &[("name", "Jane Doe"), ("email", TEST_EMAIL), ("question", TEST_QUESTION)],
            None,
        )
    );

    let (status, location, _) = send!(app, jar, test::TestRequest::get().uri("/admin"));
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/admin/login"));

    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/admin/login"));
    let token = csrf_token(&body);

    let (status, _, body) = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/admin/login")
            .set_form([("password", "wrong"), ("csrf_token", token.as_str())])
    );
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Invalid password"));

    let (status, location, _) = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/admin/login")
            .set_form([("password", ADMIN_PASS), ("csrf_token", token.as_str())])
    );
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/admin"));

    let (status, _, body) = send!(app, jar, test::TestRequest::get().uri("/admin"));
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(TEST_QUESTION));
    assert!(body.contains("1 pending"));
    let token = csrf_token(&body);

    let (status, location, _) = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/admin/questions/1/respond")
            .set_form([("response", "Shadow a PM."), ("csrf_token", token.as_str())])
    );
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/admin"));

    let (_, _, body) = send!(app, jar, test::TestRequest::get().uri("/admin"));
    assert!(body.contains("Response saved for question #1"));
    assert!(body.contains("1 answered"));
    assert_eq!(h.store.get(1).expect("row").admin_response.as_deref(), Some("Shadow a PM."));

    let (status, location, _) = send!(
        app,
        jar,
        test::TestRequest::post().uri("/admin/logout").set_form([("csrf_token", token.as_str())])
    );
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/admin/login"));
    let (status, _, _) = send!(app, jar, test::TestRequest::get().uri("/admin"));
    assert_eq!(status, StatusCode::SEE_OTHER);
}
