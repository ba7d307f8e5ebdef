use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use jobportal_backend::{build_app, config::Config, database::MemoryStore};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

const BOUNDARY: &str = "jobportal-test-boundary";

fn test_app() -> Router {
    let uploads_dir: PathBuf =
        std::env::temp_dir().join(format!("jobportal-api-{}", uuid::Uuid::new_v4()));
    let config = Config {
        uploads_dir,
        public_rps: 10_000,
        ..Config::default()
    };
    let (app, _state) = build_app(Arc::new(MemoryStore::new()), &config).expect("build app");
    app
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let res = app.clone().oneshot(req).await.expect("response");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, body)
}

fn json_request(method: Method, uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Text fields plus an optional `(field, file name, bytes)` file part.
fn multipart(uri: &str, fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn signup(app: &Router, username: &str, role: &str) {
    let (status, _) = call(
        app,
        json_request(
            Method::POST,
            "/api/signup",
            json!({ "username": username, "password": "pw", "role": role }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn post_job(app: &Router, provider: &str, title: &str) -> String {
    let (status, body) = call(
        app,
        json_request(
            Method::POST,
            "/api/jobs",
            json!({
                "username": provider,
                "title": title,
                "description": "Build things",
                "company": "Acme",
                "location": "Remote",
                "workMode": "remote",
                "skills": "rust,sql"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["job"]["id"].as_str().unwrap().to_string()
}

async fn apply(app: &Router, job_id: &str, username: &str) -> (StatusCode, JsonValue) {
    call(
        app,
        multipart(
            "/api/apply",
            &[("jobId", job_id), ("username", username), ("applicantName", username), ("age", "27")],
            Some(("resume", "cv.pdf", b"%PDF-1.4")),
        ),
    )
    .await
}

#[tokio::test]
async fn health_reports_storage_backend() {
    let app = test_app();
    let (status, body) = call(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "storage": "memory" }));
}

#[tokio::test]
async fn signup_login_round() {
    let app = test_app();
    signup(&app, "amy", "jobseeker").await;

    let (status, body) = call(
        &app,
        json_request(Method::POST, "/api/login", json!({ "username": "amy", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "jobseeker");

    let (status, body) = call(
        &app,
        json_request(Method::POST, "/api/login", json!({ "username": "amy", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, _) = call(
        &app,
        json_request(
            Method::POST,
            "/api/signup",
            json!({ "username": "amy", "password": "x", "role": "jobseeker" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn selecting_an_applicant_rejects_siblings_and_opens_a_chat() {
    let app = test_app();
    signup(&app, "bob", "jobprovider").await;
    signup(&app, "amy", "jobseeker").await;
    signup(&app, "dan", "jobseeker").await;
    let job_id = post_job(&app, "bob", "Backend Intern").await;

    let (status, amy_app) = apply(&app, &job_id, "amy").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = apply(&app, &job_id, "dan").await;
    assert_eq!(status, StatusCode::CREATED);

    let amy_app_id = amy_app["application"]["id"].as_str().unwrap();
    assert!(amy_app["application"]["resumePath"]
        .as_str()
        .unwrap()
        .starts_with("/uploads/"));

    let (status, selection) = call(
        &app,
        Request::builder()
            .method(Method::PATCH)
            .uri(format!("/api/applications/{amy_app_id}/select"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let chat_id = selection["chatId"].as_str().unwrap().to_string();

    let (_, applications) = call(&app, get(&format!("/api/jobs/{job_id}/applications"))).await;
    let statuses: Vec<(String, String)> = applications
        .as_array()
        .unwrap()
        .iter()
        .map(|a| {
            (
                a["applicant"]["username"].as_str().unwrap().to_string(),
                a["status"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert!(statuses.contains(&("amy".into(), "accepted".into())));
    assert!(statuses.contains(&("dan".into(), "rejected".into())));

    let (_, chats) = call(&app, get("/api/chats?username=amy")).await;
    assert_eq!(chats.as_array().unwrap().len(), 1);
    assert_eq!(chats[0]["id"], chat_id.as_str());
    assert_eq!(chats[0]["jobTitle"], "Backend Intern");
    let mut names: Vec<&str> = chats[0]["participants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["username"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["amy", "bob"]);

    let (_, notifications) = call(&app, get("/api/notifications?username=amy")).await;
    assert!(notifications
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["type"] == "selection"));

    let (status, sent) = call(
        &app,
        multipart(
            &format!("/api/chats/{chat_id}/messages"),
            &[("username", "bob"), ("content", "Welcome aboard")],
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sent["data"]["sender"]["username"], "bob");

    let (_, messages) = call(&app, get(&format!("/api/chats/{chat_id}/messages"))).await;
    assert_eq!(messages[0]["content"], "Welcome aboard");
}

#[tokio::test]
async fn blocked_users_cannot_message_each_other() {
    let app = test_app();
    signup(&app, "amy", "jobseeker").await;
    signup(&app, "cara", "jobseeker").await;

    let (status, chat) = call(
        &app,
        json_request(
            Method::POST,
            "/api/chats/create",
            json!({ "username": "amy", "recipient": "cara" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let chat_id = chat["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &app,
        json_request(Method::POST, "/api/block", json!({ "blocker": "cara", "blocked": "amy" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, block_status) = call(&app, get("/api/block/status?userA=amy&userB=cara")).await;
    assert_eq!(block_status, json!({ "blocked": true, "blockedByMe": false, "blockedMe": true }));

    for sender in ["amy", "cara"] {
        let (status, body) = call(
            &app,
            multipart(
                &format!("/api/chats/{chat_id}/messages"),
                &[("username", sender), ("content", "hello?")],
                Some(("file", "note.txt", b"hi")),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
    }

    let (_, messages) = call(&app, get(&format!("/api/chats/{chat_id}/messages"))).await;
    assert!(messages.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_application_conflicts_and_job_delete_cascades() {
    let app = test_app();
    signup(&app, "bob", "jobprovider").await;
    signup(&app, "amy", "jobseeker").await;
    let job_id = post_job(&app, "bob", "Data Analyst").await;

    assert_eq!(apply(&app, &job_id, "amy").await.0, StatusCode::CREATED);
    let (status, body) = apply(&app, &job_id, "amy").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Already applied to this job");

    let (status, _) = call(
        &app,
        json_request(Method::POST, "/api/saved", json!({ "username": "amy", "jobId": job_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = call(
        &app,
        json_request(Method::POST, "/api/saved", json!({ "username": "amy", "jobId": job_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Already saved");

    let (status, _) = call(
        &app,
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/jobs/{job_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, mine) = call(&app, get("/api/my-applications?username=amy")).await;
    assert!(mine.as_array().unwrap().is_empty());
    let (_, saved) = call(&app, get("/api/saved?username=amy")).await;
    assert!(saved.as_array().unwrap().is_empty());
    let (status, _) = call(&app, get(&format!("/api/jobs/{job_id}/applications"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_filters_by_query_parameters() {
    let app = test_app();
    signup(&app, "bob", "jobprovider").await;
    post_job(&app, "bob", "Rust Engineer").await;

    let (status, jobs) = call(&app, get("/api/all-jobs?q=rust&remoteOnly=true&skills=rust")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs.as_array().unwrap().len(), 1);

    let (_, none) = call(&app, get("/api/all-jobs?skills=rust,go")).await;
    assert!(none.as_array().unwrap().is_empty());

    let (status, _) = call(&app, get("/api/all-jobs?jobType=gig")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn translating_to_english_echoes_the_text() {
    let app = test_app();
    let (status, body) = call(
        &app,
        json_request(Method::POST, "/api/translate", json!({ "text": "Hello", "target": "en" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translatedText"], "Hello");

    let (status, _) = call(
        &app,
        json_request(Method::POST, "/api/translate", json!({ "text": "", "target": "es" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn coach_without_api_key_is_offline() {
    let app = test_app();
    let (status, body) = call(
        &app,
        json_request(
            Method::POST,
            "/api/ai/coach",
            json!({ "username": "amy", "message": "How do I write a CV?" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"].as_str().unwrap().contains("offline"));
}
