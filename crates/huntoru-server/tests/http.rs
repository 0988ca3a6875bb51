//! HTTP-level tests: the router served on a loopback port with fake providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use huntoru_judge::{
    AccessToken, ApiKey, Credentials, DetectionResult, ImageAnnotator, InMemoryCatalog, Judge,
    JudgeResult, JudgmentProvider, JudgmentRequest, JudgmentResult, Label, TokenSource,
};
use huntoru_server::{cors_layer, router, serve, AppState};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const IMAGE: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";

#[derive(Default)]
struct Calls(AtomicUsize);

struct Tokens(Arc<Calls>);
struct Annotator(Arc<Calls>);
struct Provider(Arc<Calls>);

#[async_trait]
impl TokenSource for Tokens {
    async fn access_token(&self, _: &Credentials) -> JudgeResult<AccessToken> {
        self.0 .0.fetch_add(1, Ordering::SeqCst);
        Ok(AccessToken::new("bearer", Utc::now() + chrono::Duration::hours(1)))
    }
}

#[async_trait]
impl ImageAnnotator for Annotator {
    async fn annotate(&self, _: &str, _: &AccessToken) -> JudgeResult<DetectionResult> {
        self.0 .0.fetch_add(1, Ordering::SeqCst);
        Ok(DetectionResult {
            labels: ["Cup", "Red", "Dish"]
                .iter()
                .map(|d| Label {
                    description: d.to_string(),
                    score: 0.9,
                })
                .collect(),
            colors: Vec::new(),
        })
    }
}

#[async_trait]
impl JudgmentProvider for Provider {
    async fn judge(&self, _: &JudgmentRequest, _: &ApiKey) -> JudgeResult<JudgmentResult> {
        self.0 .0.fetch_add(1, Ordering::SeqCst);
        Ok(JudgmentResult {
            score: 0.85,
            reason: "コップ、みーっけ！やったね！".into(),
        })
    }
}

struct TestServer {
    base: String,
    calls: Arc<Calls>,
    client: reqwest::Client,
}

async fn start(configured: bool) -> TestServer {
    let calls = Arc::new(Calls::default());
    let mut judge = Judge::new(
        Arc::new(Tokens(calls.clone())),
        Arc::new(Annotator(calls.clone())),
        Arc::new(Provider(calls.clone())),
    );
    if configured {
        judge = judge
            .with_credentials(Credentials::new("a@x", "k", "pem"))
            .with_api_key(ApiKey::new("key"));
    }

    let state = Arc::new(AppState {
        judge,
        catalog: Arc::new(InMemoryCatalog::builtin()),
    });
    let app = router(state, cors_layer(vec!["http://localhost:5173".to_string()]));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, app));

    TestServer {
        base: format!("http://{addr}"),
        calls,
        client: reqwest::Client::new(),
    }
}

impl TestServer {
    async fn post_judge(&self, body: Value) -> (u16, Value) {
        let response = self
            .client
            .post(format!("{}/judge", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(format!("{}{}", self.base, path))
            .send()
            .await
            .unwrap();
        (response.status().as_u16(), response.json().await.unwrap())
    }
}

#[tokio::test]
async fn test_judge_success() {
    let server = start(true).await;
    let (status, body) = server
        .post_judge(json!({ "theme": "赤いコップ", "imageData": IMAGE }))
        .await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["score"], 0.85);
    assert_eq!(body["detectedLabels"], json!(["Cup", "Red", "Dish"]));
    assert_eq!(server.calls.0.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_judge_missing_image() {
    let server = start(true).await;
    let (status, body) = server.post_judge(json!({ "theme": "赤いコップ" })).await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert_eq!(server.calls.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_judge_malformed_json() {
    let server = start(true).await;
    let response = server
        .client
        .post(format!("{}/judge", server.base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(server.calls.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_judge_unconfigured() {
    let server = start(false).await;
    let (status, body) = server
        .post_judge(json!({ "theme": "本", "imageData": IMAGE }))
        .await;

    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert_eq!(server.calls.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_themes() {
    let server = start(true).await;

    let (status, body) = server.get("/themes?difficulty=HARD").await;
    assert_eq!(status, 200);
    let themes = body["themes"].as_array().unwrap();
    assert_eq!(themes.len(), 1);
    assert_eq!(themes[0]["difficulty"], "HARD");

    let (status, body) = server.get("/themes?difficulty=EASY&limit=3").await;
    assert_eq!(status, 200);
    assert_eq!(body["themes"].as_array().unwrap().len(), 3);

    for path in ["/themes", "/themes?difficulty=easy"] {
        let (status, body) = server.get(path).await;
        assert_eq!(status, 400, "{path}");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_healthz() {
    let server = start(false).await;
    let (status, body) = server.get("/healthz").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["judgeConfigured"], false);
    assert_eq!(body["themes"], 21);
}

#[tokio::test]
async fn test_cors_allow_list() {
    let server = start(true).await;

    for (origin, allowed) in [
        ("http://localhost:5173", true),
        ("https://feature-x.huntoru-web.pages.dev", true),
        ("http://evil.pages.dev", false),
        ("https://evil.example", false),
    ] {
        let response = server
            .client
            .get(format!("{}/healthz", server.base))
            .header("origin", origin)
            .send()
            .await
            .unwrap();
        let header = response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string());
        assert_eq!(header.is_some(), allowed, "{origin}");
        if allowed {
            assert_eq!(header.as_deref(), Some(origin));
        }
    }
}
