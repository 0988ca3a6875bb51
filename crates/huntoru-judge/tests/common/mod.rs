//! Shared fixtures for provider integration tests.

#![allow(dead_code)]

use std::sync::OnceLock;

use huntoru_judge::{ApiKey, Credentials, GeminiClient, Judge, JudgeConfig, JudgeRequestBody};
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;
use serde_json::json;
use wiremock::MockServer;

pub const VISION_PATH: &str = "/v1/images:annotate";
pub const GEMINI_PATH: &str = "/models/gemini-1.5-flash:generateContent";
pub const TOKEN_PATH: &str = "/token";
pub const API_KEY: &str = "test-gemini-key";
pub const IMAGE_BASE64: &str = "/9j/4AAQSkZJRg==";

pub struct TestKey {
    pub private_pem: String,
    pub public_pem: String,
}

pub fn test_key() -> &'static TestKey {
    static KEY: OnceLock<TestKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = rand::thread_rng();
        let key = RsaPrivateKey::new(&mut rng, 2048).expect("failed to generate key");
        TestKey {
            private_pem: key.to_pkcs8_pem(LineEnding::LF).unwrap().to_string(),
            public_pem: key
                .to_public_key()
                .to_public_key_pem(LineEnding::LF)
                .unwrap(),
        }
    })
}

pub fn credentials(server: &MockServer) -> Credentials {
    Credentials::new(
        "judge@huntoru.iam.gserviceaccount.com",
        "key-1",
        test_key().private_pem.clone(),
    )
    .with_token_uri(format!("{}{}", server.uri(), TOKEN_PATH))
}

pub fn config(server: &MockServer) -> JudgeConfig {
    JudgeConfig::default()
        .with_vision_url(format!("{}{}", server.uri(), VISION_PATH))
        .with_gemini_base_url(format!("{}/models", server.uri()))
        .with_timeout_secs(2)
}

pub fn gemini_client(server: &MockServer) -> GeminiClient {
    GeminiClient::with_http_client(
        reqwest::Client::new(),
        format!("{}{}", server.uri(), GEMINI_PATH),
    )
}

/// Production pipeline pointed at `server` for every provider.
pub fn judge(server: &MockServer) -> Judge {
    Judge::from_config(
        &config(server),
        Some(credentials(server)),
        Some(ApiKey::new(API_KEY)),
    )
    .expect("failed to build judge")
}

pub fn body(theme: &str, difficulty: Option<&str>) -> JudgeRequestBody {
    JudgeRequestBody {
        theme: Some(theme.to_string()),
        image_data: Some(format!("data:image/jpeg;base64,{IMAGE_BASE64}")),
        difficulty: difficulty.map(String::from),
    }
}

pub fn token_response() -> serde_json::Value {
    json!({
        "access_token": "ya29.test-access-token",
        "expires_in": 3599,
        "token_type": "Bearer"
    })
}

pub fn vision_response(labels: &[&str]) -> serde_json::Value {
    let annotations: Vec<_> = labels
        .iter()
        .map(|l| json!({ "mid": "/m/0", "description": l, "score": 0.9, "topicality": 0.9 }))
        .collect();
    json!({
        "responses": [{
            "labelAnnotations": annotations,
            "imagePropertiesAnnotation": {
                "dominantColors": {
                    "colors": [
                        { "color": { "red": 212, "green": 30, "blue": 41 }, "score": 0.7, "pixelFraction": 0.45 }
                    ]
                }
            }
        }]
    })
}

pub fn gemini_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }], "role": "model" },
            "finishReason": "STOP"
        }]
    })
}
