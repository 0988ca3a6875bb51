//! Theme/label scoring through the text-generation provider.
//!
//! The provider answers with a `generateContent` envelope whose first
//! candidate carries the model output as text. That text is asked to be a
//! bare `{ "score", "reason" }` object, but nothing enforces it, so parsing
//! reports which layer failed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::JudgeConfig;
use crate::credentials::ApiKey;
use crate::error::{JudgeError, JudgeResult, MalformedKind, Stage};
use crate::http::{build_client, external_failure};
use crate::types::{JudgmentRequest, JudgmentResult};

/// Placeholder used in the prompt when color data does not apply.
pub const NO_COLOR_SENTINEL: &str = "N/A";

const PROMPT_PREAMBLE: &str = r#"あなたは「HunToruくん」という、元気で少しおっちょこちょいなキャラクターです。
プレイヤーが撮影した写真について、画像解析で得られた英語の「ラベルリスト」（難易度HARDでは「色情報」も）と「テーマ」を比べて採点してください。

# 手順
1. ラベルリストからテーマに最も関係しそうなキーワードを1〜2個選ぶ。
2. 選んだキーワードを自然な日本語に訳す（例: "Computer keyboard" → "キーボード"）。
3. 色情報がある場合は、テーマが指定する色と主要な色が合っているかも考慮する。
4. 訳したキーワードを使って、20文字程度の短いセリフを「reason」として作る。
   - テーマに合っているとき: 「〇〇、みーっけ！やったね！」のように元気に。
   - 合っていないとき: 「うーん、これは〇〇かな？お題とは違うみたい…」のように少し困った様子で。

# 出力
0.0〜1.0の類似度スコアを算出し、次のJSONオブジェクトだけを返してください。前後に文章やコードブロックを付けないこと。
{ "score": 0.85, "reason": "ここにセリフ" }
"#;

/// Scores a theme against detected labels.
#[async_trait]
pub trait JudgmentProvider: Send + Sync {
    async fn judge(&self, request: &JudgmentRequest, api_key: &ApiKey) -> JudgeResult<JudgmentResult>;
}

#[derive(Serialize)]
struct PromptColor {
    rgb: [u8; 3],
    score: f64,
}

/// Render the prompt. Colors appear only when the request carries them.
pub fn build_prompt(request: &JudgmentRequest) -> String {
    let labels = request
        .labels
        .iter()
        .map(|l| format!("\"{l}\""))
        .collect::<Vec<_>>()
        .join(", ");

    let colors = if request.colors().is_empty() {
        NO_COLOR_SENTINEL.to_string()
    } else {
        let colors: Vec<PromptColor> = request
            .colors()
            .iter()
            .map(|c| PromptColor {
                rgb: [c.red, c.green, c.blue],
                score: c.score,
            })
            .collect();
        serde_json::to_string(&colors).unwrap_or_else(|_| NO_COLOR_SENTINEL.to_string())
    };

    format!(
        "{PROMPT_PREAMBLE}\n---\nテーマ: \"{}\"\nラベルリスト: [{}]\n色情報: {}\n",
        request.theme, labels, colors
    )
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawJudgment {
    score: f64,
    reason: String,
}

/// Parse a `generateContent` response body into a judgment.
pub fn parse_judgment(body: &str) -> Result<JudgmentResult, MalformedKind> {
    let envelope: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| MalformedKind::Envelope {
            message: e.to_string(),
        })?;

    let text = envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| MalformedKind::Envelope {
            message: "no candidate text in response".to_string(),
        })?;

    let raw: RawJudgment =
        serde_json::from_str(text.trim()).map_err(|e| MalformedKind::Payload {
            message: e.to_string(),
        })?;

    if !(0.0..=1.0).contains(&raw.score) {
        return Err(MalformedKind::ScoreOutOfRange { score: raw.score });
    }

    Ok(JudgmentResult {
        score: raw.score,
        reason: raw.reason,
    })
}

/// Client for the `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    url: String,
}

impl GeminiClient {
    pub fn new(config: &JudgeConfig) -> JudgeResult<Self> {
        Ok(Self::with_http_client(
            build_client(config)?,
            config.generate_content_url(),
        ))
    }

    /// `url` is the full `generateContent` URL without the key parameter.
    pub fn with_http_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl JudgmentProvider for GeminiClient {
    async fn judge(&self, request: &JudgmentRequest, api_key: &ApiKey) -> JudgeResult<JudgmentResult> {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(request) }] }],
            "generationConfig": { "response_mime_type": "application/json" }
        });

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", api_key.expose())])
            .json(&body)
            .send()
            .await
            .map_err(|e| JudgeError::transport(Stage::Judgment, e))?;

        if !response.status().is_success() {
            return Err(external_failure(Stage::Judgment, response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| JudgeError::transport(Stage::Judgment, e))?;

        parse_judgment(&text).map_err(|kind| {
            tracing::warn!(error = %kind, "model output did not match the judgment shape");
            JudgeError::MalformedResponse {
                stage: Stage::Judgment,
                kind,
            }
        })
    }
}
