use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use crate::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const MODEL: &str = "gemini-2.0-flash";

const COMPLEXITY_PROMPT: &str = "\
Analyze the time and space complexity of the following code and return a JSON object like:
{ \"time\": \"O(n)\", \"space\": \"O(1)\" }
If the code is invalid or empty, return:
{ \"error\": \"Invalid or empty code\" }

Code:
";

const HINT_PROMPT: &str = "\
You are helping someone practice for coding interviews. Read the problem and their \
current attempt, then give one short hint that moves them forward without revealing \
the full solution. Return a JSON object like { \"hint\": \"...\" }.

Problem:
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Complexity {
    Analysis { time: String, space: String },
    /// The model declined, usually because the code was empty or invalid.
    Rejected(String),
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ComplexityReply {
    time: Option<String>,
    space: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HintReply {
    hint: String,
}

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Sends one prompt with a structured-output schema and decodes the JSON
    /// the model returns.
    async fn generate<T: DeserializeOwned>(&self, prompt: String, schema: Value) -> anyhow::Result<T> {
        let payload = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });
        let response = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, MODEL
            ))
            .query(&[("key", &self.api_key)])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if status != reqwest::StatusCode::OK {
            anyhow::bail!("Gemini API call failed: HTTP {}\n{}", status, text);
        }

        let response: GenerateResponse = serde_json::from_str(&text)
            .with_context(|| format!("Unexpected Gemini response:\n{}", text))?;
        let raw = response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.as_str())
            .ok_or_else(|| anyhow::anyhow!("Gemini returned no candidates:\n{}", text))?;
        debug!("Gemini replied: {}", raw);
        serde_json::from_str(raw)
            .with_context(|| format!("Failed to parse inner JSON. Raw text:\n{}", raw))
    }

    pub async fn analyze_complexity(&self, code: &str) -> anyhow::Result<Complexity> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "time": { "type": "STRING" },
                "space": { "type": "STRING" },
                "error": { "type": "STRING" },
            },
            "required": ["time", "space"],
        });
        let reply: ComplexityReply = self
            .generate(format!("{}{}", COMPLEXITY_PROMPT, code), schema)
            .await?;

        if let Some(error) = reply.error.filter(|error| !error.is_empty()) {
            return Ok(Complexity::Rejected(error));
        }
        Ok(Complexity::Analysis {
            time: reply.time.unwrap_or_else(|| "unknown".to_string()),
            space: reply.space.unwrap_or_else(|| "unknown".to_string()),
        })
    }

    pub async fn suggest_hint(&self, statement: &str, code: &str) -> anyhow::Result<String> {
        let schema = json!({
            "type": "OBJECT",
            "properties": { "hint": { "type": "STRING" } },
            "required": ["hint"],
        });
        let prompt = format!("{}{}\n\nCurrent attempt:\n{}", HINT_PROMPT, statement, code);
        let reply: HintReply = self.generate(prompt, schema).await?;
        Ok(reply.hint)
    }
}
