use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Anything that turns a prompt into free-form text.
pub trait TextGenerator {
    fn name(&self) -> &str;
    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Clone, Debug)]
pub struct ChatSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint
/// (Ollama, vLLM, llama.cpp server, ...).
pub struct ChatClient {
    http: reqwest::blocking::Client,
    settings: ChatSettings,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    pub fn new(settings: ChatSettings) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self { http, settings })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }
}

impl TextGenerator for ChatClient {
    fn name(&self) -> &str {
        &self.settings.model
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let req = ChatRequest {
            model: &self.settings.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: self.settings.temperature,
        };
        let url = self.endpoint();
        let resp: ChatResponse = self
            .http
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&req)
            .send()
            .with_context(|| format!("POST {url}"))?
            .error_for_status()?
            .json()
            .context("decode chat completion")?;
        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("chat completion has no content"))
    }
}
