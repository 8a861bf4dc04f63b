//! OpenAI-compatible HTTP implementation of the medication advisors.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;

use crate::error::ReviewError;

use super::service::{InteractionAdvisor, RiskAdvisor};

/// Default chat-completions base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const RISK_SYSTEM_PROMPT: &str = concat!(
    "You are a clinical pharmacist reviewing medications for elderly care-home residents. ",
    "Answer in Traditional Chinese. ",
    "Summarize the main risks of the listed drugs for an older adult in at most three sentences ",
    "and state an overall level using exactly one of 高風險, 中風險, or 低風險."
);

const INTERACTION_SYSTEM_PROMPT: &str = concat!(
    "You are a clinical pharmacist checking drug-drug interactions. ",
    "Answer in Traditional Chinese. ",
    "List each clinically relevant interaction between the listed drugs on its own line. ",
    "If there is no relevant interaction, answer with the single character 無 and nothing else."
);

/// Configuration for [`OpenAiAdvisor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiAdvisorConfig {
    /// Base API URL (e.g., `https://api.openai.com/v1`).
    pub base_url: String,
    /// Model identifier sent in chat-completions requests.
    pub model: String,
    /// API key used for bearer authentication.
    pub api_key: Option<String>,
    /// HTTP timeout.
    pub timeout: Duration,
    /// Additional request headers (primarily useful for deterministic tests).
    #[cfg(any(test, feature = "test-support"))]
    pub additional_headers: Vec<(String, String)>,
}

impl Default for OpenAiAdvisorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            #[cfg(any(test, feature = "test-support"))]
            additional_headers: Vec::new(),
        }
    }
}

impl OpenAiAdvisorConfig {
    /// Constructs configuration with required API settings.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            timeout,
            #[cfg(any(test, feature = "test-support"))]
            additional_headers: Vec::new(),
        }
    }

    /// Adds one extra HTTP header.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn with_additional_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.additional_headers.push((name.into(), value.into()));
        self
    }
}

/// Advisor backed by an OpenAI-compatible chat-completions endpoint.
///
/// One instance serves as both the risk and the interaction advisor; the HTTP
/// client is built once and reused for every call in the session.
#[derive(Debug, Clone)]
pub struct OpenAiAdvisor {
    config: OpenAiAdvisorConfig,
    client: Client,
}

impl OpenAiAdvisor {
    /// Creates an advisor from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when the API key is missing or
    /// the HTTP client cannot be built.
    pub fn new(config: OpenAiAdvisorConfig) -> Result<Self, ReviewError> {
        if config
            .api_key
            .as_deref()
            .is_none_or(|key| key.trim().is_empty())
        {
            return Err(ReviewError::configuration(concat!(
                "AI API key is required (use --ai-api-key, ",
                "SMARTMEDS_AI_API_KEY, or OPENAI_API_KEY)"
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| {
                ReviewError::configuration(format!("failed to configure AI HTTP client: {error}"))
            })?;

        Ok(Self { config, client })
    }

    fn complete(&self, system_prompt: &str, user_prompt: String) -> Result<String, ReviewError> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let endpoint = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = ChatCompletionsRequest {
            model: self.config.model.as_str(),
            temperature: 0.0,
            messages: vec![
                ChatCompletionsMessage {
                    role: "system",
                    content: system_prompt.to_owned(),
                },
                ChatCompletionsMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        #[cfg(any(test, feature = "test-support"))]
        let mut request_builder = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&payload);
        #[cfg(not(any(test, feature = "test-support")))]
        let request_builder = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&payload);
        #[cfg(any(test, feature = "test-support"))]
        for (name, value) in &self.config.additional_headers {
            request_builder = request_builder.header(name, value);
        }

        let response = request_builder.send().map_err(|error| ReviewError::Advisor {
            message: format!("AI request transport failed: {error}"),
        })?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().map_or_else(
                |_| "(failed to read error response body)".to_owned(),
                |content| truncate_for_message(content.as_str(), 160),
            );
            return Err(ReviewError::Advisor {
                message: format!("AI request failed with status {}: {body}", status.as_u16()),
            });
        }

        let response_payload: ChatCompletionsResponse =
            response.json().map_err(|error| ReviewError::Advisor {
                message: format!("AI response JSON decoding failed: {error}"),
            })?;

        response_payload
            .choices
            .first()
            .and_then(|choice| parse_content_value(&choice.message.content))
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(|| ReviewError::Advisor {
                message: "AI response did not contain assistant text".to_owned(),
            })
    }
}

impl RiskAdvisor for OpenAiAdvisor {
    fn summarize_risk(&self, medications: &[String]) -> Result<String, ReviewError> {
        self.complete(RISK_SYSTEM_PROMPT, build_prompt(medications))
    }
}

impl InteractionAdvisor for OpenAiAdvisor {
    fn summarize_interactions(&self, medications: &[String]) -> Result<String, ReviewError> {
        self.complete(INTERACTION_SYSTEM_PROMPT, build_prompt(medications))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatCompletionsMessage>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionsMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, serde::Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

#[derive(Debug, serde::Deserialize)]
struct ChatContentPart {
    text: Option<String>,
    content: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoiceMessage {
    content: ChatContent,
}

fn build_prompt(medications: &[String]) -> String {
    let mut prompt = String::from("Medications:\n");
    for medication in medications {
        prompt.push_str("- ");
        prompt.push_str(medication);
        prompt.push('\n');
    }
    prompt
}

fn parse_content_value(content: &ChatContent) -> Option<&str> {
    match content {
        ChatContent::Text(text) => Some(text.as_str()),
        ChatContent::Parts(parts) => parts
            .iter()
            .find_map(|part| part.text.as_deref().or(part.content.as_deref())),
    }
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output = String::new();
    let mut chars = message.chars();

    for _ in 0..max_chars {
        let Some(character) = chars.next() else {
            return output;
        };
        output.push(character);
    }

    if chars.next().is_some() {
        output.push_str("...");
    }

    output
}

#[cfg(test)]
#[path = "openai_tests.rs"]
mod tests;
