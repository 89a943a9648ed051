//! LLM enrichment of the rule-based report.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use servecoach_common::config::EnrichmentConfig;
use servecoach_common::error::{ServeCoachError, ServeCoachResult};
use servecoach_pose_model::export::SessionExport;
use servecoach_pose_model::report::FeedbackReport;

use crate::prompt::{build_analysis_prompt, SYSTEM_PROMPT};

/// A service that turns an analyzed session into free-form coaching text.
#[async_trait::async_trait]
pub trait FeedbackEnricher: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Produce narrative feedback for the session.
    async fn enrich(
        &self,
        export: &SessionExport,
        report: &FeedbackReport,
    ) -> ServeCoachResult<String>;
}

/// The rule-based report plus optional narrative feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedFeedback {
    #[serde(flatten)]
    pub report: FeedbackReport,

    /// Whether narrative feedback was produced.
    pub ai_enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
}

impl EnrichedFeedback {
    /// The report alone, with enrichment marked unavailable.
    pub fn unenriched(report: FeedbackReport) -> Self {
        Self {
            report,
            ai_enabled: false,
            ai_analysis: None,
        }
    }
}

/// Attach narrative feedback to `report` if an enricher is available.
///
/// Never fails. Without an enricher, or when it errors, the report is
/// returned unchanged with `ai_enabled: false`.
pub async fn enrich_feedback(
    enricher: Option<&dyn FeedbackEnricher>,
    export: &SessionExport,
    report: FeedbackReport,
) -> EnrichedFeedback {
    let Some(enricher) = enricher else {
        tracing::info!("No enrichment service configured, returning rule-based report");
        return EnrichedFeedback::unenriched(report);
    };

    match enricher.enrich(export, &report).await {
        Ok(text) => {
            tracing::info!(
                service = enricher.name(),
                chars = text.len(),
                "Enrichment complete"
            );
            EnrichedFeedback {
                report,
                ai_enabled: true,
                ai_analysis: Some(text),
            }
        }
        Err(e) => {
            tracing::warn!(service = enricher.name(), error = %e, "Enrichment failed");
            EnrichedFeedback::unenriched(report)
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenAI chat-completions client.
pub struct OpenAiEnricher {
    client: reqwest::Client,
    config: EnrichmentConfig,
    api_key: String,
}

impl OpenAiEnricher {
    pub fn new(config: EnrichmentConfig, api_key: impl Into<String>) -> ServeCoachResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ServeCoachError::enrichment(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    /// Build from config, reading the key from the configured environment
    /// variable. `Ok(None)` when enrichment is disabled or no key is set.
    pub fn from_config(config: &EnrichmentConfig) -> ServeCoachResult<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Self::new(config.clone(), key).map(Some),
            _ => {
                tracing::info!(env = %config.api_key_env, "No API key found, enrichment disabled");
                Ok(None)
            }
        }
    }

    fn request_body(&self, prompt: String) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

fn first_choice(response: ChatResponse) -> ServeCoachResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| ServeCoachError::enrichment("response contained no choices"))
}

#[async_trait::async_trait]
impl FeedbackEnricher for OpenAiEnricher {
    fn name(&self) -> &str {
        "openai"
    }

    async fn enrich(
        &self,
        export: &SessionExport,
        report: &FeedbackReport,
    ) -> ServeCoachResult<String> {
        let body = self.request_body(build_analysis_prompt(export, report));
        tracing::debug!(
            model = %self.config.model,
            endpoint = %self.config.endpoint,
            "Requesting coaching feedback"
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServeCoachError::enrichment(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServeCoachError::enrichment(format!(
                "service returned HTTP {status}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServeCoachError::enrichment(format!("malformed response: {e}")))?;
        first_choice(parsed)
    }
}
