//! Prompt orchestration and reply normalization.
//!
//! [`AiEngine::run`] always returns a JSON object:
//!
//! - demo payloads when no credential is configured,
//! - the parsed reply (or `{"response", "raw_response": true}`) on success,
//! - an error payload with a demo fallback on any failure.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{json, Value};

use crate::client::{AnthropicClient, CompletionClient};
use crate::config::AiConfig;
use crate::error::AiError;
use crate::prompts::{self, PromptKind, SYSTEM_PROMPT};

/// Message shown to the user when the endpoint fails.
pub const FRIENDLY_ERROR_MESSAGE: &str = "I encountered an error while processing your request. \
                                          Please try again or rephrase your question.";

static FENCED_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").expect("valid regex")
});

/// Runs prompts against the configured completion client.
#[derive(Clone)]
pub struct AiEngine {
    client: Option<Arc<dyn CompletionClient>>,
}

impl AiEngine {
    /// Build the engine from configuration.
    ///
    /// Falls back to demo mode when no credential is set or the HTTP client
    /// cannot be constructed.
    pub fn from_config(config: &AiConfig) -> Self {
        match AnthropicClient::from_config(config) {
            Ok(Some(client)) => {
                tracing::info!(model = %config.model, "AI engine using remote completions");
                Self::with_client(Arc::new(client))
            }
            Ok(None) => {
                tracing::info!("AI engine running in demo mode");
                Self::demo()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build AI client, using demo mode");
                Self::demo()
            }
        }
    }

    pub fn with_client(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn demo() -> Self {
        Self { client: None }
    }

    pub fn is_demo(&self) -> bool {
        self.client.is_none()
    }

    /// Send `prompt` and normalize the reply. Never fails.
    pub async fn run(&self, kind: PromptKind, prompt: &str) -> Value {
        let Some(client) = &self.client else {
            tracing::debug!(kind = %kind, "Answering from demo payload");
            return demo_response(prompt);
        };

        match client.complete(SYSTEM_PROMPT, prompt).await {
            Ok(text) => {
                tracing::debug!(kind = %kind, chars = text.len(), "AI completion received");
                parse_reply(&text)
            }
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "AI completion failed");
                error_payload(&e, prompt)
            }
        }
    }

    pub async fn project_summary(&self, input: &prompts::ProjectSummaryInput) -> Value {
        self.run(PromptKind::ProjectSummary, &prompts::project_summary(input))
            .await
    }

    pub async fn portfolio_summary(&self, input: &prompts::PortfolioSummaryInput) -> Value {
        self.run(
            PromptKind::PortfolioSummary,
            &prompts::portfolio_summary(input),
        )
        .await
    }

    pub async fn analyze_risk(&self, input: &prompts::RiskAnalysisInput) -> Value {
        self.run(PromptKind::RiskAnalysis, &prompts::risk_analysis(input))
            .await
    }

    pub async fn answer_question(
        &self,
        question: &str,
        context: &prompts::QuestionContext,
    ) -> Value {
        self.run(PromptKind::Question, &prompts::question(question, context))
            .await
    }

    pub async fn compare_projects(&self, projects: &[prompts::ComparedProject]) -> Value {
        self.run(
            PromptKind::ProjectComparison,
            &prompts::compare_projects(projects),
        )
        .await
    }

    pub async fn executive_report(
        &self,
        portfolio: &prompts::ExecutivePortfolio,
        projects: &[prompts::ExecutiveProject],
    ) -> Value {
        self.run(
            PromptKind::ExecutiveReport,
            &prompts::executive_report(portfolio, projects),
        )
        .await
    }
}

/// Parse a reply as a JSON object, also accepting a fenced ```json block.
/// Anything else is wrapped as `{"response": text, "raw_response": true}`.
pub fn parse_reply(text: &str) -> Value {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text.trim()) {
        return value;
    }
    if let Some(block) = FENCED_JSON_RE.captures(text).and_then(|c| c.get(1)) {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(block.as_str()) {
            return value;
        }
    }
    json!({ "response": text, "raw_response": true })
}

/// Structured payload returned in place of a failed completion.
pub fn error_payload(error: &AiError, prompt: &str) -> Value {
    json!({
        "error": true,
        "error_type": error.kind(),
        "error_message": error.to_string(),
        "response": FRIENDLY_ERROR_MESSAGE,
        "demo_fallback": demo_response(prompt),
    })
}

/// Canned reply chosen by the prompt wording.
pub fn demo_response(prompt: &str) -> Value {
    let prompt = prompt.to_lowercase();
    if prompt.contains("status summary") {
        json!({
            "context": { "level": "project", "report_type": "status_summary" },
            "health_summary": {
                "status": "At Risk",
                "overall_assessment": "The project is behind schedule with multiple high-impact risks affecting delivery."
            },
            "insights": [
                "Schedule performance is the primary driver of project risk.",
                "Risk exposure is increasing as completion remains below expected levels."
            ],
            "recommendations": [
                "Rebaseline critical tasks and apply recovery planning.",
                "Escalate high risks to the steering committee.",
                "Consider adding resources to critical path activities."
            ],
            "data_gaps": []
        })
    } else if prompt.contains("portfolio") {
        json!({
            "context": { "level": "portfolio", "report_type": "executive_summary" },
            "health_summary": {
                "status": "Mixed",
                "overall_assessment": "Portfolio shows healthy completion rates but resource constraints are emerging."
            },
            "insights": [
                "55% of projects are on track, indicating good overall portfolio health.",
                "Developer and QA roles are overallocated across multiple projects.",
                "7 projects with SPI < 0.9 require immediate attention."
            ],
            "recommendations": [
                "Prioritize resource allocation for critical projects.",
                "Consider hiring additional developers and QA engineers.",
                "Implement stricter schedule monitoring for at-risk projects."
            ],
            "data_gaps": []
        })
    } else {
        json!({
            "response": "I can help you analyze project data. Please provide specific project information or ask about portfolio status.",
            "capabilities": [
                "Project status summaries",
                "Risk analysis",
                "Portfolio health reports",
                "Performance insights",
                "Recommendations"
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Returns a fixed reply and records the prompts it was given.
    struct FakeClient {
        reply: fn() -> Result<String, AiError>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl FakeClient {
        fn new(reply: fn() -> Result<String, AiError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for FakeClient {
        async fn complete(&self, system: &str, user_message: &str) -> Result<String, AiError> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), user_message.to_string()));
            (self.reply)()
        }
    }

    #[tokio::test]
    async fn demo_engine_picks_payload_by_prompt() {
        let engine = AiEngine::demo();
        assert!(engine.is_demo());

        let project = engine
            .run(PromptKind::ProjectSummary, "Generate a project status summary")
            .await;
        assert_eq!(project["context"]["level"], "project");

        let portfolio = engine
            .run(PromptKind::PortfolioSummary, "Generate a PORTFOLIO summary")
            .await;
        assert_eq!(portfolio["health_summary"]["status"], "Mixed");

        let other = engine.run(PromptKind::Question, "What is a risk?").await;
        assert_eq!(other["capabilities"].as_array().map(Vec::len), Some(5));
    }

    #[tokio::test]
    async fn json_reply_is_returned_as_object() {
        let client = FakeClient::new(|| Ok(r#"{"summary": "All good"}"#.to_string()));
        let engine = AiEngine::with_client(client.clone());

        let value = engine.run(PromptKind::Question, "hello").await;
        assert_eq!(value, json!({ "summary": "All good" }));

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, SYSTEM_PROMPT);
        assert_eq!(seen[0].1, "hello");
    }

    #[tokio::test]
    async fn plain_text_reply_is_wrapped() {
        let engine = AiEngine::with_client(FakeClient::new(|| Ok("Just text".to_string())));
        let value = engine.run(PromptKind::Question, "hello").await;
        assert_eq!(
            value,
            json!({ "response": "Just text", "raw_response": true })
        );
    }

    #[tokio::test]
    async fn failure_becomes_error_payload_with_demo_fallback() {
        let engine = AiEngine::with_client(FakeClient::new(|| {
            Err(AiError::Api {
                status: 529,
                body: "overloaded".into(),
            })
        }));
        let value = engine
            .run(PromptKind::ProjectSummary, "Generate a project status summary")
            .await;

        assert_eq!(value["error"], true);
        assert_eq!(value["error_type"], "ApiError");
        assert_eq!(value["response"], FRIENDLY_ERROR_MESSAGE);
        assert!(value["error_message"]
            .as_str()
            .is_some_and(|m| m.contains("529")));
        assert_eq!(value["demo_fallback"]["context"]["level"], "project");
    }

    #[tokio::test]
    async fn empty_completion_is_reported() {
        let engine = AiEngine::with_client(FakeClient::new(|| Err(AiError::EmptyCompletion)));
        let value = engine.run(PromptKind::Question, "hello").await;
        assert_eq!(value["error_type"], "EmptyCompletion");
    }

    #[test]
    fn fenced_json_block_is_extracted() {
        let text = "Here you go:\n```json\n{\"insights\": [\"a\"]}\n```\nThanks";
        assert_eq!(parse_reply(text), json!({ "insights": ["a"] }));
    }

    #[test]
    fn non_object_json_is_treated_as_text() {
        assert_eq!(parse_reply("42")["raw_response"], true);
        assert_eq!(parse_reply("```json\n{broken\n```")["raw_response"], true);
    }

    #[test]
    fn demo_config_builds_demo_engine() {
        assert!(AiEngine::from_config(&AiConfig::demo()).is_demo());
    }
}
