//! Remote LLM content provider
//!
//! Chat-completions client used for both the primary and secondary chain
//! positions with different endpoint configurations. The request asks the
//! model for a JSON object with the guide sections; a response that is not
//! valid JSON degrades to using the raw text as the summary rather than
//! failing the call.

use super::{ContentProvider, GeneratedContent, ProviderError};
use crate::models::{CanonicalPreferences, Citation, TripFacts};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tripcast_common::config::LlmEndpoint;

const USER_AGENT: &str = "Tripcast/0.1.0 (https://github.com/tripcast/tripcast)";

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat completion response body (the subset we read)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Guide sections as the model is asked to emit them
#[derive(Debug, Deserialize)]
struct GuideSections {
    summary: String,
    #[serde(default)]
    insights: Vec<String>,
    #[serde(default)]
    day_notes: Vec<String>,
}

/// Remote LLM client
pub struct LlmClient {
    name: &'static str,
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl LlmClient {
    /// Build a client from an endpoint config
    ///
    /// `call_timeout` bounds the full request; the provider chain applies
    /// its own outer timeout as well.
    pub fn new(
        name: &'static str,
        endpoint: LlmEndpoint,
        call_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(call_timeout)
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            name,
            http_client,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            model: endpoint.model,
            api_key: endpoint.api_key,
        })
    }

    fn build_prompt(facts: &TripFacts, prefs: &CanonicalPreferences) -> String {
        let tags: Vec<String> = prefs.interest_tags().into_iter().collect();
        let cuisines: Vec<String> = prefs.cuisines.iter().cloned().collect();
        format!(
            "Write a travel guide for a {}-day trip to {} for {} traveler(s).\n\
             Pace: {:?}. Group: {:?}. Interests: {}. Preferred cuisines: {}.\n\
             Respond with a JSON object: {{\"summary\": string, \
             \"insights\": [string], \"day_notes\": [string, one per day]}}.",
            facts.date_range.len_days(),
            facts.destination,
            facts.traveler_count,
            prefs.pace,
            prefs.group,
            if tags.is_empty() { "general sightseeing".to_string() } else { tags.join(", ") },
            if cuisines.is_empty() { "any".to_string() } else { cuisines.join(", ") },
        )
    }

    /// Parse model output, tolerating non-JSON responses
    fn parse_sections(&self, content: &str, facts: &TripFacts) -> GeneratedContent {
        let citations = vec![Citation {
            title: format!("Generated guide text for {}", facts.destination),
            url: None,
            source: format!("{} ({})", self.name, self.model),
        }];

        match serde_json::from_str::<GuideSections>(content.trim()) {
            Ok(sections) => GeneratedContent {
                summary: sections.summary,
                insights: sections.insights,
                day_notes: sections.day_notes,
                citations,
            },
            Err(e) => {
                tracing::debug!(
                    provider = self.name,
                    error = %e,
                    "LLM response was not JSON, using raw text as summary"
                );
                GeneratedContent {
                    summary: content.trim().to_string(),
                    insights: Vec::new(),
                    day_notes: Vec::new(),
                    citations,
                }
            }
        }
    }
}

#[async_trait]
impl ContentProvider for LlmClient {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn generate(
        &self,
        facts: &TripFacts,
        prefs: &CanonicalPreferences,
    ) -> Result<GeneratedContent, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: Self::build_prompt(facts, prefs),
            }],
            temperature: 0.7,
        };

        tracing::debug!(provider = self.name, url = %url, "Requesting guide content");

        let mut builder = self.http_client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| ProviderError::Parse("response contained no choices".to_string()))?;

        if content.trim().is_empty() {
            return Err(ProviderError::Parse("response content was empty".to_string()));
        }

        tracing::info!(
            provider = self.name,
            destination = %facts.destination,
            "Guide content generated"
        );

        Ok(self.parse_sections(content, facts))
    }
}
