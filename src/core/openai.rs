//! Judge backed by an OpenAI-compatible chat completions endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Judge, OpenAiSettings};
use crate::types::{CaseFile, JudgeError};

pub const SYSTEM_PROMPT: &str =
    "You are an impartial judge tasked with adjudicating a debate based on the arguments presented.";

/// Asks a chat model who won and why
#[derive(Debug, Clone)]
pub struct OpenAiJudge {
    client: Client,
    settings: OpenAiSettings,
}

impl OpenAiJudge {
    pub fn new(settings: OpenAiSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }
}

/// User prompt listing the title and every locked argument by participant
pub fn render_prompt(case: &CaseFile) -> String {
    let mut prompt = format!("Adjudicate the following debate. Title: {}\n\n", case.title);
    prompt.push_str(&format!(
        "The participants are {} (who opened the debate) and {}.\n\n",
        case.creator, case.opponent
    ));
    for argument in &case.arguments {
        prompt.push_str(&format!("Participant {}:\n{}\n\n", argument.author, argument.content));
    }
    prompt.push_str(
        "Based on the arguments presented, who is the winner and why? Provide a detailed explanation.",
    );
    prompt
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn extract_verdict(response: ChatCompletionResponse) -> Result<String, JudgeError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| JudgeError::BadResponse("completion contained no text".into()))
}

#[async_trait]
impl Judge for OpenAiJudge {
    async fn adjudicate(&self, case: &CaseFile) -> Result<String, JudgeError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or_else(|| JudgeError::NotConfigured("OPENAI_API_KEY is not set".into()))?;

        let prompt = render_prompt(case);
        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &prompt },
            ],
        };
        debug!(session_id = %case.session_id, model = %self.settings.model, "requesting verdict");

        let response = self
            .client
            .post(&self.settings.url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| JudgeError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(JudgeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| JudgeError::BadResponse(err.to_string()))?;
        extract_verdict(parsed)
    }
}
