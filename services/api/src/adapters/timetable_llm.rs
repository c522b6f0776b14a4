//! services/api/src/adapters/timetable_llm.rs
//!
//! This module contains the adapter for the timetable-drafting LLM.
//! It implements the `TimetableGenerationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use classroom_core::{
    domain::Week,
    generation::{parse_generated_timetable, GenerationRequest},
    ports::{PortError, PortResult, TimetableGenerationService},
};
use tracing::{debug, info};

const SYSTEM_INSTRUCTIONS: &str = "You are a timetable planning assistant for teachers. \
You turn course syllabi into week-by-week lecture plans and always answer with a single JSON object.";

/// An adapter that implements `TimetableGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiTimetableAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiTimetableAdapter {
    /// Creates a new `OpenAiTimetableAdapter`. `model` is used unless a request names its own.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl TimetableGenerationService for OpenAiTimetableAdapter {
    async fn generate_timetable(
        &self,
        request: &GenerationRequest,
        syllabus: &str,
    ) -> PortResult<Vec<Week>> {
        let model = request.model_name.as_deref().unwrap_or(&self.model);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.prompt(syllabus))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        info!(model, weeks = request.num_weeks, "Requesting timetable draft");
        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e: OpenAIError| PortError::StoreUnavailable(e.to_string()))?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::MalformedPayload("Timetable LLM returned no text content.".to_string())
            })?;
        debug!(chars = reply.len(), "Timetable draft received");

        parse_generated_timetable(&reply)
    }
}
