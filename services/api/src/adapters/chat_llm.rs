//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the conversational LLM.
//! It implements the `ChatModelService` port from the `core` crate, including
//! the tool-invocation loop: the model may request movie tools any number of
//! times (up to a round cap) before producing its final textual reply.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
        CreateChatCompletionRequestArgs, FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;
use movie_tracker_core::{
    domain::ConversationMessage,
    ports::{ChatError, ChatModelService, ChatResult},
    toolbox::MovieToolbox,
};
use tracing::{debug, warn};

/// Upper bound on tool-invocation rounds within one turn. A model that keeps
/// requesting tools past this is cut off with an upstream error.
const MAX_TOOL_ROUNDS: usize = 8;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatModelService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    chat_model: String,
    prompt_model: String,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`. `chat_model` drives the tool-calling
    /// conversation; `prompt_model` serves the cheaper one-shot prompts.
    pub fn new(client: Client<OpenAIConfig>, chat_model: String, prompt_model: String) -> Self {
        Self {
            client,
            chat_model,
            prompt_model,
        }
    }

    fn tool_definitions(toolbox: &MovieToolbox) -> ChatResult<Vec<ChatCompletionTool>> {
        toolbox
            .definitions()
            .into_iter()
            .map(|spec| {
                let function = FunctionObjectArgs::default()
                    .name(spec.name)
                    .description(spec.description)
                    .parameters(spec.parameters)
                    .build()
                    .map_err(|e| ChatError::Upstream(e.to_string()))?;
                ChatCompletionToolArgs::default()
                    .r#type(ChatCompletionToolType::Function)
                    .function(function)
                    .build()
                    .map_err(|e| ChatError::Upstream(e.to_string()))
            })
            .collect()
    }

    /// Converts the persisted history into request messages. Tool transcripts
    /// from earlier turns are skipped: they cannot be replayed without their
    /// originating call ids, and the assistant replies already reflect them.
    fn request_messages(
        history: &[ConversationMessage],
    ) -> ChatResult<Vec<ChatCompletionRequestMessage>> {
        let mut messages = Vec::with_capacity(history.len());
        for entry in history {
            match entry {
                ConversationMessage::System { content } => messages.push(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(content.as_str())
                        .build()
                        .map_err(|e| ChatError::Upstream(e.to_string()))?
                        .into(),
                ),
                ConversationMessage::User { content } => messages.push(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(content.as_str())
                        .build()
                        .map_err(|e| ChatError::Upstream(e.to_string()))?
                        .into(),
                ),
                ConversationMessage::Assistant { content } => messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(content.as_str())
                        .build()
                        .map_err(|e| ChatError::Upstream(e.to_string()))?
                        .into(),
                ),
                ConversationMessage::Tool { .. } => {}
            }
        }
        Ok(messages)
    }

    async fn run_tool_calls(
        toolbox: &MovieToolbox,
        calls: Vec<ChatCompletionMessageToolCall>,
        messages: &mut Vec<ChatCompletionRequestMessage>,
    ) -> ChatResult<()> {
        messages.push(
            ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(calls.clone())
                .build()
                .map_err(|e| ChatError::Upstream(e.to_string()))?
                .into(),
        );

        for call in calls {
            debug!(tool = %call.function.name, "model requested tool");
            let output = toolbox
                .dispatch(&call.function.name, &call.function.arguments)
                .await;
            messages.push(
                ChatCompletionRequestToolMessageArgs::default()
                    .content(output)
                    .tool_call_id(call.id)
                    .build()
                    .map_err(|e| ChatError::Upstream(e.to_string()))?
                    .into(),
            );
        }
        Ok(())
    }
}

//=========================================================================================
// `ChatModelService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatModelService for OpenAiChatAdapter {
    /// Runs one model exchange over the conversation, resolving tool requests
    /// through the toolbox until the model produces a textual reply.
    async fn complete_with_tools(
        &self,
        history: &[ConversationMessage],
        toolbox: &MovieToolbox,
    ) -> ChatResult<String> {
        let tools = Self::tool_definitions(toolbox)?;
        let mut messages = Self::request_messages(history)?;

        for round in 0..MAX_TOOL_ROUNDS {
            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.chat_model)
                .messages(messages.clone())
                .tools(tools.clone())
                .n(1)
                .build()
                .map_err(|e| ChatError::Upstream(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e: OpenAIError| ChatError::Upstream(e.to_string()))?;

            let choice = response.choices.into_iter().next().ok_or_else(|| {
                ChatError::Upstream("Chat LLM returned no choices in its response.".to_string())
            })?;

            match choice.message.tool_calls {
                Some(calls) if !calls.is_empty() => {
                    debug!(round, count = calls.len(), "resolving tool round");
                    Self::run_tool_calls(toolbox, calls, &mut messages).await?;
                }
                _ => {
                    return choice.message.content.ok_or_else(|| {
                        ChatError::Upstream(
                            "Chat LLM response contained no text content.".to_string(),
                        )
                    });
                }
            }
        }

        warn!("tool round cap reached without a final reply");
        Err(ChatError::Upstream(format!(
            "Chat LLM exceeded {} tool rounds without replying.",
            MAX_TOOL_ROUNDS
        )))
    }

    /// One-shot instruction + input prompt without history or tools.
    async fn prompt(&self, instructions: &str, input: &str) -> ChatResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(instructions)
                .build()
                .map_err(|e| ChatError::Upstream(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(input)
                .build()
                .map_err(|e| ChatError::Upstream(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.prompt_model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| ChatError::Upstream(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| ChatError::Upstream(e.to_string()))?;

        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(ChatError::Upstream(
                    "Prompt LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(ChatError::Upstream(
                "Prompt LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
