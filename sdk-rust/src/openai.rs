use crate::{
    client_utils,
    errors::{LanguageModelError, LanguageModelResult},
    language_model::LanguageModel,
    telemetry,
    types::{
        LanguageModelInput, Message, ModelResponse, ModelUsage, Part, TextPart, Tool,
        ToolCallPart, ToolChoiceOption,
    },
};
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client,
};
use serde_json::Value;
use std::time::Duration;

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAIChatModel {
    model_id: String,
    api_key: String,
    base_url: String,
    client: Client,
    structured_outputs: bool,
    timeout: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct OpenAIChatModelOptions {
    pub base_url: Option<String>,
    pub api_key: String,
    /// Mark tool parameters as `strict` so the API enforces the schema.
    pub structured_outputs: bool,
    /// Per-request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
    pub client: Option<Client>,
}

impl OpenAIChatModel {
    #[must_use]
    pub fn new(model_id: impl Into<String>, options: OpenAIChatModelOptions) -> Self {
        let OpenAIChatModelOptions {
            base_url,
            api_key,
            structured_outputs,
            timeout,
            client,
        } = options;

        let base_url = base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            model_id: model_id.into(),
            api_key,
            base_url,
            client: client.unwrap_or_default(),
            structured_outputs,
            timeout,
        }
    }

    fn request_headers(&self) -> LanguageModelResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut auth_header =
            HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|error| {
                LanguageModelError::InvalidInput(format!(
                    "Invalid OpenAI API key header value: {error}"
                ))
            })?;
        auth_header.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_header);

        Ok(headers)
    }
}

#[async_trait::async_trait]
impl LanguageModel for OpenAIChatModel {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> String {
        self.model_id.clone()
    }

    async fn generate(&self, input: LanguageModelInput) -> LanguageModelResult<ModelResponse> {
        telemetry::trace_generate(PROVIDER, &self.model_id, input, |input| async move {
            let params = convert_to_openai_params(input, &self.model_id, self.structured_outputs);
            let headers = self.request_headers()?;

            let response: openai_api::ChatCompletion = client_utils::send_json(
                &self.client,
                &format!("{}/chat/completions", self.base_url),
                &params,
                headers,
                self.timeout,
            )
            .await?;

            let choice = response.choices.into_iter().next().ok_or_else(|| {
                LanguageModelError::Invariant(PROVIDER, "No choices in response".to_string())
            })?;

            let message = choice.message;

            if let Some(refusal) = &message.refusal {
                if !refusal.is_empty() {
                    return Err(LanguageModelError::Refusal(refusal.clone()));
                }
            }

            Ok(ModelResponse {
                content: map_openai_message(message),
                usage: response.usage.map(map_openai_usage),
            })
        })
        .await
    }
}

fn convert_to_openai_params(
    input: LanguageModelInput,
    model_id: &str,
    structured_outputs: bool,
) -> openai_api::ChatCompletionCreateParams {
    openai_api::ChatCompletionCreateParams {
        model: model_id.to_string(),
        messages: convert_to_openai_messages(input.messages, input.system_prompt),
        temperature: input.temperature,
        tools: input.tools.map(|tools| {
            tools
                .into_iter()
                .map(|tool| convert_to_openai_tool(tool, structured_outputs))
                .collect()
        }),
        tool_choice: input.tool_choice.map(convert_to_openai_tool_choice),
    }
}

fn convert_to_openai_messages(
    messages: Vec<Message>,
    system_prompt: Option<String>,
) -> Vec<openai_api::ChatCompletionMessageParam> {
    let mut openai_messages = Vec::with_capacity(messages.len() + 1);

    if let Some(content) = system_prompt {
        openai_messages.push(openai_api::ChatCompletionMessageParam::System(
            openai_api::ChatCompletionSystemMessageParam { content },
        ));
    }

    for message in messages {
        let Message::User(message) = message;
        openai_messages.push(openai_api::ChatCompletionMessageParam::User(
            openai_api::ChatCompletionUserMessageParam {
                content: join_text_parts(&message.content),
            },
        ));
    }

    openai_messages
}

fn join_text_parts(parts: &[Part]) -> String {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::Text(part) => Some(part.text.as_str()),
            Part::ToolCall(_) => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn convert_to_openai_tool(tool: Tool, structured_outputs: bool) -> openai_api::ChatCompletionTool {
    openai_api::ChatCompletionTool {
        function: openai_api::ChatCompletionToolFunction {
            name: tool.name,
            description: Some(tool.description),
            parameters: Some(tool.parameters),
            strict: structured_outputs.then_some(true),
        },
        type_: "function".to_string(),
    }
}

fn convert_to_openai_tool_choice(
    tool_choice: ToolChoiceOption,
) -> openai_api::ChatCompletionToolChoiceOption {
    match tool_choice {
        ToolChoiceOption::None => openai_api::ChatCompletionToolChoiceOption::Mode(
            openai_api::ChatCompletionToolChoiceMode::None,
        ),
        ToolChoiceOption::Auto => openai_api::ChatCompletionToolChoiceOption::Mode(
            openai_api::ChatCompletionToolChoiceMode::Auto,
        ),
        ToolChoiceOption::Required => openai_api::ChatCompletionToolChoiceOption::Mode(
            openai_api::ChatCompletionToolChoiceMode::Required,
        ),
        ToolChoiceOption::Tool(tool) => openai_api::ChatCompletionToolChoiceOption::Named(
            openai_api::ChatCompletionNamedToolChoice {
                type_: "function".to_string(),
                function: openai_api::ChatCompletionNamedToolChoiceFunction {
                    name: tool.tool_name,
                },
            },
        ),
    }
}

fn map_openai_message(message: openai_api::ChatCompletionMessage) -> Vec<Part> {
    let mut parts: Vec<Part> = vec![];

    if let Some(text) = message.content {
        if !text.is_empty() {
            parts.push(Part::Text(TextPart { text }));
        }
    }

    for tool_call in message.tool_calls.unwrap_or_default() {
        // Arguments that are not valid JSON are kept verbatim so callers can
        // report them as a malformed answer.
        let args = serde_json::from_str(&tool_call.function.arguments).unwrap_or_else(|error| {
            tracing::debug!(
                %error,
                tool = %tool_call.function.name,
                "tool call arguments are not valid JSON"
            );
            Value::String(tool_call.function.arguments.clone())
        });

        parts.push(Part::ToolCall(ToolCallPart {
            tool_call_id: tool_call.id,
            tool_name: tool_call.function.name,
            args,
        }));
    }

    parts
}

fn map_openai_usage(usage: openai_api::CompletionUsage) -> ModelUsage {
    ModelUsage {
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
    }
}

mod openai_api {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    #[derive(Debug, Serialize)]
    pub struct ChatCompletionCreateParams {
        pub model: String,
        pub messages: Vec<ChatCompletionMessageParam>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub temperature: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub tools: Option<Vec<ChatCompletionTool>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub tool_choice: Option<ChatCompletionToolChoiceOption>,
    }

    #[derive(Debug, Serialize)]
    #[serde(tag = "role", rename_all = "lowercase")]
    pub enum ChatCompletionMessageParam {
        System(ChatCompletionSystemMessageParam),
        User(ChatCompletionUserMessageParam),
    }

    #[derive(Debug, Serialize)]
    pub struct ChatCompletionSystemMessageParam {
        pub content: String,
    }

    #[derive(Debug, Serialize)]
    pub struct ChatCompletionUserMessageParam {
        pub content: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChatCompletionMessageToolCall {
        pub id: String,
        pub function: ChatCompletionMessageToolCallFunction,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChatCompletionMessageToolCallFunction {
        pub name: String,
        pub arguments: String,
    }

    #[derive(Debug, Serialize)]
    pub struct ChatCompletionTool {
        pub function: ChatCompletionToolFunction,
        #[serde(rename = "type")]
        pub type_: String,
    }

    #[derive(Debug, Serialize)]
    pub struct ChatCompletionToolFunction {
        pub name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub parameters: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub strict: Option<bool>,
    }

    #[derive(Debug, Serialize)]
    #[serde(untagged)]
    pub enum ChatCompletionToolChoiceOption {
        Mode(ChatCompletionToolChoiceMode),
        Named(ChatCompletionNamedToolChoice),
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "lowercase")]
    pub enum ChatCompletionToolChoiceMode {
        None,
        Auto,
        Required,
    }

    #[derive(Debug, Serialize)]
    pub struct ChatCompletionNamedToolChoice {
        #[serde(rename = "type")]
        pub type_: String,
        pub function: ChatCompletionNamedToolChoiceFunction,
    }

    #[derive(Debug, Serialize)]
    pub struct ChatCompletionNamedToolChoiceFunction {
        pub name: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChatCompletion {
        pub choices: Vec<ChatCompletionChoice>,
        pub usage: Option<CompletionUsage>,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChatCompletionChoice {
        pub message: ChatCompletionMessage,
    }

    #[derive(Debug, Deserialize)]
    pub struct ChatCompletionMessage {
        pub content: Option<String>,
        pub refusal: Option<String>,
        pub tool_calls: Option<Vec<ChatCompletionMessageToolCall>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct CompletionUsage {
        pub prompt_tokens: u32,
        pub completion_tokens: u32,
    }
}
