use coffee_llm::{
    openai::{OpenAIChatModel, OpenAIChatModelOptions},
    LanguageModel, LanguageModelError, LanguageModelInput, Message, ModelUsage, OutputContract,
    Part, SchemaField, SchemaKind,
};
use httpmock::prelude::*;
use serde_json::json;

fn model_for(server: &MockServer) -> OpenAIChatModel {
    OpenAIChatModel::new(
        "gpt-4",
        OpenAIChatModelOptions {
            base_url: Some(server.base_url()),
            api_key: "sk-test".to_string(),
            ..Default::default()
        },
    )
}

fn styles_input() -> LanguageModelInput {
    let contract = OutputContract::new("get_possible_coffee_styles", "List styles.")
        .field(SchemaField::required(
            "coffees",
            SchemaKind::array_of(SchemaKind::String),
            "Style names.",
        ))
        .field(SchemaField::required(
            "failed",
            SchemaKind::Boolean,
            "Whether the task failed.",
        ));

    LanguageModelInput {
        system_prompt: Some("Suggest coffee styles.".to_string()),
        messages: vec![Message::user(vec![Part::text(r#"["milk","espresso"]"#)])],
        tools: Some(vec![contract.to_tool()]),
        tool_choice: Some(contract.tool_choice()),
        temperature: Some(0.0),
        ..LanguageModelInput::default()
    }
}

#[tokio::test]
async fn generate_sends_forced_tool_call_and_parses_arguments() {
    let server = MockServer::start_async().await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer sk-test")
                .json_body_partial(
                    r#"{
                        "model": "gpt-4",
                        "temperature": 0.0,
                        "tool_choice": {
                            "type": "function",
                            "function": { "name": "get_possible_coffee_styles" }
                        },
                        "messages": [
                            { "role": "system", "content": "Suggest coffee styles." },
                            { "role": "user", "content": "[\"milk\",\"espresso\"]" }
                        ]
                    }"#,
                );
            then.status(200).json_body(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "finish_reason": "stop",
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {
                                "name": "get_possible_coffee_styles",
                                "arguments": "{\"coffees\":[\"Latte\"],\"failed\":false}"
                            }
                        }]
                    }
                }],
                "usage": { "prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49 }
            }));
        })
        .await;

    let response = model_for(&server)
        .generate(styles_input())
        .await
        .expect("generate succeeds");

    completion.assert_async().await;
    assert_eq!(
        response.content,
        vec![Part::tool_call(
            "call_1",
            "get_possible_coffee_styles",
            json!({ "coffees": ["Latte"], "failed": false })
        )]
    );
    assert_eq!(
        response.usage,
        Some(ModelUsage {
            input_tokens: 42,
            output_tokens: 7
        })
    );
}

#[tokio::test]
async fn generate_sends_tool_schema() {
    let server = MockServer::start_async().await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions").json_body_partial(
                r#"{
                    "tools": [{
                        "type": "function",
                        "function": {
                            "name": "get_possible_coffee_styles",
                            "parameters": {
                                "type": "object",
                                "required": ["coffees", "failed"]
                            }
                        }
                    }]
                }"#,
            );
            then.status(200).json_body(json!({
                "choices": [{ "message": { "role": "assistant", "content": "ok" } }]
            }));
        })
        .await;

    let response = model_for(&server)
        .generate(styles_input())
        .await
        .expect("generate succeeds");

    completion.assert_async().await;
    assert_eq!(response.content, vec![Part::text("ok")]);
    assert_eq!(response.usage, None);
}

#[tokio::test]
async fn generate_maps_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(401)
                .json_body(json!({ "error": { "message": "Incorrect API key provided" } }));
        })
        .await;

    let error = model_for(&server)
        .generate(styles_input())
        .await
        .expect_err("unauthorized call fails");

    match error {
        LanguageModelError::StatusCode(status, body) => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("Incorrect API key provided"));
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
}

#[tokio::test]
async fn generate_maps_server_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(503).body("overloaded");
        })
        .await;

    let error = model_for(&server)
        .generate(styles_input())
        .await
        .expect_err("unavailable upstream fails");

    assert!(matches!(error, LanguageModelError::StatusCode(status, _) if status.as_u16() == 503));
}

#[tokio::test]
async fn generate_rejects_empty_choices() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        })
        .await;

    let error = model_for(&server)
        .generate(styles_input())
        .await
        .expect_err("empty choices fail");

    assert!(matches!(error, LanguageModelError::Invariant("openai", _)));
}

#[tokio::test]
async fn generate_surfaces_refusal() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "refusal": "I can't help with that."
                    }
                }]
            }));
        })
        .await;

    let error = model_for(&server)
        .generate(styles_input())
        .await
        .expect_err("refusal fails");

    match error {
        LanguageModelError::Refusal(message) => assert_eq!(message, "I can't help with that."),
        other => panic!("unexpected error variant: {other:?}"),
    }
}
