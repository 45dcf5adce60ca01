use coffee_llm::{
    llm_test::{MockGenerateResult, MockLanguageModel},
    LanguageModel, LanguageModelError, LanguageModelInput, Message, ModelResponse, Part,
};
use serde_json::json;

fn user_input(text: &str) -> LanguageModelInput {
    LanguageModelInput {
        messages: vec![Message::user(vec![Part::text(text)])],
        ..LanguageModelInput::default()
    }
}

#[tokio::test]
async fn mock_language_model_tracks_generate_inputs_and_returns_results() {
    let model = MockLanguageModel::new();

    let response1 = ModelResponse {
        content: vec![Part::text("Hello, world!")],
        ..ModelResponse::default()
    };

    model
        .enqueue_generate(response1.clone())
        .enqueue_generate(MockGenerateResult::error(LanguageModelError::InvalidInput(
            "generate error".to_string(),
        )))
        .enqueue_generate(MockGenerateResult::tool_call(
            "get_coffee_recipe",
            json!({ "failed": true }),
        ));

    let input1 = user_input("Hi");
    let res1 = model
        .generate(input1.clone())
        .await
        .expect("first generate should succeed");
    assert_eq!(res1, response1);
    let tracked = model.tracked_generate_inputs();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[0].messages, input1.messages);

    let err = model
        .generate(user_input("Error"))
        .await
        .expect_err("second generate should error");
    match err {
        LanguageModelError::InvalidInput(msg) => {
            assert_eq!(msg, "generate error");
        }
        other => panic!("unexpected error variant: {other:?}"),
    }

    let res3 = model
        .generate(user_input("Recipe"))
        .await
        .expect("third generate should succeed");
    let tool_call = res3.tool_calls().next().expect("tool call present");
    assert_eq!(tool_call.tool_name, "get_coffee_recipe");
    assert_eq!(tool_call.args, json!({ "failed": true }));
    assert_eq!(model.tracked_generate_inputs().len(), 3);
}

#[tokio::test]
async fn mock_language_model_errors_when_queue_is_empty() {
    let model = MockLanguageModel::new();

    let err = model
        .generate(user_input("Hi"))
        .await
        .expect_err("no mocked results");

    assert!(matches!(err, LanguageModelError::Invariant("mock", _)));
}

#[tokio::test]
async fn mock_language_model_restore_clears_state() {
    let model = MockLanguageModel::new();
    model.enqueue_generate(ModelResponse::default());
    model
        .generate(user_input("Hi"))
        .await
        .expect("generate succeeds");
    model.enqueue_generate(ModelResponse::default());

    model.restore();

    assert!(model.tracked_generate_inputs().is_empty());
    assert!(model.generate(user_input("Again")).await.is_err());
}
