use crate::{LanguageModelInput, LanguageModelResult, ModelResponse};
use std::time::Instant;
use tracing::{field, info_span, Instrument};

/// Run a `generate` call inside a `coffee_llm.generate` span and record the
/// outcome on it.
pub async fn trace_generate<F, Fut>(
    provider: &str,
    model_id: &str,
    input: LanguageModelInput,
    f: F,
) -> LanguageModelResult<ModelResponse>
where
    F: FnOnce(LanguageModelInput) -> Fut,
    Fut: std::future::Future<Output = LanguageModelResult<ModelResponse>>,
{
    let span = info_span!(
        "coffee_llm.generate",
        provider,
        model = model_id,
        temperature = field::Empty,
        tool_choice = field::Empty,
        input_tokens = field::Empty,
        output_tokens = field::Empty,
    );
    if let Some(temperature) = input.temperature {
        span.record("temperature", temperature);
    }
    if let Some(tool_choice) = &input.tool_choice {
        span.record("tool_choice", field::debug(tool_choice));
    }

    let start_time = Instant::now();
    let result = f(input).instrument(span.clone()).await;
    let elapsed_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);

    let _entered = span.enter();
    match &result {
        Ok(response) => {
            if let Some(usage) = &response.usage {
                span.record("input_tokens", usage.input_tokens);
                span.record("output_tokens", usage.output_tokens);
            }
            tracing::debug!(elapsed_ms, parts = response.content.len(), "model call finished");
        }
        Err(error) => {
            tracing::warn!(elapsed_ms, %error, "model call failed");
        }
    }

    result
}
