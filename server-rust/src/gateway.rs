//! All interaction with the language model: prompt construction, forced tool
//! calls and validation of the structured answers.

use std::{collections::HashSet, sync::Arc};

use coffee_llm::{LanguageModel, LanguageModelInput, Message, OutputContract, Part};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, info_span, Instrument};

use crate::{
    errors::{GatewayError, GatewayResult},
    models::CoffeeRecipe,
    prompts,
};

#[derive(Debug, Deserialize)]
struct PossibleCoffeesAnswer {
    coffees: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RecipeAnswer {
    id: String,
    name: String,
    ingredients: Vec<String>,
    instructions: String,
    price: f64,
}

pub struct CoffeeGateway {
    model: Arc<dyn LanguageModel>,
}

impl CoffeeGateway {
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Ask the model which coffee styles can be made from `ingredients`.
    ///
    /// Styles that repeat an ingredient name (ignoring case and surrounding
    /// whitespace) are dropped, as are blanks and duplicates. Fails with
    /// [`GatewayError::NoValidResult`] when nothing is left.
    pub async fn possible_coffees(&self, ingredients: &[String]) -> GatewayResult<Vec<String>> {
        let contract = prompts::possible_coffees_contract();
        let answer: PossibleCoffeesAnswer = self
            .invoke(
                &contract,
                prompts::POSSIBLE_COFFEES_PROMPT,
                json!(ingredients).to_string(),
                "could not determine coffee styles for the provided ingredients",
            )
            .await?;

        let coffees = filter_ingredient_echoes(answer.coffees, ingredients);
        if coffees.is_empty() {
            return Err(GatewayError::NoValidResult);
        }

        debug!(count = coffees.len(), "model suggested coffee styles");
        Ok(coffees)
    }

    /// Ask the model for a full recipe of `coffee_style`.
    pub async fn recipe(&self, coffee_style: &str) -> GatewayResult<CoffeeRecipe> {
        let contract = prompts::recipe_contract();
        let answer: RecipeAnswer = self
            .invoke(
                &contract,
                prompts::RECIPE_PROMPT,
                json!(coffee_style).to_string(),
                "unable to generate a recipe for the provided coffee style",
            )
            .await?;

        let recipe = CoffeeRecipe {
            id: answer.id,
            name: answer.name,
            ingredients: answer.ingredients,
            instructions: answer.instructions,
            price: answer.price,
        };
        if !is_complete(&recipe) {
            return Err(GatewayError::IncompleteResult);
        }

        debug!(id = %recipe.id, name = %recipe.name, "model produced recipe");
        Ok(recipe)
    }

    /// Force the model to answer through `contract` and decode its arguments.
    /// A set `failed` flag takes precedence over every other field.
    async fn invoke<T: DeserializeOwned>(
        &self,
        contract: &OutputContract,
        system_prompt: &str,
        user_content: String,
        declined_message: &str,
    ) -> GatewayResult<T> {
        let input = LanguageModelInput {
            system_prompt: Some(system_prompt.to_string()),
            messages: vec![Message::user(vec![Part::text(user_content)])],
            tools: Some(vec![contract.to_tool()]),
            tool_choice: Some(contract.tool_choice()),
            temperature: Some(0.0),
            ..LanguageModelInput::default()
        };

        let span = info_span!(
            "gateway.invoke",
            tool = %contract.name,
            provider = self.model.provider(),
            model = %self.model.model_id(),
        );
        let response = self.model.generate(input).instrument(span).await?;

        let tool_call = response.tool_calls().next().ok_or_else(|| {
            GatewayError::MalformedUpstreamResponse("no tool calls found in response".to_string())
        })?;
        if tool_call.tool_name != contract.name {
            return Err(GatewayError::MalformedUpstreamResponse(format!(
                "unexpected function called: {}",
                tool_call.tool_name
            )));
        }

        if declined(&tool_call.args)? {
            return Err(GatewayError::ModelDeclinedTask(declined_message.to_string()));
        }

        serde_json::from_value(tool_call.args.clone()).map_err(|error| {
            GatewayError::MalformedUpstreamResponse(format!(
                "failed to parse tool call arguments: {error}"
            ))
        })
    }
}

/// Read the contract's `failed` flag. It is required and must be a boolean.
fn declined(args: &Value) -> GatewayResult<bool> {
    match args.get("failed") {
        Some(Value::Bool(failed)) => Ok(*failed),
        Some(other) => Err(GatewayError::MalformedUpstreamResponse(format!(
            "failed to parse tool call arguments: `failed` must be a boolean, got {other}"
        ))),
        None => Err(GatewayError::MalformedUpstreamResponse(
            "failed to parse tool call arguments: missing field `failed`".to_string(),
        )),
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn filter_ingredient_echoes(coffees: Vec<String>, ingredients: &[String]) -> Vec<String> {
    let ingredients: HashSet<String> = ingredients.iter().map(|i| normalize(i)).collect();
    let mut seen = HashSet::new();

    coffees
        .into_iter()
        .filter(|coffee| {
            let key = normalize(coffee);
            !key.is_empty() && !ingredients.contains(&key) && seen.insert(key)
        })
        .collect()
}

fn is_complete(recipe: &CoffeeRecipe) -> bool {
    !recipe.ingredients.is_empty() && !recipe.instructions.trim().is_empty() && recipe.price > 0.0
}
