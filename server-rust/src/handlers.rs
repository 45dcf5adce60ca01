use axum::{extract::rejection::JsonRejection, extract::State, response::Response, Json};
use tracing::{info, warn};

use crate::{
    envelope,
    errors::ApiError,
    models::{
        PossibleCoffeeRequest, PossibleCoffeeResponse, RecipeRequest, RecipeResponse,
        RecipeSummary,
    },
    routes::AppState,
};

fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

/// `POST /api/getPossibleCoffee`
pub async fn get_possible_coffee(
    State(state): State<AppState>,
    payload: Result<Json<PossibleCoffeeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = decode(payload)?;
    if request.ingredients.is_empty() {
        return Err(ApiError::Validation(
            "ingredients must contain at least one item".to_string(),
        ));
    }
    if request.ingredients.iter().any(|i| i.trim().is_empty()) {
        return Err(ApiError::Validation(
            "ingredients must not contain empty names".to_string(),
        ));
    }

    info!(ingredients = request.ingredients.len(), "suggesting coffee styles");
    let possible_coffees = state.gateway.possible_coffees(&request.ingredients).await?;

    Ok(envelope::success(PossibleCoffeeResponse { possible_coffees }))
}

/// `POST /api/getRecipe`
///
/// Only ingredients and instructions are returned; the recipe as a whole is
/// handed to the recipe repository.
pub async fn get_recipe(
    State(state): State<AppState>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = decode(payload)?;
    let coffee_type = request.coffee_type.trim();
    if coffee_type.is_empty() {
        return Err(ApiError::Validation(
            "coffee_type must not be empty".to_string(),
        ));
    }

    info!(coffee_type, "generating recipe");
    let recipe = state.gateway.recipe(coffee_type).await?;
    let summary = RecipeSummary::from(&recipe);

    if let Err(error) = state.recipes.create(recipe).await {
        warn!(%error, coffee_type, "failed to record generated recipe");
    }

    Ok(envelope::success(RecipeResponse { recipe: summary }))
}

/// `GET /api/health`
pub async fn health_check() -> Response {
    envelope::success("Ready")
}
