use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{gateway::CoffeeGateway, handlers, repository::RecipeRepository};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<CoffeeGateway>,
    pub recipes: Arc<dyn RecipeRepository>,
}

impl AppState {
    #[must_use]
    pub fn new(gateway: CoffeeGateway, recipes: Arc<dyn RecipeRepository>) -> Self {
        Self {
            gateway: Arc::new(gateway),
            recipes,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/getPossibleCoffee", post(handlers::get_possible_coffee))
        .route("/getRecipe", post(handlers::get_recipe))
        .route("/health", get(handlers::health_check));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
