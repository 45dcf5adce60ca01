use serde::{Deserialize, Serialize};

/// A complete recipe for one coffee style, as produced by the model gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoffeeRecipe {
    pub id: String,
    pub name: String,
    /// At least one ingredient.
    pub ingredients: Vec<String>,
    pub instructions: String,
    /// Strictly positive.
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct PossibleCoffeeRequest {
    pub ingredients: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PossibleCoffeeResponse {
    pub possible_coffees: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub coffee_type: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RecipeResponse {
    pub recipe: RecipeSummary,
}

/// The part of a [`CoffeeRecipe`] surfaced by `/api/getRecipe`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RecipeSummary {
    pub ingredients: Vec<String>,
    pub instructions: String,
}

impl From<&CoffeeRecipe> for RecipeSummary {
    fn from(recipe: &CoffeeRecipe) -> Self {
        Self {
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
        }
    }
}
