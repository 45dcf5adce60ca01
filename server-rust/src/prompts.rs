//! Instructions and output contracts for the two gateway capabilities.

use coffee_llm::{OutputContract, SchemaField, SchemaKind};

pub const POSSIBLE_COFFEES_TOOL: &str = "get_possible_coffee_styles";
pub const RECIPE_TOOL: &str = "get_coffee_recipe";

pub const POSSIBLE_COFFEES_PROMPT: &str = r#"You analyze a list of ingredients and decide which coffee styles can be prepared with them.
The user message is a JSON array of ingredient names.

Rules:
1. Name coffee styles (for example Espresso, Latte, Mocha) that can be made from the given ingredients.
2. Never return a raw ingredient name as a coffee style.
3. If no coffee style can be made, set "failed" to true.
4. Answer only by calling the get_possible_coffee_styles function, for example:
{"coffees": ["Espresso", "Latte", "Cappuccino"], "failed": false}"#;

pub const RECIPE_PROMPT: &str = r#"You write a complete recipe for the coffee style named in the user message (a JSON string).

Rules:
1. Give the recipe a new identifier: the style name in lowercase, a dash, then a random suffix of six letters or digits. Never reuse an identifier.
2. List every ingredient it needs with a clear name.
3. Describe the preparation step by step.
4. Suggest a reasonable price greater than zero.
5. If the style is unknown or no recipe can be written, set "failed" to true.
6. Answer only by calling the get_coffee_recipe function, for example:
{"id": "<style>-<random suffix>", "name": "Latte", "ingredients": ["Milk", "Espresso"], "instructions": "Step 1: Brew the espresso. Step 2: Steam the milk. Step 3: Combine and serve.", "price": 4.5, "failed": false}"#;

fn failed_field() -> SchemaField {
    SchemaField::required(
        "failed",
        SchemaKind::Boolean,
        "True when the task could not be completed.",
    )
}

#[must_use]
pub fn possible_coffees_contract() -> OutputContract {
    OutputContract::new(
        POSSIBLE_COFFEES_TOOL,
        "Report the coffee styles that can be prepared from the given ingredients.",
    )
    .field(SchemaField::required(
        "coffees",
        SchemaKind::array_of(SchemaKind::String),
        "Coffee styles that can be prepared, such as Espresso or Latte.",
    ))
    .field(failed_field())
}

#[must_use]
pub fn recipe_contract() -> OutputContract {
    OutputContract::new(RECIPE_TOOL, "Report a full recipe for the given coffee style.")
        .field(SchemaField::required(
            "id",
            SchemaKind::String,
            "A unique identifier for the recipe.",
        ))
        .field(SchemaField::required(
            "name",
            SchemaKind::String,
            "The name of the coffee style.",
        ))
        .field(SchemaField::required(
            "ingredients",
            SchemaKind::array_of(SchemaKind::String),
            "Ingredients required to make the coffee.",
        ))
        .field(SchemaField::required(
            "instructions",
            SchemaKind::String,
            "Step-by-step preparation instructions.",
        ))
        .field(SchemaField::required(
            "price",
            SchemaKind::Number,
            "Suggested price for the coffee.",
        ))
        .field(failed_field())
}
