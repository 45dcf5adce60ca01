mod client_utils;
mod errors;
mod language_model;
pub mod llm_test;
pub mod openai;
mod schema;
mod telemetry;
mod types;

pub use errors::*;
pub use language_model::LanguageModel;
pub use schema::{OutputContract, SchemaField, SchemaKind};
pub use types::*;
