pub mod config;
pub mod envelope;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod models;
mod prompts;
pub mod repository;
pub mod routes;
pub mod telemetry;

pub use gateway::CoffeeGateway;
pub use routes::{router, AppState};
