//! Storage for generated recipes.
//!
//! Only two backends exist: an in-process map and a disabled store that keeps
//! nothing. Which one the service uses is chosen by `storage` in the config.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::CoffeeRecipe;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("recipe {0} already exists")]
    AlreadyExists(String),
    #[error("recipe {0} not found")]
    NotFound(String),
    #[error("invalid recipe: {0}")]
    InvalidRecipe(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    async fn fetch_all(&self) -> RepositoryResult<Vec<CoffeeRecipe>>;
    async fn fetch_by_id(&self, id: &str) -> RepositoryResult<Option<CoffeeRecipe>>;
    async fn create(&self, recipe: CoffeeRecipe) -> RepositoryResult<()>;
    async fn update(&self, recipe: CoffeeRecipe) -> RepositoryResult<()>;
    async fn delete(&self, id: &str) -> RepositoryResult<()>;
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    None,
    Memory,
}

impl StorageKind {
    #[must_use]
    pub fn build(self) -> Arc<dyn RecipeRepository> {
        match self {
            Self::None => Arc::new(DisabledRecipeRepository),
            Self::Memory => Arc::new(InMemoryRecipeRepository::default()),
        }
    }
}

/// Keeps recipes keyed by id for the lifetime of the process. `fetch_all`
/// returns them in insertion order.
#[derive(Default)]
pub struct InMemoryRecipeRepository {
    recipes: RwLock<RecipeIndex>,
}

#[derive(Default)]
struct RecipeIndex {
    by_id: HashMap<String, CoffeeRecipe>,
    order: Vec<String>,
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn fetch_all(&self) -> RepositoryResult<Vec<CoffeeRecipe>> {
        let index = self.recipes.read().await;
        Ok(index
            .order
            .iter()
            .filter_map(|id| index.by_id.get(id).cloned())
            .collect())
    }

    async fn fetch_by_id(&self, id: &str) -> RepositoryResult<Option<CoffeeRecipe>> {
        Ok(self.recipes.read().await.by_id.get(id).cloned())
    }

    async fn create(&self, recipe: CoffeeRecipe) -> RepositoryResult<()> {
        if recipe.id.trim().is_empty() {
            return Err(RepositoryError::InvalidRecipe(
                "recipe id must not be empty".to_string(),
            ));
        }

        let mut index = self.recipes.write().await;
        if index.by_id.contains_key(&recipe.id) {
            return Err(RepositoryError::AlreadyExists(recipe.id));
        }
        index.order.push(recipe.id.clone());
        index.by_id.insert(recipe.id.clone(), recipe);
        Ok(())
    }

    async fn update(&self, recipe: CoffeeRecipe) -> RepositoryResult<()> {
        let mut index = self.recipes.write().await;
        let existing = index
            .by_id
            .get_mut(&recipe.id)
            .ok_or_else(|| RepositoryError::NotFound(recipe.id.clone()))?;
        *existing = recipe;
        Ok(())
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        let mut index = self.recipes.write().await;
        if index.by_id.remove(id).is_none() {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        index.order.retain(|existing| existing != id);
        Ok(())
    }
}

/// Accepts writes and forgets them; reads always come back empty.
pub struct DisabledRecipeRepository;

#[async_trait]
impl RecipeRepository for DisabledRecipeRepository {
    async fn fetch_all(&self) -> RepositoryResult<Vec<CoffeeRecipe>> {
        Ok(Vec::new())
    }

    async fn fetch_by_id(&self, _id: &str) -> RepositoryResult<Option<CoffeeRecipe>> {
        Ok(None)
    }

    async fn create(&self, _recipe: CoffeeRecipe) -> RepositoryResult<()> {
        Ok(())
    }

    async fn update(&self, _recipe: CoffeeRecipe) -> RepositoryResult<()> {
        Ok(())
    }

    async fn delete(&self, _id: &str) -> RepositoryResult<()> {
        Ok(())
    }
}
