use std::{cell::RefCell, collections::HashSet};

use chrono::{DateTime, Utc};

use crate::{
    error::StoreError,
    schema::{Ingredient, NewRecipe, Recipe, RecipeIngredient, Uuid},
    store::RecipeStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Failure {
    ListIngredients,
    CreateIngredient,
    ListRecipes,
    GetRecipe,
    ListLinks,
    CreateRecipe,
    DeleteRecipe,
    /// Fails the n-th linkage insert, counting from 1.
    LinkIngredient(usize),
}

#[derive(Default)]
struct State {
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    links: Vec<RecipeIngredient>,
    failures: HashSet<Failure>,
    link_attempts: usize,
    next_id: u128,
    clock: i64,
}

impl State {
    fn next_id(&mut self) -> Uuid {
        self.next_id += 1;
        Uuid::from_u128(1_000 + self.next_id)
    }

    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        DateTime::<Utc>::from_timestamp(1_700_000_000 + self.clock, 0).unwrap_or_default()
    }

    fn check(&self, failure: Failure) -> Result<(), String> {
        if self.failures.contains(&failure) {
            return Err(format!("{failure:?} failed"));
        }
        Ok(())
    }
}

/// In-memory store with per-operation failure injection.
#[derive(Default)]
pub struct MemoryStore {
    state: RefCell<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(ingredients: &[Ingredient]) -> Self {
        let store = Self::new();
        store.state.borrow_mut().ingredients = ingredients.to_vec();
        store
    }

    pub fn fail(&self, failure: Failure) {
        self.state.borrow_mut().failures.insert(failure);
    }

    pub fn recover(&self, failure: Failure) {
        self.state.borrow_mut().failures.remove(&failure);
    }

    pub fn seed_ingredient(&self, name: &str) -> Uuid {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.ingredients.push(Ingredient {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn seed_recipe(&self, user_id: Uuid, name: &str) -> Uuid {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        let created_at = state.tick();
        state.recipes.push(Recipe {
            id,
            user_id,
            name: name.to_string(),
            description: String::new(),
            photo: None,
            custom_text: None,
            created_at,
        });
        id
    }

    pub fn seed_link(&self, recipe_id: Uuid, ingredient_id: Uuid) {
        self.state.borrow_mut().links.push(RecipeIngredient {
            recipe_id,
            ingredient_id,
        });
    }

    pub fn ingredient_names(&self) -> Vec<String> {
        let state = self.state.borrow();
        state.ingredients.iter().map(|ing| ing.name.to_owned()).collect()
    }

    pub fn recipe(&self, id: Uuid) -> Option<Recipe> {
        let state = self.state.borrow();
        state.recipes.iter().find(|r| r.id == id).cloned()
    }

    pub fn rename_recipe(&self, id: Uuid, name: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(recipe) = state.recipes.iter_mut().find(|r| r.id == id) {
            recipe.name = name.to_string();
        }
    }

    pub fn links_of(&self, recipe_id: Uuid) -> Vec<Uuid> {
        let state = self.state.borrow();
        state
            .links
            .iter()
            .filter(|link| link.recipe_id == recipe_id)
            .map(|link| link.ingredient_id)
            .collect()
    }
}

impl RecipeStore for MemoryStore {
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, StoreError> {
        let state = self.state.borrow();
        state.check(Failure::ListIngredients).map_err(StoreError::fetch)?;

        let mut rows = state.ingredients.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn create_ingredient(&self, name: &str) -> Result<Ingredient, StoreError> {
        let mut state = self.state.borrow_mut();
        state.check(Failure::CreateIngredient).map_err(StoreError::write)?;

        let row = Ingredient {
            id: state.next_id(),
            name: name.to_string(),
        };
        state.ingredients.push(row.clone());
        Ok(row)
    }

    async fn list_user_recipes(&self, user_id: Uuid) -> Result<Vec<Recipe>, StoreError> {
        let state = self.state.borrow();
        state.check(Failure::ListRecipes).map_err(StoreError::fetch)?;

        let mut rows: Vec<Recipe> = state
            .recipes
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<Recipe>, StoreError> {
        let state = self.state.borrow();
        state.check(Failure::GetRecipe).map_err(StoreError::fetch)?;

        Ok(state.recipes.iter().find(|r| r.id == recipe_id).cloned())
    }

    async fn list_recipe_links(
        &self,
        recipe_ids: &[Uuid],
    ) -> Result<Vec<RecipeIngredient>, StoreError> {
        let state = self.state.borrow();
        state.check(Failure::ListLinks).map_err(StoreError::fetch)?;

        Ok(state
            .links
            .iter()
            .filter(|link| recipe_ids.contains(&link.recipe_id))
            .copied()
            .collect())
    }

    async fn create_recipe(&self, user_id: Uuid, recipe: &NewRecipe) -> Result<Recipe, StoreError> {
        let mut state = self.state.borrow_mut();
        state.check(Failure::CreateRecipe).map_err(StoreError::write)?;

        let row = Recipe {
            id: state.next_id(),
            user_id,
            name: recipe.name.to_owned(),
            description: recipe.description.to_owned(),
            photo: recipe.photo.to_owned(),
            custom_text: recipe.custom_text.to_owned(),
            created_at: state.tick(),
        };
        state.recipes.push(row.clone());
        Ok(row)
    }

    async fn link_ingredient(&self, recipe_id: Uuid, ingredient_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.borrow_mut();
        state.link_attempts += 1;
        let attempt = state.link_attempts;
        state
            .check(Failure::LinkIngredient(attempt))
            .map_err(StoreError::write)?;

        state.links.push(RecipeIngredient {
            recipe_id,
            ingredient_id,
        });
        Ok(())
    }

    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.borrow_mut();
        state.check(Failure::DeleteRecipe).map_err(StoreError::write)?;

        state.recipes.retain(|r| r.id != recipe_id);
        Ok(())
    }
}
