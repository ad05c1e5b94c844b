use sqlx::{Pool, Postgres};

use crate::{
    actions::{ingredients, links, recipes},
    error::StoreError,
    schema::{Ingredient, NewRecipe, Recipe, RecipeIngredient, Uuid},
};

/// Remote relational store backing the recipe pages.
///
/// Reads decode into typed rows or fail with a `Parse` error; nothing untyped crosses this seam.
#[allow(async_fn_in_trait)]
pub trait RecipeStore {
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, StoreError>;

    async fn create_ingredient(&self, name: &str) -> Result<Ingredient, StoreError>;

    async fn list_user_recipes(&self, user_id: Uuid) -> Result<Vec<Recipe>, StoreError>;

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<Recipe>, StoreError>;

    async fn list_recipe_links(
        &self,
        recipe_ids: &[Uuid],
    ) -> Result<Vec<RecipeIngredient>, StoreError>;

    async fn create_recipe(&self, user_id: Uuid, recipe: &NewRecipe)
        -> Result<Recipe, StoreError>;

    async fn link_ingredient(&self, recipe_id: Uuid, ingredient_id: Uuid)
        -> Result<(), StoreError>;

    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<(), StoreError>;
}

impl RecipeStore for Pool<Postgres> {
    async fn list_ingredients(&self) -> Result<Vec<Ingredient>, StoreError> {
        ingredients::list_ingredients(self).await
    }

    async fn create_ingredient(&self, name: &str) -> Result<Ingredient, StoreError> {
        ingredients::create_ingredient(name, self).await
    }

    async fn list_user_recipes(&self, user_id: Uuid) -> Result<Vec<Recipe>, StoreError> {
        recipes::list_user_recipes(user_id, self).await
    }

    async fn get_recipe(&self, recipe_id: Uuid) -> Result<Option<Recipe>, StoreError> {
        recipes::get_recipe(recipe_id, self).await
    }

    async fn list_recipe_links(
        &self,
        recipe_ids: &[Uuid],
    ) -> Result<Vec<RecipeIngredient>, StoreError> {
        links::list_recipe_links(recipe_ids, self).await
    }

    async fn create_recipe(
        &self,
        user_id: Uuid,
        recipe: &NewRecipe,
    ) -> Result<Recipe, StoreError> {
        recipes::create_recipe(user_id, recipe, self).await
    }

    async fn link_ingredient(
        &self,
        recipe_id: Uuid,
        ingredient_id: Uuid,
    ) -> Result<(), StoreError> {
        links::link_ingredient(recipe_id, ingredient_id, self).await
    }

    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<(), StoreError> {
        recipes::delete_recipe(recipe_id, self).await
    }
}
