use std::collections::HashMap;

use crate::{
    error::StoreError,
    schema::{Ingredient, Recipe, RecipeIngredient, RecipeWithIngredients, Uuid},
    store::RecipeStore,
};

/// Resolves each recipe's ingredient names through its own linkage rows.
/// Links pointing at ingredients missing from the catalog are dropped.
pub fn attach_ingredients(
    recipes: Vec<Recipe>,
    links: &[RecipeIngredient],
    catalog: &[Ingredient],
) -> Vec<RecipeWithIngredients> {
    let names: HashMap<Uuid, &str> = catalog
        .iter()
        .map(|ing| (ing.id, ing.name.as_str()))
        .collect();

    recipes
        .into_iter()
        .map(|recipe| {
            let ingredients = links
                .iter()
                .filter(|link| link.recipe_id == recipe.id)
                .filter_map(|link| names.get(&link.ingredient_id))
                .map(|name| name.to_string())
                .collect();

            RecipeWithIngredients {
                recipe,
                ingredients,
            }
        })
        .collect()
}

/// Fetches the user's recipes newest first with their ingredient names. Any failed step fails the load.
pub async fn load_recipes<S: RecipeStore>(
    store: &S,
    user_id: Uuid,
) -> Result<Vec<RecipeWithIngredients>, StoreError> {
    let recipes = store.list_user_recipes(user_id).await?;
    let recipe_ids: Vec<Uuid> = recipes.iter().map(|recipe| recipe.id).collect();
    resolve(store, recipes, &recipe_ids).await
}

pub(crate) async fn resolve<S: RecipeStore>(
    store: &S,
    recipes: Vec<Recipe>,
    recipe_ids: &[Uuid],
) -> Result<Vec<RecipeWithIngredients>, StoreError> {
    let links = store.list_recipe_links(recipe_ids).await?;
    let catalog = store.list_ingredients().await?;

    Ok(attach_ingredients(recipes, &links, &catalog))
}
