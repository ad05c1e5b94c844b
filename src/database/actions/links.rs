use sqlx::{Pool, Postgres};

use crate::{
    error::StoreError,
    schema::{RecipeIngredient, Uuid},
};

pub async fn list_recipe_links(
    recipe_ids: &[Uuid],
    pool: &Pool<Postgres>,
) -> Result<Vec<RecipeIngredient>, StoreError> {
    let rows: Vec<RecipeIngredient> = sqlx::query_as(
        "SELECT recipe_id, ingredient_id FROM recipe_ingredients WHERE recipe_id = ANY($1)",
    )
    .bind(recipe_ids.to_vec())
    .fetch_all(pool)
    .await
    .map_err(StoreError::from_read)?;

    Ok(rows)
}

pub async fn link_ingredient(
    recipe_id: Uuid,
    ingredient_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<(), StoreError> {
    sqlx::query("INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES ($1, $2)")
        .bind(recipe_id)
        .bind(ingredient_id)
        .execute(pool)
        .await
        .map_err(StoreError::from_write)?;

    Ok(())
}
