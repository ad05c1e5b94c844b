use sqlx::{Pool, Postgres};

use crate::{
    error::StoreError,
    schema::{NewRecipe, Recipe, Uuid},
};

pub async fn list_user_recipes(
    user_id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Vec<Recipe>, StoreError> {
    let rows: Vec<Recipe> = sqlx::query_as(
        "
        SELECT id, user_id, name, description, photo, custom_text, created_at
        FROM recipes
        WHERE user_id = $1
        ORDER BY created_at DESC
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(StoreError::from_read)?;

    Ok(rows)
}

pub async fn get_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<Option<Recipe>, StoreError> {
    let row: Option<Recipe> = sqlx::query_as(
        "
        SELECT id, user_id, name, description, photo, custom_text, created_at
        FROM recipes
        WHERE id = $1
    ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(StoreError::from_read)?;

    Ok(row)
}

pub async fn create_recipe(
    user_id: Uuid,
    recipe: &NewRecipe,
    pool: &Pool<Postgres>,
) -> Result<Recipe, StoreError> {
    let row: Recipe = sqlx::query_as(
        "
        INSERT INTO recipes (user_id, name, description, photo, custom_text)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, name, description, photo, custom_text, created_at
    ",
    )
    .bind(user_id)
    .bind(&recipe.name)
    .bind(&recipe.description)
    .bind(&recipe.photo)
    .bind(&recipe.custom_text)
    .fetch_one(pool)
    .await
    .map_err(StoreError::from_write)?;

    Ok(row)
}

/// Removes the recipe row only. Linkage rows pointing at it are left in place.
pub async fn delete_recipe(id: Uuid, pool: &Pool<Postgres>) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(StoreError::from_write)?;

    Ok(())
}
